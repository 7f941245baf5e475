/// Arquivo: core/time/mod.rs
///
/// Propósito: Subsistema de tempo do escalonador.
///
/// Módulos contidos:
/// - `timer`: Fila per-CPU de timers one-shot, ordenada por expiração.
pub mod timer;
