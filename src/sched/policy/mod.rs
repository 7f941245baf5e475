/// Arquivo: sched/policy/mod.rs
///
/// Propósito: Políticas de runqueue.
///
/// Módulos contidos:
/// - `rr`: Round-robin cooperativo.
/// - `edf`: Earliest Deadline First com reserva de utilização.
pub mod edf;
pub mod rr;
