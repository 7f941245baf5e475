/// Arquivo: sched/mod.rs
///
/// Propósito: Escalonador per-CPU.
/// Cada CPU possui uma runqueue independente (round-robin ou EDF,
/// escolhida na inicialização) e uma idle task. Migração entre CPUs é
/// cooperativa: marca-se a CPU alvo na task e a CPU de origem a desvia
/// no próximo `schedule()`.
///
/// Módulos contidos:
/// - `core`: Laço de dispatch, runqueue, operações públicas (add, del,
///   wakeup, bind, admissão EDF).
/// - `policy`: Políticas de fila: round-robin e EDF com controle de
///   admissão por reserva de utilização.
/// - `task`: Task sob a ótica do escalonador (estado, CPUs, reserva).
/// - `sync`: Filas de espera (bloqueio por evento com wakeup coletivo).
pub mod core;
pub mod policy;
pub mod sync;
pub mod task;

#[cfg(test)]
mod tests;
