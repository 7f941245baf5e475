/// Arquivo: sched/sync/mod.rs
///
/// Propósito: Primitivas de bloqueio construídas sobre o escalonador.
///
/// Módulos contidos:
/// - `waitqueue`: Fila de espera por evento com wakeup coletivo.
pub mod waitqueue;

pub use waitqueue::WaitQueue;
