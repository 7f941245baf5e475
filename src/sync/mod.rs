/// Arquivo: sync/mod.rs
///
/// Propósito: Primitivas de sincronização do núcleo.
/// Os dados compartilhados usam `spin::Mutex`; este módulo adiciona o
/// guard de interrupções que acompanha cada seção crítica per-CPU.
pub mod irq;

pub use irq::IrqGuard;
