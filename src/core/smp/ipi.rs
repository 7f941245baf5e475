//! Arquivo: core/smp/ipi.rs
//!
//! Propósito: Vetores de Interrupções Inter-Processador (IPIs).
//! Usados para coordenar atividades em sistemas SMP: reschedule remoto e
//! cross-calls genéricas (que por sua vez carregam TLB shootdown etc.).
//!
//! O envio físico é delegado à camada de arquitetura via
//! `Platform::send_ipi`; o recebimento entra pelo handler correspondente
//! no `Kernel` (`xcall_interrupt`, `reschedule_interrupt`).

/// Vetores de IPI (definidos por convenção no kernel)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpiVector {
    /// Reschedule: seta a flag need-resched da CPU alvo
    Reschedule = 0xFC,
    /// Call Function: executa função remota (cross-call)
    CallFunction = 0xFB,
}
