//! Estados de task

use bitflags::bitflags;

/// Estado de escalonamento de uma task
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Pronta para executar (na runqueue, aguardando dispatch)
    Ready = 0,
    /// Executando em alguma CPU
    Running = 1,
    /// Bloqueada, pode ser acordada por sinal
    Interruptible = 2,
    /// Bloqueada, só acorda pelo evento esperado
    Uninterruptible = 3,
    /// Parada (debugger/controle de jobs)
    Stopped = 4,
    /// Terminada, aguardando cleanup
    Exited = 5,
}

impl TaskState {
    /// Verifica se pode ser despachada
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }

    pub(crate) const fn from_u8(v: u8) -> TaskState {
        match v {
            0 => TaskState::Ready,
            1 => TaskState::Running,
            2 => TaskState::Interruptible,
            3 => TaskState::Uninterruptible,
            4 => TaskState::Stopped,
            _ => TaskState::Exited,
        }
    }
}

bitflags! {
    /// Máscara de estados, usada para expressar de quais estados prévios
    /// um wakeup é válido (`sched_wakeup_task`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateMask: u8 {
        const READY           = 1 << 0;
        const RUNNING         = 1 << 1;
        const INTERRUPTIBLE   = 1 << 2;
        const UNINTERRUPTIBLE = 1 << 3;
        const STOPPED         = 1 << 4;
        const EXITED          = 1 << 5;
    }
}

impl StateMask {
    /// Wakeup "normal": qualquer bloqueio por espera de evento
    pub const NORMAL: StateMask = StateMask::INTERRUPTIBLE.union(StateMask::UNINTERRUPTIBLE);

    /// A máscara contém o estado dado?
    pub fn matches(self, state: TaskState) -> bool {
        self.bits() & (1u8 << state as u8) != 0
    }
}
