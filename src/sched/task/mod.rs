//! # Task - visão de escalonamento
//!
//! O que o escalonador precisa saber de uma task: identidade, estado de
//! escalonamento, CPU dona e CPU alvo (migração), e a reserva EDF quando
//! houver. Criação/destruição de tasks e espaços de endereçamento são
//! responsabilidade de colaboradores externos.
//!
//! Tasks circulam como `Arc<Task>`: a runqueue que contém o Arc é a dona
//! lógica; o slot "current" de cada CPU guarda uma referência não-dona.
//! Os campos mutáveis são atômicos - as transições de estado usam
//! compare-exchange, o que torna o wakeup imune a corridas com o
//! caminho de bloqueio (sem wakeups perdidos).

pub mod state;

use alloc::string::String;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use spin::Mutex;

use crate::core::smp::topology::CpuId;
use state::{StateMask, TaskState};

/// Identificador único de task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(pub u32);

/// ID convencional das idle tasks (uma por CPU, nunca numa runqueue)
pub const IDLE_TASK_ID: TaskId = TaskId(0);

/// Parâmetros de reserva EDF de uma task (microsegundos).
///
/// `slice` é o orçamento de CPU por período: 0 < slice <= period,
/// limitado pelos min/max configurados na runqueue EDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdfParams {
    pub period_us: u64,
    pub slice_us: u64,
}

/// Task sob a ótica do escalonador.
pub struct Task {
    id: TaskId,
    name: String,
    state: AtomicU8,
    /// CPU onde a task reside atualmente
    cpu_id: AtomicU32,
    /// CPU onde a task deve rodar; diferente de `cpu_id` => migração pendente
    cpu_target_id: AtomicU32,
    /// Reserva EDF, se a task for de tempo real
    edf: Mutex<Option<EdfParams>>,
    /// Reserva admitida por `edf_sched_admit` (pré-condição de enfileirar)
    edf_admitted: AtomicBool,
}

impl Task {
    /// Cria uma task comum (round-robin), residente em `cpu`.
    pub fn new(id: TaskId, name: &str, cpu: CpuId) -> Self {
        Self {
            id,
            name: String::from(name),
            state: AtomicU8::new(TaskState::Ready as u8),
            cpu_id: AtomicU32::new(cpu),
            cpu_target_id: AtomicU32::new(cpu),
            edf: Mutex::new(None),
            edf_admitted: AtomicBool::new(false),
        }
    }

    /// Cria uma task com reserva EDF (ainda não admitida).
    pub fn new_edf(id: TaskId, name: &str, cpu: CpuId, params: EdfParams) -> Self {
        let task = Self::new(id, name, cpu);
        *task.edf.lock() = Some(params);
        task
    }

    /// Cria a idle task de uma CPU. Nasce em Running: é quem está no
    /// controle quando o escalonador assume.
    pub(crate) fn idle(cpu: CpuId) -> Self {
        let task = Self::new(IDLE_TASK_ID, "idle_task", cpu);
        task.state.store(TaskState::Running as u8, Ordering::Relaxed);
        task
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_idle(&self) -> bool {
        self.id == IDLE_TASK_ID
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Transição condicional de estado: troca para `to` somente se o
    /// estado atual pertence a `from`. Retorna o estado que permitiu a
    /// transição, ou Err com o estado observado.
    pub fn transition(&self, from: StateMask, to: TaskState) -> Result<TaskState, TaskState> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let observed = TaskState::from_u8(current);
            if !from.matches(observed) {
                return Err(observed);
            }
            match self.state.compare_exchange(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(observed),
                Err(actual) => current = actual,
            }
        }
    }

    /// CPU onde a task reside
    pub fn cpu(&self) -> CpuId {
        self.cpu_id.load(Ordering::Acquire)
    }

    pub(crate) fn set_cpu(&self, cpu: CpuId) {
        self.cpu_id.store(cpu, Ordering::Release);
    }

    /// CPU alvo (migração pendente se diferente de `cpu()`)
    pub fn target_cpu(&self) -> CpuId {
        self.cpu_target_id.load(Ordering::Acquire)
    }

    pub(crate) fn set_target_cpu(&self, cpu: CpuId) {
        self.cpu_target_id.store(cpu, Ordering::Release);
    }

    /// Cópia dos parâmetros EDF, se houver
    pub fn edf_params(&self) -> Option<EdfParams> {
        *self.edf.lock()
    }

    pub(crate) fn set_edf_params(&self, params: EdfParams) {
        *self.edf.lock() = Some(params);
    }

    pub(crate) fn edf_admitted(&self) -> bool {
        self.edf_admitted.load(Ordering::Acquire)
    }

    pub(crate) fn set_edf_admitted(&self, admitted: bool) {
        self.edf_admitted.store(admitted, Ordering::Release);
    }
}
