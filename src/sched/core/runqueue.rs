//! Runqueue de uma CPU
//!
//! Fachada sobre as políticas concretas: a política é escolhida na
//! inicialização e todas as CPUs usam a mesma. O laço de dispatch e as
//! operações públicas falam só com esta fachada.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::core::smp::topology::CpuId;
use crate::sched::core::policy::{PolicyKind, SchedConfig};
use crate::sched::policy::edf::EdfRq;
use crate::sched::policy::rr::RrRq;
use crate::sched::task::{EdfParams, Task};
use crate::sys::Errno;

pub(crate) enum RunQueue {
    Rr(RrRq),
    Edf(EdfRq),
}

impl RunQueue {
    pub(crate) fn new(cpu: CpuId, config: &SchedConfig) -> Self {
        match config.policy {
            PolicyKind::RoundRobin => RunQueue::Rr(RrRq::new(cpu)),
            PolicyKind::Deadline => RunQueue::Edf(EdfRq::new(cpu, config.edf.clone())),
        }
    }

    /// Insere uma task residente nesta CPU
    pub(crate) fn add_task(&mut self, task: Arc<Task>, now_us: u64) -> Result<(), Errno> {
        match self {
            RunQueue::Rr(rq) => {
                rq.add_task(task);
                Ok(())
            }
            RunQueue::Edf(rq) => rq.add_task(task, now_us),
        }
    }

    /// Remove a task; retorna se estava presente
    pub(crate) fn del_task(&mut self, task: &Arc<Task>) -> bool {
        match self {
            RunQueue::Rr(rq) => rq.del_task(task),
            RunQueue::Edf(rq) => rq.del_task(task),
        }
    }

    /// Escolhe a próxima task; desvios de migração vão para `migrate`
    pub(crate) fn pick_next(
        &mut self,
        now_us: u64,
        migrate: &mut Vec<Arc<Task>>,
    ) -> Option<Arc<Task>> {
        match self {
            RunQueue::Rr(rq) => rq.pick_next(migrate),
            RunQueue::Edf(rq) => rq.pick(now_us, migrate),
        }
    }

    /// Devolve a task anterior à posição justa da política: fim da fila
    /// no round-robin, nada a fazer no EDF (a posição é o deadline).
    pub(crate) fn requeue_tail(&mut self, task: &Arc<Task>) {
        if let RunQueue::Rr(rq) = self {
            rq.requeue_tail(task);
        }
    }

    /// Contabiliza o fim de um trecho de execução (EDF)
    pub(crate) fn adjust(&mut self, task: &Arc<Task>, now_us: u64) {
        if let RunQueue::Edf(rq) = self {
            rq.adjust(task, now_us);
        }
    }

    /// Marca o início de um trecho de execução (EDF)
    pub(crate) fn set_wakeup(&mut self, task: &Arc<Task>, now_us: u64) {
        if let RunQueue::Edf(rq) = self {
            rq.set_wakeup(task, now_us);
        }
    }

    /// Desvia todas as tasks residentes para `migrate`
    pub(crate) fn drain(&mut self, migrate: &mut Vec<Arc<Task>>) {
        match self {
            RunQueue::Rr(rq) => rq.drain(migrate),
            RunQueue::Edf(rq) => rq.drain(migrate),
        }
    }

    /// Reserva de admissão EDF; `EINVAL` se a política não é EDF
    pub(crate) fn edf_admit(&mut self, params: EdfParams) -> Result<(), Errno> {
        match self {
            RunQueue::Edf(rq) => rq.admit(params),
            RunQueue::Rr(_) => Err(Errno::EINVAL),
        }
    }

    /// Devolve uma reserva EDF
    pub(crate) fn edf_release(&mut self, params: EdfParams) {
        if let RunQueue::Edf(rq) = self {
            rq.release(params);
        }
    }

    /// Utilização EDF reservada (percentual), se a política é EDF
    #[cfg(test)]
    pub(crate) fn edf_utilization(&self) -> Option<u64> {
        match self {
            RunQueue::Edf(rq) => Some(rq.utilization()),
            RunQueue::Rr(_) => None,
        }
    }

    /// Deadlines perdidos de uma task na janela de estatística corrente
    #[cfg(test)]
    pub(crate) fn edf_deadline_misses(&self, id: crate::sched::task::TaskId) -> Option<u64> {
        match self {
            RunQueue::Edf(rq) => rq.deadline_misses(id),
            RunQueue::Rr(_) => None,
        }
    }

    /// Períodos completados de uma task na janela de estatística corrente
    #[cfg(test)]
    pub(crate) fn edf_periods_in_window(&self, id: crate::sched::task::TaskId) -> Option<u64> {
        match self {
            RunQueue::Edf(rq) => rq.periods_in_window(id),
            RunQueue::Rr(_) => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            RunQueue::Rr(rq) => rq.len(),
            RunQueue::Edf(rq) => rq.len(),
        }
    }
}
