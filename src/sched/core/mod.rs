/// Arquivo: sched/core/mod.rs
///
/// Propósito: Laço de dispatch e operações públicas do escalonador.
///
/// Módulos contidos:
/// - `policy`: Seleção de política e configuração.
/// - `runqueue`: Fachada sobre as políticas concretas.
pub mod policy;
pub(crate) mod runqueue;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

use crate::core::smp::topology::CpuId;
use crate::core::Kernel;
use crate::hal::Platform;
use crate::sched::task::state::{StateMask, TaskState};
use crate::sched::task::{EdfParams, Task};
use crate::sync::IrqGuard;
use crate::sys::Errno;

/// Estado de escalonamento de uma CPU.
pub(crate) struct CpuLocal {
    /// Task em execução nesta CPU (a idle task quando ociosa)
    pub(crate) current: Mutex<Arc<Task>>,
    /// Pedido de re-escalonamento pendente, consumido por `schedule()`
    pub(crate) need_resched: AtomicBool,
    pub(crate) idle: Arc<Task>,
}

impl CpuLocal {
    pub(crate) fn new(cpu: CpuId) -> Self {
        let idle = Arc::new(Task::idle(cpu));
        Self {
            current: Mutex::new(idle.clone()),
            need_resched: AtomicBool::new(false),
            idle,
        }
    }

    pub(crate) fn set_need_resched(&self) {
        self.need_resched.store(true, Ordering::Release);
    }

    pub(crate) fn clear_need_resched(&self) {
        self.need_resched.store(false, Ordering::Release);
    }

    pub(crate) fn need_resched(&self) -> bool {
        self.need_resched.load(Ordering::Acquire)
    }
}

impl<P: Platform> Kernel<P> {
    /// Laço de dispatch da CPU local.
    ///
    /// Com interrupções desabilitadas: devolve a task anterior à posição
    /// justa da política, escolhe a próxima (desviando migrações
    /// pendentes), e troca o contexto se a escolha mudou. Sem task
    /// executável, a CPU fica com a idle task.
    pub fn schedule(&self) {
        let _irq = IrqGuard::save(&self.platform);
        let cpu = self.this_cpu();
        let now_us = self.now_us();
        let prev = self.cpus.get(cpu).current.lock().clone();

        let mut migrate = Vec::new();
        let next = {
            let mut rq = self.runqueues.get(cpu).lock();
            if !prev.is_idle() {
                rq.adjust(&prev, now_us);
                rq.requeue_tail(&prev);
            }
            let next = rq.pick_next(now_us, &mut migrate);
            if let Some(ref next) = next {
                rq.set_wakeup(next, now_us);
            }
            next
        };

        // Segunda metade da migração: instala as desviadas na CPU alvo
        // (o lock da runqueue local já foi solto).
        for task in migrate {
            self.migrate_install(task, now_us);
        }

        let next = next.unwrap_or_else(|| self.cpus.get(cpu).idle.clone());
        self.cpus.get(cpu).clear_need_resched();

        if !Arc::ptr_eq(&prev, &next) {
            // Se a task anterior já se marcou bloqueada, respeita; só
            // quem ainda estava Running volta a Ready.
            let _ = prev.transition(StateMask::RUNNING, TaskState::Ready);
            next.set_state(TaskState::Running);
            *self.cpus.get(cpu).current.lock() = next.clone();
            crate::ktrace!("(Sched) Troca de contexto. next=", next.id().0);
            self.platform.switch(&prev, &next);
        }
    }

    /// Instala uma task desviada por migração na runqueue da CPU alvo.
    fn migrate_install(&self, task: Arc<Task>, now_us: u64) {
        let target = task.target_cpu();
        task.set_cpu(target);
        let result = self.runqueues.get(target).lock().add_task(task, now_us);
        match result {
            Ok(()) => self.xcall_reschedule(target),
            Err(_) => {
                crate::kerror!("(Sched) Falha ao instalar task migrada. cpu=", target);
            }
        }
    }

    /// Cede a CPU voluntariamente: a task atual vai para o fim da fila
    /// (round-robin) e o dispatch escolhe de novo.
    pub fn sched_yield_now(&self) {
        self.schedule();
    }

    /// Tick periódico: contabiliza a execução corrente e pede
    /// re-escalonamento na saída da interrupção.
    pub fn sched_tick(&self) {
        let cpu = self.this_cpu();
        let current = self.cpus.get(cpu).current.lock().clone();
        if !current.is_idle() {
            let _irq = IrqGuard::save(&self.platform);
            self.runqueues.get(cpu).lock().adjust(&current, self.now_us());
        }
        self.cpus.get(cpu).set_need_resched();
    }

    /// Saída de interrupção: despacha se há pedido pendente.
    pub fn irq_exit_check(&self) {
        if self.cpus.get(self.this_cpu()).need_resched() {
            self.schedule();
        }
    }

    /// Handler da IPI de re-escalonamento
    pub fn reschedule_interrupt(&self) {
        self.cpus.get(self.this_cpu()).set_need_resched();
    }

    /// Insere uma task na runqueue da CPU onde ela reside.
    ///
    /// Tasks EDF precisam ter passado por `edf_sched_admit` antes.
    pub fn sched_add_task(&self, task: Arc<Task>) -> Result<(), Errno> {
        let cpu = task.cpu();
        if !self.topology.is_online(cpu) {
            return Err(Errno::EINVAL);
        }
        if task.edf_params().is_some() && !task.edf_admitted() {
            return Err(Errno::EINVAL);
        }
        let _irq = IrqGuard::save(&self.platform);
        let now_us = self.now_us();
        self.runqueues.get(cpu).lock().add_task(task, now_us)
    }

    /// Remove a task da runqueue onde reside; devolve a reserva EDF, se
    /// havia. Retorna se a task estava enfileirada.
    pub fn sched_del_task(&self, task: &Arc<Task>) -> bool {
        let _irq = IrqGuard::save(&self.platform);
        let removed = self.runqueues.get(task.cpu()).lock().del_task(task);
        if removed {
            task.set_edf_admitted(false);
        }
        removed
    }

    /// Acorda uma task bloqueada.
    ///
    /// A transição para Ready só acontece se o estado atual pertence a
    /// `mask` - wakeups atrasados contra tasks que já acordaram (ou
    /// nunca bloquearam pelo motivo esperado) são ignorados com
    /// `EAGAIN`. Retorna a CPU onde a task reside para o chamador poder
    /// cutucá-la (`xcall_reschedule`).
    pub fn sched_wakeup_task(&self, task: &Arc<Task>, mask: StateMask) -> Result<CpuId, Errno> {
        match task.transition(mask, TaskState::Ready) {
            Ok(_) => Ok(task.cpu()),
            Err(_) => Err(Errno::EAGAIN),
        }
    }

    /// Fixa a CPU alvo de uma task comum (migração cooperativa).
    ///
    /// Tasks EDF migram por `edf_sched_remap`, que garante a reserva no
    /// destino primeiro.
    pub fn sched_bind_task(&self, task: &Arc<Task>, cpu: CpuId) -> Result<(), Errno> {
        if task.edf_params().is_some() {
            return Err(Errno::EINVAL);
        }
        if !self.topology.is_online(cpu) {
            return Err(Errno::EINVAL);
        }
        let source = task.cpu();
        task.set_target_cpu(cpu);
        if source != cpu {
            // A CPU de origem desvia a task no próximo dispatch
            self.xcall_reschedule(source);
        }
        Ok(())
    }

    /// Tira uma CPU de operação: marca offline e realoja as tasks
    /// residentes em `fallback`.
    pub fn sched_cpu_remove(&self, cpu: CpuId, fallback: CpuId) -> Result<(), Errno> {
        if cpu == fallback
            || !self.topology.is_online(cpu)
            || !self.topology.is_online(fallback)
        {
            return Err(Errno::EINVAL);
        }
        self.topology.set_offline(cpu);
        crate::kinfo!("(Sched) CPU saindo de operação. cpu=", cpu);

        let _irq = IrqGuard::save(&self.platform);
        let mut migrate = Vec::new();
        self.runqueues.get(cpu).lock().drain(&mut migrate);

        let now_us = self.now_us();
        for task in migrate {
            task.set_target_cpu(fallback);
            task.set_cpu(fallback);
            if let Some(params) = task.edf_params() {
                // A reserva local já foi devolvida pelo drain; tenta
                // readmitir no destino.
                let admitted = self.runqueues.get(fallback).lock().edf_admit(params);
                if admitted.is_err() {
                    task.set_edf_admitted(false);
                    crate::kwarn!(
                        "(Sched) Reserva EDF não coube na CPU de destino. task=",
                        task.id().0
                    );
                    continue;
                }
            }
            if self
                .runqueues
                .get(fallback)
                .lock()
                .add_task(task, now_us)
                .is_err()
            {
                crate::kerror!("(Sched) Falha ao realojar task. cpu=", fallback);
            }
        }
        self.xcall_reschedule(fallback);
        Ok(())
    }

    /// Admite a reserva EDF de uma task na CPU onde ela reside.
    ///
    /// Valida os limites de slice/period e debita a utilização da CPU;
    /// `ERSV` se a reserva não cabe no teto configurado. Pré-condição de
    /// `sched_add_task` para tasks EDF.
    pub fn edf_sched_admit(&self, task: &Arc<Task>) -> Result<(), Errno> {
        let params = task.edf_params().ok_or(Errno::EINVAL)?;
        if task.edf_admitted() {
            return Err(Errno::EBUSY);
        }
        let _irq = IrqGuard::save(&self.platform);
        self.runqueues.get(task.cpu()).lock().edf_admit(params)?;
        task.set_edf_admitted(true);
        Ok(())
    }

    /// Troca a reserva de uma task EDF já admitida.
    ///
    /// A reserva antiga é devolvida e a nova submetida à admissão; em
    /// falha, a antiga é restaurada e nada muda.
    pub fn edf_adjust_reservation(
        &self,
        task: &Arc<Task>,
        params: EdfParams,
    ) -> Result<(), Errno> {
        let old = task.edf_params().ok_or(Errno::EINVAL)?;
        if !task.edf_admitted() {
            return Err(Errno::EINVAL);
        }
        let _irq = IrqGuard::save(&self.platform);
        let now_us = self.now_us();
        let mut rq = self.runqueues.get(task.cpu()).lock();

        // del_task devolve a reserva antiga se a task estava na fila
        let queued = rq.del_task(task);
        if !queued {
            rq.edf_release(old);
        }
        match rq.edf_admit(params) {
            Ok(()) => {
                task.set_edf_params(params);
                if queued {
                    rq.add_task(task.clone(), now_us)?;
                }
                Ok(())
            }
            Err(e) => {
                let _ = rq.edf_admit(old);
                if queued {
                    let _ = rq.add_task(task.clone(), now_us);
                }
                Err(e)
            }
        }
    }

    /// Migra uma task EDF para outra CPU.
    ///
    /// A reserva é garantida na CPU destino ANTES de a migração começar;
    /// se não cabe lá, a task permanece onde está e nada muda (`ERSV`).
    /// A CPU de origem desvia a task (devolvendo a reserva local) no
    /// próximo dispatch.
    pub fn edf_sched_remap(&self, task: &Arc<Task>, target: CpuId) -> Result<(), Errno> {
        let params = task.edf_params().ok_or(Errno::EINVAL)?;
        if !task.edf_admitted() {
            return Err(Errno::EINVAL);
        }
        if !self.topology.is_online(target) {
            return Err(Errno::EINVAL);
        }
        let source = task.cpu();
        if source == target {
            return Ok(());
        }
        let _irq = IrqGuard::save(&self.platform);
        self.runqueues.get(target).lock().edf_admit(params)?;
        task.set_target_cpu(target);
        self.xcall_reschedule(source);
        Ok(())
    }
}
