//! Fila de espera por evento
//!
//! Protocolo clássico de espera sem wakeups perdidos:
//!
//! ```text
//! loop {
//!     prepare_to_wait(task, estado_bloqueado);
//!     if condicao { break; }
//!     schedule();
//! }
//! finish_wait(task);
//! ```
//!
//! `prepare_to_wait` marca a task bloqueada SOB o lock da fila, e
//! `wakeup` acorda sob o mesmo lock - um produtor que torna a condição
//! verdadeira e chama `wakeup` nunca passa despercebido: ou encontra a
//! task já bloqueada e a acorda, ou a task ainda vai reavaliar a
//! condição antes de dormir.

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::core::smp::topology::CpuMask;
use crate::core::Kernel;
use crate::hal::Platform;
use crate::sched::task::state::{StateMask, TaskState};
use crate::sched::task::Task;
use crate::sync::IrqGuard;

/// Fila de tasks bloqueadas à espera de um evento.
pub struct WaitQueue {
    waiters: Mutex<Vec<Arc<Task>>>,
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitQueue {
    pub const fn new() -> Self {
        Self {
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Registra a task na fila sem alterar o estado dela.
    pub fn add_entry(&self, task: &Arc<Task>) {
        let mut waiters = self.waiters.lock();
        if !waiters.iter().any(|t| Arc::ptr_eq(t, task)) {
            waiters.push(task.clone());
        }
    }

    /// Retira a task da fila sem alterar o estado dela.
    pub fn remove_entry(&self, task: &Arc<Task>) {
        self.waiters.lock().retain(|t| !Arc::ptr_eq(t, task));
    }

    /// Registra a task na fila (se ausente) e a marca bloqueada.
    ///
    /// Deve ser chamada ANTES de reavaliar a condição de espera.
    pub fn prepare_to_wait<P: Platform>(
        &self,
        kernel: &Kernel<P>,
        task: &Arc<Task>,
        state: TaskState,
    ) {
        let _irq = IrqGuard::save(kernel.platform());
        let mut waiters = self.waiters.lock();
        if !waiters.iter().any(|t| Arc::ptr_eq(t, task)) {
            waiters.push(task.clone());
        }
        task.set_state(state);
    }

    /// Encerra a espera: remove a task da fila e a devolve a Running.
    pub fn finish_wait<P: Platform>(&self, kernel: &Kernel<P>, task: &Arc<Task>) {
        let _irq = IrqGuard::save(kernel.platform());
        let mut waiters = self.waiters.lock();
        waiters.retain(|t| !Arc::ptr_eq(t, task));
        task.set_state(TaskState::Running);
    }

    /// Acorda todas as tasks bloqueadas da fila.
    ///
    /// As entradas permanecem na fila - quem remove é `finish_wait` (ou
    /// `remove_entry`), na própria task ao retomar. Uma entrada cuja task
    /// ainda não bloqueou fica intacta e é alcançada pelo próximo wakeup.
    /// As CPUs onde as acordadas residem recebem um único pedido de
    /// re-escalonamento cada, depois de soltar o lock da fila.
    pub fn wakeup<P: Platform>(&self, kernel: &Kernel<P>) -> usize {
        let mut kick = CpuMask::EMPTY;
        let mut woken = 0;
        {
            let _irq = IrqGuard::save(kernel.platform());
            let waiters = self.waiters.lock();
            for task in waiters.iter() {
                if let Ok(cpu) = kernel.sched_wakeup_task(task, StateMask::NORMAL) {
                    kick.set(cpu);
                    woken += 1;
                }
            }
        }
        for cpu in kick.iter() {
            kernel.xcall_reschedule(cpu);
        }
        woken
    }

    /// Bloqueia a task atual até `cond` ser verdadeira.
    pub fn wait_event<P: Platform, F: Fn() -> bool>(&self, kernel: &Kernel<P>, cond: F) {
        let task = kernel.current_task();
        loop {
            self.prepare_to_wait(kernel, &task, TaskState::Uninterruptible);
            if cond() {
                break;
            }
            kernel.schedule();
        }
        self.finish_wait(kernel, &task);
    }

    /// Número de tasks atualmente à espera
    pub fn waiters(&self) -> usize {
        self.waiters.lock().len()
    }
}
