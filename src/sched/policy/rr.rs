//! Round-robin cooperativo
//!
//! Fila FIFO de tasks residentes. A task escolhida NÃO é removida da
//! fila ao ser despachada: ela continua residente e o `schedule()`
//! seguinte a move para o fim (requeue) antes de escolher de novo. Quem
//! bloqueia ou migra é removido explicitamente.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::core::smp::topology::CpuId;
use crate::sched::task::Task;

/// Runqueue round-robin de uma CPU.
pub struct RrRq {
    cpu: CpuId,
    queue: VecDeque<Arc<Task>>,
}

impl RrRq {
    pub fn new(cpu: CpuId) -> Self {
        Self {
            cpu,
            queue: VecDeque::new(),
        }
    }

    /// Enfileira no fim
    pub fn add_task(&mut self, task: Arc<Task>) {
        self.queue.push_back(task);
    }

    /// Remove a task da fila; retorna se estava presente.
    pub fn del_task(&mut self, task: &Arc<Task>) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| !Arc::ptr_eq(t, task));
        self.queue.len() != before
    }

    /// Move a task para o fim da fila, se presente
    pub fn requeue_tail(&mut self, task: &Arc<Task>) {
        if self.del_task(task) {
            self.queue.push_back(task.clone());
        }
    }

    /// Escolhe a próxima task a executar.
    ///
    /// Tasks com CPU alvo diferente desta são desviadas para `migrate`
    /// (removidas da fila) em vez de escolhidas. Retorna a primeira task
    /// executável restante, sem removê-la.
    pub fn pick_next(&mut self, migrate: &mut Vec<Arc<Task>>) -> Option<Arc<Task>> {
        let mut i = 0;
        while i < self.queue.len() {
            let task = &self.queue[i];
            if task.target_cpu() != self.cpu {
                let task = self.queue.remove(i);
                if let Some(task) = task {
                    migrate.push(task);
                }
                continue;
            }
            if task.state().is_runnable() {
                return Some(task.clone());
            }
            i += 1;
        }
        None
    }

    /// Desvia TODAS as tasks residentes para `migrate` (CPU saindo de
    /// operação).
    pub fn drain(&mut self, migrate: &mut Vec<Arc<Task>>) {
        migrate.extend(self.queue.drain(..));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
