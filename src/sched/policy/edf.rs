//! Earliest Deadline First com reserva de utilização
//!
//! Cada task EDF carrega uma reserva (slice, period): direito a `slice`
//! microsegundos de CPU a cada `period` microsegundos. A admissão só
//! aceita a reserva se a utilização agregada da CPU continuar dentro do
//! teto configurado - caso contrário devolve `ERSV`.
//!
//! A fila mantém dois conjuntos ordenados por (deadline, id):
//! - `ready`: tasks com orçamento restante no período corrente; o
//!   dispatch escolhe sempre a de menor deadline.
//! - `resched`: tasks com orçamento esgotado (ou deadline vencido),
//!   aguardando o início do próximo período para voltarem a `ready`.
//!
//! O desempate por id mais baixo torna a escolha determinística quando
//! dois deadlines coincidem.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::core::smp::topology::CpuId;
use crate::sched::task::{EdfParams, Task, TaskId};
use crate::sys::Errno;

/// Janela de relatório de deadlines perdidos (microsegundos)
pub const DEADLINE_INTERVAL_US: u64 = 10_000_000;

/// Limites de admissão EDF de uma CPU (microsegundos / percentual).
#[derive(Debug, Clone)]
pub struct EdfConfig {
    pub min_slice_us: u64,
    pub max_slice_us: u64,
    pub min_period_us: u64,
    pub max_period_us: u64,
    /// Teto de utilização agregada da CPU, em percentual inteiro
    pub cpu_percent: u64,
}

impl Default for EdfConfig {
    fn default() -> Self {
        Self {
            min_slice_us: 1_000,
            max_slice_us: 1_000_000_000,
            min_period_us: 1_000,
            max_period_us: 1_000_000_000,
            cpu_percent: 100,
        }
    }
}

/// Contabilidade de uma task EDF residente.
struct EdfEntry {
    task: Arc<Task>,
    period_us: u64,
    slice_us: u64,
    /// Percentual de CPU reservado: 100 * slice / period
    reservation_pct: u64,
    /// Deadline corrente (fim do período corrente, µs absolutos)
    deadline_us: u64,
    /// CPU consumida no período corrente
    used_us: u64,
    /// Último instante em que a task começou a executar
    last_wakeup_us: u64,
    /// Deadlines perdidos na janela de estatística corrente
    miss_deadlines: u64,
    /// Períodos completados na janela de estatística corrente
    periods: u64,
    stat_window_start_us: u64,
}

/// Runqueue EDF de uma CPU.
pub struct EdfRq {
    cpu: CpuId,
    config: EdfConfig,
    /// Utilização agregada reservada (percentual inteiro)
    cpu_u: u64,
    ready: BTreeSet<(u64, TaskId)>,
    resched: BTreeSet<(u64, TaskId)>,
    entries: BTreeMap<TaskId, EdfEntry>,
}

impl EdfRq {
    pub fn new(cpu: CpuId, config: EdfConfig) -> Self {
        Self {
            cpu,
            config,
            cpu_u: 0,
            ready: BTreeSet::new(),
            resched: BTreeSet::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Percentual de CPU que `params` reservaria
    fn reservation_pct(params: EdfParams) -> u64 {
        100 * params.slice_us / params.period_us
    }

    /// Teste de admissão: valida limites e reserva a utilização.
    ///
    /// A reserva é debitada AQUI, antes de a task entrar na fila - é o
    /// que permite a `edf_sched_remap` garantir espaço na CPU destino
    /// antes de iniciar a migração.
    pub fn admit(&mut self, params: EdfParams) -> Result<(), Errno> {
        let c = &self.config;
        // Período e slice nulos são inválidos mesmo com limites mínimos
        // configurados em zero; reservation_pct divide pelo período.
        if params.period_us == 0
            || params.slice_us == 0
            || params.slice_us < c.min_slice_us
            || params.slice_us > c.max_slice_us
            || params.period_us < c.min_period_us
            || params.period_us > c.max_period_us
            || params.slice_us > params.period_us
        {
            return Err(Errno::EINVAL);
        }
        let pct = Self::reservation_pct(params);
        if self.cpu_u + pct > c.cpu_percent {
            crate::kwarn!(
                "(EDF) Admissão negada: utilização excederia o teto. pedida=",
                pct as u64
            );
            return Err(Errno::ERSV);
        }
        self.cpu_u += pct;
        Ok(())
    }

    /// Devolve uma reserva previamente admitida
    pub fn release(&mut self, params: EdfParams) {
        let pct = Self::reservation_pct(params);
        self.cpu_u = self.cpu_u.saturating_sub(pct);
    }

    /// Utilização agregada reservada (percentual)
    pub fn utilization(&self) -> u64 {
        self.cpu_u
    }

    /// Insere uma task já admitida. O primeiro deadline é `now + period`.
    pub fn add_task(&mut self, task: Arc<Task>, now_us: u64) -> Result<(), Errno> {
        let params = task.edf_params().ok_or(Errno::EINVAL)?;
        let id = task.id();
        if self.entries.contains_key(&id) {
            return Err(Errno::EBUSY);
        }
        let deadline = now_us + params.period_us;
        self.entries.insert(
            id,
            EdfEntry {
                task,
                period_us: params.period_us,
                slice_us: params.slice_us,
                reservation_pct: Self::reservation_pct(params),
                deadline_us: deadline,
                used_us: 0,
                last_wakeup_us: now_us,
                miss_deadlines: 0,
                periods: 0,
                stat_window_start_us: now_us,
            },
        );
        self.ready.insert((deadline, id));
        Ok(())
    }

    /// Remove a task e devolve a reserva dela; retorna se estava presente.
    pub fn del_task(&mut self, task: &Arc<Task>) -> bool {
        let id = task.id();
        match self.entries.remove(&id) {
            Some(entry) => {
                self.ready.remove(&(entry.deadline_us, id));
                self.resched.remove(&(entry.deadline_us, id));
                self.cpu_u = self.cpu_u.saturating_sub(entry.reservation_pct);
                true
            }
            None => false,
        }
    }

    /// Revisita deadlines:
    /// 1. Tasks em `ready` com deadline vencido perderam o prazo se não
    ///    consumiram o slice inteiro; vão para `resched`.
    /// 2. Tasks em `resched` cujo deadline já passou começam um novo
    ///    período: deadline avança, orçamento zera, voltam a `ready`.
    pub fn check_deadlines(&mut self, now_us: u64) {
        // Passo 1: expirar ready
        let expired: Vec<(u64, TaskId)> = self
            .ready
            .iter()
            .take_while(|(deadline, _)| *deadline <= now_us)
            .copied()
            .collect();
        for key in expired {
            self.ready.remove(&key);
            self.resched.insert(key);
            if let Some(entry) = self.entries.get_mut(&key.1) {
                if entry.used_us < entry.slice_us {
                    entry.miss_deadlines += 1;
                }
            }
        }

        // Passo 2: iniciar novos períodos
        let due: Vec<(u64, TaskId)> = self
            .resched
            .iter()
            .take_while(|(deadline, _)| *deadline <= now_us)
            .copied()
            .collect();
        for (old_deadline, id) in due {
            self.resched.remove(&(old_deadline, id));
            let entry = match self.entries.get_mut(&id) {
                Some(e) => e,
                None => continue,
            };
            // Períodos encadeiam a partir do deadline anterior; se a CPU
            // ficou muito tempo sem atender, realinha ao presente.
            let next = old_deadline + entry.period_us;
            entry.deadline_us = if next > now_us {
                next
            } else {
                now_us + entry.period_us
            };
            entry.used_us = 0;
            entry.periods += 1;
            self.ready.insert((entry.deadline_us, id));

            self.report_misses(id, now_us);
        }
    }

    /// Relatório periódico de deadlines perdidos por task
    fn report_misses(&mut self, id: TaskId, now_us: u64) {
        let entry = match self.entries.get_mut(&id) {
            Some(e) => e,
            None => return,
        };
        if now_us.saturating_sub(entry.stat_window_start_us) < DEADLINE_INTERVAL_US {
            return;
        }
        if entry.miss_deadlines > 0 && entry.periods > 0 {
            let pct = 100 * entry.miss_deadlines / entry.periods;
            crate::kinfo!("(EDF) Task perdeu deadlines na janela. id=", id.0);
            crate::kinfo!("(EDF) Percentual de perdas=", pct as u64);
        }
        entry.miss_deadlines = 0;
        entry.periods = 0;
        entry.stat_window_start_us = now_us;
    }

    /// Escolhe a task executável de menor deadline com orçamento restante.
    ///
    /// Antes de escolher, desvia tasks com CPU alvo diferente (devolvendo
    /// a reserva local) e atualiza os períodos via `check_deadlines`.
    pub fn pick(&mut self, now_us: u64, migrate: &mut Vec<Arc<Task>>) -> Option<Arc<Task>> {
        // Desvio de migração pendente
        let leaving: Vec<TaskId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.task.target_cpu() != self.cpu)
            .map(|(id, _)| *id)
            .collect();
        for id in leaving {
            let task = match self.entries.get(&id) {
                Some(entry) => entry.task.clone(),
                None => continue,
            };
            self.del_task(&task);
            migrate.push(task);
        }

        self.check_deadlines(now_us);

        for (_, id) in self.ready.iter() {
            let entry = match self.entries.get(id) {
                Some(e) => e,
                None => continue,
            };
            if entry.task.state().is_runnable() && entry.used_us < entry.slice_us {
                return Some(entry.task.clone());
            }
        }
        None
    }

    /// Marca o início de um trecho de execução da task
    pub fn set_wakeup(&mut self, task: &Arc<Task>, now_us: u64) {
        if let Some(entry) = self.entries.get_mut(&task.id()) {
            entry.last_wakeup_us = now_us;
        }
    }

    /// Contabiliza o trecho de execução que terminou agora.
    ///
    /// Se o orçamento do período se esgotou, a task sai de `ready` e só
    /// volta no próximo período.
    pub fn adjust(&mut self, task: &Arc<Task>, now_us: u64) {
        let entry = match self.entries.get_mut(&task.id()) {
            Some(e) => e,
            None => return,
        };
        entry.used_us += now_us.saturating_sub(entry.last_wakeup_us);
        entry.last_wakeup_us = now_us;
        if entry.used_us >= entry.slice_us {
            let key = (entry.deadline_us, task.id());
            if self.ready.remove(&key) {
                self.resched.insert(key);
            }
        }
    }

    /// Desvia todas as tasks residentes para `migrate` (CPU saindo de
    /// operação), devolvendo as reservas locais.
    pub fn drain(&mut self, migrate: &mut Vec<Arc<Task>>) {
        let all: Vec<Arc<Task>> = self.entries.values().map(|e| e.task.clone()).collect();
        for task in all {
            self.del_task(&task);
            migrate.push(task);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deadlines perdidos acumulados na janela corrente
    #[cfg(test)]
    pub(crate) fn deadline_misses(&self, id: TaskId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.miss_deadlines)
    }

    /// Períodos completados na janela corrente
    #[cfg(test)]
    pub(crate) fn periods_in_window(&self, id: TaskId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.periods)
    }
}
