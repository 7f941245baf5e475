//! Seleção e configuração de política

use crate::sched::policy::edf::EdfConfig;

/// Política de escalonamento de uma runqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Round-robin cooperativo (fila FIFO, requeue no fim)
    RoundRobin,
    /// Earliest Deadline First com controle de admissão
    Deadline,
}

/// Configuração do escalonador, fixada na inicialização.
///
/// Todas as CPUs usam a mesma política; troca em tempo de execução não é
/// suportada.
#[derive(Debug, Clone)]
pub struct SchedConfig {
    pub policy: PolicyKind,
    pub edf: EdfConfig,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::RoundRobin,
            edf: EdfConfig::default(),
        }
    }
}

impl SchedConfig {
    /// Configuração EDF com limites padrão
    pub fn deadline() -> Self {
        Self {
            policy: PolicyKind::Deadline,
            edf: EdfConfig::default(),
        }
    }
}
