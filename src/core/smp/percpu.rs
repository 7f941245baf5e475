//! Arquivo: core/smp/percpu.rs
//!
//! Propósito: Gerenciamento de dados Por-CPU (Per-CPU variables).
//! Permite definir dados que possuem uma instância separada para cada núcleo
//! do processador, evitando contenda de locks (cache contention).
//!
//! Detalhes de Implementação:
//! - Abordagem baseada em Array: `PerCpu<T>` mantém um array `[T; MAX_CPUS]`.
//! - O acesso é indexado pelo ID lógico da CPU.
//! - Não há mutabilidade interior aqui: cada slot carrega seu próprio lock
//!   ou atômicos, então o acesso é inteiramente seguro.

use super::topology::{CpuId, MAX_CPUS};

/// Wrapper para dados que são replicados por CPU.
///
/// # Exemplo
///
/// ```ignore
/// let queues: PerCpu<Mutex<TimerQueue>> = PerCpu::from_fn(|_| Mutex::new(TimerQueue::new()));
/// queues.get(cpu_id).lock().add(...);
/// ```
pub struct PerCpu<T> {
    data: [T; MAX_CPUS],
}

impl<T> PerCpu<T> {
    /// Cria uma variável PerCpu, inicializando cada slot com `init(cpu)`.
    pub fn from_fn(mut init: impl FnMut(CpuId) -> T) -> Self {
        Self {
            data: core::array::from_fn(|i| init(i as CpuId)),
        }
    }

    /// Obtém o slot de uma CPU específica.
    ///
    /// Um ID fora de faixa indica erro catastrófico de topologia; nesse
    /// caso retornamos o slot do core 0 em vez de abortar em caminho
    /// crítico (mesma política do acesso per-CPU do resto do kernel).
    pub fn get(&self, cpu: CpuId) -> &T {
        debug_assert!((cpu as usize) < MAX_CPUS);
        if (cpu as usize) >= MAX_CPUS {
            &self.data[0]
        } else {
            &self.data[cpu as usize]
        }
    }

    /// Itera sobre todos os slots (inicialização/diagnóstico)
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }
}
