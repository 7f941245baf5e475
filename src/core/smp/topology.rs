//! Arquivo: core/smp/topology.rs
//!
//! Propósito: Topologia de processadores do sistema.
//! Mantém as máscaras de CPUs presentes e online. O escalonador consulta
//! a máscara online para fan-out de cross-calls e inserção remota de
//! timers; CPUs saem da máscara durante offlining (`sched_cpu_remove`).

use core::sync::atomic::{AtomicU64, Ordering};

/// Identificador lógico de CPU (0 a N-1)
pub type CpuId = u32;

/// Número máximo de CPUs suportadas.
pub const MAX_CPUS: usize = 32;

/// Máscara de CPUs (bit N = CPU lógica N).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuMask(u64);

impl CpuMask {
    /// Máscara vazia
    pub const EMPTY: CpuMask = CpuMask(0);

    /// Máscara contendo apenas `cpu`
    pub const fn single(cpu: CpuId) -> Self {
        CpuMask(1u64 << cpu)
    }

    /// Máscara com as primeiras `n` CPUs (0..n)
    pub const fn first_n(n: usize) -> Self {
        if n >= 64 {
            CpuMask(u64::MAX)
        } else {
            CpuMask((1u64 << n) - 1)
        }
    }

    pub const fn from_bits(bits: u64) -> Self {
        CpuMask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn set(&mut self, cpu: CpuId) {
        self.0 |= 1u64 << cpu;
    }

    pub fn clear(&mut self, cpu: CpuId) {
        self.0 &= !(1u64 << cpu);
    }

    pub const fn contains(self, cpu: CpuId) -> bool {
        self.0 & (1u64 << cpu) != 0
    }

    /// Interseção de duas máscaras
    pub const fn and(self, other: CpuMask) -> CpuMask {
        CpuMask(self.0 & other.0)
    }

    /// Número de CPUs na máscara
    pub const fn weight(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Itera sobre os IDs presentes na máscara, em ordem crescente
    pub fn iter(self) -> impl Iterator<Item = CpuId> {
        (0..64u32).filter(move |cpu| self.contains(*cpu))
    }
}

/// Topologia do sistema: CPUs presentes (fixas no boot) e online (mutável).
pub struct CpuTopology {
    present: CpuMask,
    online: AtomicU64,
}

impl CpuTopology {
    /// Cria a topologia; todas as CPUs presentes começam online.
    pub fn new(present: CpuMask) -> Self {
        Self {
            present,
            online: AtomicU64::new(present.bits()),
        }
    }

    pub fn present_mask(&self) -> CpuMask {
        self.present
    }

    pub fn online_mask(&self) -> CpuMask {
        CpuMask::from_bits(self.online.load(Ordering::Acquire))
    }

    pub fn is_online(&self, cpu: CpuId) -> bool {
        self.online_mask().contains(cpu)
    }

    /// Marca uma CPU como offline (usado por sched_cpu_remove)
    pub fn set_offline(&self, cpu: CpuId) {
        self.online
            .fetch_and(!(1u64 << cpu), Ordering::AcqRel);
    }

    /// Retorna o número de CPUs presentes
    pub fn count(&self) -> usize {
        self.present.weight() as usize
    }
}
