//! Testes para o escalonador
//!
//! Todos os testes rodam no host com uma plataforma simulada
//! (`MockPlatform`): relógio e CPU corrente ajustáveis pelo teste, IPIs
//! e programações de alarme gravadas em vez de enviadas ao hardware.
//!
//! # Como Executar os Testes
//!
//! ```bash
//! # Executar todos os testes do escalonador
//! cargo test --lib sched::tests
//!
//! # Executar testes de um módulo específico
//! cargo test --lib sched::tests::rr
//! cargo test --lib sched::tests::edf
//! ```
//!
//! # Estrutura dos Testes
//!
//! - `rr.rs` - Round-robin, migração e remoção de CPU
//! - `edf.rs` - Admissão, dispatch e reservas EDF
//! - `timer.rs` - Fila de timers one-shot e alarme
//! - `xcall.rs` - Cross-calls e IPIs de reschedule
//! - `waitq.rs` - Filas de espera
//!
//! # Convenções
//!
//! - Prefixo `test_` para testes unitários
//! - Testes com múltiplas "CPUs" usam uma thread por CPU simulada

#![cfg(test)]

pub mod edf;
pub mod waitq;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::core::smp::ipi::IpiVector;
use crate::core::smp::topology::{CpuId, CpuMask};
use crate::core::Kernel;
use crate::hal::Platform;
use crate::sched::core::policy::SchedConfig;
use crate::sched::task::{EdfParams, Task, TaskId};

std::thread_local! {
    /// CPU simulada da thread corrente (threads = CPUs nos testes SMP)
    static TL_CPU: Cell<CpuId> = const { Cell::new(0) };
    /// Estado de interrupções da CPU simulada
    static TL_IRQS: Cell<bool> = const { Cell::new(true) };
}

/// Plataforma simulada para testes no host.
pub struct MockPlatform {
    clock_ns: AtomicU64,
    /// IPIs enviadas, na ordem: (cpu alvo, vetor)
    ipis: Mutex<Vec<(CpuId, IpiVector)>>,
    /// Última programação do alarme one-shot de cada CPU
    armed: Mutex<BTreeMap<CpuId, Option<u64>>>,
    /// Trocas de contexto: (prev, next)
    switches: Mutex<Vec<(TaskId, TaskId)>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            clock_ns: AtomicU64::new(1_000_000),
            ipis: Mutex::new(Vec::new()),
            armed: Mutex::new(BTreeMap::new()),
            switches: Mutex::new(Vec::new()),
        }
    }

    /// Define a CPU simulada da thread corrente
    pub fn set_cpu(&self, cpu: CpuId) {
        TL_CPU.with(|c| c.set(cpu));
    }

    pub fn advance_ns(&self, delta: u64) {
        self.clock_ns.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn advance_us(&self, delta: u64) {
        self.advance_ns(delta * 1000);
    }

    /// Drena as IPIs gravadas
    pub fn take_ipis(&self) -> Vec<(CpuId, IpiVector)> {
        std::mem::take(&mut self.ipis.lock().unwrap())
    }

    /// Última programação do alarme de `cpu` (None = nunca programado)
    pub fn armed(&self, cpu: CpuId) -> Option<Option<u64>> {
        self.armed.lock().unwrap().get(&cpu).copied()
    }

    /// Trocas de contexto gravadas, como (id anterior, id seguinte)
    pub fn take_switches(&self) -> Vec<(TaskId, TaskId)> {
        std::mem::take(&mut self.switches.lock().unwrap())
    }
}

impl Platform for MockPlatform {
    fn cpu_id(&self) -> CpuId {
        TL_CPU.with(|c| c.get())
    }

    fn now_ns(&self) -> u64 {
        self.clock_ns.load(Ordering::SeqCst)
    }

    fn irqs_enabled(&self) -> bool {
        TL_IRQS.with(|i| i.get())
    }

    fn disable_irqs(&self) {
        TL_IRQS.with(|i| i.set(false));
    }

    fn enable_irqs(&self) {
        TL_IRQS.with(|i| i.set(true));
    }

    fn send_ipi(&self, cpu: CpuId, vector: IpiVector) {
        self.ipis.lock().unwrap().push((cpu, vector));
    }

    fn arm_oneshot(&self, cpu: CpuId, deadline_ns: Option<u64>) {
        self.armed.lock().unwrap().insert(cpu, deadline_ns);
    }

    fn switch(&self, prev: &Task, next: &Task) {
        self.switches.lock().unwrap().push((prev.id(), next.id()));
    }
}

/// Helper: kernel round-robin com `n` CPUs
pub fn kernel_rr(n: usize) -> Kernel<MockPlatform> {
    let platform = MockPlatform::new();
    platform.set_cpu(0);
    Kernel::new(platform, CpuMask::first_n(n), SchedConfig::default())
}

/// Helper: kernel EDF com `n` CPUs e limites padrão
pub fn kernel_edf(n: usize) -> Kernel<MockPlatform> {
    let platform = MockPlatform::new();
    platform.set_cpu(0);
    Kernel::new(platform, CpuMask::first_n(n), SchedConfig::deadline())
}

/// Helper: task round-robin já enfileirada em `cpu`
pub fn spawn_rr(
    kernel: &Kernel<MockPlatform>,
    id: u32,
    name: &str,
    cpu: CpuId,
) -> std::sync::Arc<Task> {
    let task = std::sync::Arc::new(Task::new(TaskId(id), name, cpu));
    kernel.sched_add_task(task.clone()).unwrap();
    task
}

/// Helper: task EDF admitida e enfileirada em `cpu`
pub fn spawn_edf(
    kernel: &Kernel<MockPlatform>,
    id: u32,
    cpu: CpuId,
    period_us: u64,
    slice_us: u64,
) -> std::sync::Arc<Task> {
    let task = std::sync::Arc::new(Task::new_edf(
        TaskId(id),
        "edf_task",
        cpu,
        EdfParams {
            period_us,
            slice_us,
        },
    ));
    kernel.edf_sched_admit(&task).unwrap();
    kernel.sched_add_task(task.clone()).unwrap();
    task
}
