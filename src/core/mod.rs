/// Arquivo: core/mod.rs
///
/// Propósito: Contexto central do núcleo de escalonamento.
/// Em vez de estado global espalhado em statics, todo o estado mutável do
/// escalonador vive numa única estrutura `Kernel<P>`, criada no boot e
/// compartilhada entre as CPUs. Cada subsistema contribui com blocos
/// `impl Kernel<P>` no seu próprio módulo.
///
/// Módulos contidos:
/// - `debug`: Logging (klog).
/// - `smp`: Per-CPU, topologia, IPIs, cross-calls.
/// - `time`: Fila de timers one-shot por CPU.
pub mod debug;
pub mod smp;
pub mod time;

use alloc::sync::Arc;
use spin::Mutex;

use crate::hal::Platform;
use crate::sched::core::policy::SchedConfig;
use crate::sched::core::runqueue::RunQueue;
use crate::sched::core::CpuLocal;
use crate::sched::task::Task;
use smp::percpu::PerCpu;
use smp::topology::{CpuId, CpuMask, CpuTopology};
use smp::xcall::XcallEngine;
use time::timer::{Timer, TimerHandle, TimerQueue};

/// Contexto do núcleo de escalonamento.
///
/// Uma runqueue e uma fila de timers independentes por CPU; não existe
/// runqueue global. O único recurso globalmente serializado é o motor de
/// cross-call (uma chamada em voo por vez no sistema inteiro).
pub struct Kernel<P: Platform> {
    pub(crate) platform: P,
    pub(crate) topology: CpuTopology,
    pub(crate) xcall: XcallEngine<P>,
    pub(crate) timers: PerCpu<Mutex<TimerQueue<P>>>,
    pub(crate) runqueues: PerCpu<Mutex<RunQueue>>,
    pub(crate) cpus: PerCpu<CpuLocal>,
    /// Serializa as inserções remotas de timer: segurado do preenchimento
    /// do mailbox até a retirada do handle. Sem ele, duas chamadoras
    /// concorrentes sobrescreveriam o mailbox antes de a cross-call de
    /// qualquer uma começar.
    pub(crate) timer_xfer_gate: Mutex<()>,
    /// Mailbox para inserção remota de timer via cross-call. No máximo um
    /// timer em trânsito, garantido por `timer_xfer_gate`.
    pub(crate) timer_xfer: Mutex<Option<Timer<P>>>,
    /// Handle devolvido pela CPU alvo da inserção remota.
    pub(crate) timer_xfer_handle: Mutex<Option<TimerHandle>>,
}

impl<P: Platform> Kernel<P> {
    /// Inicializa o escalonador: uma runqueue da política configurada e
    /// uma idle task por CPU presente.
    ///
    /// Falha de alocação aqui é fatal (abort) - não há caminho de
    /// recuperação tão cedo no boot.
    pub fn new(platform: P, present: CpuMask, config: SchedConfig) -> Self {
        let kernel = Self {
            platform,
            topology: CpuTopology::new(present),
            xcall: XcallEngine::new(),
            timers: PerCpu::from_fn(|_| Mutex::new(TimerQueue::new())),
            runqueues: PerCpu::from_fn(|cpu| Mutex::new(RunQueue::new(cpu, &config))),
            cpus: PerCpu::from_fn(CpuLocal::new),
            timer_xfer_gate: Mutex::new(()),
            timer_xfer: Mutex::new(None),
            timer_xfer_handle: Mutex::new(None),
        };
        crate::kinfo!("(Sched) Escalonador pronto. CPUs presentes=", present.weight());
        kernel
    }

    /// Acesso à plataforma (HAL)
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// ID da CPU que executa o chamador
    pub fn this_cpu(&self) -> CpuId {
        self.platform.cpu_id()
    }

    /// Relógio monotônico em nanosegundos
    pub fn now_ns(&self) -> u64 {
        self.platform.now_ns()
    }

    /// Relógio monotônico em microsegundos (contabilidade EDF)
    pub(crate) fn now_us(&self) -> u64 {
        self.platform.now_ns() / 1000
    }

    /// Máscara de CPUs online
    pub fn online_mask(&self) -> CpuMask {
        self.topology.online_mask()
    }

    /// Task atualmente em execução na CPU local (referência não-dona)
    pub fn current_task(&self) -> Arc<Task> {
        self.cpus.get(self.this_cpu()).current.lock().clone()
    }
}
