//! Timers one-shot per-CPU
//!
//! Cada CPU mantém uma lista ordenada por expiração (nanosegundos
//! absolutos, relógio monotônico) protegida por spinlock. O alarme
//! one-shot do hardware, quando armado, aponta sempre para a cabeça da
//! lista; com a lista vazia, fica desarmado.
//!
//! A inserção usa varredura linear a partir da cabeça - o número de
//! timers pendentes por CPU é pequeno na prática e a lista curta vence
//! estruturas mais espertas.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use crate::core::smp::topology::{CpuId, CpuMask};
use crate::core::Kernel;
use crate::hal::Platform;
use crate::sched::task::state::StateMask;
use crate::sync::IrqGuard;
use crate::sys::Errno;

/// Intervalo mínimo entre o agora e o instante programado no alarme.
/// Evita tempestade de reprogramação quando expirações estão no passado
/// ou iminentes.
pub const TIMER_MIN_ARM_NS: u64 = 50_000;

/// Callback de timer: recebe o contexto do kernel para poder rearmar-se,
/// acordar tasks, etc. Executa em contexto de interrupção com o lock da
/// fila SOLTO (pode legalmente chamar `timer_add`).
pub type TimerFn<P> = Box<dyn FnMut(&Kernel<P>) + Send>;

/// Um timer one-shot.
pub struct Timer<P: Platform> {
    /// Instante de expiração (nanosegundos absolutos)
    pub expires_ns: u64,
    callback: TimerFn<P>,
}

impl<P: Platform> Timer<P> {
    /// Cria um novo timer
    pub fn new<F>(expires_ns: u64, callback: F) -> Self
    where
        F: FnMut(&Kernel<P>) + Send + 'static,
    {
        Self {
            expires_ns,
            callback: Box::new(callback),
        }
    }
}

/// Handle devolvido por `timer_add`; identifica o timer para cancelamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    cpu: CpuId,
    seq: u64,
}

impl TimerHandle {
    /// CPU dona do timer
    pub fn cpu(self) -> CpuId {
        self.cpu
    }
}

struct TimerEntry<P: Platform> {
    seq: u64,
    timer: Timer<P>,
}

/// Fila de timers de uma CPU, ordenada por expiração crescente.
pub(crate) struct TimerQueue<P: Platform> {
    list: VecDeque<TimerEntry<P>>,
    next_seq: u64,
}

impl<P: Platform> TimerQueue<P> {
    pub(crate) fn new() -> Self {
        Self {
            list: VecDeque::new(),
            next_seq: 1,
        }
    }

    /// Insere mantendo a ordenação; retorna (seq, virou_cabeça).
    fn insert(&mut self, timer: Timer<P>) -> (u64, bool) {
        let seq = self.next_seq;
        self.next_seq += 1;

        // Varredura linear a partir da cabeça
        let mut pos = self.list.len();
        for (i, entry) in self.list.iter().enumerate() {
            if entry.timer.expires_ns > timer.expires_ns {
                pos = i;
                break;
            }
        }
        self.list.insert(pos, TimerEntry { seq, timer });
        (seq, pos == 0)
    }

    /// Expiração da cabeça da fila, se houver
    fn head_expiry(&self) -> Option<u64> {
        self.list.front().map(|e| e.timer.expires_ns)
    }

    fn len(&self) -> usize {
        self.list.len()
    }
}

impl<P: Platform> Kernel<P> {
    /// Reprograma o alarme one-shot de `cpu` para a cabeça da fila.
    ///
    /// Instantes no passado ou iminentes são adiantados para
    /// `now + TIMER_MIN_ARM_NS` (única exceção à regra "alarme = cabeça").
    fn timer_rearm(&self, cpu: CpuId, head: Option<u64>) {
        let deadline = head.map(|expires| {
            let min = self.now_ns() + TIMER_MIN_ARM_NS;
            if expires < min {
                min
            } else {
                expires
            }
        });
        self.platform.arm_oneshot(cpu, deadline);
    }

    /// Adiciona um timer à fila da CPU local.
    pub fn timer_add(&self, timer: Timer<P>) -> TimerHandle {
        let cpu = self.this_cpu();
        self.timer_attach(cpu, timer)
    }

    /// Insere `timer` na fila de `cpu` (qualquer CPU, chamada local).
    fn timer_attach(&self, cpu: CpuId, timer: Timer<P>) -> TimerHandle {
        let _irq = IrqGuard::save(&self.platform);
        let mut queue = self.timers.get(cpu).lock();
        let (seq, became_head) = queue.insert(timer);
        let head = queue.head_expiry();
        drop(queue);

        if became_head {
            self.timer_rearm(cpu, head);
        }
        TimerHandle { cpu, seq }
    }

    /// Adiciona um timer à fila de uma CPU remota.
    ///
    /// A inserção acontece NA CPU alvo via cross-call síncrona: a
    /// chamadora bloqueia (busy-wait) até a inserção remota completar.
    /// O timer viaja pelo mailbox `timer_xfer`, serializado pelo
    /// `timer_xfer_gate` do preenchimento até a retirada do handle.
    pub fn timer_add_on(&self, target_cpu: CpuId, timer: Timer<P>) -> Result<TimerHandle, Errno> {
        if target_cpu == self.this_cpu() {
            return Ok(self.timer_add(timer));
        }
        if !self.topology.is_online(target_cpu) {
            return Err(Errno::EINVAL);
        }

        // O gate cobre mailbox + cross-call + handle: outra chamadora só
        // preenche o mailbox depois que esta retirou o handle dela.
        let _gate = self.timer_xfer_gate.lock();
        *self.timer_xfer.lock() = Some(timer);

        fn install_remote<P: Platform>(kernel: &Kernel<P>, _arg: usize) {
            let timer = kernel.timer_xfer.lock().take();
            if let Some(timer) = timer {
                let cpu = kernel.this_cpu();
                let handle = kernel.timer_attach(cpu, timer);
                // Devolver o handle pela mesma via: a iniciadora ainda
                // segura a serialização da cross-call.
                *kernel.timer_xfer_handle.lock() = Some(handle);
            }
        }

        self.xcall_function(CpuMask::single(target_cpu), install_remote::<P>, 0, true)?;

        self.timer_xfer_handle
            .lock()
            .take()
            .ok_or(Errno::EAGAIN)
    }

    /// Cancela um timer ainda pendente.
    ///
    /// Retorna `true` se o timer foi removido, `false` se já disparou.
    pub fn timer_del(&self, handle: TimerHandle) -> bool {
        let _irq = IrqGuard::save(&self.platform);
        let mut queue = self.timers.get(handle.cpu).lock();

        let mut found = false;
        let mut was_head = false;
        for (i, entry) in queue.list.iter().enumerate() {
            if entry.seq == handle.seq {
                found = true;
                was_head = i == 0;
                break;
            }
        }
        if found {
            queue.list.retain(|e| e.seq != handle.seq);
        }
        let head = queue.head_expiry();
        drop(queue);

        if was_head {
            self.timer_rearm(handle.cpu, head);
        }
        found
    }

    /// Caminho de interrupção do timer: dispara todo timer vencido.
    ///
    /// Cada callback executa com o lock da fila SOLTO, então pode rearmar
    /// a si mesmo ou outros timers. Nunca dispara timer com expiração
    /// futura.
    pub fn timer_interrupt(&self) {
        let cpu = self.this_cpu();
        let now = self.now_ns();
        let _irq = IrqGuard::save(&self.platform);

        loop {
            let mut queue = self.timers.get(cpu).lock();
            let expired = match queue.head_expiry() {
                Some(expires) if expires <= now => queue.list.pop_front(),
                _ => break,
            };
            drop(queue);

            if let Some(mut entry) = expired {
                (entry.timer.callback)(self);
            }
        }

        let head = self.timers.get(cpu).lock().head_expiry();
        self.timer_rearm(cpu, head);
    }

    /// Dorme até o instante absoluto `when_ns` (nanosegundos).
    ///
    /// Marca a task atual como bloqueada-interruptível, arma um timer que
    /// a acorda e cede a CPU. Retorna o tempo restante (0 se o prazo já
    /// passou) - a task pode ter sido acordada antes por outro motivo.
    pub fn timer_sleep_until(&self, when_ns: u64) -> u64 {
        let task = self.current_task();

        let waker = {
            let task = task.clone();
            move |kernel: &Kernel<P>| {
                if let Ok(cpu) = kernel.sched_wakeup_task(&task, StateMask::INTERRUPTIBLE) {
                    kernel.xcall_reschedule(cpu);
                }
            }
        };
        let handle = self.timer_add(Timer::new(when_ns, waker));

        // O timer já está armado: se disparar antes desta marcação, o
        // waker encontra a task ainda Running e a transição falha - o
        // sono só termina com outro wakeup interruptível. Com o clamp de
        // TIMER_MIN_ARM_NS a janela é estreita, mas existe.
        task.set_state(crate::sched::task::state::TaskState::Interruptible);
        self.schedule();

        self.timer_del(handle);

        let now = self.now_ns();
        when_ns.saturating_sub(now)
    }

    /// Número de timers pendentes na CPU local (diagnóstico)
    pub fn timer_pending(&self) -> usize {
        self.timers.get(self.this_cpu()).lock().len()
    }
}
