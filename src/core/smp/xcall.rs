//! Arquivo: core/smp/xcall.rs
//!
//! Propósito: Motor de Cross-Call - execução remota síncrona de funções.
//! Executa `func(arg)` em todas as CPUs online de uma máscara, incluindo a
//! chamadora (como chamada local direta, sem IPI). Usado para TLB
//! shootdown, entrega de reschedule e inserção remota de timers.
//!
//! Protocolo:
//! 1. Conta os alvos remotos (máscara ∩ online, menos a CPU local).
//! 2. Toma o lock global de serialização, girando com interrupções
//!    HABILITADAS - assim a chamadora continua respondendo a cross-calls
//!    de terceiros enquanto espera a vez dela. Uma única chamada em voo
//!    no sistema inteiro.
//! 3. Publica o descritor no slot global e envia uma IPI por alvo.
//! 4. Cada alvo incrementa `started`, executa a função e, se `wait` foi
//!    pedido, incrementa `finished`.
//! 5. A iniciadora espera `started` == alvos (todos ao menos começaram)
//!    e, com `wait`, espera também `finished` == alvos.
//! 6. Solta o lock; a porção local executa depois do fan-out remoto.
//!
//! Limitação conhecida (herdada do design original): sem timeout e sem
//! detecção de alvo que saiu do ar no meio da chamada.

use core::sync::atomic::{AtomicU32, Ordering};
use spin::Mutex;

use super::ipi::IpiVector;
use super::topology::CpuMask;
use crate::core::Kernel;
use crate::hal::Platform;
use crate::sys::Errno;

/// Função executada pela cross-call em cada CPU alvo.
///
/// Roda em contexto de interrupção com interrupções desabilitadas:
/// não pode bloquear e deve ser curta.
pub type XcallFn<P> = fn(&Kernel<P>, usize);

/// Descritor transitório de uma cross-call (um vivo por vez no sistema).
struct XcallData<P: Platform> {
    func: XcallFn<P>,
    arg: usize,
    wait: bool,
}

/// Motor de cross-call. No máximo um descritor vivo no sistema; o lock de
/// serialização é o único recurso globalmente compartilhado do escalonador.
pub(crate) struct XcallEngine<P: Platform> {
    serialize: Mutex<()>,
    slot: Mutex<Option<XcallData<P>>>,
    started: AtomicU32,
    finished: AtomicU32,
}

impl<P: Platform> XcallEngine<P> {
    pub(crate) fn new() -> Self {
        Self {
            serialize: Mutex::new(()),
            slot: Mutex::new(None),
            started: AtomicU32::new(0),
            finished: AtomicU32::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn finished_count(&self) -> u32 {
        self.finished.load(Ordering::SeqCst)
    }
}

impl<P: Platform> Kernel<P> {
    /// Executa `func(arg)` em todas as CPUs online de `mask`.
    ///
    /// Com `wait = true`, só retorna depois que a função completou em
    /// todos os alvos. Com `wait = false`, o chamador deve garantir que
    /// `arg` continua válido até a função completar em todos os alvos.
    pub fn xcall_function(
        &self,
        mask: CpuMask,
        func: XcallFn<P>,
        arg: usize,
        wait: bool,
    ) -> Result<(), Errno> {
        // Cross-call exige interrupções habilitadas: a chamadora precisa
        // continuar recebendo cross-calls alheias enquanto gira no lock.
        debug_assert!(self.platform.irqs_enabled());

        // Só CPUs online são alvo
        let mut mask = mask.and(self.topology.online_mask());

        // Não precisamos de IPI para nós mesmos - chamada local direta
        let me = self.this_cpu();
        let contains_me = mask.contains(me);
        if contains_me {
            mask.clear(me);
        }

        let num_cpus = mask.weight();
        if num_cpus > 0 {
            let guard = self.xcall.serialize.lock();

            self.xcall.started.store(0, Ordering::SeqCst);
            self.xcall.finished.store(0, Ordering::SeqCst);
            *self.xcall.slot.lock() = Some(XcallData { func, arg, wait });

            // Enviar IPIs para as CPUs alvo
            for cpu in mask.iter() {
                self.platform.send_ipi(cpu, IpiVector::CallFunction);
            }

            // Esperar confirmação de início de todos os alvos
            while self.xcall.started.load(Ordering::SeqCst) != num_cpus {
                self.platform.cpu_relax();
            }

            // Se pedido, esperar confirmação de término
            if wait {
                while self.xcall.finished.load(Ordering::SeqCst) != num_cpus {
                    self.platform.cpu_relax();
                }
            }

            *self.xcall.slot.lock() = None;
            drop(guard);
        }

        // Porção local, depois do fan-out remoto reconhecido
        if contains_me {
            func(self, arg);
        }

        Ok(())
    }

    /// Handler da IPI de cross-call. Chamado pela cola de interrupções da
    /// plataforma quando o vetor CallFunction chega.
    pub fn xcall_interrupt(&self) {
        // Copiar o descritor antes de soltar o lock do slot: a iniciadora
        // só o invalida depois que `started` alcança o total de alvos.
        let data = {
            let slot = self.xcall.slot.lock();
            match slot.as_ref() {
                Some(d) => (d.func, d.arg, d.wait),
                None => {
                    crate::kwarn!("(Xcall) IPI de cross-call sem descritor publicado");
                    return;
                }
            }
        };
        let (func, arg, wait) = data;

        // Avisar a iniciadora que começamos
        self.xcall.started.fetch_add(1, Ordering::SeqCst);

        func(self, arg);

        // Avisar a iniciadora que terminamos
        if wait {
            self.xcall.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Variante assíncrona: pede reschedule na CPU alvo.
    ///
    /// Seta a flag need-resched remota e envia a IPI de reschedule sem
    /// esperar. Seguro de chamar com locks tomados e interrupções
    /// desabilitadas, desde que o chamador os solte "logo".
    pub fn xcall_reschedule(&self, cpu: super::topology::CpuId) {
        self.cpus.get(cpu).set_need_resched();
        if cpu != self.this_cpu() {
            self.platform.send_ipi(cpu, IpiVector::Reschedule);
        }
    }
}
