//! Arquivo: hal/traits/platform.rs
//!
//! Propósito: Definição do trait abstrato `Platform`.
//! Este trait estabelece o contrato que todas as implementações de arquitetura
//! (x86_64, aarch64, etc.) devem cumprir para hospedar o escalonador. Permite
//! que o núcleo opere de forma agnóstica à arquitetura.
//!
//! Detalhes de Implementação:
//! - Controle de interrupções locais (cli/sti).
//! - Relógio monotônico em nanosegundos.
//! - Envio de IPIs e programação do alarme one-shot por CPU.
//! - Primitivo de troca de contexto (salvar/restaurar registradores).

use crate::core::smp::ipi::IpiVector;
use crate::core::smp::topology::CpuId;
use crate::sched::task::Task;

/// Trait que toda arquitetura deve implementar.
///
/// Uma instância é entregue ao `Kernel` na inicialização e compartilhada
/// por todas as CPUs; cada método deve ser seguro para chamada concorrente.
pub trait Platform: Send + Sync {
    /// Retorna o ID lógico da CPU que executa o chamador
    fn cpu_id(&self) -> CpuId;

    /// Relógio monotônico do sistema, em nanosegundos
    fn now_ns(&self) -> u64;

    /// Retorna se interrupções locais estão habilitadas
    fn irqs_enabled(&self) -> bool;

    /// Desabilita interrupções locais (ex: cli em x86)
    fn disable_irqs(&self);

    /// Habilita interrupções locais (ex: sti em x86)
    fn enable_irqs(&self);

    /// Envia uma interrupção inter-processador para `cpu`
    fn send_ipi(&self, cpu: CpuId, vector: IpiVector);

    /// Programa o alarme one-shot de `cpu` para disparar no instante
    /// absoluto `deadline_ns`. `None` desarma o alarme.
    fn arm_oneshot(&self, cpu: CpuId, deadline_ns: Option<u64>);

    /// Troca de contexto: salva o estado de `prev` e restaura o de `next`.
    ///
    /// O bookkeeping de "task atual" por CPU já foi atualizado quando este
    /// método é chamado; a implementação só lida com registradores, pilha
    /// e espaço de endereçamento.
    fn switch(&self, prev: &Task, next: &Task);

    /// Pausa curta dentro de busy-wait (spin).
    ///
    /// Sob um hipervisor a implementação pode ceder o vcpu aqui para
    /// evitar preempção do detentor do lock; o contrato de bloqueio das
    /// cross-calls não muda.
    fn cpu_relax(&self) {
        core::hint::spin_loop();
    }
}
