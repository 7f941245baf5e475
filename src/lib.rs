//! Anvil - Núcleo de Escalonamento SMP.
//!
//! Ponto central de exportação dos módulos do escalonador.
//! Define a estrutura hierárquica do subsistema: um escalonador
//! independente por CPU (runqueue + fila de timers), coordenado por
//! cross-calls síncronas entre processadores.
//!
//! O hardware (troca de contexto, controlador de interrupções, relógio
//! monotônico) é consumido através do trait `hal::Platform`; nada aqui
//! toca registradores diretamente.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/Arc)
extern crate alloc;

// --- Contrato com o Hardware ---
pub mod hal; // Trait Platform (CPU, IPI, relógio, context switch)

// --- Módulos Centrais ---
pub mod core; // Contexto do kernel, SMP (xcall), timers, logging
pub mod sync; // Primitivas de sincronização (IrqGuard)
pub mod sys; // Definições de Sistema (Errno)

// --- Subsistemas ---
pub mod sched; // Scheduler, políticas (RR/EDF), wait queues

// Re-exportar os tipos de uso mais frequente
pub use crate::core::smp::topology::{CpuId, CpuMask};
pub use crate::core::Kernel;
pub use crate::hal::Platform;
