/// Arquivo: core/smp/mod.rs
///
/// Propósito: Módulo de Multiprocessamento Simétrico (SMP).
/// Coordenação entre múltiplos cores de CPU: topologia, dados per-CPU,
/// interrupções inter-processador e cross-calls síncronas.
///
/// Módulos contidos:
/// - `percpu`: Variáveis locais de CPU.
/// - `topology`: Máscaras e IDs de CPU, estado online/offline.
/// - `ipi`: Vetores de Inter-Processor Interrupts.
/// - `xcall`: Motor de cross-call (execução remota síncrona).
pub mod ipi;
pub mod percpu;
pub mod topology;
pub mod xcall;
