/// Arquivo: hal/mod.rs
///
/// Propósito: Hardware Abstraction Layer do núcleo de escalonamento.
/// Tudo que depende de arquitetura (troca de contexto, IPIs, relógio,
/// alarme one-shot) entra por aqui, via o trait `Platform`.
pub mod traits;

pub use traits::platform::Platform;
