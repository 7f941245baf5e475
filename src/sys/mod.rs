/// Arquivo: sys/mod.rs
///
/// Propósito: Definições de sistema compartilhadas por todos os subsistemas.
///
/// Módulos contidos:
/// - `error`: Códigos de erro padronizados (Errno).
pub mod error;

pub use error::Errno;
