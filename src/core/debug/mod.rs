/// Arquivo: core/debug/mod.rs
///
/// Propósito: Módulo de diagnóstico e depuração.
///
/// Módulos contidos:
/// - `klog`: Macros de logging (kinfo, kerror, etc) com filtro em compile-time.
pub mod klog;
