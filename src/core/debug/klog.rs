// =============================================================================
// KERNEL LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do núcleo de escalonamento com custo ZERO em release.
//
// ARQUITETURA:
// Este sistema foi projetado para ser completamente removível em release:
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt - Evita geração de código SSE/AVX
// - SEM alocação - Apenas strings literais e um buffer hex na pilha
//
// Como o escalonador é um núcleo independente (sem driver serial próprio),
// a saída vai para um sink instalado uma única vez na inicialização via
// `set_sink`. Sem sink instalado, os logs são descartados em silêncio.
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Erros fatais ou críticos
// - WARN:  Situações suspeitas mas recuperáveis
// - INFO:  Fluxo normal de execução
// - DEBUG: Informações de debugging
// - TRACE: Detalhes extremos (cada decisão de escalonamento)
//
// COMO USAR:
//   kinfo!("(Sched) Inicializando...");          // Apenas string
//   kinfo!("(Sched) CPU=", cpu_id);              // String + hex
//
// =============================================================================

use spin::Once;

/// Sink de saída: recebe um fragmento de texto já pronto.
pub type LogSink = fn(&str);

static SINK: Once<LogSink> = Once::new();

/// Instala o sink de log. Chamadas subsequentes são ignoradas.
pub fn set_sink(sink: LogSink) {
    SINK.call_once(|| sink);
}

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

/// Emite um fragmento de texto no sink, se instalado.
pub fn emit_str(s: &str) {
    if let Some(sink) = SINK.get() {
        sink(s);
    }
}

/// Emite um valor em hexadecimal (sem core::fmt).
pub fn emit_hex(value: u64) {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut buf = [0u8; 16];
    let mut i = 16;
    let mut v = value;
    loop {
        i -= 1;
        buf[i] = DIGITS[(v & 0xf) as usize];
        v >>= 4;
        if v == 0 {
            break;
        }
    }
    emit_str("0x");
    // Os dígitos são ASCII puro, a conversão nunca falha
    if let Ok(s) = core::str::from_utf8(&buf[i..]) {
        emit_str(s);
    }
}

/// Emite quebra de linha.
pub fn emit_nl() {
    emit_str("\n");
}

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================
//
// kerror! - Sempre ativo (exceto com no_logs)
// Usado para erros críticos.
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_ERROR);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_nl();
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_ERROR);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_hex($val as u64);
        $crate::core::debug::klog::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_WARN);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_WARN);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_hex($val as u64);
        $crate::core::debug::klog::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_INFO);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_INFO);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_hex($val as u64);
        $crate::core::debug::klog::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_DEBUG);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_DEBUG);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_hex($val as u64);
        $crate::core::debug::klog::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_TRACE);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::debug::klog::emit_str($crate::core::debug::klog::P_TRACE);
        $crate::core::debug::klog::emit_str($msg);
        $crate::core::debug::klog::emit_hex($val as u64);
        $crate::core::debug::klog::emit_nl();
    }};
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}
