//! IrqGuard - seção crítica com interrupções desabilitadas
//!
//! As filas per-CPU (runqueue, timer queue) são manipuladas tanto por
//! código de task quanto pelo handler de interrupção de timer da mesma
//! CPU. Todo acesso precisa desabilitar interrupções locais antes de
//! tomar o spinlock, senão o handler pode reentrar na mesma estrutura.

use crate::hal::Platform;

/// Guard RAII: desabilita interrupções na criação e restaura o estado
/// anterior no drop.
pub struct IrqGuard<'a, P: Platform> {
    platform: &'a P,
    were_enabled: bool,
}

impl<'a, P: Platform> IrqGuard<'a, P> {
    /// Salva o estado atual de interrupções e as desabilita.
    pub fn save(platform: &'a P) -> Self {
        let were_enabled = platform.irqs_enabled();
        platform.disable_irqs();
        Self {
            platform,
            were_enabled,
        }
    }
}

impl<P: Platform> Drop for IrqGuard<'_, P> {
    fn drop(&mut self) {
        // Restaurar interrupções se estavam habilitadas
        if self.were_enabled {
            self.platform.enable_irqs();
        }
    }
}
