//! # Standard Error Codes (Errno)
//!
//! Define os códigos de erro retornados pelo núcleo de escalonamento.
//! Baseado no padrão POSIX para compatibilidade com ferramentas existentes.
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Uniformidade:** Todas as operações faliveis retornam códigos padronizados.
//! - **Conversion:** Métodos `as_isize` facilitam o retorno negativo em ABIs.
//!
//! Erros de política de escalonamento (rejeição de admissão EDF) são
//! condições normais reportadas ao chamador, nunca panics. O chamador
//! (criação de tasks) decide se tenta de novo com parâmetros ajustados.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    Success = 0,
    EPERM = 1,  // Operation not permitted
    ESRCH = 3,  // No such process
    EINTR = 4,  // Interrupted system call
    EAGAIN = 11, // Try again
    ENOMEM = 12, // Out of memory
    EBUSY = 16,  // Device or resource busy
    EINVAL = 22, // Invalid argument
    ERANGE = 34, // Result not representable
    ENOSYS = 38, // Function not implemented

    // Redstone Specific
    ERSV = 1000, // Reservation error (admissão EDF excederia a utilização da CPU)
}

impl Errno {
    pub fn as_usize(self) -> usize {
        self as usize
    }

    pub fn as_isize(self) -> isize {
        -(self as i32) as isize
    }
}
