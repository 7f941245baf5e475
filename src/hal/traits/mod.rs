//! Traits abstratos de hardware

pub mod platform;
