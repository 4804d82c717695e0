//! Command handlers. Each returns the text printed on stdout.

pub mod classify;
pub mod evaluate;
