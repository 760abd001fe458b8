//! Operator-facing interfaces

pub mod console;
