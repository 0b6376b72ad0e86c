//! Shared helpers for Arrow tables, logging and console output

pub mod arrow;
pub mod logging;
