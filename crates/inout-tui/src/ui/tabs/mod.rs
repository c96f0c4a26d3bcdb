//! Tab content rendering.
//!
//! - `scan`: location picker, card field, and the last scan outcome
//! - `log`: today's entry/exit table

pub mod log;
pub mod scan;
