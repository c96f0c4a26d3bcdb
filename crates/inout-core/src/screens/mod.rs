//! Per-view state, independent of any UI toolkit.
//!
//! Each screen tracks its operations as an [`OpStatus`] and exposes a
//! `begin_*` / `finish_*` pair so a front end can run the gateway call on a
//! background task, plus an `async` one-shot wrapper for simple callers.
//! Errors never propagate out of a screen; they settle into its status and
//! are read back as inline text.

pub mod log;
pub mod login;
pub mod scan;
pub mod status;

pub use log::{LogScreen, NO_ENTRIES};
pub use login::{LoginRequest, LoginScreen};
pub use scan::{ScanScreen, SELECT_LOCATION};
pub use status::OpStatus;
