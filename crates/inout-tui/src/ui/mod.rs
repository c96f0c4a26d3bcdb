//! Terminal UI module using ratatui.
//!
//! - `render`: routed views, layout, and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling
//! - `tabs`: Scan and Log tab content

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
