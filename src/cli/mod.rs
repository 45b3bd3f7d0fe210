//! Command implementations and terminal rendering

pub mod ratio;
pub mod setup;
pub mod ui;
