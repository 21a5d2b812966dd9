//! Vigilance unit types shared between the engine and its tooling.
//!
//! - [`state`] - operating mode, vigilance and speed-limit state enums
//! - [`speed`] - thermometer speed band codec
//! - [`tla`] - task-linked activity channels and allotments
//! - [`config`] - timing tables and validation
//! - [`io`] - input/output signal records

pub mod config;
pub mod io;
pub mod speed;
pub mod state;
pub mod tla;
