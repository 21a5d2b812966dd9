//! State machine module root.
//!
//! Sample-rate state machines and their building blocks. Every machine is a
//! `Copy` register set with a pure `step` returning the next value; the
//! cycle engine commits all of them at once.

pub mod arbiter;
pub mod speed_limit;
pub mod timer;
pub mod tla;
pub mod vigilance;
