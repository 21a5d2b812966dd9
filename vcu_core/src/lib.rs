//! # VCU Core
//!
//! Deterministic timing core of a railway cab vigilance unit. Decides when
//! to warn the operator, when to apply the penalty brake, and when the
//! 25 km/h speed-limit function is active.
//!
//! ## Components
//!
//! 1. **TickGenerator / ResetSync**: every rate derived from one cycle counter
//! 2. **EdgeSampler**: button and TLA edges latched between samples
//! 3. **ModeRequestDecoder**: registered suppression/depression/test requests
//! 4. **ModeArbiter**: authoritative operating mode
//! 5. **VigilanceFsm**: warning escalation and penalty brake
//! 6. **SpeedLimitFsm**: speed-limit timer, override and exceeded relays
//!
//! ## Two-Phase Step
//!
//! Every component is a `Copy` register set with a pure `step`. The
//! [`cycle::Engine`] evaluates all of them from one snapshot and commits the
//! results together. The step path never allocates and never fails.
//!
//! ```
//! use vcu_common::prelude::*;
//! use vcu_core::cycle::Engine;
//!
//! let mut engine = Engine::default();
//! let out = engine.run_samples(&Inputs::driving(SpeedBand::Above25), 10);
//! assert_eq!(out.operating_mode(), Some(OperatingMode::Normal));
//! assert!(!out.penalty_brake());
//! ```

pub mod config;
pub mod cycle;
pub mod decoder;
pub mod journal;
pub mod sampler;
pub mod scenario;
pub mod state;
pub mod tick;
