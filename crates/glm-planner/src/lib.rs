//! glm-planner: turns a model descriptor and a hardware snapshot into
//! inference-engine flags.
//!
//! Planning is pure: no probing, no I/O. Callers obtain the snapshot from a
//! [`glm_core::HardwareProbe`] and append the resulting [`FlagSet`] to the
//! engine command line.

pub mod flags;
pub mod planner;

pub use flags::{Flag, FlagSet};
pub use planner::{plan, under_memory_pressure};
