pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{BreathingController, BreathingSnapshot};
pub use state::{BreathPhase, BreathingCycle, BreathingStatus};
