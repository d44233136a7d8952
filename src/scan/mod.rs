pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{ScanController, ScanRejection, ScanSnapshot, ScanTrigger};
pub use state::{ScanState, ScanStatus};
