pub mod logging;
pub mod sync;
