pub mod commands;
pub mod session;

pub use session::{ChatSession, ChatSnapshot, GREETING};
