pub mod chat;
pub mod emotion;
pub mod mood;
pub mod user;

pub use chat::{ChatReply, ReplyProvenance, Speaker, Turn};
pub use emotion::{mood_score_from_stress, EmotionResult};
pub use mood::{default_mood_history, MoodSample};
pub use user::{SessionContext, User, UserRole};
