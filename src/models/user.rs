use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    User,
    Therapist,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: "Alex Johnson".into(),
            role: UserRole::User,
        }
    }
}

/// Who is using the client. Built once at startup and handed to whatever needs it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionContext {
    pub user: User,
}

impl SessionContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Identifier the backend files mood samples under.
    pub fn user_id(&self) -> &str {
        &self.user.name
    }
}
