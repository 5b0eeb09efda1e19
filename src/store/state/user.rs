use serde::{Deserialize, Serialize};

/// Signed-in user as supplied by the session service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Authentication slice
///
/// `is_authenticated` always mirrors whether `current` is set; build it with
/// [`UserState::signed_in`] / [`UserState::signed_out`] or `From<Option<User>>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserState {
    pub current: Option<User>,
    pub is_authenticated: bool,
}

impl UserState {
    pub fn signed_in(user: User) -> Self {
        Self {
            current: Some(user),
            is_authenticated: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.current.as_ref().map(|user| user.name.as_str())
    }
}

impl From<Option<User>> for UserState {
    fn from(user: Option<User>) -> Self {
        match user {
            Some(user) => Self::signed_in(user),
            None => Self::signed_out(),
        }
    }
}
