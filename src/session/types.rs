//! Operator identity and credential payloads. Passwords and tokens are held in
//! `SecretString` so they never end up in `Debug` output or tracing fields.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SessionError;

/// Characters accepted as the "special character" of a registration password.
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";
const MIN_PASSWORD_LEN: usize = 8;

/// Role carried by a user profile. The API spells them `admin` and `user`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin", alias = "Admin")]
    Admin,
    #[serde(rename = "user", alias = "User", alias = "StandardUser")]
    StandardUser,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::StandardUser => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::StandardUser),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Profile of the signed-in operator, in the shape the API returns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(
        rename = "passwordChangedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub password_changed_at: Option<String>,
}

/// Opaque bearer credential. The value is never inspected, only forwarded.
#[derive(Clone, Debug)]
pub struct Token(SecretString);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Compares two tokens without exposing either in logs.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Email/password pair submitted on sign-in.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Sign-up form data.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirm: SecretString,
    pub role: Option<Role>,
}

impl Registration {
    /// Rejects forms the API would refuse anyway, so no request goes out.
    ///
    /// # Errors
    /// Returns `SessionError::Validation` describing the first failed rule.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::Validation("name is required".to_string()));
        }
        if !valid_email(&self.email) {
            return Err(SessionError::Validation(
                "email address is not valid".to_string(),
            ));
        }

        let password = self.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(SessionError::Validation(
                "password must contain an uppercase letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(SessionError::Validation(
                "password must contain a number".to_string(),
            ));
        }
        if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
            return Err(SessionError::Validation(
                "password must contain a special character".to_string(),
            ));
        }
        if password != self.password_confirm.expose_secret() {
            return Err(SessionError::Validation(
                "passwords do not match".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email.trim()))
}
