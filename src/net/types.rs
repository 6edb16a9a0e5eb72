//! Wire DTOs for the movie catalog API.
//!
//! DESIGN
//! ======
//! Field names follow the server's camelCase JSON. Ids and years usually
//! arrive as integers; integer-valued floats and numeric strings are
//! accepted on input as well.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub type MovieId = i64;
pub type UserId = i64;

/// Account role as issued by the auth endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse a role name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("USER") {
            Some(Self::User)
        } else if raw.eq_ignore_ascii_case("ADMIN") {
            Some(Self::Admin)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown role '{s}' (expected USER or ADMIN)"))
    }
}

/// A catalog movie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_year", skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
}

/// A registered account as listed by the admin endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_opt_role")]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/login`, success or failure.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_role")]
    pub role: Option<Role>,
    #[serde(default, rename = "userId", deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Body of `POST /auth/register`, success or failure.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

/// Admin movie form. `title` and `release_year` are required.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub title: String,
    pub poster_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub genre: String,
    pub release_year: i32,
}

impl MovieDraft {
    /// Reject drafts the admin form would refuse to submit.
    ///
    /// # Errors
    ///
    /// Returns a message when the title is blank or the year is not positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.release_year <= 0 {
            return Err("Title and release year are required".to_owned());
        }
        Ok(())
    }
}

/// Partial user update for `PATCH /users/update/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: Option<String>,
}

fn integer_from_value<E: serde::de::Error>(value: &serde_json::Value) -> Result<i64, E> {
    match value {
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err(E::custom("expected integer-compatible number"))
        }
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| E::custom("expected integer string")),
        _ => Err(E::custom("expected number")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    integer_from_value(&value)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        value => integer_from_value(&value).map(Some),
    }
}

fn deserialize_opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(year) = deserialize_opt_id(deserializer)? else {
        return Ok(None);
    };
    i32::try_from(year)
        .map(Some)
        .map_err(|_| D::Error::custom("release year out of range"))
}

/// Unknown role strings read as "no role" rather than failing the whole body.
fn deserialize_opt_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}

/// Validation failures carry `message` as an array of strings.
fn deserialize_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(message) => Some(message),
        serde_json::Value::Array(parts) => {
            let joined = parts
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    })
}
