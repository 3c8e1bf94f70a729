//! User identity and profile model.
//!
//! Profiles arrive from the authentication provider. Role and age are parsed
//! leniently: an unrecognised role or an impossible age is dropped rather than
//! rejected, so downstream policy checks see "unknown" and fail closed.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;
use uuid::Uuid;

use super::viewer::{Age, ParentalControls, Role};

/// Validation errors returned by the identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    DisplayNameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, hyphens, apostrophes, or underscores",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Account identifier issued by the authentication provider.
///
/// Rendered in lowercase hyphenated form whatever the input casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier, refusing padded or non-UUID text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable name shown next to uploads and in the family dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

static NAME_CHARS: OnceLock<Regex> = OnceLock::new();

/// Letters in any script, digits, spaces, hyphens, apostrophes, underscores.
fn name_chars() -> &'static Regex {
    NAME_CHARS.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}_ '\-]+$")
            .unwrap_or_else(|error| panic!("name pattern is invalid: {error}"))
    })
}

impl DisplayName {
    /// Trim and check a name typed at sign-up.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = display_name.into();
        let name = raw.trim();
        match name.chars().count() {
            0 => Err(UserValidationError::EmptyDisplayName),
            n if n > DISPLAY_NAME_MAX => Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            }),
            _ if !name_chars().is_match(name) => {
                Err(UserValidationError::DisplayNameInvalidCharacters)
            }
            _ => Ok(Self(name.to_owned())),
        }
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile record owned by the authentication provider.
///
/// ## Invariants
/// - `id` is a valid UUID.
/// - `role` is `None` when the stored role is missing or unrecognised.
/// - `age` is `None` when the stored age is missing, negative, or implausible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserProfileDto", into = "UserProfileDto")]
pub struct UserProfile {
    id: UserId,
    display_name: DisplayName,
    role: Option<Role>,
    age: Option<Age>,
    parental_controls: ParentalControls,
    parent_id: Option<UserId>,
}

impl UserProfile {
    /// Build a profile from validated components.
    pub fn new(id: UserId, display_name: DisplayName, role: Option<Role>) -> Self {
        Self {
            id,
            display_name,
            role,
            age: None,
            parental_controls: ParentalControls::default(),
            parent_id: None,
        }
    }

    /// Attach the profile owner's age.
    pub fn with_age(mut self, age: Age) -> Self {
        self.age = Some(age);
        self
    }

    /// Attach the parental controls configured for this profile.
    pub fn with_parental_controls(mut self, controls: ParentalControls) -> Self {
        self.parental_controls = controls;
        self
    }

    /// Link the profile to its supervising parent.
    pub fn with_parent(mut self, parent_id: UserId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to other family members.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Recognised role, if any.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Age in years, if known and plausible.
    pub fn age(&self) -> Option<Age> {
        self.age
    }

    /// Capability flags set by a parent.
    pub fn parental_controls(&self) -> &ParentalControls {
        &self.parental_controls
    }

    /// Supervising parent, for child profiles.
    pub fn parent_id(&self) -> Option<&UserId> {
        self.parent_id.as_ref()
    }
}

/// Wire shape of a profile as stored by the authentication provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileDto {
    id: String,
    #[serde(alias = "full_name", alias = "fullName")]
    display_name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default, alias = "parental_controls")]
    parental_controls: ParentalControls,
    #[serde(default, alias = "parent_id")]
    parent_id: Option<String>,
}

impl From<UserProfile> for UserProfileDto {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.into(),
            display_name: value.display_name.into(),
            role: value.role.map(|role| role.as_str().to_owned()),
            age: value.age.map(|age| i64::from(age.years())),
            parental_controls: value.parental_controls,
            parent_id: value.parent_id.map(String::from),
        }
    }
}

impl TryFrom<UserProfileDto> for UserProfile {
    type Error = UserValidationError;

    fn try_from(value: UserProfileDto) -> Result<Self, Self::Error> {
        let id = UserId::new(&value.id)?;
        let display_name = DisplayName::new(value.display_name)?;
        let role = value.role.as_deref().and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                debug!(user_id = %id, error = %err, "dropping unrecognised role");
                None
            }
        });
        let age = value.age.and_then(|raw| match Age::new(raw) {
            Ok(age) => Some(age),
            Err(err) => {
                debug!(user_id = %id, error = %err, "dropping invalid age");
                None
            }
        });
        let parent_id = value.parent_id.map(UserId::new).transpose()?;

        Ok(Self {
            id,
            display_name,
            role,
            age,
            parental_controls: value.parental_controls,
            parent_id,
        })
    }
}

#[cfg(test)]
mod tests;
