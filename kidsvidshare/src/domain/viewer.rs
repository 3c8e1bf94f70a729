//! The acting party whose permissions are evaluated.
//!
//! A [`Viewer`] is a plain value built per call. Nothing in the core keeps a
//! "current user"; callers pass the viewer into every policy check and
//! service method.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::user::{UserId, UserProfile};

/// Family role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Child,
    Parent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }

    /// Parents and admins bypass rating checks and may review uploads.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Parent | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid role: {}", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "child" => Ok(Self::Child),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Validation errors raised by viewer value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerValidationError {
    NegativeAge { value: i64 },
    AgeTooLarge { value: i64, max: u8 },
}

impl fmt::Display for ViewerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAge { value } => write!(f, "age must not be negative, got {value}"),
            Self::AgeTooLarge { value, max } => {
                write!(f, "age must be at most {max}, got {value}")
            }
        }
    }
}

impl std::error::Error for ViewerValidationError {}

/// Age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Age(u8);

/// Largest accepted age.
pub const AGE_MAX: u8 = 150;

impl Age {
    /// Validate a raw age.
    pub fn new(years: i64) -> Result<Self, ViewerValidationError> {
        if years < 0 {
            return Err(ViewerValidationError::NegativeAge { value: years });
        }
        match u8::try_from(years) {
            Ok(value) if value <= AGE_MAX => Ok(Self(value)),
            _ => Err(ViewerValidationError::AgeTooLarge {
                value: years,
                max: AGE_MAX,
            }),
        }
    }

    pub fn years(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Age {
    type Error = ViewerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Age> for i64 {
    fn from(value: Age) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A capability a parent can switch on or off for a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Upload,
    Comments,
    Sharing,
    Download,
}

impl Capability {
    /// Name of the flag in the stored parental controls map.
    pub fn flag_name(&self) -> &'static str {
        match self {
            Self::Upload => "upload_enabled",
            Self::Comments => "comments_enabled",
            Self::Sharing => "sharing_enabled",
            Self::Download => "download_enabled",
        }
    }
}

/// Per-child capability flags.
///
/// Every flag is optional: `None` means the parent never set it, and the
/// access policy decides the default for that capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentalControls {
    pub upload_enabled: Option<bool>,
    pub comments_enabled: Option<bool>,
    pub sharing_enabled: Option<bool>,
    pub download_enabled: Option<bool>,
}

impl ParentalControls {
    /// Explicit value stored for `capability`, if any.
    pub fn flag(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::Upload => self.upload_enabled,
            Capability::Comments => self.comments_enabled,
            Capability::Sharing => self.sharing_enabled,
            Capability::Download => self.download_enabled,
        }
    }

    /// Return a copy with `capability` explicitly set.
    pub fn with(mut self, capability: Capability, enabled: bool) -> Self {
        let slot = match capability {
            Capability::Upload => &mut self.upload_enabled,
            Capability::Comments => &mut self.comments_enabled,
            Capability::Sharing => &mut self.sharing_enabled,
            Capability::Download => &mut self.download_enabled,
        };
        *slot = Some(enabled);
        self
    }
}

/// Acting party for a single policy evaluation or service call.
///
/// `role == None` covers both anonymous visitors and accounts whose stored
/// role was not recognised; both are treated as the least privileged viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    user_id: Option<UserId>,
    role: Option<Role>,
    age: Option<Age>,
    parental_controls: ParentalControls,
}

impl Viewer {
    /// Visitor without an account.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: None,
            age: None,
            parental_controls: ParentalControls::default(),
        }
    }

    /// Child account of a known age.
    pub fn child(user_id: UserId, age: Age) -> Self {
        Self {
            user_id: Some(user_id),
            role: Some(Role::Child),
            age: Some(age),
            parental_controls: ParentalControls::default(),
        }
    }

    /// Parent account. Parents review uploads and manage their children.
    ///
    /// # Examples
    /// ```
    /// use kidsvidshare::domain::{Role, UserId, Viewer};
    ///
    /// let parent = Viewer::parent(UserId::random());
    /// assert_eq!(parent.role(), Some(Role::Parent));
    /// assert!(parent.is_privileged());
    /// assert_eq!(parent.age(), None);
    /// ```
    pub fn parent(user_id: UserId) -> Self {
        Self::with_role(user_id, Role::Parent)
    }

    /// Administrator account, privileged like a parent for every family.
    pub fn admin(user_id: UserId) -> Self {
        Self::with_role(user_id, Role::Admin)
    }

    /// Account with the given role and no age on record.
    pub fn with_role(user_id: UserId, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            role: Some(role),
            age: None,
            parental_controls: ParentalControls::default(),
        }
    }

    /// Signed-in account whose stored role could not be recognised.
    pub fn unrecognised(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::anonymous()
        }
    }

    /// Replace the parental controls evaluated for this viewer.
    pub fn with_parental_controls(mut self, controls: ParentalControls) -> Self {
        self.parental_controls = controls;
        self
    }

    /// Replace the recorded age.
    pub fn with_age(mut self, age: Option<Age>) -> Self {
        self.age = age;
        self
    }

    /// Build the viewer for a signed-in profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: Some(profile.id().clone()),
            role: profile.role(),
            age: profile.age(),
            parental_controls: *profile.parental_controls(),
        }
    }

    /// Account id, or `None` for anonymous visitors.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Recognised role, if any.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Recorded age. Only child accounts usually carry one.
    pub fn age(&self) -> Option<Age> {
        self.age
    }

    /// Controls evaluated for child actions.
    pub fn parental_controls(&self) -> &ParentalControls {
        &self.parental_controls
    }

    /// Whether the viewer is a parent or admin.
    pub fn is_privileged(&self) -> bool {
        self.role.is_some_and(|role| role.is_privileged())
    }

    /// Whether `user_id` identifies this viewer.
    pub fn is_user(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }
}
