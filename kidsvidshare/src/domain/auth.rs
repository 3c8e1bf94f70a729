//! Authentication primitives such as login credentials and sign-up requests.
//!
//! Keep provider payload parsing outside the domain by exposing constructors
//! that validate string inputs before a caller talks to the
//! [`AuthProvider`](super::ports::AuthProvider) port.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::user::{DisplayName, UserId};
use super::viewer::{Age, Role};

/// Domain error returned when login or sign-up values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email lacks a local part or a domain.
    MalformedEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than the sign-up minimum.
    PasswordTooShort { min: usize },
    /// Role that self-service sign-up may not grant.
    RoleNotSelfService { role: Role },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::MalformedEmail => write!(f, "email must look like name@example.com"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::RoleNotSelfService { role } => {
                write!(f, "{role} accounts cannot be created through sign-up")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Minimum password length accepted when creating an account.
pub const PASSWORD_MIN: usize = 8;

fn normalise_email(email: &str) -> Result<String, LoginValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(LoginValidationError::EmptyEmail);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(LoginValidationError::MalformedEmail),
    }
}

/// Email and password as typed into the sign-in form.
///
/// The email is trimmed and lower-cased; the password is kept byte for byte
/// and wiped from memory on drop.
///
/// # Examples
/// ```
/// use kidsvidshare::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Parent@Example.com ", "password").unwrap();
/// assert_eq!(creds.email(), "parent@example.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Check and normalise the two form fields.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = normalise_email(email)?;
        match password {
            "" => Err(LoginValidationError::EmptyPassword),
            _ => Ok(Self {
                email,
                password: Zeroizing::new(password.to_owned()),
            }),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Role given to new accounts when the registration form omits one.
pub const DEFAULT_SIGN_UP_ROLE: Role = Role::Child;
/// Age recorded for new child accounts when the registration form omits one.
pub const DEFAULT_CHILD_AGE: i64 = 8;

/// Validated request to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    credentials: LoginCredentials,
    display_name: DisplayName,
    role: Role,
    age: Option<Age>,
    parent_id: Option<UserId>,
}

impl SignUpRequest {
    /// Validate a sign-up form.
    ///
    /// A missing role defaults to [`DEFAULT_SIGN_UP_ROLE`]; a child without an
    /// age is recorded as [`DEFAULT_CHILD_AGE`]. Adults carry no age. Admin
    /// accounts are provisioned outside the app and refused here.
    pub fn try_new(
        credentials: LoginCredentials,
        display_name: DisplayName,
        role: Option<Role>,
        age: Option<Age>,
    ) -> Result<Self, LoginValidationError> {
        if credentials.password().chars().count() < PASSWORD_MIN {
            return Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let role = role.unwrap_or(DEFAULT_SIGN_UP_ROLE);
        if role == Role::Admin {
            return Err(LoginValidationError::RoleNotSelfService { role });
        }
        let age = match (role, age) {
            (Role::Child, None) => Age::new(DEFAULT_CHILD_AGE).ok(),
            (Role::Child, Some(age)) => Some(age),
            _ => None,
        };
        Ok(Self {
            credentials,
            display_name,
            role,
            age,
            parent_id: None,
        })
    }

    /// Link the new account to the parent creating it.
    pub(crate) fn with_parent(mut self, parent_id: UserId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn age(&self) -> Option<Age> {
        self.age
    }

    pub fn parent_id(&self) -> Option<&UserId> {
        self.parent_id.as_ref()
    }
}

/// Authenticated session issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    access_token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            access_token: Zeroizing::new(access_token.into()),
            expires_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Opaque bearer token for the provider's SDK.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session is still valid at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    //! Credential and sign-up validation.
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("kid@example.com", "rainbow-fox").expect("valid creds")
    }

    #[fixture]
    fn display_name() -> DisplayName {
        DisplayName::new("Mia").expect("valid name")
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("no-at-sign", "pw", LoginValidationError::MalformedEmail)]
    #[case("@example.com", "pw", LoginValidationError::MalformedEmail)]
    #[case("kid@localhost", "pw", LoginValidationError::MalformedEmail)]
    #[case("kid@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  Parent@Example.COM  ", "secret")]
    #[case("alice@example.org", "correct horse battery staple")]
    fn valid_credentials_normalise_email(#[case] email: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(email, password)
            .expect("accepted");
        assert_eq!(creds.email(), email.trim().to_lowercase());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn sign_up_defaults_to_child_of_eight(credentials: LoginCredentials, display_name: DisplayName) {
        let request =
            SignUpRequest::try_new(credentials, display_name, None, None).expect("valid sign-up");
        assert_eq!(request.role(), Role::Child);
        assert_eq!(request.age().map(|age| age.years()), Some(8));
    }

    #[rstest]
    fn sign_up_drops_age_for_parents(credentials: LoginCredentials, display_name: DisplayName) {
        let age = Age::new(40).expect("valid age");
        let request = SignUpRequest::try_new(credentials, display_name, Some(Role::Parent), Some(age))
            .expect("valid sign-up");
        assert_eq!(request.age(), None);
    }

    #[rstest]
    fn sign_up_rejects_short_passwords(display_name: DisplayName) {
        let creds = LoginCredentials::try_from_parts("kid@example.com", "short").expect("creds");
        let err = SignUpRequest::try_new(creds, display_name, None, None).expect_err("too short");
        assert_eq!(err, LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }

    #[rstest]
    fn sign_up_refuses_admin_accounts(credentials: LoginCredentials, display_name: DisplayName) {
        let err = SignUpRequest::try_new(credentials, display_name, Some(Role::Admin), None)
            .expect_err("admins are provisioned elsewhere");
        assert_eq!(err, LoginValidationError::RoleNotSelfService { role: Role::Admin });
    }

    #[rstest]
    fn sign_up_never_links_a_parent(credentials: LoginCredentials, display_name: DisplayName) {
        let request =
            SignUpRequest::try_new(credentials, display_name, None, None).expect("valid sign-up");
        assert_eq!(request.parent_id(), None);
    }

    #[rstest]
    fn session_expiry_is_exclusive() {
        let now = Utc::now();
        let session = Session::new(UserId::random(), "token", now + Duration::minutes(5));
        assert!(session.is_active_at(now));
        assert!(!session.is_active_at(now + Duration::minutes(5)));
    }
}
