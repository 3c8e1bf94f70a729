//! Port for the external authentication provider.
//!
//! The provider owns password storage and session issuance. The core only
//! hands it validated credentials and reads back profiles, which carry the
//! role, age and parental controls the access policy evaluates.

use async_trait::async_trait;

use crate::domain::{
    LoginCredentials, ParentalControls, Session, SignUpRequest, UserId, UserProfile,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by authentication provider adapters.
    pub enum AuthProviderError {
        /// Provider could not be reached.
        Connection { message: String } =>
            "auth provider connection failed: {message}",
        /// Email and password did not match an account.
        InvalidCredentials => "invalid email or password",
        /// Sign-up collided with an existing account.
        AccountExists { email: String } =>
            "an account already exists for {email}",
        /// Profile to update does not exist.
        ProfileNotFound { user_id: String } =>
            "no profile found for user {user_id}",
        /// Provider rejected or failed the request.
        Query { message: String } =>
            "auth provider request failed: {message}",
    }
}

/// Port for account and session management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Session, AuthProviderError>;

    /// Create an account and its profile, returning the new user id.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<UserId, AuthProviderError>;

    async fn sign_out(&self, session: &Session) -> Result<(), AuthProviderError>;

    /// Session of the current caller, if one is signed in.
    async fn current_session(&self) -> Result<Option<Session>, AuthProviderError>;

    /// Profile for `user_id`, or `None` when no profile exists.
    async fn user_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, AuthProviderError>;

    /// Replace the parental controls stored for `user_id`.
    ///
    /// Returns the updated profile, or
    /// [`AuthProviderError::ProfileNotFound`] when the user has no profile.
    async fn update_parental_controls(
        &self,
        user_id: &UserId,
        controls: &ParentalControls,
    ) -> Result<UserProfile, AuthProviderError>;
}

/// Fixture provider with no accounts.
///
/// Sign-in always fails, sign-up hands out fresh ids and profile lookups
/// return `None`. Use it where authentication is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn sign_in(&self, _credentials: &LoginCredentials) -> Result<Session, AuthProviderError> {
        Err(AuthProviderError::invalid_credentials())
    }

    async fn sign_up(&self, _request: &SignUpRequest) -> Result<UserId, AuthProviderError> {
        Ok(UserId::random())
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthProviderError> {
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthProviderError> {
        Ok(None)
    }

    async fn user_profile(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<UserProfile>, AuthProviderError> {
        Ok(None)
    }

    async fn update_parental_controls(
        &self,
        user_id: &UserId,
        _controls: &ParentalControls,
    ) -> Result<UserProfile, AuthProviderError> {
        Err(AuthProviderError::profile_not_found(user_id.to_string()))
    }
}
