//! In-memory [`AuthProvider`] with email/password accounts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{
    LoginCredentials, ParentalControls, Session, SignUpRequest, UserId, UserProfile,
};

/// Lifetime of sessions issued by [`InMemoryAuthProvider`].
const SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug)]
struct Account {
    user_id: UserId,
    password: Zeroizing<String>,
}

#[derive(Debug, Default)]
struct Directory {
    accounts: HashMap<String, Account>,
    profiles: HashMap<UserId, UserProfile>,
    current: Option<Session>,
}

/// Authentication provider kept in process memory.
///
/// Holds at most one current session, mirroring a single signed-in client.
pub struct InMemoryAuthProvider {
    clock: Arc<dyn Clock>,
    directory: Mutex<Directory>,
}

impl InMemoryAuthProvider {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            directory: Mutex::new(Directory::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Directory>, AuthProviderError> {
        self.directory
            .lock()
            .map_err(|_| AuthProviderError::query("account directory lock poisoned"))
    }

    /// Store or replace a profile without creating a login.
    pub fn insert_profile(&self, profile: UserProfile) -> Result<(), AuthProviderError> {
        self.lock()?.profiles.insert(profile.id().clone(), profile);
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Session, AuthProviderError> {
        let mut directory = self.lock()?;
        let user_id = directory
            .accounts
            .get(credentials.email())
            .filter(|account| account.password.as_str() == credentials.password())
            .map(|account| account.user_id.clone())
            .ok_or_else(AuthProviderError::invalid_credentials)?;
        let session = Session::new(
            user_id,
            Uuid::new_v4().simple().to_string(),
            self.clock.utc() + Duration::hours(SESSION_TTL_HOURS),
        );
        directory.current = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<UserId, AuthProviderError> {
        let mut directory = self.lock()?;
        let email = request.credentials().email();
        if directory.accounts.contains_key(email) {
            return Err(AuthProviderError::account_exists(email));
        }
        let user_id = UserId::random();
        let mut profile = UserProfile::new(
            user_id.clone(),
            request.display_name().clone(),
            Some(request.role()),
        );
        if let Some(age) = request.age() {
            profile = profile.with_age(age);
        }
        if let Some(parent_id) = request.parent_id() {
            profile = profile.with_parent(parent_id.clone());
        }
        directory.accounts.insert(
            email.to_owned(),
            Account {
                user_id: user_id.clone(),
                password: Zeroizing::new(request.credentials().password().to_owned()),
            },
        );
        directory.profiles.insert(user_id.clone(), profile);
        Ok(user_id)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthProviderError> {
        let mut directory = self.lock()?;
        let is_current = directory
            .current
            .as_ref()
            .is_some_and(|current| current.access_token() == session.access_token());
        if is_current {
            directory.current = None;
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthProviderError> {
        Ok(self.lock()?.current.clone())
    }

    async fn user_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, AuthProviderError> {
        Ok(self.lock()?.profiles.get(user_id).cloned())
    }

    async fn update_parental_controls(
        &self,
        user_id: &UserId,
        controls: &ParentalControls,
    ) -> Result<UserProfile, AuthProviderError> {
        let mut directory = self.lock()?;
        let profile = directory
            .profiles
            .remove(user_id)
            .ok_or_else(|| AuthProviderError::profile_not_found(user_id.to_string()))?;
        let updated = profile.with_parental_controls(*controls);
        directory.profiles.insert(user_id.clone(), updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{fixed_clock, fixed_now};
    use crate::domain::{Capability, DisplayName, Role};
    use rstest::{fixture, rstest};

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts("Robin@Example.com", password).expect("valid credentials")
    }

    #[fixture]
    fn provider() -> InMemoryAuthProvider {
        InMemoryAuthProvider::new(fixed_clock())
    }

    async fn register(provider: &InMemoryAuthProvider) -> UserId {
        let request = SignUpRequest::try_new(
            credentials("rainbow-fox"),
            DisplayName::new("Robin").expect("valid name"),
            None,
            None,
        )
        .expect("valid request");
        provider.sign_up(&request).await.expect("sign up")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_creates_a_child_profile(provider: InMemoryAuthProvider) {
        let user_id = register(&provider).await;
        let profile = provider
            .user_profile(&user_id)
            .await
            .expect("lookup")
            .expect("profile stored");
        assert_eq!(profile.role(), Some(Role::Child));
        assert!(profile.age().is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_issues_the_current_session(provider: InMemoryAuthProvider) {
        let user_id = register(&provider).await;
        let session = provider
            .sign_in(&credentials("rainbow-fox"))
            .await
            .expect("sign in");
        assert_eq!(session.user_id(), &user_id);
        assert!(session.is_active_at(fixed_now()));
        assert_eq!(
            provider.current_session().await.expect("lookup"),
            Some(session.clone())
        );

        provider.sign_out(&session).await.expect("sign out");
        assert_eq!(provider.current_session().await.expect("lookup"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_rejected(provider: InMemoryAuthProvider) {
        register(&provider).await;
        let err = provider
            .sign_in(&credentials("wrong-password"))
            .await
            .expect_err("bad password");
        assert_eq!(err, AuthProviderError::InvalidCredentials);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(provider: InMemoryAuthProvider) {
        register(&provider).await;
        let request = SignUpRequest::try_new(
            credentials("another-secret"),
            DisplayName::new("Robin Two").expect("valid name"),
            Some(Role::Parent),
            None,
        )
        .expect("valid request");
        let err = provider.sign_up(&request).await.expect_err("email taken");
        assert!(matches!(err, AuthProviderError::AccountExists { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn parental_controls_are_replaced(provider: InMemoryAuthProvider) {
        let user_id = register(&provider).await;
        let controls = ParentalControls::default().with(Capability::Upload, true);
        let updated = provider
            .update_parental_controls(&user_id, &controls)
            .await
            .expect("update");
        assert_eq!(updated.parental_controls(), &controls);
        let err = provider
            .update_parental_controls(&UserId::random(), &controls)
            .await
            .expect_err("unknown user");
        assert!(matches!(err, AuthProviderError::ProfileNotFound { .. }));
    }
}
