//! Account and session service.
//!
//! Wraps the [`AuthProvider`] port and turns sessions into the [`Viewer`]
//! every other service call expects.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{Error, LoginCredentials, Role, Session, SignUpRequest, UserId, Viewer};

pub(crate) fn map_auth_error(error: AuthProviderError) -> Error {
    match error {
        AuthProviderError::Connection { message } => {
            Error::service_unavailable(format!("auth provider unavailable: {message}"))
        }
        AuthProviderError::InvalidCredentials => Error::unauthorized("invalid email or password"),
        AuthProviderError::AccountExists { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
        AuthProviderError::ProfileNotFound { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
        }
        AuthProviderError::Query { message } => {
            Error::internal(format!("auth provider error: {message}"))
        }
    }
}

/// Sign-in, sign-up and viewer resolution.
#[derive(Clone)]
pub struct AccountService<A> {
    auth: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> AccountService<A> {
    pub fn new(auth: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { auth, clock }
    }
}

impl<A> AccountService<A>
where
    A: AuthProvider,
{
    /// Viewer for a known user.
    ///
    /// Returns `NotFound` when the provider holds no profile for `user_id`.
    pub async fn viewer_for(&self, user_id: &UserId) -> Result<Viewer, Error> {
        self.auth
            .user_profile(user_id)
            .await
            .map_err(map_auth_error)?
            .map(|profile| Viewer::from_profile(&profile))
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    async fn viewer_for_session(&self, session: &Session) -> Result<Viewer, Error> {
        let user_id = session.user_id();
        let profile = self
            .auth
            .user_profile(user_id)
            .await
            .map_err(map_auth_error)?;
        Ok(match profile {
            Some(profile) => Viewer::from_profile(&profile),
            None => {
                warn!(user_id = %user_id, "signed-in user has no profile");
                Viewer::unrecognised(user_id.clone())
            }
        })
    }

    /// Exchange an email and password for a session and its viewer.
    ///
    /// A signed-in user without a profile gets a viewer with no role, which
    /// the access policy treats like an anonymous visitor.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Viewer), Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let session = self
            .auth
            .sign_in(&credentials)
            .await
            .map_err(map_auth_error)?;
        let viewer = self.viewer_for_session(&session).await?;
        info!(user_id = %session.user_id(), role = ?viewer.role(), "signed in");
        Ok((session, viewer))
    }

    /// Self-service registration. The new account has no supervising
    /// parent; admins cannot be created this way.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<UserId, Error> {
        let user_id = self.auth.sign_up(request).await.map_err(map_auth_error)?;
        info!(user_id = %user_id, role = %request.role(), "account created");
        Ok(user_id)
    }

    /// Register a child account supervised by the acting parent.
    ///
    /// The parent link always comes from `actor`, never from the request.
    pub async fn create_child_account(
        &self,
        actor: &Viewer,
        request: &SignUpRequest,
    ) -> Result<UserId, Error> {
        let parent_id = actor
            .user_id()
            .ok_or_else(|| Error::unauthorized("sign in to continue"))?;
        if actor.role() != Some(Role::Parent) {
            return Err(Error::forbidden("only parents may create child accounts"));
        }
        if request.role() != Role::Child {
            return Err(Error::invalid_request(format!(
                "expected a child account, got {}",
                request.role()
            )));
        }
        let linked = request.clone().with_parent(parent_id.clone());
        let child_id = self.auth.sign_up(&linked).await.map_err(map_auth_error)?;
        info!(child_id = %child_id, parent_id = %parent_id, "child account created");
        Ok(child_id)
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), Error> {
        self.auth.sign_out(session).await.map_err(map_auth_error)
    }

    /// Viewer for whoever is signed in, or an anonymous viewer.
    pub async fn current_viewer(&self) -> Result<Viewer, Error> {
        let Some(session) = self
            .auth
            .current_session()
            .await
            .map_err(map_auth_error)?
        else {
            return Ok(Viewer::anonymous());
        };
        if !session.is_active_at(self.clock.utc()) {
            debug!(user_id = %session.user_id(), "session expired");
            return Ok(Viewer::anonymous());
        }
        self.viewer_for_session(&session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAuthProvider;
    use crate::domain::test_support::{fixed_clock, fixed_now};
    use crate::domain::{Age, DisplayName, ErrorCode, Role, UserProfile};
    use chrono::Duration;
    use rstest::rstest;

    fn service(auth: MockAuthProvider) -> AccountService<MockAuthProvider> {
        AccountService::new(Arc::new(auth), fixed_clock())
    }

    fn child_profile(user_id: &UserId) -> UserProfile {
        UserProfile::new(
            user_id.clone(),
            DisplayName::new("Robin").expect("valid name"),
            Some(Role::Child),
        )
        .with_age(Age::new(9).expect("valid age"))
    }

    #[tokio::test]
    async fn sign_in_resolves_the_viewer() {
        let user_id = UserId::random();
        let session = Session::new(user_id.clone(), "token", fixed_now() + Duration::hours(1));
        let profile = child_profile(&user_id);
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .withf(|creds| creds.email() == "robin@example.com")
            .times(1)
            .return_once(move |_| Ok(session));
        auth.expect_user_profile()
            .times(1)
            .return_once(move |_| Ok(Some(profile)));

        let (session, viewer) = service(auth)
            .sign_in("robin@example.com", "rainbow-fox")
            .await
            .expect("sign in succeeds");
        assert_eq!(session.user_id(), &user_id);
        assert_eq!(viewer.role(), Some(Role::Child));
        assert_eq!(viewer.age().map(|age| age.years()), Some(9));
    }

    #[tokio::test]
    async fn malformed_credentials_never_reach_the_provider() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().times(0);

        let err = service(auth)
            .sign_in("not-an-email", "rainbow-fox")
            .await
            .expect_err("invalid email");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(AuthProviderError::invalid_credentials(), ErrorCode::Unauthorized)]
    #[case(AuthProviderError::connection("timeout"), ErrorCode::ServiceUnavailable)]
    #[case(AuthProviderError::query("bad gateway"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn provider_errors_are_mapped(
        #[case] error: AuthProviderError,
        #[case] expected: ErrorCode,
    ) {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().return_once(move |_| Err(error));

        let err = service(auth)
            .sign_in("robin@example.com", "rainbow-fox")
            .await
            .expect_err("provider failed");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn profile_less_sign_in_is_least_privileged() {
        let user_id = UserId::random();
        let session = Session::new(user_id.clone(), "token", fixed_now() + Duration::hours(1));
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().return_once(move |_| Ok(session));
        auth.expect_user_profile().return_once(|_| Ok(None));

        let (_, viewer) = service(auth)
            .sign_in("robin@example.com", "rainbow-fox")
            .await
            .expect("sign in succeeds");
        assert_eq!(viewer.user_id(), Some(&user_id));
        assert_eq!(viewer.role(), None);
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_a_conflict() {
        let credentials = LoginCredentials::try_from_parts("robin@example.com", "rainbow-fox")
            .expect("valid credentials");
        let request = SignUpRequest::try_new(
            credentials,
            DisplayName::new("Robin").expect("valid name"),
            None,
            None,
        )
        .expect("valid request");
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_up()
            .return_once(|_| Err(AuthProviderError::account_exists("robin@example.com")));

        let err = service(auth)
            .sign_up(&request)
            .await
            .expect_err("account exists");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    fn child_sign_up(role: Option<Role>) -> SignUpRequest {
        let credentials = LoginCredentials::try_from_parts("kid@example.com", "rainbow-fox")
            .expect("valid credentials");
        SignUpRequest::try_new(
            credentials,
            DisplayName::new("Kit").expect("valid name"),
            role,
            None,
        )
        .expect("valid request")
    }

    #[tokio::test]
    async fn parents_create_children_linked_to_themselves() {
        let parent_id = UserId::random();
        let child_id = UserId::random();
        let expected_parent = parent_id.clone();
        let returned = child_id.clone();
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_up()
            .withf(move |request| {
                request.parent_id() == Some(&expected_parent) && request.role() == Role::Child
            })
            .times(1)
            .return_once(move |_| Ok(returned));

        let created = service(auth)
            .create_child_account(&Viewer::parent(parent_id), &child_sign_up(None))
            .await
            .expect("parent may create a child");
        assert_eq!(created, child_id);
    }

    #[rstest]
    #[case(Viewer::anonymous(), ErrorCode::Unauthorized)]
    #[case(Viewer::child(UserId::random(), Age::new(11).expect("valid age")), ErrorCode::Forbidden)]
    #[case(Viewer::admin(UserId::random()), ErrorCode::Forbidden)]
    #[case(Viewer::unrecognised(UserId::random()), ErrorCode::Forbidden)]
    #[tokio::test]
    async fn only_parents_create_child_accounts(
        #[case] actor: Viewer,
        #[case] expected: ErrorCode,
    ) {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_up().times(0);

        let err = service(auth)
            .create_child_account(&actor, &child_sign_up(None))
            .await
            .expect_err("not a parent");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn child_accounts_must_have_the_child_role() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_up().times(0);

        let err = service(auth)
            .create_child_account(
                &Viewer::parent(UserId::random()),
                &child_sign_up(Some(Role::Parent)),
            )
            .await
            .expect_err("adult account");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn no_session_means_anonymous() {
        let mut auth = MockAuthProvider::new();
        auth.expect_current_session().return_once(|| Ok(None));
        auth.expect_user_profile().times(0);

        let viewer = service(auth).current_viewer().await.expect("resolves");
        assert_eq!(viewer, Viewer::anonymous());
    }

    #[tokio::test]
    async fn expired_session_means_anonymous() {
        let session = Session::new(UserId::random(), "token", fixed_now());
        let mut auth = MockAuthProvider::new();
        auth.expect_current_session()
            .return_once(move || Ok(Some(session)));
        auth.expect_user_profile().times(0);

        let viewer = service(auth).current_viewer().await.expect("resolves");
        assert_eq!(viewer.user_id(), None);
    }

    #[tokio::test]
    async fn viewer_for_unknown_user_is_not_found() {
        let mut auth = MockAuthProvider::new();
        auth.expect_user_profile().return_once(|_| Ok(None));

        let err = service(auth)
            .viewer_for(&UserId::random())
            .await
            .expect_err("no profile");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
