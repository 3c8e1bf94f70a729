//! Parental supervision of child accounts.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::access_policy::can_manage_child;
use crate::domain::account_service::map_auth_error;
use crate::domain::ports::AuthProvider;
use crate::domain::{Error, ParentalControls, Role, UserId, UserProfile, Viewer};

/// Lets parents and admins change what a child account may do.
#[derive(Clone)]
pub struct SupervisionService<A> {
    auth: Arc<A>,
}

impl<A> SupervisionService<A> {
    pub fn new(auth: Arc<A>) -> Self {
        Self { auth }
    }
}

impl<A> SupervisionService<A>
where
    A: AuthProvider,
{
    /// Replace a child's parental controls.
    ///
    /// Only an admin or the child's own parent may do this. The target must
    /// be an existing child account.
    pub async fn update_parental_controls(
        &self,
        actor: &Viewer,
        child_id: &UserId,
        controls: ParentalControls,
    ) -> Result<UserProfile, Error> {
        let child = self
            .auth
            .user_profile(child_id)
            .await
            .map_err(map_auth_error)?
            .ok_or_else(|| Error::not_found(format!("user {child_id} not found")))?;
        if child.role() != Some(Role::Child) {
            return Err(
                Error::invalid_request("parental controls apply to child accounts only")
                    .with_details(json!({
                        "role": child.role().map(|role| role.as_str()),
                    })),
            );
        }
        if !can_manage_child(actor, &child) {
            return Err(Error::forbidden("only this child's parent may change their controls"));
        }
        let updated = self
            .auth
            .update_parental_controls(child_id, &controls)
            .await
            .map_err(map_auth_error)?;
        info!(
            child_id = %child_id,
            actor_id = ?actor.user_id().map(ToString::to_string),
            upload_enabled = ?controls.upload_enabled,
            "parental controls updated"
        );
        Ok(updated)
    }
}
