//! Upload gating workflow.
//!
//! Every upload starts as a [`ReviewState::Draft`], is submitted for review
//! and then approved or rejected by a parent or admin. A decision can be
//! reversed by re-opening the item, which puts it back in the queue.
//!
//! ```text
//! Draft --submit--> AwaitingReview --approve--> Published
//!                         |  ^                      |
//!                  reject |  +-------reopen---------+
//!                         v  |
//!                       Rejected
//! ```
//!
//! Operations take the item by reference and return an updated copy, so a
//! failed call leaves the caller's item untouched. Repeating an operation on
//! an item that already sits in the target state returns the item unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use super::content::{ContentItem, ReviewState, ReviewStateKind};
use super::error::Error;
use super::viewer::{Role, Viewer};

/// Transition requested on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewAction {
    Submit,
    Approve,
    Reject,
    Reopen,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Reopen => "reopen",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by workflow transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The reviewer's role may not change review decisions.
    #[error("{role} accounts may not review videos")]
    Unauthorised { role: Role },
    /// The reviewer has no recognised role at all.
    #[error("reviewer has no recognised role")]
    InvalidReviewer,
    /// The item's current state does not allow the requested action.
    #[error("cannot {action} a video that is {from}")]
    IllegalTransition {
        from: ReviewStateKind,
        action: ReviewAction,
    },
}

impl From<WorkflowError> for Error {
    fn from(value: WorkflowError) -> Self {
        let message = value.to_string();
        match value {
            WorkflowError::Unauthorised { role } => {
                Error::forbidden(message).with_details(json!({ "role": role.as_str() }))
            }
            WorkflowError::InvalidReviewer => Error::invalid_request(message),
            WorkflowError::IllegalTransition { from, action } => Error::conflict(message)
                .with_details(json!({ "state": from.as_str(), "action": action.as_str() })),
        }
    }
}

/// Check that `reviewer` may take review decisions at all.
pub(crate) fn require_reviewer(reviewer: &Viewer) -> Result<(), WorkflowError> {
    match reviewer.role() {
        Some(Role::Parent | Role::Admin) => Ok(()),
        Some(role @ Role::Child) => Err(WorkflowError::Unauthorised { role }),
        None => Err(WorkflowError::InvalidReviewer),
    }
}

fn illegal(item: &ContentItem, action: ReviewAction) -> WorkflowError {
    WorkflowError::IllegalTransition {
        from: item.review().kind(),
        action,
    }
}

fn moved(item: &ContentItem, review: ReviewState, now: DateTime<Utc>) -> ContentItem {
    let mut next = item.clone();
    next.transition(review, now);
    info!(
        content_id = %next.id(),
        from = %item.review().kind(),
        to = %next.review().kind(),
        revision = next.revision(),
        "review state changed"
    );
    next
}

/// Send a draft to the review queue.
pub fn submit(item: &ContentItem, now: DateTime<Utc>) -> Result<ContentItem, WorkflowError> {
    match item.review() {
        ReviewState::Draft => Ok(moved(item, ReviewState::AwaitingReview, now)),
        ReviewState::AwaitingReview => Ok(item.clone()),
        ReviewState::Published | ReviewState::Rejected { .. } => {
            Err(illegal(item, ReviewAction::Submit))
        }
    }
}

/// Publish an item waiting for review.
///
/// Drafts have not been submitted and rejected items must be re-opened
/// first, so both are illegal here.
pub fn approve(
    item: &ContentItem,
    reviewer: &Viewer,
    now: DateTime<Utc>,
) -> Result<ContentItem, WorkflowError> {
    require_reviewer(reviewer)?;
    match item.review() {
        ReviewState::AwaitingReview => Ok(moved(item, ReviewState::Published, now)),
        ReviewState::Published => Ok(item.clone()),
        ReviewState::Draft | ReviewState::Rejected { .. } => {
            Err(illegal(item, ReviewAction::Approve))
        }
    }
}

/// Decline an item waiting for review.
///
/// Rejecting an already rejected item replaces the stored reason. Blank
/// reasons are stored as `None`.
pub fn reject(
    item: &ContentItem,
    reviewer: &Viewer,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ContentItem, WorkflowError> {
    require_reviewer(reviewer)?;
    let reason = reason
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned);
    match item.review() {
        ReviewState::AwaitingReview => Ok(moved(item, ReviewState::Rejected { reason }, now)),
        ReviewState::Rejected { reason: current } if *current == reason => Ok(item.clone()),
        ReviewState::Rejected { .. } => Ok(moved(item, ReviewState::Rejected { reason }, now)),
        ReviewState::Draft | ReviewState::Published => Err(illegal(item, ReviewAction::Reject)),
    }
}

/// Put a decided item back in the review queue.
pub fn mark_pending_again(
    item: &ContentItem,
    reviewer: &Viewer,
    now: DateTime<Utc>,
) -> Result<ContentItem, WorkflowError> {
    require_reviewer(reviewer)?;
    match item.review() {
        ReviewState::Published | ReviewState::Rejected { .. } => {
            Ok(moved(item, ReviewState::AwaitingReview, now))
        }
        ReviewState::AwaitingReview => Ok(item.clone()),
        ReviewState::Draft => Err(illegal(item, ReviewAction::Reopen)),
    }
}

#[cfg(test)]
mod tests;
