//! Tests for the upload gating state machine.

use super::*;
use crate::domain::content::ContentRating;
use crate::domain::error::ErrorCode;
use crate::domain::test_support::{child_aged, fixed_now, item};
use crate::domain::user::UserId;
use chrono::Duration;
use rstest::{fixture, rstest};

#[fixture]
fn parent() -> Viewer {
    Viewer::parent(UserId::random())
}

fn later() -> DateTime<Utc> {
    fixed_now() + Duration::hours(1)
}

fn in_state(review: ReviewState) -> ContentItem {
    item(ContentRating::AllAges, review)
}

fn rejected(reason: Option<&str>) -> ReviewState {
    ReviewState::Rejected {
        reason: reason.map(str::to_owned),
    }
}

#[rstest]
fn submit_moves_draft_to_review_queue() {
    let draft = in_state(ReviewState::Draft);
    let submitted = submit(&draft, later()).expect("draft can be submitted");

    assert_eq!(submitted.review(), &ReviewState::AwaitingReview);
    assert_eq!(submitted.revision(), draft.revision() + 1);
    assert_eq!(submitted.updated_at(), later());
}

#[rstest]
#[case(ReviewState::Published)]
#[case(rejected(None))]
fn submit_rejects_decided_items(#[case] review: ReviewState) {
    let decided = in_state(review);
    let err = submit(&decided, later()).expect_err("decided items cannot be submitted");
    assert_eq!(
        err,
        WorkflowError::IllegalTransition {
            from: decided.review().kind(),
            action: ReviewAction::Submit,
        }
    );
}

#[rstest]
fn approve_publishes_awaiting_items(parent: Viewer) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    let published = approve(&awaiting, &parent, later()).expect("parent can approve");

    assert_eq!(published.review(), &ReviewState::Published);
    assert_eq!(published.review().publication_status().as_str(), "published");
    assert_eq!(published.review().approval_status().as_str(), "approved");
}

#[rstest]
fn approving_twice_is_a_no_op(parent: Viewer) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    let once = approve(&awaiting, &parent, later()).expect("first approval");
    let twice = approve(&once, &parent, later() + Duration::hours(1)).expect("second approval");

    assert_eq!(twice, once);
}

#[rstest]
#[case(ReviewState::Draft)]
#[case(rejected(Some("wobbly camera")))]
fn approve_requires_an_awaiting_item(parent: Viewer, #[case] review: ReviewState) {
    let item = in_state(review);
    let err = approve(&item, &parent, later()).expect_err("illegal approval");
    assert!(matches!(
        err,
        WorkflowError::IllegalTransition {
            action: ReviewAction::Approve,
            ..
        }
    ));
}

#[rstest]
#[case(ReviewAction::Approve)]
#[case(ReviewAction::Reject)]
#[case(ReviewAction::Reopen)]
fn children_cannot_review(#[case] action: ReviewAction) {
    let child = child_aged(11);
    let awaiting = in_state(ReviewState::AwaitingReview);
    let before = awaiting.clone();

    let result = match action {
        ReviewAction::Approve => approve(&awaiting, &child, later()),
        ReviewAction::Reject => reject(&awaiting, &child, Some("no"), later()),
        ReviewAction::Reopen | ReviewAction::Submit => {
            mark_pending_again(&awaiting, &child, later())
        }
    };

    assert_eq!(
        result.expect_err("children are not reviewers"),
        WorkflowError::Unauthorised { role: Role::Child }
    );
    assert_eq!(awaiting, before);
    assert_eq!(awaiting.review().approval_status().as_str(), "pending");
}

#[rstest]
#[case(Viewer::anonymous())]
#[case(Viewer::unrecognised(UserId::random()))]
fn viewers_without_a_role_are_invalid_reviewers(#[case] reviewer: Viewer) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    let err = approve(&awaiting, &reviewer, later()).expect_err("no role");
    assert_eq!(err, WorkflowError::InvalidReviewer);
}

#[rstest]
fn reject_stores_trimmed_reason(parent: Viewer) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    let declined =
        reject(&awaiting, &parent, Some("  please add sound  "), later()).expect("rejected");
    assert_eq!(declined.review().rejection_reason(), Some("please add sound"));
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
fn blank_reasons_are_dropped(parent: Viewer, #[case] reason: Option<&str>) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    let declined = reject(&awaiting, &parent, reason, later()).expect("rejected");
    assert_eq!(declined.review(), &rejected(None));
}

#[rstest]
fn rejecting_again_replaces_the_reason(parent: Viewer) {
    let declined = in_state(rejected(Some("too dark")));
    let same = reject(&declined, &parent, Some("too dark"), later()).expect("same reason");
    assert_eq!(same, declined);

    let updated = reject(&declined, &parent, Some("too loud"), later()).expect("new reason");
    assert_eq!(updated.review().rejection_reason(), Some("too loud"));
    assert_eq!(updated.revision(), declined.revision() + 1);
}

#[rstest]
#[case(ReviewState::Draft)]
#[case(ReviewState::Published)]
fn reject_requires_an_awaiting_or_rejected_item(parent: Viewer, #[case] review: ReviewState) {
    let item = in_state(review);
    let err = reject(&item, &parent, None, later()).expect_err("illegal rejection");
    assert!(matches!(
        err,
        WorkflowError::IllegalTransition {
            action: ReviewAction::Reject,
            ..
        }
    ));
}

#[rstest]
#[case(ReviewState::Published)]
#[case(rejected(Some("blurry")))]
fn reopen_returns_decided_items_to_the_queue(parent: Viewer, #[case] review: ReviewState) {
    let decided = in_state(review);
    let reopened = mark_pending_again(&decided, &parent, later()).expect("reopened");
    assert_eq!(reopened.review(), &ReviewState::AwaitingReview);
}

#[rstest]
fn reopen_is_idempotent_and_refuses_drafts(parent: Viewer) {
    let awaiting = in_state(ReviewState::AwaitingReview);
    assert_eq!(
        mark_pending_again(&awaiting, &parent, later()).expect("no-op"),
        awaiting
    );

    let draft = in_state(ReviewState::Draft);
    assert_eq!(
        mark_pending_again(&draft, &parent, later()).expect_err("draft"),
        WorkflowError::IllegalTransition {
            from: ReviewStateKind::Draft,
            action: ReviewAction::Reopen,
        }
    );
}

#[rstest]
fn submit_reject_reopen_approve_round_trip(parent: Viewer) {
    let draft = in_state(ReviewState::Draft);

    let submitted = submit(&draft, later()).expect("submit");
    let declined = reject(&submitted, &parent, None, later()).expect("reject");
    let reopened = mark_pending_again(&declined, &parent, later()).expect("reopen");
    let published = approve(&reopened, &parent, later()).expect("approve");

    assert_eq!(published.review().publication_status().as_str(), "published");
    assert_eq!(published.review().approval_status().as_str(), "approved");
    assert_eq!(published.revision(), draft.revision() + 4);
}

#[rstest]
#[case(WorkflowError::Unauthorised { role: Role::Child }, ErrorCode::Forbidden)]
#[case(WorkflowError::InvalidReviewer, ErrorCode::InvalidRequest)]
#[case(
    WorkflowError::IllegalTransition {
        from: ReviewStateKind::Draft,
        action: ReviewAction::Approve,
    },
    ErrorCode::Conflict
)]
fn workflow_errors_map_to_domain_codes(#[case] err: WorkflowError, #[case] code: ErrorCode) {
    let message = err.to_string();
    let mapped = Error::from(err);
    assert_eq!(mapped.code(), code);
    assert_eq!(mapped.message(), message);
}

#[rstest]
fn illegal_transition_message_names_state_and_action() {
    let err = WorkflowError::IllegalTransition {
        from: ReviewStateKind::Draft,
        action: ReviewAction::Approve,
    };
    assert_eq!(err.to_string(), "cannot approve a video that is draft");
}
