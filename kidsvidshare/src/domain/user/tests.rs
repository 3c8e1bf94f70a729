//! Tests for the user identity and profile model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const PARENT_ID: &str = "6c1f2f5e-8a1b-4f0e-9b7a-2d3c4e5f6a7b";

#[fixture]
fn child_profile_json() -> serde_json::Value {
    json!({
        "id": VALID_ID,
        "full_name": "Mia Rose",
        "role": "child",
        "age": 7,
        "parental_controls": {"upload_enabled": true},
        "parent_id": PARENT_ID,
    })
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn invalid_user_ids_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn user_ids_render_in_lowercase() {
    let id = UserId::new(VALID_ID.to_uppercase()).expect("valid id");
    assert_eq!(String::from(id.clone()), VALID_ID);
    assert_eq!(id, UserId::new(VALID_ID).expect("valid id"));
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
#[case("bad$char", UserValidationError::DisplayNameInvalidCharacters)]
fn invalid_display_names_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw).expect_err("invalid name"), expected);
}

#[rstest]
fn overlong_display_names_are_rejected() {
    let err = DisplayName::new("a".repeat(DISPLAY_NAME_MAX + 1)).expect_err("too long");
    assert_eq!(
        err,
        UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        }
    );
}

#[rstest]
#[case("Zoë O'Neill")]
#[case("Liam-James")]
#[case("Kid_2")]
fn display_names_allow_family_names(#[case] raw: &str) {
    let name = DisplayName::new(raw).expect("valid name");
    assert_eq!(name.as_ref(), raw);
}

#[rstest]
fn display_names_are_trimmed() {
    let name = DisplayName::new("  Ada  ").expect("valid name");
    assert_eq!(name.as_ref(), "Ada");
}

#[rstest]
fn profile_deserialises_from_provider_shape(child_profile_json: serde_json::Value) {
    let profile: UserProfile = serde_json::from_value(child_profile_json).expect("profile parses");
    assert_eq!(profile.id().to_string(), VALID_ID);
    assert_eq!(profile.role(), Some(Role::Child));
    assert_eq!(profile.age().map(|age| age.years()), Some(7));
    assert_eq!(profile.parental_controls().upload_enabled, Some(true));
    assert_eq!(
        profile.parent_id().map(ToString::to_string),
        Some(PARENT_ID.to_owned())
    );
}

#[rstest]
fn unknown_role_and_negative_age_are_dropped(mut child_profile_json: serde_json::Value) {
    child_profile_json["role"] = json!("superuser");
    child_profile_json["age"] = json!(-3);

    let profile: UserProfile = serde_json::from_value(child_profile_json).expect("profile parses");
    assert_eq!(profile.role(), None);
    assert_eq!(profile.age(), None);
}

#[rstest]
fn invalid_profile_id_fails(mut child_profile_json: serde_json::Value) {
    child_profile_json["id"] = json!("nope");
    let result: Result<UserProfile, _> = serde_json::from_value(child_profile_json);
    assert!(result.is_err());
}

#[rstest]
fn profile_serialises_back_to_camel_case(child_profile_json: serde_json::Value) {
    let profile: UserProfile = serde_json::from_value(child_profile_json).expect("profile parses");
    let value = serde_json::to_value(&profile).expect("serialises");
    assert_eq!(value["displayName"], json!("Mia Rose"));
    assert_eq!(value["role"], json!("child"));
    assert_eq!(value["parentId"], json!(PARENT_ID));
}
