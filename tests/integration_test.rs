//! Integration tests for scalar-sanitize.
//!
//! These exercise the three rule layers together: hard-coded defaults, the
//! process-wide stores and per-call overrides. Tests that touch a store hold
//! `STORES` so they never observe each other's updates.

use parking_lot::{const_mutex, Mutex};
use scalar_sanitize::{
    boolean, email, enumeration, integer, store, uuid, BoolOverrides, BoolSanitizer,
    Disposition, EmailSanitizer, EnumOverrides, ErrorKind, Fallback, Field, Input, IntRange,
    IntegerOverrides, RangedSanitizer, RuleError, Sanitizer, SignedSanitizer, SignedValues,
    UnsignedSanitizer, UuidDefault, UuidOverrides, UuidSanitizer,
};
use serde_json::json;

static STORES: Mutex<()> = const_mutex(());

fn reset_all() {
    store::BOOLEAN.reset();
    store::INTEGER.reset();
    store::ENUMERATION.reset();
    store::UUID.reset();
    store::EMAIL.reset();
}

#[test]
fn test_defaults_apply_without_configuration() {
    let _guard = STORES.lock();
    reset_all();

    assert_eq!(boolean::sanitize("TRUE", None, None), Ok(true));
    assert_eq!(boolean::sanitize(Input::Missing, None, None), Ok(false));
    assert_eq!(integer::signed("-3.5", None, None), Ok(Some(-4)));
    assert_eq!(integer::unsigned(-3, None, None), Ok(Some(0)));
    assert_eq!(
        uuid::sanitize("x", None, Some("id")).unwrap_err().kind(),
        ErrorKind::InvalidUuid
    );
    assert_eq!(
        email::html_input("A@B.C", None, None),
        Ok("a@b.c".to_string())
    );
}

#[test]
fn test_global_rules_change_later_calls() {
    let _guard = STORES.lock();
    reset_all();

    store::BOOLEAN.update(BoolOverrides {
        undefined_values: Some(Disposition::Fail),
        ..Default::default()
    });

    let error = boolean::sanitize(Input::Missing, None, Some("agree")).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UndefinedValue);
    assert_eq!(error.field(), Some("agree"));

    reset_all();
    assert_eq!(boolean::sanitize(Input::Missing, None, None), Ok(false));
}

#[test]
fn test_local_rules_win_over_global_rules() {
    let _guard = STORES.lock();
    reset_all();

    store::INTEGER.update(IntegerOverrides {
        signed_values: Some(SignedValues::Fail),
        ..Default::default()
    });

    assert_eq!(
        integer::unsigned(-8, None, None).unwrap_err().kind(),
        ErrorKind::NegativeValue
    );

    let local = IntegerOverrides {
        signed_values: Some(SignedValues::Abs),
        ..Default::default()
    };
    assert_eq!(integer::unsigned(-8, Some(&local), None), Ok(Some(8)));

    // the local override left the store untouched
    assert_eq!(store::INTEGER.snapshot().signed_values, SignedValues::Fail);
    reset_all();
}

#[test]
fn test_sanitizers_keep_the_rules_they_were_built_with() {
    let _guard = STORES.lock();
    reset_all();

    let before = BoolSanitizer::global();
    store::BOOLEAN.update(BoolOverrides {
        default: Some(Fallback::Value(true)),
        ..Default::default()
    });
    let after = BoolSanitizer::global();

    assert_eq!(before.sanitize("maybe"), Ok(false));
    assert_eq!(after.sanitize("maybe"), Ok(true));
    reset_all();
}

#[test]
fn test_json_configuration_updates_the_store() {
    let _guard = STORES.lock();
    reset_all();

    store::BOOLEAN
        .update_json(&json!({
            "trueStrings": ["  ON ", "Enabled"],
            "falseStrings": ["off"],
            "unknownRule": 1
        }))
        .expect("valid configuration");

    let rules = store::BOOLEAN.snapshot();
    assert_eq!(
        rules.true_strings,
        Some(vec!["on".to_string(), "enabled".to_string()])
    );
    assert_eq!(boolean::sanitize("ENABLED", None, None), Ok(true));
    assert_eq!(boolean::sanitize("yes", None, None), Ok(false));

    store::INTEGER
        .update_json(&json!({ "nanValues": "error", "infiniteValues": 0 }))
        .expect("valid configuration");
    assert_eq!(
        integer::signed("abc", None, None).unwrap_err().kind(),
        ErrorKind::NanValue
    );
    assert_eq!(integer::signed(f64::INFINITY, None, None), Ok(Some(0)));
    reset_all();
}

#[test]
fn test_malformed_json_configuration_is_rejected_whole() {
    let _guard = STORES.lock();
    reset_all();

    let result = store::EMAIL.update_json(&json!({ "default": "x@y.z", "trimStrings": "no" }));

    assert!(matches!(
        result,
        Err(RuleError::InvalidValue { domain: "email", .. })
    ));
    assert_eq!(store::EMAIL.snapshot().default, Fallback::Fail);
}

#[test]
fn test_enumeration_and_uuid_through_the_stores() {
    let _guard = STORES.lock();
    reset_all();

    store::ENUMERATION.update(EnumOverrides {
        case_sensitive: Some(true),
        ..Default::default()
    });
    let sizes = ["S", "M", "L"];
    assert!(enumeration::one_of("m", &sizes, None, None, None).is_err());
    assert_eq!(enumeration::one_of("m", &sizes, None, Some("M"), None), Ok("M"));

    let local = EnumOverrides {
        case_sensitive: Some(false),
        ..Default::default()
    };
    assert_eq!(enumeration::one_of("m", &sizes, Some(&local), None, None), Ok("M"));

    store::UUID.update(UuidOverrides {
        default: Some(UuidDefault::Value(String::new())),
        ..Default::default()
    });
    assert_eq!(uuid::sanitize("nope", None, None), Ok(String::new()));
    assert_eq!(uuid::or_null(" ", None, None), Ok(None));
    reset_all();
}

#[test]
fn test_enumeration_default_from_json_configuration() {
    let _guard = STORES.lock();
    reset_all();

    store::ENUMERATION
        .update_json(&json!({ "default": "m" }))
        .expect("valid configuration");
    let sizes = ["S", "M", "L"];
    assert_eq!(enumeration::one_of("XXL", &sizes, None, None, None), Ok("M"));
    assert_eq!(enumeration::one_of(Input::Null, &sizes, None, None, None), Ok("M"));
    assert_eq!(enumeration::one_of("XXL", &sizes, None, Some("S"), None), Ok("S"));

    store::ENUMERATION
        .update_json(&json!({ "default": null }))
        .expect("valid configuration");
    assert_eq!(
        enumeration::one_of("XXL", &sizes, None, None, None)
            .unwrap_err()
            .kind(),
        ErrorKind::EnumValue
    );
    reset_all();
}

#[test]
fn test_ranged_ignores_the_global_default() {
    let _guard = STORES.lock();
    reset_all();

    store::INTEGER.update(IntegerOverrides {
        default: Some(Fallback::Value(0)),
        ..Default::default()
    });
    let range = IntRange::new(18, 120).expect("valid range");
    assert_eq!(integer::ranged("unknown", range, None, None), Ok(Some(18)));

    let local = IntegerOverrides {
        default: Some(Fallback::Value(30)),
        ..Default::default()
    };
    assert_eq!(integer::ranged("unknown", range, Some(&local), None), Ok(Some(30)));
    assert_eq!(integer::ranged(7, range, Some(&local), None), Ok(Some(18)));
    reset_all();
}

#[test]
fn test_errors_carry_field_value_and_message() {
    let sanitizer = RangedSanitizer::new(
        integer::IntegerRules {
            out_of_range_values: integer::OutOfRangeValues::Fail,
            ..Default::default()
        },
        IntRange::new(1, 5).expect("valid range"),
    );

    let error = sanitizer.sanitize_field("9", "stars").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::OutOfRangeValue);
    assert_eq!(error.field(), Some("stars"));
    assert_eq!(error.value(), Some("9"));
    assert_eq!(
        error.to_string(),
        "Out of range: Received out of range value '9' for field 'stars'."
    );
}

#[test]
fn test_form_with_named_fields() {
    let strict_uint = UnsignedSanitizer::default().with_overrides(&IntegerOverrides {
        signed_values: Some(SignedValues::Fail),
        ..Default::default()
    });

    let mut quantity = Field::new("quantity", strict_uint).required();
    let mut contact = Field::new("contact", EmailSanitizer::rfc5322());
    let mut id = Field::new("id", UuidSanitizer::default().or_null());
    let mut gift = Field::new("gift", BoolSanitizer::default());

    assert_eq!(quantity.assign(" 3 "), Ok(&Some(3)));
    assert_eq!(contact.assign("Shop@Example.com"), Ok(&"shop@example.com".to_string()));
    assert_eq!(id.assign(""), Ok(&None));
    assert_eq!(gift.assign(&json!("no")), Ok(&false));

    let error = quantity.assign(-1).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NegativeValue);
    assert_eq!(error.field(), Some("quantity"));
    assert_eq!(quantity.get(), Some(&Some(3)));
}

#[test]
fn test_json_values_are_accepted_as_input() {
    let sanitizer = SignedSanitizer::default();
    let document = json!({ "age": "31", "score": 7.6, "tags": ["a"], "missing": null });

    assert_eq!(sanitizer.sanitize(&document["age"]), Ok(Some(31)));
    assert_eq!(sanitizer.sanitize(&document["score"]), Ok(Some(8)));
    assert_eq!(sanitizer.sanitize(&document["tags"]), Ok(Some(0)));
    assert_eq!(sanitizer.sanitize(&document["missing"]), Ok(Some(0)));

    let strict = BoolSanitizer::default().with_overrides(&BoolOverrides {
        nan_values: Some(Disposition::Fail),
        ..Default::default()
    });
    assert_eq!(
        strict.sanitize(&document["tags"]).unwrap_err().kind(),
        ErrorKind::NanValue
    );
}

#[test]
fn test_tracing_subscriber_captures_rule_warnings() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let _guard = STORES.lock();
    reset_all();

    store::UUID
        .update_json(&json!({ "generate": true }))
        .expect("unknown keys only warn");
    assert!(matches!(store::UUID.snapshot().default, UuidDefault::Fail));
}
