//! Shared proptest strategies for the unit tests.

use proptest::prelude::*;

use crate::numeric::{MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};

// Strategy: whitespace that trimming removes
pub fn arb_padding() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ \t\n\r]{0,4}").unwrap()
}

// Strategy: integers that survive a trip through f64
pub fn arb_safe_integer() -> impl Strategy<Value = i64> {
    MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER
}

// Strategy: canonical hyphenated UUID text in mixed case
pub fn arb_uuid_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(
        "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap()
}

// Strategy: simple lowercase addresses accepted by both email grammars
pub fn arb_simple_email() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-z0-9]{1,12}(\\.[a-z0-9]{1,8})?").unwrap(),
        prop::string::string_regex("[a-z0-9]{1,12}").unwrap(),
        prop_oneof![Just("com"), Just("org"), Just("io"), Just("nl")],
    )
        .prop_map(|(local, host, tld)| format!("{local}@{host}.{tld}"))
}
