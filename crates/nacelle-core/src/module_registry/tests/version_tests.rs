use std::str::FromStr;

use semver::Version;

use crate::module_registry::version::{satisfies, validate, VersionRange};

#[test]
fn validate_accepts_exact_versions_and_ranges() {
    assert!(validate("1.2.3"));
    assert!(validate("^1.2.0"));
    assert!(validate("~1.2"));
    assert!(validate(">=2.0.0, <3.0.0"));
    assert!(validate("*"));
    assert!(validate("1.x"));
}

#[test]
fn validate_rejects_garbage() {
    assert!(!validate("not-a-version"));
    assert!(!validate("1.2.3.4.5"));
    assert!(!validate(""));
}

#[test]
fn satisfies_follows_semver_precedence() {
    assert!(satisfies("1.2.3", "^1.2.0"));
    assert!(!satisfies("2.0.0", "^1.2.0"));
    assert!(satisfies("1.2.9", "~1.2.0"));
    assert!(!satisfies("1.3.0", "~1.2.0"));
    assert!(satisfies("2.5.0", ">=2.0.0"));
    assert!(satisfies("0.9.1", "*"));
    assert!(satisfies("3.1.4", "3.1.4"));
}

#[test]
fn satisfies_degrades_to_false_on_invalid_input() {
    assert!(!satisfies("garbage", "^1.0.0"));
    assert!(!satisfies("1.0.0", "garbage"));
    assert!(!satisfies("", ""));
}

#[test]
fn version_range_round_trips_constraint_string() {
    let range = VersionRange::from_constraint("^1.2.3").unwrap();
    assert_eq!(range.constraint_string(), "^1.2.3");
    assert_eq!(range.to_string(), "^1.2.3");
    assert!(range.includes(&Version::parse("1.9.0").unwrap()));
    assert!(!range.includes(&Version::parse("2.0.0").unwrap()));
}

#[test]
fn version_range_rejects_invalid_constraints() {
    assert!(VersionRange::from_constraint("^^1.0").is_err());
    assert!(VersionRange::from_str("oops").is_err());
}

#[test]
fn version_range_includes_str_never_panics() {
    let range = VersionRange::from_constraint(">=1.0.0").unwrap();
    assert!(range.includes_str("1.0.0"));
    assert!(!range.includes_str("0.9.9"));
    assert!(!range.includes_str("not-a-version"));
}
