use ratelimit_core::{Granularity, Limit, parse, parse_many};

#[test]
fn parses_every_granularity_both_plural_forms() {
    for (token, expected) in [
        ("second", Granularity::Second),
        ("seconds", Granularity::Second),
        ("minute", Granularity::Minute),
        ("minutes", Granularity::Minute),
        ("hour", Granularity::Hour),
        ("hours", Granularity::Hour),
        ("day", Granularity::Day),
        ("days", Granularity::Day),
        ("month", Granularity::Month),
        ("months", Granularity::Month),
        ("year", Granularity::Year),
        ("years", Granularity::Year),
    ] {
        let limit = parse(&format!("1/{token}")).unwrap();
        assert_eq!(limit.granularity(), expected);
    }
}

#[test]
fn parse_many_rejects_if_any_member_is_malformed() {
    assert!(parse_many("10/second;not-a-limit").is_err());
}

#[test]
fn storage_key_is_stable_for_equal_limits_and_identities() {
    let a = parse("10/3/minute").unwrap();
    let b = Limit::new(10, 3, Granularity::Minute);
    assert_eq!(a.storage_key(&["x", "y"]), b.storage_key(&["x", "y"]));
}

#[test]
fn empty_identity_still_produces_a_usable_key() {
    let limit = parse("10/minute").unwrap();
    assert_eq!(limit.storage_key(&[]), limit.canonical());
}
