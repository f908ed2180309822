use chrono_tz::Tz;
use clinicbook_api::config::{parse_log_level, parse_timezone};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tracing::Level;

#[rstest]
#[case(None, Tz::Asia__Dubai)]
#[case(Some(""), Tz::Asia__Dubai)]
#[case(Some("Europe/Berlin"), Tz::Europe__Berlin)]
#[case(Some("Mars/Olympus_Mons"), Tz::UTC)]
fn test_parse_timezone(#[case] raw: Option<&str>, #[case] expected: Tz) {
    assert_eq!(parse_timezone(raw), expected);
}

#[rstest]
#[case("debug", Level::DEBUG)]
#[case("WARN", Level::WARN)]
#[case("verbose", Level::INFO)]
fn test_parse_log_level(#[case] raw: &str, #[case] expected: Level) {
    assert_eq!(parse_log_level(raw), expected);
}
