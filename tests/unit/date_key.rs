//! Unit tests for Earth date validation

use rover_photo_downloader::date::{DateError, DateKey};

#[test]
fn test_valid_dates_accepted() {
    let valid = [
        "2020-8-6",
        "2020-08-06",
        "2012-8-3",
        "2012-08-03",
        "2015-12-31",
        "2016-2-29",
        "1999-1-1",
    ];

    for input in valid {
        assert!(DateKey::parse(input).is_ok(), "{input:?} should be accepted");
    }
}

#[test]
fn test_invalid_dates_rejected() {
    let invalid = [
        "2sdaf",
        "7634rs",
        "",
        "2020",
        "2020-8",
        "2020/8/6",
        "6-8-2020",
        "2020-8-6-1",
        "2020-aug-6",
        "2020-8-6T00:00:00",
        "2020-13-1",
        "2020-8-32",
        "2019-2-29",
        "-2020-8-6",
        " 2020-8-6",
        "2020-8-6 ",
        "2020-8-6\n",
    ];

    for input in invalid {
        assert!(DateKey::parse(input).is_err(), "{input:?} should be rejected");
    }
}

#[test]
fn test_canonical_rendering_round_trips() {
    let date: DateKey = "2020-08-06".parse().unwrap();
    assert_eq!(date.to_string(), "2020-8-6");
    assert_eq!(DateKey::parse(&date.to_string()).unwrap(), date);
}

#[test]
fn test_error_message_names_expected_format() {
    let err = DateKey::parse("7634rs").unwrap_err();
    assert_eq!(err, DateError::InvalidFormat("7634rs".to_string()));
    assert!(err.to_string().contains("YYYY-M-D"));
}
