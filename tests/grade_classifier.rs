use reportcard::grade::{Grade, Severity, grade_message};

#[test]
fn every_known_grade_has_its_message() {
    let expected = [
        ("A+", "Excellent!"),
        ("A", "Great!"),
        ("B", "Not bad!"),
        ("C", "Needs some work"),
        ("D", "Needs lots of improvement"),
        ("E", "Urgent improvement needed"),
        ("F", "... is for lots of things to Fix!"),
    ];

    for (grade, message) in expected {
        assert_eq!(grade_message(grade), Some(message), "grade {grade}");
    }
}

#[test]
fn unknown_grades_have_no_message() {
    for grade in ["", "Z", "a+", "A +", "B-"] {
        assert_eq!(grade_message(grade), None, "grade {grade:?}");
        assert!(grade.parse::<Grade>().is_err());
    }
}

#[test]
fn severity_thresholds_are_lower_inclusive() {
    let cases = [
        (0.0, Severity::Danger),
        (29.9, Severity::Danger),
        (30.0, Severity::Warning),
        (49.99, Severity::Warning),
        (50.0, Severity::Info),
        (79.0, Severity::Info),
        (80.0, Severity::Success),
        (100.0, Severity::Success),
    ];

    for (percentage, expected) in cases {
        assert_eq!(Severity::from_percentage(percentage), expected, "{percentage}");
    }
}

#[test]
fn out_of_range_percentages_still_classify() {
    assert_eq!(Severity::from_percentage(-5.0), Severity::Danger);
    assert_eq!(Severity::from_percentage(150.0), Severity::Success);
    assert_eq!(Severity::from_percentage(f64::NAN), Severity::Success);
}

#[test]
fn severity_names_and_classes() {
    assert_eq!(Severity::Danger.to_string(), "danger");
    assert_eq!(Severity::Info.css_class(), "is-info");
    assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
}

#[test]
fn grades_derive_from_strict_bands() {
    assert_eq!(Grade::from_percentage(100.0), Grade::APlus);
    assert_eq!(Grade::from_percentage(90.1), Grade::APlus);
    assert_eq!(Grade::from_percentage(90.0), Grade::A);
    assert_eq!(Grade::from_percentage(70.5), Grade::B);
    assert_eq!(Grade::from_percentage(40.5), Grade::E);
    assert_eq!(Grade::from_percentage(40.0), Grade::F);
    assert_eq!(Grade::from_percentage(0.0), Grade::F);
}

#[test]
fn grades_round_trip_through_their_wire_form() {
    for grade in Grade::ALL {
        assert_eq!(grade.as_str().parse::<Grade>(), Ok(grade));
    }
    assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
    assert_eq!(serde_json::from_str::<Grade>("\"A+\"").unwrap(), Grade::APlus);
}

#[test]
fn only_a_grades_take_an() {
    assert!(Grade::APlus.takes_an());
    assert!(Grade::A.takes_an());
    assert!(!Grade::B.takes_an());
    assert!(!Grade::F.takes_an());
}
