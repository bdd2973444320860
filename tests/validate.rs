#![forbid(unsafe_code)]
mod common;

use common::{date, fixture, pid, set_backup, set_shift};
use gardes::model::{Maternity, RotationEntry, Rotation, Vacation, Year};
use gardes::scheduler::{validate, ValidationError};
use std::collections::BTreeMap;

#[test]
fn fixture_is_valid() {
    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 2), "weekday_call", Some("CD"));
    set_shift(&mut schedule, date(2024, 7, 6), "weekend_call", Some("EF"));
    set_backup(&mut schedule, date(2024, 7, 6), "chief_backup", Some("IJ"));
    validate(&schedule).unwrap();
}

#[test]
fn rejects_empty_date_range() {
    let mut schedule = fixture();
    schedule.last_day = schedule.first_day;
    assert!(matches!(validate(&schedule), Err(ValidationError::DateRange { .. })));
}

#[test]
fn first_failing_category_wins() {
    let mut schedule = fixture();
    schedule.last_day = schedule.first_day;
    schedule.rotations.get_mut(&pid("EF")).unwrap()[1].start = date(2024, 6, 1);
    assert!(matches!(validate(&schedule), Err(ValidationError::DateRange { .. })));
}

#[test]
fn rejects_gap_between_days() {
    let mut schedule = fixture();
    schedule.weeks[1].days[3].date = date(2024, 7, 11);
    let err = validate(&schedule).unwrap_err();
    assert!(matches!(err, ValidationError::Contiguity { week: 1, .. }), "{err}");
}

#[test]
fn rejects_sunday_date_mismatch() {
    let mut schedule = fixture();
    schedule.weeks[2].sunday_date = date(2024, 7, 21);
    assert!(matches!(
        validate(&schedule),
        Err(ValidationError::Contiguity { week: 2, .. })
    ));
}

#[test]
fn rejects_first_year_on_regular_shift() {
    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 2), "weekday_call", Some("GH"));
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("cannot take regular shifts"), "{err}");
}

#[test]
fn rejects_chief_on_regular_shift() {
    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 6), "weekend_call", Some("IJ"));
    assert!(matches!(validate(&schedule), Err(ValidationError::Cell { .. })));
}

#[test]
fn rejects_resident_on_backup_shift() {
    let mut schedule = fixture();
    set_backup(&mut schedule, date(2024, 7, 5), "chief_backup", Some("EF"));
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("cannot take backup shifts"), "{err}");
}

#[test]
fn rejects_unknown_person_and_shift() {
    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 2), "weekday_call", Some("ZZ"));
    assert!(validate(&schedule).unwrap_err().to_string().contains("unknown person ZZ"));

    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 2), "day_call", None);
    assert!(validate(&schedule).unwrap_err().to_string().contains("unknown shift config"));
}

#[test]
fn rejects_weekday_shift_on_friday() {
    let mut schedule = fixture();
    set_shift(&mut schedule, date(2024, 7, 5), "weekday_call", None);
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("weekday shift on a Fri"), "{err}");
}

#[test]
fn rejects_inconsistent_shift_config() {
    let mut schedule = fixture();
    schedule.shift_configs.get_mut("weekday_call").unwrap().kind = "other".into();
    assert!(matches!(validate(&schedule), Err(ValidationError::ShiftConfig { .. })));

    let mut schedule = fixture();
    schedule.shift_configs.get_mut("weekend_call").unwrap().hours = -1.0;
    assert!(matches!(validate(&schedule), Err(ValidationError::ShiftConfig { .. })));

    let mut schedule = fixture();
    schedule.chief_shift_configs.get_mut("chief_backup").unwrap().name = " ".into();
    assert!(matches!(validate(&schedule), Err(ValidationError::ShiftConfig { .. })));
}

#[test]
fn rejects_incomplete_call_targets() {
    let mut schedule = fixture();
    schedule.call_targets.weekday.get_mut(&Year::Third).unwrap().clear();
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("missing person CD"), "{err}");
}

#[test]
fn rejects_targets_for_ineligible_years() {
    let mut schedule = fixture();
    schedule
        .call_targets
        .weekend
        .insert(Year::First, BTreeMap::from([(pid("GH"), 1)]));
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("must be empty"), "{err}");

    let mut schedule = fixture();
    schedule.call_targets.weekend.insert(Year::Chief, BTreeMap::new());
    validate(&schedule).unwrap();
}

#[test]
fn rejects_person_listed_under_another_year() {
    let mut schedule = fixture();
    schedule
        .call_targets
        .weekday
        .get_mut(&Year::Third)
        .unwrap()
        .insert(pid("AB"), 1);
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("AB is year 2"), "{err}");
}

#[test]
fn rejects_short_name_not_matching_initials() {
    let mut schedule = fixture();
    schedule.people.get_mut(&pid("AB")).unwrap().given_name = Some("Zoe".into());
    assert!(matches!(validate(&schedule), Err(ValidationError::Person { .. })));
}

#[test]
fn rejects_bad_person_dates() {
    let mut schedule = fixture();
    schedule.people.get_mut(&pid("CD")).unwrap().priority_saturday = Some("2024-07-08".into());
    assert!(validate(&schedule).unwrap_err().to_string().contains("not a Saturday"));

    let mut schedule = fixture();
    schedule.people.get_mut(&pid("CD")).unwrap().priority_saturday = Some("2024-02-30".into());
    assert!(validate(&schedule).unwrap_err().to_string().contains("invalid priority saturday"));

    let mut schedule = fixture();
    schedule.people.get_mut(&pid("CD")).unwrap().maternity = Some(Maternity {
        from: "2024-07-20".into(),
        to: "2024-07-10".into(),
    });
    assert!(matches!(validate(&schedule), Err(ValidationError::Person { .. })));

    let mut schedule = fixture();
    schedule.people.get_mut(&pid("CD")).unwrap().priority_saturday = Some("2024-07-13".into());
    validate(&schedule).unwrap();
}

#[test]
fn rejects_holiday_outside_bounds() {
    let mut schedule = fixture();
    schedule.holidays.insert(date(2024, 9, 2), "Labor Day".into());
    assert!(matches!(
        validate(&schedule),
        Err(ValidationError::OutOfBounds { kind: "holiday", .. })
    ));
}

#[test]
fn rejects_special_day_outside_bounds() {
    let mut schedule = fixture();
    schedule.special_days.insert(date(2024, 6, 30), "Orientation".into());
    assert!(matches!(
        validate(&schedule),
        Err(ValidationError::OutOfBounds { kind: "special day", date: d }) if d == date(2024, 6, 30)
    ));
}

#[test]
fn rejects_vacation_not_on_monday() {
    let mut schedule = fixture();
    schedule
        .vacations
        .insert(pid("CD"), vec![Vacation::Week(date(2024, 7, 9))]);
    assert!(matches!(validate(&schedule), Err(ValidationError::Vacation { .. })));

    let mut schedule = fixture();
    schedule.vacations.insert(
        pid("CD"),
        vec![Vacation::Split {
            start: date(2024, 7, 9),
            length: -1,
        }],
    );
    assert!(matches!(validate(&schedule), Err(ValidationError::Vacation { .. })));
}

#[test]
fn rejects_rotation_starting_before_previous() {
    let mut schedule = fixture();
    schedule.rotations.get_mut(&pid("EF")).unwrap()[1].start = date(2024, 6, 15);
    let err = validate(&schedule).unwrap_err();
    assert!(err.to_string().contains("starts before the previous rotation"), "{err}");
}

#[test]
fn rejects_chief_rotation_for_junior() {
    let mut schedule = fixture();
    schedule.rotations.get_mut(&pid("AB")).unwrap().push(RotationEntry {
        start: date(2024, 7, 20),
        rotation: Rotation::Main,
        chief: true,
    });
    assert!(matches!(validate(&schedule), Err(ValidationError::Rotation { .. })));

    let mut schedule = fixture();
    schedule.rotations.get_mut(&pid("EF")).unwrap()[1].chief = true;
    validate(&schedule).unwrap();
}
