#![allow(dead_code)]
use chrono::{Datelike, NaiveDate, Weekday};
use gardes::model::{
    CallSchedule, CallTargets, CallType, ChiefShiftConfig, Day, Person, PersonId, Rotation,
    RotationEntry, ShiftConfig, Vacation, Week, Year,
};
use std::collections::BTreeMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn pid(s: &str) -> PersonId {
    PersonId::new(s)
}

/// Quatre semaines du dimanche 2024-06-30 au samedi 2024-07-27, cellules vides.
///
/// AB (2, congés la semaine du 2024-07-08), CD (3), EF (S, passe au VA le 2024-07-15),
/// GH (1), IJ (chef).
pub fn fixture() -> CallSchedule {
    let sunday = date(2024, 6, 30);
    let weeks = (0..4)
        .map(|w| {
            let week_sunday = sunday + chrono::Duration::days(7 * w);
            let days = (0..7)
                .map(|d| {
                    let mut day = Day::new(week_sunday + chrono::Duration::days(d));
                    if matches!(day.date.weekday(), Weekday::Fri | Weekday::Sat) {
                        day.shifts.insert("weekend_call".into(), None);
                        day.backup_shifts.insert("chief_backup".into(), None);
                    } else {
                        day.shifts.insert("weekday_call".into(), None);
                    }
                    day
                })
                .collect();
            Week {
                sunday_date: week_sunday,
                days,
            }
        })
        .collect();

    let mut shift_configs = BTreeMap::new();
    shift_configs.insert(
        "weekday_call".to_string(),
        ShiftConfig {
            kind: "weekday_call".into(),
            name: "Weekday night".into(),
            days: 1,
            hours: 16.0,
            hospitals: vec![Rotation::Main, Rotation::Childrens],
            call_type: CallType::Weekday,
            export_group: "weekday".into(),
        },
    );
    shift_configs.insert(
        "weekend_call".to_string(),
        ShiftConfig {
            kind: "weekend_call".into(),
            name: "Weekend call".into(),
            days: 1,
            hours: 24.0,
            hospitals: vec![Rotation::Main, Rotation::Va, Rotation::Childrens],
            call_type: CallType::Weekend,
            export_group: "weekend".into(),
        },
    );

    let mut chief_shift_configs = BTreeMap::new();
    chief_shift_configs.insert(
        "chief_backup".to_string(),
        ChiefShiftConfig {
            kind: "chief_backup".into(),
            name: "Chief backup".into(),
            days: 0,
            hours: 24.0,
            call_type: CallType::Weekend,
        },
    );

    let mut people = BTreeMap::new();
    people.insert(pid("AB"), Person::new(Year::Second).with_names("Alice", "Brown"));
    people.insert(pid("CD"), Person::new(Year::Third).with_names("Carl", "Dunn"));
    people.insert(pid("EF"), Person::new(Year::Senior).with_names("Emma", "Fox"));
    people.insert(pid("GH"), Person::new(Year::First).with_names("Gina", "Hart"));
    people.insert(pid("IJ"), Person::new(Year::Chief).with_names("Ian", "Jones"));

    let mut call_targets = CallTargets::default();
    for (table, count) in [(&mut call_targets.weekday, 4), (&mut call_targets.weekend, 2)] {
        table.insert(Year::Second, BTreeMap::from([(pid("AB"), count)]));
        table.insert(Year::Third, BTreeMap::from([(pid("CD"), count)]));
        table.insert(Year::Senior, BTreeMap::from([(pid("EF"), count)]));
    }

    let main = |chief| RotationEntry {
        start: date(2024, 7, 1),
        rotation: Rotation::Main,
        chief,
    };
    let mut rotations = BTreeMap::new();
    rotations.insert(pid("AB"), vec![main(false)]);
    rotations.insert(pid("CD"), vec![main(false)]);
    rotations.insert(
        pid("EF"),
        vec![
            main(false),
            RotationEntry {
                start: date(2024, 7, 15),
                rotation: Rotation::Va,
                chief: false,
            },
        ],
    );
    rotations.insert(pid("GH"), vec![main(false)]);
    rotations.insert(pid("IJ"), vec![main(true)]);

    let mut vacations = BTreeMap::new();
    vacations.insert(pid("AB"), vec![Vacation::Week(date(2024, 7, 8))]);

    CallSchedule {
        first_day: date(2024, 7, 1),
        last_day: date(2024, 7, 27),
        weeks,
        shift_configs,
        chief_shift_configs,
        call_targets,
        people,
        holidays: BTreeMap::from([(date(2024, 7, 4), "Independence Day".to_string())]),
        special_days: BTreeMap::new(),
        vacations,
        rotations,
        is_public: false,
    }
}

fn day_mut(schedule: &mut CallSchedule, on: NaiveDate) -> &mut Day {
    schedule
        .weeks
        .iter_mut()
        .flat_map(|w| w.days.iter_mut())
        .find(|d| d.date == on)
        .unwrap()
}

pub fn set_shift(schedule: &mut CallSchedule, on: NaiveDate, shift: &str, person: Option<&str>) {
    day_mut(schedule, on)
        .shifts
        .insert(shift.to_string(), person.map(pid));
}

pub fn set_backup(schedule: &mut CallSchedule, on: NaiveDate, shift: &str, person: Option<&str>) {
    day_mut(schedule, on)
        .backup_shifts
        .insert(shift.to_string(), person.map(pid));
}

pub fn shift_of(schedule: &CallSchedule, on: NaiveDate, shift: &str) -> Option<PersonId> {
    schedule.find_day(on).unwrap().shifts.get(shift).cloned().flatten()
}
