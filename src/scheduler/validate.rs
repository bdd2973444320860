use super::types::ValidationError;
use super::util;
use crate::model::{CallSchedule, CallType, PersonId, Year, YearTargets};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

pub(super) fn validate(schedule: &CallSchedule) -> Result<(), ValidationError> {
    check_date_range(schedule)?;
    check_contiguity(schedule)?;
    check_cells(schedule)?;
    check_shift_configs(schedule)?;
    check_call_targets(schedule)?;
    check_short_names(schedule)?;
    check_person_dates(schedule)?;
    check_special_dates(schedule)?;
    check_vacations(schedule)?;
    check_rotations(schedule)?;
    Ok(())
}

fn check_date_range(schedule: &CallSchedule) -> Result<(), ValidationError> {
    if schedule.first_day >= schedule.last_day {
        return Err(ValidationError::DateRange {
            first: schedule.first_day,
            last: schedule.last_day,
        });
    }
    Ok(())
}

fn check_contiguity(schedule: &CallSchedule) -> Result<(), ValidationError> {
    let contiguity = |week: usize, message: String| ValidationError::Contiguity { week, message };
    let mut previous: Option<NaiveDate> = None;

    for (w, week) in schedule.weeks.iter().enumerate() {
        if week.days.len() != 7 {
            return Err(contiguity(w, format!("has {} days, expected 7", week.days.len())));
        }
        if week.sunday_date.weekday() != Weekday::Sun {
            return Err(contiguity(
                w,
                format!("sunday date {} is not a Sunday", week.sunday_date),
            ));
        }
        if week.days[0].date != week.sunday_date {
            return Err(contiguity(
                w,
                format!(
                    "first day {} does not match sunday date {}",
                    week.days[0].date, week.sunday_date
                ),
            ));
        }
        for (d, day) in week.days.iter().enumerate() {
            if let Some(prev) = previous {
                if util::add_days(prev, 1) != Some(day.date) {
                    return Err(contiguity(
                        w,
                        format!("day {d} ({}) does not follow {prev}", day.date),
                    ));
                }
            }
            previous = Some(day.date);
        }
    }
    Ok(())
}

fn check_cells(schedule: &CallSchedule) -> Result<(), ValidationError> {
    for (w, week) in schedule.weeks.iter().enumerate() {
        for (d, day) in week.days.iter().enumerate() {
            let cell = |shift: &str, message: String| ValidationError::Cell {
                week: w,
                day: d,
                date: day.date,
                shift: shift.to_string(),
                message,
            };

            for (shift, assigned) in &day.shifts {
                let config = schedule
                    .shift_configs
                    .get(shift)
                    .ok_or_else(|| cell(shift, "unknown shift config".into()))?;
                check_call_type(config.call_type, day.date).map_err(|m| cell(shift, m))?;
                if let Some(person) = assigned {
                    let year = person_year(schedule, person).map_err(|m| cell(shift, m))?;
                    if !year.takes_regular_call() {
                        return Err(cell(
                            shift,
                            format!("{person} (year {year}) cannot take regular shifts"),
                        ));
                    }
                }
            }

            for (shift, assigned) in &day.backup_shifts {
                let config = schedule
                    .chief_shift_configs
                    .get(shift)
                    .ok_or_else(|| cell(shift, "unknown chief shift config".into()))?;
                check_call_type(config.call_type, day.date).map_err(|m| cell(shift, m))?;
                if let Some(person) = assigned {
                    let year = person_year(schedule, person).map_err(|m| cell(shift, m))?;
                    if !year.takes_backup_call() {
                        return Err(cell(
                            shift,
                            format!("{person} (year {year}) cannot take backup shifts"),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_call_type(call_type: CallType, date: NaiveDate) -> Result<(), String> {
    if call_type == CallType::Weekday && util::is_weekend_night(date) {
        return Err(format!("weekday shift on a {}", date.weekday()));
    }
    Ok(())
}

fn person_year(schedule: &CallSchedule, person: &PersonId) -> Result<Year, String> {
    schedule
        .people
        .get(person)
        .map(|p| p.year)
        .ok_or_else(|| format!("unknown person {person}"))
}

fn check_shift_configs(schedule: &CallSchedule) -> Result<(), ValidationError> {
    let err = |kind: &str, message: &str| ValidationError::ShiftConfig {
        kind: kind.to_string(),
        message: message.to_string(),
    };

    for (key, config) in &schedule.shift_configs {
        if key != &config.kind {
            return Err(err(key, "key does not match kind"));
        }
        if config.days < 0 || config.hours < 0.0 {
            return Err(err(key, "days and hours must be non-negative"));
        }
        if config.name.trim().is_empty() || config.export_group.trim().is_empty() {
            return Err(err(key, "name and export group cannot be empty"));
        }
        if config.hospitals.is_empty() {
            return Err(err(key, "hospitals cannot be empty"));
        }
    }

    for (key, config) in &schedule.chief_shift_configs {
        if key != &config.kind {
            return Err(err(key, "key does not match kind"));
        }
        if config.days < 0 || config.hours < 0.0 {
            return Err(err(key, "days and hours must be non-negative"));
        }
        if config.name.trim().is_empty() {
            return Err(err(key, "name cannot be empty"));
        }
    }
    Ok(())
}

fn check_call_targets(schedule: &CallSchedule) -> Result<(), ValidationError> {
    check_target_table(schedule, CallType::Weekday, &schedule.call_targets.weekday)?;
    check_target_table(schedule, CallType::Weekend, &schedule.call_targets.weekend)
}

fn check_target_table(
    schedule: &CallSchedule,
    call_type: CallType,
    targets: &YearTargets,
) -> Result<(), ValidationError> {
    let err = |year: Year, message: String| ValidationError::CallTarget {
        call_type: call_type.to_string(),
        year,
        message,
    };
    let mut seen: BTreeSet<&PersonId> = BTreeSet::new();

    for (year, people) in targets {
        if !year.takes_regular_call() {
            if !people.is_empty() {
                return Err(err(*year, "must be empty".into()));
            }
            continue;
        }
        for person in people.keys() {
            let actual = schedule
                .people
                .get(person)
                .map(|p| p.year)
                .ok_or_else(|| err(*year, format!("unknown person {person}")))?;
            if actual != *year {
                return Err(err(*year, format!("{person} is year {actual}")));
            }
            if !seen.insert(person) {
                return Err(err(*year, format!("duplicate person {person}")));
            }
        }
    }

    for year in Year::REGULAR {
        for (id, person) in &schedule.people {
            if person.year == year && !seen.contains(id) {
                return Err(err(year, format!("missing person {id}")));
            }
        }
    }
    Ok(())
}

fn check_short_names(schedule: &CallSchedule) -> Result<(), ValidationError> {
    for (id, person) in &schedule.people {
        let (Some(given), Some(family)) = (&person.given_name, &person.family_name) else {
            continue;
        };
        let initials: String = [given, family]
            .iter()
            .filter_map(|n| n.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if !id.as_str().to_uppercase().starts_with(&initials) {
            return Err(ValidationError::Person {
                person: id.clone(),
                message: format!("short name does not match initials {initials}"),
            });
        }
    }
    Ok(())
}

fn check_person_dates(schedule: &CallSchedule) -> Result<(), ValidationError> {
    for (id, person) in &schedule.people {
        let err = |message: String| ValidationError::Person {
            person: id.clone(),
            message,
        };
        if let Some(raw) = &person.priority_saturday {
            let date = util::parse_date(raw)
                .ok_or_else(|| err(format!("invalid priority saturday {raw}")))?;
            if date.weekday() != Weekday::Sat {
                return Err(err(format!("priority saturday {raw} is not a Saturday")));
            }
        }
        if let Some(maternity) = &person.maternity {
            let from = util::parse_date(&maternity.from)
                .ok_or_else(|| err(format!("invalid maternity start {}", maternity.from)))?;
            let to = util::parse_date(&maternity.to)
                .ok_or_else(|| err(format!("invalid maternity end {}", maternity.to)))?;
            if from >= to {
                return Err(err(format!("maternity from {from} is not before {to}")));
            }
        }
    }
    Ok(())
}

fn check_special_dates(schedule: &CallSchedule) -> Result<(), ValidationError> {
    let in_bounds = |date: &NaiveDate| *date >= schedule.first_day && *date <= schedule.last_day;
    if let Some(date) = schedule.holidays.keys().find(|d| !in_bounds(*d)) {
        return Err(ValidationError::OutOfBounds {
            kind: "holiday",
            date: *date,
        });
    }
    if let Some(date) = schedule.special_days.keys().find(|d| !in_bounds(*d)) {
        return Err(ValidationError::OutOfBounds {
            kind: "special day",
            date: *date,
        });
    }
    Ok(())
}

fn check_vacations(schedule: &CallSchedule) -> Result<(), ValidationError> {
    use crate::model::Vacation;

    for (person, vacations) in &schedule.vacations {
        for vacation in vacations {
            let message = match *vacation {
                Vacation::Week(monday) if monday.weekday() != Weekday::Mon => {
                    format!("{monday} is not a Monday")
                }
                Vacation::Split { start, length } if length < 0 => {
                    format!("split vacation at {start} has negative length {length}")
                }
                _ => continue,
            };
            return Err(ValidationError::Vacation {
                person: person.clone(),
                message,
            });
        }
    }
    Ok(())
}

fn check_rotations(schedule: &CallSchedule) -> Result<(), ValidationError> {
    for (person, rotations) in &schedule.rotations {
        let year = schedule.people.get(person).map(|p| p.year);
        for (index, entry) in rotations.iter().enumerate() {
            let err = |message: String| ValidationError::Rotation {
                person: person.clone(),
                index,
                message,
            };
            if index > 0 && entry.start <= rotations[index - 1].start {
                return Err(err(format!(
                    "{} starts before the previous rotation ({})",
                    entry.start,
                    rotations[index - 1].start
                )));
            }
            if entry.chief && !matches!(year, Some(Year::Senior | Year::Chief)) {
                return Err(err("chief rotation requires a senior or chief".into()));
            }
        }
    }
    Ok(())
}
