use super::types::{CallScheduleProcessed, DayPersonInfo, IssueRule};
use super::util;
use crate::model::{CallSchedule, CallType, Issue, PersonId, Vacation};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub(super) fn derive(schedule: &CallSchedule) -> CallScheduleProcessed {
    let mut processed = CallScheduleProcessed::default();
    walk_rotations(schedule, &mut processed);
    overlay_shifts(schedule, &mut processed);
    detect_issues(schedule, &mut processed);
    processed
}

/// Vrai si `day` tombe dans une période de congés de la liste.
pub(crate) fn is_on_vacation(vacations: &[Vacation], day: NaiveDate) -> bool {
    vacations.iter().any(|vac| match *vac {
        // vendredi précédent .. samedi suivant (9 jours)
        Vacation::Week(monday) => {
            let days = util::days_between(monday, day);
            (-2..=6).contains(&days)
        }
        Vacation::Split { start, length } => {
            let days = util::days_between(start, day);
            days >= 0 && days < length
        }
    })
}

fn walk_rotations(schedule: &CallSchedule, processed: &mut CallScheduleProcessed) {
    let no_vacations = Vec::new();
    for (person, rotations) in &schedule.rotations {
        if rotations.is_empty() {
            continue;
        }
        let vacations = schedule.vacations.get(person).unwrap_or(&no_vacations);
        let mut index = 0usize;

        for day in util::each_day(schedule.first_day, schedule.last_day) {
            while rotations.get(index + 1).is_some_and(|next| next.start <= day) {
                index += 1;
            }
            let on_vacation = is_on_vacation(vacations, day);
            processed
                .day2person2info
                .entry(day)
                .or_default()
                .insert(
                    person.clone(),
                    DayPersonInfo {
                        rotation: rotations[index].rotation,
                        on_vacation,
                        is_working: util::is_weekday(day) && !on_vacation,
                        shift: None,
                    },
                );
        }
    }
}

fn overlay_shifts(schedule: &CallSchedule, processed: &mut CallScheduleProcessed) {
    for day in schedule.days() {
        for (shift_name, assigned) in &day.shifts {
            let Some(person) = assigned else {
                continue;
            };
            let Some(config) = schedule.shift_configs.get(shift_name) else {
                continue;
            };
            for i in 0..=config.days {
                let Some(covered) = util::add_days(day.date, i) else {
                    break;
                };
                if covered > schedule.last_day {
                    break;
                }
                let Some(info) = processed
                    .day2person2info
                    .get_mut(&covered)
                    .and_then(|m| m.get_mut(person))
                else {
                    continue;
                };
                info.is_working = true;
                if i == 0 {
                    info.shift = Some(shift_name.clone());
                }
            }
        }
    }
}

/// Lit les cellules du tableau : une personne peut tenir plusieurs gardes le même jour.
fn detect_issues(schedule: &CallSchedule, processed: &mut CallScheduleProcessed) {
    let mut issues = BTreeMap::new();
    let mut weekday_nights: BTreeMap<NaiveDate, BTreeSet<&PersonId>> = BTreeMap::new();

    for day in schedule.days() {
        for (shift, assigned) in &day.shifts {
            let Some(person) = assigned else {
                continue;
            };
            if processed.info(day.date, person).is_some_and(|i| i.on_vacation) {
                let date = day.date;
                let message = format!("{person} is assigned {shift} on {date} while on vacation");
                push_issue(&mut issues, IssueRule::ShiftDuringVacation, date, person, message);
            }
            if is_weekday_night(schedule, shift) {
                weekday_nights.entry(day.date).or_default().insert(person);
            }
        }
    }

    for (day, people) in &weekday_nights {
        let Some(next_day) = util::add_days(*day, 1) else {
            continue;
        };
        let Some(next_people) = weekday_nights.get(&next_day) else {
            continue;
        };
        for person in people.intersection(next_people) {
            let message =
                format!("{person} has consecutive weekday night calls on {day} and {next_day}");
            push_issue(
                &mut issues,
                IssueRule::ConsecutiveWeekdayCalls,
                *day,
                person,
                message,
            );
        }
    }

    processed.issues = issues;
}

fn is_weekday_night(schedule: &CallSchedule, shift: &str) -> bool {
    schedule
        .shift_configs
        .get(shift)
        .is_some_and(|c| c.call_type == CallType::Weekday)
}

/// Clé stable : même règle, même jour, même personne => même clé.
pub fn issue_key(rule: IssueRule, day: NaiveDate, person: &PersonId) -> String {
    let name = format!("{}|{}|{}", rule.as_str(), day, person);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

fn push_issue(
    issues: &mut BTreeMap<String, Issue>,
    rule: IssueRule,
    day: NaiveDate,
    person: &PersonId,
    message: String,
) {
    issues.insert(
        issue_key(rule, day, person),
        Issue {
            start_day: day,
            message,
        },
    );
}
