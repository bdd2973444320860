use super::derive::is_on_vacation;
use super::types::{
    CallScheduleProcessed, Candidate, InferOptions, Inference, ShiftSlot, Unavailability,
};
use super::util;
use crate::model::{CallSchedule, CallType, Person, PersonId, Rotation};
use chrono::NaiveDate;

const SOFT_PENALTY: f64 = 5.0;
const PROXIMITY_WINDOW_DAYS: i64 = 7;

/// Ce qu'on sait de la cellule visée.
struct SlotInfo<'a> {
    date: NaiveDate,
    slot: &'a ShiftSlot,
    call_type: CallType,
    hospitals: Option<&'a [Rotation]>,
}

pub(super) fn infer(
    schedule: &CallSchedule,
    processed: &CallScheduleProcessed,
    date: NaiveDate,
    slot: &ShiftSlot,
    opts: InferOptions,
) -> Inference {
    let mut out = Inference::default();

    let info = match slot {
        ShiftSlot::Regular(name) => schedule.shift_configs.get(name).map(|c| SlotInfo {
            date,
            slot,
            call_type: c.call_type,
            hospitals: Some(c.hospitals.as_slice()),
        }),
        ShiftSlot::Backup(name) => schedule.chief_shift_configs.get(name).map(|c| SlotInfo {
            date,
            slot,
            call_type: c.call_type,
            hospitals: None,
        }),
    };
    let Some(info) = info else {
        log(opts, || format!("no config for shift {}", slot.name()));
        return out;
    };

    let pool = schedule.people.iter().filter(|(_, p)| match slot {
        ShiftSlot::Regular(_) => p.year.takes_regular_call(),
        ShiftSlot::Backup(_) => p.year.takes_backup_call(),
    });

    for (id, person) in pool {
        let (hard, soft) = unavailability(schedule, processed, &info, id, person);
        let hard_unavailable = hard.is_some();

        if hard_unavailable && opts.skip_unavailable_people {
            log(opts, || format!("{id}: skipped ({})", hard.as_deref().unwrap_or("")));
            continue;
        }

        let rating = rate(schedule, &info, id) + SOFT_PENALTY * soft.len() as f64;
        log(opts, || format!("{id}: rating {rating:.2}, hard {hard:?}, soft {soft:?}"));

        if let Some(reason) = hard {
            out.unavailable_people
                .insert(id.clone(), Unavailability { soft: false, reason });
        } else if !soft.is_empty() {
            out.unavailable_people.insert(
                id.clone(),
                Unavailability {
                    soft: true,
                    reason: soft.join(", "),
                },
            );
        }

        let candidate = Candidate {
            person: id.clone(),
            rating,
        };
        // le pool est trié par identifiant : `<` strict garde le premier à égalité
        if !hard_unavailable && out.best.as_ref().map_or(true, |b| rating < b.rating) {
            out.best = Some(candidate.clone());
        }
        out.ranked.push(candidate);
    }

    out.ranked.sort_by(|a, b| a.rating.total_cmp(&b.rating));
    out
}

/// Retourne (raison bloquante, raisons souples).
fn unavailability(
    schedule: &CallSchedule,
    processed: &CallScheduleProcessed,
    slot: &SlotInfo<'_>,
    id: &PersonId,
    person: &Person,
) -> (Option<String>, Vec<String>) {
    let mut soft = Vec::new();

    let Some(day_info) = processed.info(slot.date, id) else {
        return (Some("no rotation on this day".into()), soft);
    };
    let on_vacation = day_info.on_vacation
        || schedule
            .vacations
            .get(id)
            .is_some_and(|v| is_on_vacation(v, slot.date));
    if on_vacation {
        return (Some("on vacation".into()), soft);
    }
    if on_maternity(person, slot.date) {
        return (Some("on maternity leave".into()), soft);
    }
    if let Some(other) = assigned_elsewhere(schedule, slot, id) {
        return (Some(format!("already assigned to {other}")), soft);
    }
    if matches!(slot.slot, ShiftSlot::Regular(_)) {
        if let Some(prev) = post_call_from(schedule, slot.date, id) {
            return (Some(format!("post call from {prev}")), soft);
        }
    }

    if let Some(hospitals) = slot.hospitals {
        if !hospitals.contains(&day_info.rotation) {
            soft.push(format!("rotation {:?} not eligible", day_info.rotation));
        }
    }
    if slot.call_type == CallType::Weekday && adjacent_weekday_call(schedule, slot, id) {
        soft.push("consecutive weekday calls".into());
    }
    if in_priority_weekend(person, slot.date) {
        soft.push("priority weekend".into());
    }
    (None, soft)
}

fn on_maternity(person: &Person, date: NaiveDate) -> bool {
    let Some(maternity) = &person.maternity else {
        return false;
    };
    match (util::parse_date(&maternity.from), util::parse_date(&maternity.to)) {
        (Some(from), Some(to)) => from <= date && date <= to,
        _ => false,
    }
}

/// Vendredi..dimanche autour du samedi prioritaire.
fn in_priority_weekend(person: &Person, date: NaiveDate) -> bool {
    let Some(saturday) = person.priority_saturday.as_deref().and_then(util::parse_date) else {
        return false;
    };
    (-1..=1).contains(&util::days_between(saturday, date))
}

fn assigned_elsewhere(schedule: &CallSchedule, slot: &SlotInfo<'_>, id: &PersonId) -> Option<String> {
    let day = schedule.find_day(slot.date)?;
    let (cells, name) = match slot.slot {
        ShiftSlot::Regular(name) => (&day.shifts, name),
        ShiftSlot::Backup(name) => (&day.backup_shifts, name),
    };
    cells
        .iter()
        .find(|(shift, assigned)| *shift != name && assigned.as_ref() == Some(id))
        .map(|(shift, _)| shift.clone())
}

/// Garde régulière commencée avant `date` et qui la couvre encore (`start..=start+days`).
fn post_call_from(schedule: &CallSchedule, date: NaiveDate, id: &PersonId) -> Option<String> {
    schedule
        .days()
        .filter(|day| day.date < date)
        .flat_map(|day| day.shifts.iter().map(move |cell| (day.date, cell)))
        .find(|&(start, (shift, assigned))| {
            assigned.as_ref() == Some(id)
                && schedule
                    .shift_configs
                    .get(shift)
                    .is_some_and(|c| util::days_between(start, date) <= c.days)
        })
        .map(|(_, (shift, _))| shift.clone())
}

fn adjacent_weekday_call(schedule: &CallSchedule, slot: &SlotInfo<'_>, id: &PersonId) -> bool {
    [-1, 1].into_iter().any(|offset| {
        util::add_days(slot.date, offset)
            .and_then(|d| schedule.find_day(d))
            .is_some_and(|day| {
                day.shifts.iter().any(|(shift, assigned)| {
                    assigned.as_ref() == Some(id)
                        && schedule
                            .shift_configs
                            .get(shift)
                            .is_some_and(|c| c.call_type == CallType::Weekday)
                })
            })
    })
}

/// Équité (ratio gardes faites / objectif) + proximité de la garde la plus proche.
fn rate(schedule: &CallSchedule, slot: &SlotInfo<'_>, id: &PersonId) -> f64 {
    let backup = matches!(slot.slot, ShiftSlot::Backup(_));
    let mut count = 0u32;
    let mut nearest: Option<i64> = None;

    for day in schedule.days() {
        let cells = if backup { &day.backup_shifts } else { &day.shifts };
        for (shift, assigned) in cells {
            if assigned.as_ref() != Some(id) {
                continue;
            }
            if day.date == slot.date && shift == slot.slot.name() {
                continue;
            }
            let call_type = if backup {
                schedule.chief_shift_configs.get(shift).map(|c| c.call_type)
            } else {
                schedule.shift_configs.get(shift).map(|c| c.call_type)
            };
            if call_type == Some(slot.call_type) {
                count += 1;
            }
            let gap = util::days_between(day.date, slot.date).abs();
            nearest = Some(nearest.map_or(gap, |n| n.min(gap)));
        }
    }

    let fairness = match (backup, schedule.call_targets.target_of(slot.call_type, id)) {
        (false, Some(target)) if target > 0 => f64::from(count) / f64::from(target),
        _ => f64::from(count),
    };
    let proximity = nearest.map_or(0, |gap| (PROXIMITY_WINDOW_DAYS - gap).max(0));
    10.0 * fairness + proximity as f64
}

#[allow(unused_variables)]
fn log<F: FnOnce() -> String>(opts: InferOptions, message: F) {
    #[cfg(feature = "logging")]
    if opts.enable_log {
        tracing::debug!(target: "gardes::infer", "{}", message());
    }
}
