//! Diff cellule par cellule entre deux tableaux, et rejeu du diff sur une autre version.
//!
//! C'est la base de la réconciliation à l'enregistrement : on diffe la copie éditée
//! contre la copie d'origine du client, puis on rejoue seulement ces actions sur la
//! dernière version stockée. `apply` écrase sans vérifier `previous` : si deux
//! enregistrements concurrents touchent la même cellule, le dernier arrivé gagne.

use crate::model::{Assignment, CallSchedule, Day, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Adresse d'une cellule de garde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRef {
    pub week_index: usize,
    pub day_index: usize,
    pub shift_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub shift: CellRef,
    pub previous: Assignment,
    pub next: Assignment,
}

/// Une modification unitaire (avant → après) d'une cellule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    Regular(CellChange),
    Backup(CellChange),
}

impl Action {
    pub fn change(&self) -> &CellChange {
        match self {
            Action::Regular(c) | Action::Backup(c) => c,
        }
    }

    fn cells<'a>(&self, day: &'a Day) -> &'a BTreeMap<String, Assignment> {
        match self {
            Action::Regular(_) => &day.shifts,
            Action::Backup(_) => &day.backup_shifts,
        }
    }

    fn cells_mut<'a>(&self, day: &'a mut Day) -> &'a mut BTreeMap<String, Assignment> {
        match self {
            Action::Regular(_) => &mut day.shifts,
            Action::Backup(_) => &mut day.backup_shifts,
        }
    }
}

/// Résultat d'un diff : une incompatibilité de forme n'est pas une erreur Rust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiffResult {
    Changes { actions: Vec<Action> },
    Error { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangeError {
    #[error("no day at week {week_index}, day {day_index}")]
    UnknownCell { week_index: usize, day_index: usize },
}

/// Action dont la valeur `previous` ne correspond plus à la cellule cible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub action: Action,
    pub current: Assignment,
}

/// Diff de toutes les cellules (gardes et backups) entre `before` et `after`.
pub fn diff(before: &CallSchedule, after: &CallSchedule) -> DiffResult {
    if before.weeks.len() != after.weeks.len() {
        return DiffResult::Error {
            message: format!(
                "week count differs: {} before, {} after",
                before.weeks.len(),
                after.weeks.len()
            ),
        };
    }

    let mut actions = Vec::new();
    for (week_index, (wb, wa)) in before.weeks.iter().zip(&after.weeks).enumerate() {
        if wb.days.len() != wa.days.len() {
            return DiffResult::Error {
                message: format!(
                    "day count differs in week {week_index}: {} before, {} after",
                    wb.days.len(),
                    wa.days.len()
                ),
            };
        }
        for (day_index, (db, da)) in wb.days.iter().zip(&wa.days).enumerate() {
            for change in diff_cells(week_index, day_index, &db.shifts, &da.shifts) {
                actions.push(Action::Regular(change));
            }
            for change in diff_cells(week_index, day_index, &db.backup_shifts, &da.backup_shifts) {
                actions.push(Action::Backup(change));
            }
        }
    }
    DiffResult::Changes { actions }
}

fn diff_cells(
    week_index: usize,
    day_index: usize,
    before: &BTreeMap<String, Assignment>,
    after: &BTreeMap<String, Assignment>,
) -> Vec<CellChange> {
    let names: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            let previous = before.get(name).cloned().flatten();
            let next = after.get(name).cloned().flatten();
            (previous != next).then(|| CellChange {
                shift: CellRef {
                    week_index,
                    day_index,
                    shift_name: name.clone(),
                },
                previous,
                next,
            })
        })
        .collect()
}

/// Écrit `next` dans chaque cellule visée, sans comparer à `previous`.
pub fn apply(schedule: &mut CallSchedule, actions: &[Action]) -> Result<(), ChangeError> {
    for action in actions {
        let change = action.change();
        let day = day_mut(schedule, &change.shift)?;
        action
            .cells_mut(day)
            .insert(change.shift.shift_name.clone(), change.next.clone());
    }
    Ok(())
}

/// Actions qui écraseraient une valeur différente de leur `previous`.
///
/// N'altère rien : l'appelant décide quoi faire des conflits.
pub fn conflicts(schedule: &CallSchedule, actions: &[Action]) -> Vec<Conflict> {
    actions
        .iter()
        .filter_map(|action| {
            let change = action.change();
            let day = schedule
                .weeks
                .get(change.shift.week_index)?
                .days
                .get(change.shift.day_index)?;
            let current = action
                .cells(day)
                .get(&change.shift.shift_name)
                .cloned()
                .flatten();
            (current != change.previous).then(|| Conflict {
                action: action.clone(),
                current,
            })
        })
        .collect()
}

fn day_mut<'a>(schedule: &'a mut CallSchedule, cell: &CellRef) -> Result<&'a mut Day, ChangeError> {
    schedule
        .weeks
        .get_mut(cell.week_index)
        .and_then(|w| w.days.get_mut(cell.day_index))
        .ok_or(ChangeError::UnknownCell {
            week_index: cell.week_index,
            day_index: cell.day_index,
        })
}

/// Résumé lisible des actions (une ligne par action), pour les journaux d'audit.
pub fn serialize(schedule: &CallSchedule, actions: &[Action]) -> String {
    let mut out = String::new();
    for action in actions {
        let change = action.change();
        let cell = &change.shift;
        let date = schedule
            .weeks
            .get(cell.week_index)
            .and_then(|w| w.days.get(cell.day_index))
            .map(|d| d.date.to_string())
            .unwrap_or_else(|| format!("week {} day {}", cell.week_index, cell.day_index));
        let label = match action {
            Action::Regular(_) => schedule
                .shift_configs
                .get(&cell.shift_name)
                .map_or(cell.shift_name.clone(), |c| c.name.clone()),
            Action::Backup(_) => format!(
                "{} (backup)",
                schedule
                    .chief_shift_configs
                    .get(&cell.shift_name)
                    .map_or(cell.shift_name.as_str(), |c| c.name.as_str())
            ),
        };
        out.push_str(&format!(
            "{date} {label}: {} -> {}\n",
            person_label(schedule, change.previous.as_ref()),
            person_label(schedule, change.next.as_ref())
        ));
    }
    out
}

fn person_label(schedule: &CallSchedule, person: Option<&PersonId>) -> String {
    let Some(id) = person else {
        return "nobody".to_string();
    };
    match schedule.people.get(id).and_then(|p| p.display_name()) {
        Some(name) => format!("{name} ({id})"),
        None => id.to_string(),
    }
}
