use crate::model::{Issue, PersonId, Rotation, Year};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Statut dérivé d'une personne pour un jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPersonInfo {
    pub rotation: Rotation,
    pub on_vacation: bool,
    pub is_working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
}

/// Table dérivée (jamais persistée), reconstruite à chaque dérivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallScheduleProcessed {
    pub day2person2info: BTreeMap<NaiveDate, BTreeMap<PersonId, DayPersonInfo>>,
    pub issues: BTreeMap<String, Issue>,
}

impl CallScheduleProcessed {
    pub fn info(&self, day: NaiveDate, person: &PersonId) -> Option<&DayPersonInfo> {
        self.day2person2info.get(&day).and_then(|m| m.get(person))
    }
}

/// Règle ayant produit une issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueRule {
    ConsecutiveWeekdayCalls,
    ShiftDuringVacation,
}

impl IssueRule {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueRule::ConsecutiveWeekdayCalls => "consecutive-weekday-calls",
            IssueRule::ShiftDuringVacation => "shift-during-vacation",
        }
    }
}

/// Cellule visée par l'inférence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftSlot {
    Regular(String),
    Backup(String),
}

impl ShiftSlot {
    pub fn name(&self) -> &str {
        match self {
            ShiftSlot::Regular(name) | ShiftSlot::Backup(name) => name,
        }
    }
}

/// Options d'inférence
#[derive(Debug, Clone, Copy, Default)]
pub struct InferOptions {
    pub skip_unavailable_people: bool,
    pub enable_log: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unavailability {
    pub soft: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub person: PersonId,
    pub rating: f64,
}

/// Résultat de l'inférence pour une cellule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inference {
    pub unavailable_people: BTreeMap<PersonId, Unavailability>,
    /// Candidats classés du meilleur au moins bon.
    pub ranked: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<Candidate>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date range: first day {first} is not before last day {last}")]
    DateRange { first: NaiveDate, last: NaiveDate },
    #[error("week {week}: {message}")]
    Contiguity { week: usize, message: String },
    #[error("week {week}, day {day} ({date}), shift {shift}: {message}")]
    Cell {
        week: usize,
        day: usize,
        date: NaiveDate,
        shift: String,
        message: String,
    },
    #[error("shift config {kind}: {message}")]
    ShiftConfig { kind: String, message: String },
    #[error("{call_type} call targets, year {year}: {message}")]
    CallTarget {
        call_type: String,
        year: Year,
        message: String,
    },
    #[error("person {person}: {message}")]
    Person { person: PersonId, message: String },
    #[error("{kind} {date}: outside of schedule bounds")]
    OutOfBounds { kind: &'static str, date: NaiveDate },
    #[error("vacation of {person}: {message}")]
    Vacation { person: PersonId, message: String },
    #[error("rotation {index} of {person}: {message}")]
    Rotation {
        person: PersonId,
        index: usize,
        message: String,
    },
}
