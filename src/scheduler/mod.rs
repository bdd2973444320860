mod derive;
mod infer;
mod types;
mod util;
mod validate;

pub use derive::issue_key;
pub use types::{
    CallScheduleProcessed, Candidate, DayPersonInfo, InferOptions, Inference, IssueRule,
    ShiftSlot, Unavailability, ValidationError,
};

use crate::model::CallSchedule;
use chrono::NaiveDate;

/// Dérive la table jour → personne → statut et les issues.
///
/// Pure : l'entrée n'est jamais modifiée, la table est reconstruite de zéro.
/// Deux dérivations du même tableau donnent la même table et les mêmes clés d'issues.
pub fn derive(schedule: &CallSchedule) -> CallScheduleProcessed {
    derive::derive(schedule)
}

/// Vérifie les invariants structurels et métier ; s'arrête à la première violation.
pub fn validate(schedule: &CallSchedule) -> Result<(), ValidationError> {
    validate::validate(schedule)
}

/// Classe les candidats pour une cellule et propose le meilleur.
///
/// `best` est absent si le pool est vide ou si tous les candidats restants sont
/// indisponibles de façon bloquante.
pub fn infer(
    schedule: &CallSchedule,
    processed: &CallScheduleProcessed,
    date: NaiveDate,
    slot: &ShiftSlot,
    opts: InferOptions,
) -> Inference {
    infer::infer(schedule, processed, date, slot, opts)
}
