use crate::changes::{self, DiffResult};
use crate::model::{CallSchedule, CellCounts, StoredCallSchedule, StoredCallSchedules};
use crate::scheduler;
use crate::storage::Storage;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,
    pub academic_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub call_schedule: CallSchedule,
    /// Copie d'origine du client : si présente, seules ses modifications sont rejouées.
    #[serde(default)]
    pub initial_call_schedule: Option<CallSchedule>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub academic_year: i32,
}

/// Métadonnées d'une version (sans le tableau).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMeta {
    pub name: String,
    pub last_edited_by: String,
    pub shift_counts: CellCounts,
    pub issue_counts: u32,
    pub backup_shift_counts: CellCounts,
    pub ts: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no stored version for academic year {0}")]
    NoVersions(i32),
    #[error("no stored version at {0}")]
    UnknownVersion(DateTime<Utc>),
    #[error("cannot reconcile edits: {0}")]
    Incompatible(String),
}

/// Chargement, enregistrement et listing des versions d'un tableau.
///
/// Aucune exclusion entre requêtes : deux enregistrements concurrents peuvent rejouer
/// sur la même dernière version, et le dernier écrit gagne cellule par cellule.
pub struct CallScheduleService<S: Storage> {
    storage: S,
}

impl<S: Storage> CallScheduleService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Dernière version, ou celle d'horodatage `ts`.
    pub fn load(&self, req: &LoadRequest) -> Result<CallSchedule> {
        let versions = self.storage.load(req.academic_year)?;
        let version = match req.ts {
            Some(ts) => versions.find(ts).ok_or(StoreError::UnknownVersion(ts))?,
            None => versions
                .latest()
                .ok_or(StoreError::NoVersions(req.academic_year))?,
        };
        Ok(version.call_schedule.clone())
    }

    pub fn save(&self, req: SaveRequest, editor: &str, now: DateTime<Utc>) -> Result<SaveResponse> {
        let academic_year = req.call_schedule.academic_year();
        let mut versions = self.storage.load(academic_year)?;

        let next = match req.initial_call_schedule {
            Some(initial) => reconcile(&versions, initial, &req.call_schedule)?,
            None => req.call_schedule,
        };

        scheduler::validate(&next).context("validating call schedule")?;
        let processed = scheduler::derive(&next);

        // horodatages strictement croissants
        let ts = match versions.latest() {
            Some(latest) if latest.ts >= now => latest.ts + Duration::milliseconds(1),
            _ => now,
        };
        let (shift_counts, backup_shift_counts) = cell_counts(&next);
        versions.versions.push(StoredCallSchedule {
            ts,
            name: req.name,
            call_schedule: next,
            shift_counts,
            issue_counts: u32::try_from(processed.issues.len()).unwrap_or(u32::MAX),
            backup_shift_counts,
            last_edited_by: editor.to_string(),
        });
        self.storage.save(academic_year, &versions)?;

        #[cfg(feature = "logging")]
        tracing::info!(academic_year, %ts, editor, "saved call schedule version");

        Ok(SaveResponse { ts })
    }

    /// Métadonnées de toutes les versions, dans l'ordre d'ajout.
    pub fn list(&self, req: &ListRequest) -> Result<Vec<VersionMeta>> {
        let versions = self.storage.load(req.academic_year)?;
        Ok(versions
            .versions
            .iter()
            .map(|v| VersionMeta {
                name: v.name.clone(),
                last_edited_by: v.last_edited_by.clone(),
                shift_counts: v.shift_counts,
                issue_counts: v.issue_counts,
                backup_shift_counts: v.backup_shift_counts,
                ts: v.ts,
            })
            .collect())
    }

    /// Maintenance : retire la dernière version ajoutée.
    pub fn pop_last_version(&self, academic_year: i32) -> Result<StoredCallSchedule> {
        let mut versions = self.storage.load(academic_year)?;
        let removed = versions
            .versions
            .pop()
            .ok_or(StoreError::NoVersions(academic_year))?;
        self.storage.save(academic_year, &versions)?;
        Ok(removed)
    }
}

/// Rejoue les modifications du client (édité vs origine) sur la dernière version stockée.
fn reconcile(
    versions: &StoredCallSchedules,
    initial: CallSchedule,
    edited: &CallSchedule,
) -> Result<CallSchedule> {
    let actions = match changes::diff(&initial, edited) {
        DiffResult::Changes { actions } => actions,
        DiffResult::Error { message } => return Err(StoreError::Incompatible(message).into()),
    };
    let mut base = match versions.latest() {
        Some(latest) => latest.call_schedule.clone(),
        None => initial,
    };

    #[cfg(feature = "logging")]
    {
        for conflict in changes::conflicts(&base, &actions) {
            tracing::warn!(
                cell = ?conflict.action.change().shift,
                current = ?conflict.current,
                "overwriting a cell edited since the client loaded it"
            );
        }
        tracing::info!("replaying edits:\n{}", changes::serialize(&base, &actions));
    }

    changes::apply(&mut base, &actions).context("replaying edits on latest version")?;
    Ok(base)
}

fn cell_counts(schedule: &CallSchedule) -> (CellCounts, CellCounts) {
    let mut shifts = CellCounts::default();
    let mut backups = CellCounts::default();
    for day in schedule.days() {
        for assigned in day.shifts.values() {
            shifts.total += 1;
            shifts.assigned += u32::from(assigned.is_some());
        }
        for assigned in day.backup_shifts.values() {
            backups.total += 1;
            backups.assigned += u32::from(assigned.is_some());
        }
    }
    (shifts, backups)
}
