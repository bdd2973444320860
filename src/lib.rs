#![forbid(unsafe_code)]
//! Gardes : moteur de tableau de gardes d'internat (sans BD).
//!
//! - Dérivation du statut jour par jour (rotations, congés, gardes).
//! - Validation fail-fast des invariants.
//! - Inférence du meilleur candidat pour une cellule.
//! - Diff/rejeu cellule par cellule entre versions, stockage append-only (JSON).

pub mod changes;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod storage;

pub use changes::{Action, CellChange, CellRef, DiffResult};
pub use model::{
    CallSchedule, CallType, Person, PersonId, Rotation, RotationEntry, ShiftConfig, Vacation,
    Year,
};
pub use scheduler::{
    derive, infer, validate, CallScheduleProcessed, InferOptions, Inference, ShiftSlot,
    ValidationError,
};
pub use service::{CallScheduleService, ListRequest, LoadRequest, SaveRequest, SaveResponse};
pub use storage::{JsonStorage, Storage};
