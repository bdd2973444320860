use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifiant court d'une personne (ses initiales, ex. `AB`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Promotion (ancienneté) d'un interne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Year {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "S")]
    Senior,
    #[serde(rename = "R")]
    Research,
    #[serde(rename = "M")]
    Masters,
    #[serde(rename = "C")]
    Chief,
}

impl Year {
    /// Promotions qui prennent les gardes régulières.
    pub const REGULAR: [Year; 5] = [
        Year::Second,
        Year::Third,
        Year::Senior,
        Year::Research,
        Year::Masters,
    ];

    pub fn takes_regular_call(self) -> bool {
        Self::REGULAR.contains(&self)
    }

    /// Seuls les chefs prennent les astreintes de second rang (backup).
    pub fn takes_backup_call(self) -> bool {
        self == Year::Chief
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Year::First => "1",
            Year::Second => "2",
            Year::Third => "3",
            Year::Senior => "S",
            Year::Research => "R",
            Year::Masters => "M",
            Year::Chief => "C",
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Congé maternité/paternité, dates brutes `YYYY-MM-DD` (validées par le validateur).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maternity {
    pub from: String,
    pub to: String,
}

/// Personne (interne ou chef)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub year: Year,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Samedi prioritaire (week-end protégé), `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_saturday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maternity: Option<Maternity>,
}

impl Person {
    pub fn new(year: Year) -> Self {
        Self {
            year,
            given_name: None,
            family_name: None,
            priority_saturday: None,
            maternity: None,
        }
    }

    pub fn with_names<G: Into<String>, F: Into<String>>(mut self, given: G, family: F) -> Self {
        self.given_name = Some(given.into());
        self.family_name = Some(family.into());
        self
    }

    /// Nom affichable, ou `None` si la personne n'a pas de nom déclaré.
    pub fn display_name(&self) -> Option<String> {
        match (&self.given_name, &self.family_name) {
            (Some(g), Some(f)) => Some(format!("{g} {f}")),
            (Some(n), None) | (None, Some(n)) => Some(n.clone()),
            (None, None) => None,
        }
    }
}

/// Service (hôpital) d'une rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rotation {
    Main,
    Va,
    Childrens,
    NightFloat,
    Research,
    Elective,
    Off,
}

/// Entrée de rotation : court jusqu'au début de l'entrée suivante.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEntry {
    pub start: NaiveDate,
    pub rotation: Rotation,
    #[serde(default)]
    pub chief: bool,
}

/// Congés : soit un lundi (fenêtre fixe de 9 jours), soit un intervalle explicite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vacation {
    Week(NaiveDate),
    Split { start: NaiveDate, length: i64 },
}

/// Type de garde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallType {
    Weekday,
    Weekend,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Weekday => f.write_str("weekday"),
            CallType::Weekend => f.write_str("weekend"),
        }
    }
}

/// Définition statique d'une garde régulière.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftConfig {
    pub kind: String,
    pub name: String,
    /// Durée en jours : la garde marque `day..=day + days` comme travaillés.
    pub days: i64,
    pub hours: f64,
    pub hospitals: Vec<Rotation>,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub export_group: String,
}

/// Définition statique d'une astreinte de chef (backup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChiefShiftConfig {
    pub kind: String,
    pub name: String,
    pub days: i64,
    pub hours: f64,
    #[serde(rename = "type")]
    pub call_type: CallType,
}

/// Une cellule de garde : personne assignée ou vide.
pub type Assignment = Option<PersonId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub date: NaiveDate,
    #[serde(default)]
    pub shifts: BTreeMap<String, Assignment>,
    #[serde(default)]
    pub backup_shifts: BTreeMap<String, Assignment>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            shifts: BTreeMap::new(),
            backup_shifts: BTreeMap::new(),
        }
    }
}

/// Semaine : 7 jours contigus commençant un dimanche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub sunday_date: NaiveDate,
    pub days: Vec<Day>,
}

/// Objectifs par promotion : personne → nombre de gardes visé.
pub type YearTargets = BTreeMap<Year, BTreeMap<PersonId, u32>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTargets {
    #[serde(default)]
    pub weekday: YearTargets,
    #[serde(default)]
    pub weekend: YearTargets,
}

impl CallTargets {
    pub fn for_type(&self, call_type: CallType) -> &YearTargets {
        match call_type {
            CallType::Weekday => &self.weekday,
            CallType::Weekend => &self.weekend,
        }
    }

    pub fn target_of(&self, call_type: CallType, person: &PersonId) -> Option<u32> {
        self.for_type(call_type)
            .values()
            .find_map(|people| people.get(person).copied())
    }
}

/// Tableau de gardes complet d'une année universitaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSchedule {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub weeks: Vec<Week>,
    #[serde(default)]
    pub shift_configs: BTreeMap<String, ShiftConfig>,
    #[serde(default)]
    pub chief_shift_configs: BTreeMap<String, ChiefShiftConfig>,
    #[serde(default)]
    pub call_targets: CallTargets,
    #[serde(default)]
    pub people: BTreeMap<PersonId, Person>,
    #[serde(default)]
    pub holidays: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub special_days: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub vacations: BTreeMap<PersonId, Vec<Vacation>>,
    #[serde(default)]
    pub rotations: BTreeMap<PersonId, Vec<RotationEntry>>,
    /// Posé par l'appelant au chargement, jamais interprété par le moteur.
    #[serde(default)]
    pub is_public: bool,
}

impl CallSchedule {
    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn find_day(&self, date: NaiveDate) -> Option<&Day> {
        self.days().find(|d| d.date == date)
    }

    /// Année universitaire (commence en juillet).
    pub fn academic_year(&self) -> i32 {
        academic_year_of(self.first_day)
    }
}

pub fn academic_year_of(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Issue détectée lors de la dérivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub start_day: NaiveDate,
    pub message: String,
}

/// Compte de cellules (assignées / total).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub assigned: u32,
    pub total: u32,
}

/// Version stockée (immuable) d'un tableau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCallSchedule {
    pub ts: DateTime<Utc>,
    pub name: String,
    pub call_schedule: CallSchedule,
    pub shift_counts: CellCounts,
    pub issue_counts: u32,
    pub backup_shift_counts: CellCounts,
    pub last_edited_by: String,
}

/// Liste append-only des versions d'une année universitaire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCallSchedules {
    pub versions: Vec<StoredCallSchedule>,
}

impl StoredCallSchedules {
    pub fn latest(&self) -> Option<&StoredCallSchedule> {
        self.versions.iter().max_by_key(|v| v.ts)
    }

    pub fn find(&self, ts: DateTime<Utc>) -> Option<&StoredCallSchedule> {
        self.versions.iter().find(|v| v.ts == ts)
    }
}
