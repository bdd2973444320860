#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use gardes::{
    changes::{self, DiffResult},
    io,
    scheduler::{self, InferOptions, ShiftSlot},
    service::{CallScheduleService, ListRequest, LoadRequest, SaveRequest},
    storage::JsonStorage,
};
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI du tableau de gardes (stockage fichiers, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire des versions stockées (un fichier par année universitaire)
    #[arg(long, global = true, default_value = "data")]
    data_dir: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vérifier les invariants d'un tableau
    Validate {
        #[arg(long)]
        schedule: String,
    },

    /// Lister les issues détectées
    Issues {
        #[arg(long)]
        schedule: String,
        /// Export CSV des issues (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Proposer un candidat pour une cellule
    Infer {
        #[arg(long)]
        schedule: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        shift: String,
        /// Astreinte de chef plutôt que garde régulière
        #[arg(long)]
        backup: bool,
        #[arg(long)]
        skip_unavailable: bool,
        #[arg(long)]
        enable_log: bool,
    },

    /// Diff cellule par cellule entre deux tableaux
    Diff {
        #[arg(long)]
        before: String,
        #[arg(long)]
        after: String,
        /// Export JSON des actions (optionnel)
        #[arg(long)]
        out: Option<String>,
    },

    /// Rejouer des actions sur un tableau
    Apply {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        actions: String,
        #[arg(long)]
        out: String,
    },

    /// Enregistrer une nouvelle version
    Save {
        #[arg(long)]
        schedule: String,
        /// Copie d'origine : seules les modifications sont rejouées sur la dernière version
        #[arg(long)]
        initial: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "cli")]
        editor: String,
    },

    /// Charger une version
    Load {
        #[arg(long)]
        year: i32,
        /// RFC3339 UTC ; dernière version par défaut
        #[arg(long)]
        ts: Option<DateTime<Utc>>,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        out: String,
    },

    /// Lister les versions d'une année
    List {
        #[arg(long)]
        year: i32,
    },

    /// Retirer la dernière version (maintenance)
    Pop {
        #[arg(long)]
        year: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Validate { schedule } => {
            let schedule = io::read_schedule_json(schedule)?;
            scheduler::validate(&schedule)?;
            println!("OK: schedule is valid");
            0
        }
        Commands::Issues { schedule, report } => {
            let schedule = io::read_schedule_json(schedule)?;
            let processed = scheduler::derive(&schedule);
            if processed.issues.is_empty() {
                println!("OK: no issues");
                0
            } else {
                eprintln!("Found {} issue(s)", processed.issues.len());
                for issue in processed.issues.values() {
                    println!("{} | {}", issue.start_day, issue.message);
                }
                if let Some(path) = report {
                    #[cfg(feature = "csv")]
                    io::export_issues_csv(path, &processed)?;
                    #[cfg(not(feature = "csv"))]
                    bail!("--report {path} requires the `csv` feature");
                }
                // Code 2 = WARNING
                2
            }
        }
        Commands::Infer {
            schedule,
            date,
            shift,
            backup,
            skip_unavailable,
            enable_log,
        } => {
            let schedule = io::read_schedule_json(schedule)?;
            let processed = scheduler::derive(&schedule);
            let slot = if backup {
                ShiftSlot::Backup(shift)
            } else {
                ShiftSlot::Regular(shift)
            };
            let opts = InferOptions {
                skip_unavailable_people: skip_unavailable,
                enable_log,
            };
            let inference = scheduler::infer(&schedule, &processed, date, &slot, opts);
            for candidate in &inference.ranked {
                let note = inference
                    .unavailable_people
                    .get(&candidate.person)
                    .map(|u| format!(" [{}: {}]", if u.soft { "soft" } else { "hard" }, u.reason))
                    .unwrap_or_default();
                println!("{} | {:.2}{}", candidate.person, candidate.rating, note);
            }
            match inference.best {
                Some(best) => {
                    println!("best: {}", best.person);
                    0
                }
                None => {
                    eprintln!("no available candidate");
                    2
                }
            }
        }
        Commands::Diff { before, after, out } => {
            let before = io::read_schedule_json(before)?;
            let after = io::read_schedule_json(after)?;
            let actions = match changes::diff(&before, &after) {
                DiffResult::Changes { actions } => actions,
                DiffResult::Error { message } => bail!("incompatible schedules: {message}"),
            };
            print!("{}", changes::serialize(&after, &actions));
            if let Some(path) = out {
                io::write_actions_json(path, &actions)?;
            }
            0
        }
        Commands::Apply {
            schedule,
            actions,
            out,
        } => {
            let mut schedule = io::read_schedule_json(schedule)?;
            let actions = io::read_actions_json(actions)?;
            changes::apply(&mut schedule, &actions)?;
            io::write_schedule_json(out, &schedule)?;
            0
        }
        Commands::Save {
            schedule,
            initial,
            name,
            editor,
        } => {
            let service = CallScheduleService::new(JsonStorage::open(&cli.data_dir)?);
            let call_schedule = io::read_schedule_json(schedule)?;
            let initial_call_schedule = initial.map(|p| io::read_schedule_json(p)).transpose()?;
            let resp = service.save(
                SaveRequest {
                    call_schedule,
                    initial_call_schedule,
                    name,
                },
                &editor,
                Utc::now(),
            )?;
            println!("saved version {}", resp.ts.to_rfc3339());
            0
        }
        Commands::Load {
            year,
            ts,
            public,
            out,
        } => {
            let service = CallScheduleService::new(JsonStorage::open(&cli.data_dir)?);
            let mut schedule = service.load(&LoadRequest {
                ts,
                academic_year: year,
            })?;
            schedule.is_public = public;
            io::write_schedule_json(out, &schedule)?;
            0
        }
        Commands::List { year } => {
            let service = CallScheduleService::new(JsonStorage::open(&cli.data_dir)?);
            let mut versions = service.list(&ListRequest { academic_year: year })?;
            versions.sort_by(|a, b| b.ts.cmp(&a.ts));
            for v in &versions {
                println!(
                    "{} | {} | {} | shifts {}/{} | backups {}/{} | issues {}",
                    v.ts.to_rfc3339(),
                    v.name,
                    v.last_edited_by,
                    v.shift_counts.assigned,
                    v.shift_counts.total,
                    v.backup_shift_counts.assigned,
                    v.backup_shift_counts.total,
                    v.issue_counts
                );
            }
            0
        }
        Commands::Pop { year } => {
            let service = CallScheduleService::new(JsonStorage::open(&cli.data_dir)?);
            let removed = service.pop_last_version(year)?;
            println!("removed version {} ({})", removed.ts.to_rfc3339(), removed.name);
            0
        }
    };

    std::process::exit(code);
}
