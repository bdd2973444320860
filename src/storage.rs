use crate::model::StoredCallSchedules;
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stockage des versions, un document append-only par année universitaire.
pub trait Storage {
    /// Charge toutes les versions d'une année (liste vide si rien n'est stocké).
    fn load(&self, academic_year: i32) -> anyhow::Result<StoredCallSchedules>;
    /// Sauvegarde de manière atomique.
    fn save(&self, academic_year: i32, versions: &StoredCallSchedules) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, academic_year: i32) -> PathBuf {
        self.dir.join(format!("call-schedule-{academic_year}.json"))
    }
}

impl Storage for JsonStorage {
    fn load(&self, academic_year: i32) -> anyhow::Result<StoredCallSchedules> {
        let path = self.path_for(academic_year);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(StoredCallSchedules::default())
            }
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        };
        let versions: StoredCallSchedules = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(versions)
    }

    fn save(&self, academic_year: i32, versions: &StoredCallSchedules) -> anyhow::Result<()> {
        let path = self.path_for(academic_year);
        let json = serde_json::to_vec_pretty(versions)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
