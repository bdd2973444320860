use crate::changes::Action;
use crate::model::CallSchedule;
#[cfg(feature = "csv")]
use crate::scheduler::CallScheduleProcessed;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<T> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Lecture d'un tableau JSON.
pub fn read_schedule_json<P: AsRef<Path>>(path: P) -> anyhow::Result<CallSchedule> {
    read_json(path)
}

/// Export JSON d'un tableau (jolie mise en forme)
pub fn write_schedule_json<P: AsRef<Path>>(path: P, schedule: &CallSchedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn read_actions_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Action>> {
    read_json(path)
}

pub fn write_actions_json<P: AsRef<Path>>(path: P, actions: &[Action]) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(actions)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des issues: header `key,start_day,message`
#[cfg(feature = "csv")]
pub fn export_issues_csv<P: AsRef<Path>>(
    path: P,
    processed: &CallScheduleProcessed,
) -> anyhow::Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["key", "start_day", "message"])?;
    let mut issues: Vec<_> = processed.issues.iter().collect();
    issues.sort_by(|(ka, a), (kb, b)| a.start_day.cmp(&b.start_day).then(ka.cmp(kb)));
    for (key, issue) in issues {
        let day = issue.start_day.to_string();
        w.write_record([key.as_str(), day.as_str(), issue.message.as_str()])?;
    }
    w.flush()?;
    Ok(())
}
