//! # Report Publisher
//! Renders the alert list to markdown, persists it, then hands it to the notifiers.
//!
//! Persistence is the only fatal step of a run. Notifications come after it
//! and can never undo or block it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::listing::Listing;
use crate::notify::NotifierMux;

pub const NO_MATCHES_LINE: &str = "No strong matches today based on your keywords/threshold.";

pub fn report_subject(date: NaiveDate) -> String {
    format!("Internship Intelligence Digest - {}", date.format("%Y-%m-%d"))
}

/// Markdown digest: dated title, then one section per listing or the no-matches line.
pub fn render_report(date: NaiveDate, alerts: &[Listing]) -> String {
    let mut lines = vec![format!("# {}\n", report_subject(date))];

    if alerts.is_empty() {
        lines.push(format!("{NO_MATCHES_LINE}\n"));
    } else {
        for j in alerts {
            lines.push(format!(
                "## {}\n- Source: {}\n- Company: {}\n- Location: {}\n- Score: {}/10\n- Why: {}\n- Link: {}\n",
                j.title,
                j.source,
                j.company,
                j.location,
                j.score_or_zero(),
                j.reason.as_deref().unwrap_or_default(),
                j.url
            ));
        }
    }

    lines.join("\n")
}

/// Durable sink for the rendered digest.
pub trait ReportStore: Send + Sync {
    /// Write the report for `date`; returns the paths written.
    fn persist(&self, date: NaiveDate, report: &str) -> Result<Vec<PathBuf>>;
}

/// `out/digest_YYYY-MM-DD.md` plus an always-overwritten `latest_report.md`.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    pub out_dir: PathBuf,
    pub latest_path: PathBuf,
}

impl Default for FileReportStore {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            latest_path: PathBuf::from("latest_report.md"),
        }
    }
}

impl FileReportStore {
    pub fn new(out_dir: impl Into<PathBuf>, latest_path: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            latest_path: latest_path.into(),
        }
    }

    pub fn dated_path(&self, date: NaiveDate) -> PathBuf {
        self.out_dir
            .join(format!("digest_{}.md", date.format("%Y-%m-%d")))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("writing report to {}", path.display()))
}

impl ReportStore for FileReportStore {
    fn persist(&self, date: NaiveDate, report: &str) -> Result<Vec<PathBuf>> {
        let dated = self.dated_path(date);
        write_file(&dated, report)?;
        write_file(&self.latest_path, report)?;
        Ok(vec![dated, self.latest_path.clone()])
    }
}

/// Render, persist (errors propagate), then notify (errors swallowed). Returns the report text.
pub async fn publish(
    date: NaiveDate,
    alerts: &[Listing],
    store: &dyn ReportStore,
    notifiers: &NotifierMux,
) -> Result<String> {
    let report = render_report(date, alerts);

    let paths = store.persist(date, &report).context("persisting digest")?;
    tracing::info!(paths = ?paths, alerts = alerts.len(), "digest persisted");

    let summary = notifiers.notify_all(&report_subject(date), &report).await;
    tracing::info!(
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        "notifications dispatched"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 6).unwrap()
    }

    #[test]
    fn empty_alerts_render_no_matches_line() {
        let r = render_report(date(), &[]);
        assert!(r.starts_with("# Internship Intelligence Digest - 2025-09-06"));
        assert!(r.contains(NO_MATCHES_LINE));
        assert!(!r.contains("## "));
    }

    #[test]
    fn every_field_is_rendered_in_order() {
        let a = Listing {
            source: "Remotive".into(),
            title: "Data Science Intern".into(),
            company: "Acme".into(),
            location: "India".into(),
            url: "https://jobs.test/a".into(),
            score: Some(8),
            reason: Some("Strong DS match".into()),
            ..Default::default()
        };
        let b = Listing {
            title: "NLP Intern".into(),
            score: Some(7),
            ..Default::default()
        };
        let r = render_report(date(), &[a, b]);
        for needle in [
            "## Data Science Intern",
            "- Source: Remotive",
            "- Company: Acme",
            "- Location: India",
            "- Score: 8/10",
            "- Why: Strong DS match",
            "- Link: https://jobs.test/a",
        ] {
            assert!(r.contains(needle), "missing {needle}");
        }
        assert!(r.find("Data Science Intern").unwrap() < r.find("NLP Intern").unwrap());
        assert!(!r.contains(NO_MATCHES_LINE));
    }

    #[test]
    fn file_store_writes_dated_and_latest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(tmp.path().join("out"), tmp.path().join("latest_report.md"));
        let paths = store.persist(date(), "first").unwrap();
        assert_eq!(paths[0], tmp.path().join("out/digest_2025-09-06.md"));
        store.persist(date(), "second").unwrap();
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "second");
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "second");
    }
}
