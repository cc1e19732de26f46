//! Text and JSON rendering for command results.

use std::fmt::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use eduform_client::RecommendationResults;
use eduform_core::{EntryMeta, GroupedProgram, InstitutionRecord, Page, Suggestion};

/// Writes command output to stdout.
pub(crate) struct Printer {
    json: bool,
}

#[derive(Serialize)]
struct MatchRow<'a> {
    score: f64,
    #[serde(flatten)]
    record: &'a InstitutionRecord,
}

#[derive(Serialize)]
struct RecommendationOutput<'a> {
    explanation: &'a str,
    unresolved: usize,
    page: &'a Page<GroupedProgram>,
}

impl Printer {
    pub(crate) fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        let out = if self.json { serde_json::to_string_pretty(value)? } else { text() };
        println!("{}", out.trim_end());
        Ok(())
    }

    pub(crate) fn names(&self, names: &[String]) -> Result<()> {
        self.emit(&names, || {
            if names.is_empty() {
                return "(none)".to_string();
            }
            names.join("\n")
        })
    }

    pub(crate) fn matches(&self, query: &str, matches: &[Suggestion]) -> Result<()> {
        let rows: Vec<MatchRow> = matches.iter().map(|s| MatchRow { score: s.score, record: &s.record }).collect();
        self.emit(&rows, || {
            if matches.is_empty() {
                return format!("No institutions match \"{query}\".");
            }
            let mut out = String::new();
            for s in matches {
                let _ = writeln!(out, "{:.2}  {}  ({})", s.score, s.record.name, s.record.location_label());
            }
            out
        })
    }

    pub(crate) fn records(&self, records: &[InstitutionRecord]) -> Result<()> {
        self.emit(&records, || records.iter().map(record_block).collect::<Vec<_>>().join("\n"))
    }

    pub(crate) fn table(&self, page: &Page<InstitutionRecord>) -> Result<()> {
        self.emit(page, || {
            if page.items.is_empty() {
                return "No institutions match the selected filters.".to_string();
            }
            let mut out = String::new();
            for r in &page.items {
                let duration = r.duration_years.map(|d| format!("{d} yr")).unwrap_or_default();
                let _ = writeln!(out, "{} | {} | {} | {}", r.program_name, r.name, r.location_label(), duration);
            }
            out.push_str(&pager(page));
            out
        })
    }

    pub(crate) fn recommendation(&self, results: &RecommendationResults, page: &Page<GroupedProgram>) -> Result<()> {
        let output = RecommendationOutput { explanation: &results.explanation, unresolved: results.unresolved, page };
        self.emit(&output, || {
            let mut out = String::new();
            if !results.explanation.is_empty() {
                let _ = writeln!(out, "{}\n", results.explanation);
            }
            if results.is_empty() {
                out.push_str("No programs were recommended for these interests and filters.");
                return out;
            }
            for group in &page.items {
                let _ = writeln!(out, "== {} ==", group.program_name);
                for school in &group.schools {
                    let _ = writeln!(out, "  {}", record_block(school).replace('\n', "\n  "));
                }
            }
            out.push_str(&pager(page));
            out
        })
    }

    pub(crate) fn cache_entries(&self, location: &str, entries: &[EntryMeta], ttl: Duration) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.emit(&entries, || {
            if entries.is_empty() {
                return format!("Cache at {location} is empty.");
            }
            let mut out = format!("cache: {location}\n");
            for e in entries {
                let written = DateTime::<Utc>::from_timestamp_millis(e.written_at)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| e.written_at.to_string());
                let status = if now - e.written_at < ttl_ms { "fresh" } else { "expired" };
                let _ = writeln!(out, "{}  {}  {} bytes  {}", e.key, written, e.size_bytes, status);
            }
            out
        })
    }

    pub(crate) fn deleted(&self, deleted: u64) -> Result<()> {
        self.emit(&serde_json::json!({ "deleted": deleted }), || format!("Deleted {deleted} cache entries."))
    }
}

fn record_block(r: &InstitutionRecord) -> String {
    let mut out = format!("{} ({})", r.name, r.location_label());
    if !r.address.is_empty() {
        let _ = write!(out, "\n{}", r.address);
    }
    if !r.phones.is_empty() {
        let _ = write!(out, "\ntel: {}", r.phones.join(", "));
    }
    if !r.emails.is_empty() {
        let _ = write!(out, "\nemail: {}", r.emails.join(", "));
    }
    if let Some(web) = &r.website {
        let _ = write!(out, "\nweb: {web}");
    }
    out
}

fn pager<T>(page: &Page<T>) -> String {
    if page.show_pager() { format!("\npage {} of {}", page.current_page, page.total_pages) } else { String::new() }
}
