//! Terminal rendering of a session.
//!
//! Everything here is read-only: it takes the derived view from the session
//! and turns it into text. Styling goes through `console`, which drops the
//! escape codes when stdout is not a terminal.

use dialoguer::console::style;
use gazette_matcher_common::pipeline::GroupPage;
use gazette_matcher_common::{
    render_cell, Cell, RecordField, ResultSummary, Segment, Session, SortConfig, NOT_AVAILABLE,
};

/// Shown when the raw list is empty.
pub const NO_RECORDS: &str = "No records found.";
/// Shown when the search filters everything out.
pub const NO_MATCHES: &str = "No matches found.";

/// Full report: summary, error banner and the grouped table.
pub fn render_session(session: &Session) -> String {
    let mut out = String::new();

    if let Some(summary) = session.summary() {
        out.push_str(&render_summary(summary));
        out.push('\n');
    }
    if let Some(message) = session.error() {
        out.push_str(&format!("{} {}\n\n", style("✖").red().bold(), style(sanitize(message)).red()));
    }
    out.push_str(&render_groups(session));
    out
}

pub fn render_summary(summary: &ResultSummary) -> String {
    let text = |v: Option<&str>| v.map(sanitize).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let threshold = summary
        .threshold
        .map(|t| format!("{:.2}", t))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    format!(
        "{} {}  {} {}\n{} {}  {} {}\n{} {}  {} {}\n",
        style("Mode:").bold(),
        text(summary.mode.as_deref()),
        style("Threshold:").bold(),
        threshold,
        style("Gazette:").bold(),
        count(summary.total_gazette),
        style("Excel:").bold(),
        count(summary.total_excel),
        style("Matched:").bold(),
        count(summary.matched_count),
        style("Inserted:").bold(),
        count(summary.inserted_count),
    )
}

/// Date groups in display order; expanded groups show their current page.
pub fn render_groups(session: &Session) -> String {
    if session.records().is_empty() {
        return format!("{}\n", style(NO_RECORDS).dim());
    }
    let view = session.view();
    if view.is_empty() {
        return format!("{}\n", style(NO_MATCHES).dim());
    }

    let query = &session.view_state().search;
    let mut out = String::new();
    for group in &view.groups {
        let marker = if group.expanded { "▾" } else { "▸" };
        out.push_str(&format!(
            "{} {} {}\n",
            marker,
            style(sanitize(&group.key)).cyan().bold(),
            style(format!("({})", group.total)).dim(),
        ));
        if group.expanded {
            out.push_str(&render_table(group, view.sort, query));
            out.push_str(&format!("  {}\n", style(format!("page {}/{}", group.page, group.page_count)).dim()));
        }
    }
    out
}

/// One group's visible page as an aligned table.
fn render_table(group: &GroupPage<'_>, sort: SortConfig, query: &str) -> String {
    let headers: Vec<String> = RecordField::ALL
        .iter()
        .map(|&field| {
            if field == sort.key {
                format!("{} {}", field.label(), sort.direction.arrow())
            } else {
                field.label().to_string()
            }
        })
        .collect();

    // "No." is the row position within the group, not the record id.
    let rows: Vec<Vec<Cell>> = group
        .rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            RecordField::ALL
                .iter()
                .map(|&field| match field {
                    RecordField::Id => Cell::Text(vec![Segment {
                        text: (group.first_row_number + i).to_string(),
                        highlighted: false,
                    }]),
                    _ => render_cell(record.get(field), query),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(sanitize(&cell.plain_text()).chars().count());
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| style(pad(h, h.chars().count(), w)).bold().to_string())
        .collect();
    out.push_str(&format!("  {}\n", header_line.join(" │ ")));
    let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
    out.push_str(&format!("  {}\n", rule.join("─┼─")));

    for row in &rows {
        let line: Vec<String> = row.iter().zip(&widths).map(|(cell, &w)| styled_cell(cell, w)).collect();
        out.push_str(&format!("  {}\n", line.join(" │ ")));
    }
    out
}

fn styled_cell(cell: &Cell, width: usize) -> String {
    match cell {
        Cell::NotAvailable => {
            let text = style(NOT_AVAILABLE).dim().italic().to_string();
            pad(&text, NOT_AVAILABLE.chars().count(), width)
        }
        Cell::Text(segments) => {
            let mut text = String::new();
            let mut visible = 0;
            for segment in segments {
                let clean = sanitize(&segment.text);
                visible += clean.chars().count();
                if segment.highlighted {
                    text.push_str(&style(clean).black().on_yellow().to_string());
                } else {
                    text.push_str(&clean);
                }
            }
            pad(&text, visible, width)
        }
    }
}

fn pad(text: &str, visible: usize, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(visible)))
}

/// Replace control characters so record content cannot drive the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_matcher_common::{MatchMode, MatchResponse, Record, SubmissionParameters, Threshold};

    fn record(name: Option<&str>, court: &str, date: &str) -> Record {
        Record {
            name_of_deceased: name.map(str::to_string),
            court_station: Some(court.to_string()),
            date_published: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize("a\u{1b}[2Jb"), "a\u{FFFD}[2Jb");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn test_empty_session() {
        let session = Session::new();
        assert!(render_session(&session).contains(NO_RECORDS));
    }

    #[test]
    fn test_search_with_no_hits() {
        let mut session = Session::with_records(vec![record(Some("A"), "Nairobi", "2024-01-01")]);
        session.set_search("zzz");
        assert!(render_groups(&session).contains(NO_MATCHES));
    }

    #[test]
    fn test_collapsed_groups_show_counts() {
        let session = Session::with_records(vec![
            record(Some("A"), "Nairobi", "2024-01-01"),
            record(Some("B"), "Nairobi", "2024-01-01"),
            record(Some("C"), "Mombasa", ""),
        ]);
        let text = render_groups(&session);
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("(2)"));
        assert!(text.contains("Unknown Date"));
        assert!(!text.contains("Court Station"));
    }

    #[test]
    fn test_expanded_group_table() {
        let mut session = Session::with_records(vec![
            record(None, "Nairobi Court", "2024-01-01"),
            record(Some("WANJIKU"), "Kisumu", "2024-01-01"),
        ]);
        session.toggle_group("2024-01-01");
        let text = render_groups(&session);

        assert!(text.contains("Court Station"));
        assert!(text.contains("Date Published ▼"));
        assert!(text.contains(NOT_AVAILABLE));
        assert!(text.contains("page 1/1"));
        assert!(!text.contains("undefined"));
    }

    #[test]
    fn test_row_numbers_continue_across_pages() {
        let records: Vec<Record> = (0..60).map(|i| record(Some(&format!("N{}", i)), "X", "2024-01-01")).collect();
        let mut session = Session::with_records(records);
        session.toggle_group("2024-01-01");
        session.set_page("2024-01-01", 2);
        let text = render_groups(&session);
        assert!(text.contains("page 2/2"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("51 ")));
    }

    #[test]
    fn test_summary_block() {
        let mut session = Session::new();
        let params = SubmissionParameters::new(MatchMode::Fuzzy, Threshold::new(0.9).unwrap());
        let ticket = session.begin_submission(true, true, params).unwrap();
        let response: MatchResponse = serde_json::from_str(
            r#"{"matchedRows": [], "mode": "fuzzy", "threshold": 0.9, "totalGazette": 10, "totalExcel": 4, "matchedCount": 0, "insertedCount": 0}"#,
        )
        .unwrap();
        let _ = session.complete_submission(ticket, response);

        let text = render_session(&session);
        assert!(text.contains("fuzzy"));
        assert!(text.contains("0.90"));
        assert!(text.contains("10"));
        assert!(text.contains(NO_RECORDS));
    }
}
