//! Highlight renderer
//!
//! Splits a cell value into plain and highlighted segments. The query is
//! matched literally and case-insensitively, left to right, without overlap.
//! Segments keep the original text untouched; escaping for a particular
//! output medium happens when the segments are written out.

use crate::pipeline::{fold_case, fold_char};
use serde::Serialize;

/// Text shown in place of an absent or blank value.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// A renderable cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cell {
    NotAvailable,
    Text(Vec<Segment>),
}

impl Cell {
    /// Display text without markers.
    pub fn plain_text(&self) -> String {
        match self {
            Cell::NotAvailable => NOT_AVAILABLE.to_string(),
            Cell::Text(segments) => segments.iter().map(|s| s.text.as_str()).collect(),
        }
    }

    pub fn has_highlight(&self) -> bool {
        matches!(self, Cell::Text(segments) if segments.iter().any(|s| s.highlighted))
    }

    /// HTML fragment; every segment is escaped before `<mark>` is added.
    pub fn to_html(&self) -> String {
        match self {
            Cell::NotAvailable => format!("<span class=\"not-available\">{}</span>", NOT_AVAILABLE),
            Cell::Text(segments) => segments
                .iter()
                .map(|s| {
                    let text = escape_html(&s.text);
                    if s.highlighted {
                        format!("<mark>{}</mark>", text)
                    } else {
                        text
                    }
                })
                .collect(),
        }
    }
}

/// Escape the characters that carry meaning in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one cell value for the current search.
pub fn render_cell(value: Option<&str>, query: &str) -> Cell {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Cell::NotAvailable,
    };

    let query = query.trim();
    if query.is_empty() {
        return Cell::Text(vec![Segment {
            text: value.to_string(),
            highlighted: false,
        }]);
    }

    let ranges = find_matches(value, query);
    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for (start, end) in ranges {
        if start > cursor {
            segments.push(Segment {
                text: value[cursor..start].to_string(),
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: value[start..end].to_string(),
            highlighted: true,
        });
        cursor = end;
    }
    if cursor < value.len() {
        segments.push(Segment {
            text: value[cursor..].to_string(),
            highlighted: false,
        });
    }

    Cell::Text(segments)
}

/// Byte ranges in `value` matching `query`, case-insensitively.
///
/// Folding is done per character and may change lengths (e.g. `İ`), so each
/// folded char remembers the byte span of the source char it came from.
fn find_matches(value: &str, query: &str) -> Vec<(usize, usize)> {
    let mut folded: Vec<char> = Vec::with_capacity(value.len());
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(value.len());
    for (offset, c) in value.char_indices() {
        let end = offset + c.len_utf8();
        for lower in fold_char(c) {
            folded.push(lower);
            spans.push((offset, end));
        }
    }
    let needle: Vec<char> = fold_case(query).chars().collect();
    if needle.is_empty() || needle.len() > folded.len() {
        return Vec::new();
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i + needle.len() <= folded.len() {
        if folded[i..i + needle.len()] == needle[..] {
            let start = spans[i].0;
            let end = spans[i + needle.len() - 1].1;
            let overlaps = ranges.last().map(|&(_, prev_end)| start < prev_end).unwrap_or(false);
            if !overlaps {
                ranges.push((start, end));
            }
            i += needle.len();
        } else {
            i += 1;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighted(cell: &Cell) -> Vec<String> {
        match cell {
            Cell::Text(segments) => segments
                .iter()
                .filter(|s| s.highlighted)
                .map(|s| s.text.clone())
                .collect(),
            Cell::NotAvailable => vec![],
        }
    }

    #[test]
    fn test_absent_value_is_not_available() {
        assert_eq!(render_cell(None, ""), Cell::NotAvailable);
        assert_eq!(render_cell(Some("   "), "x"), Cell::NotAvailable);
        assert_eq!(render_cell(None, "").plain_text(), "N/A");
        assert_ne!(render_cell(None, "").plain_text(), "undefined");
    }

    #[test]
    fn test_no_query_is_plain() {
        let cell = render_cell(Some("Nairobi Court"), "");
        assert_eq!(cell.plain_text(), "Nairobi Court");
        assert!(!cell.has_highlight());
    }

    #[test]
    fn test_highlight_case_insensitive_substring() {
        let cell = render_cell(Some("Nairobi Court"), "cour");
        assert_eq!(
            cell,
            Cell::Text(vec![
                Segment { text: "Nairobi ".into(), highlighted: false },
                Segment { text: "Cour".into(), highlighted: true },
                Segment { text: "t".into(), highlighted: false },
            ])
        );
        assert_eq!(cell.plain_text(), "Nairobi Court");
    }

    #[test]
    fn test_highlight_all_non_overlapping() {
        let cell = render_cell(Some("aaaa"), "aa");
        assert_eq!(highlighted(&cell), vec!["aa", "aa"]);

        let cell = render_cell(Some("aaa"), "aa");
        assert_eq!(highlighted(&cell), vec!["aa"]);
        assert_eq!(cell.plain_text(), "aaa");
    }

    #[test]
    fn test_query_is_literal() {
        let cell = render_cell(Some("E12/2024 (a)"), "(a)");
        assert_eq!(highlighted(&cell), vec!["(a)"]);

        let cell = render_cell(Some("abc"), ".*");
        assert!(!cell.has_highlight());
    }

    #[test]
    fn test_unicode_folding() {
        let cell = render_cell(Some("ÉMILE Ölz"), "émile");
        assert_eq!(highlighted(&cell), vec!["ÉMILE"]);
    }

    #[test]
    fn test_html_is_escaped_before_marking() {
        let cell = render_cell(Some("<script>alert('x')</script> Court"), "court");
        let html = cell.to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&#39;x&#39;"));
        assert!(html.ends_with("<mark>Court</mark>"));
    }

    #[test]
    fn test_query_matching_escape_sequence_is_not_marked() {
        // searching "lt" must not mark inside an escaped "&lt;"
        let cell = render_cell(Some("<b>"), "lt");
        assert_eq!(cell.to_html(), "&lt;b&gt;");
    }

    #[test]
    fn test_not_available_html() {
        assert_eq!(Cell::NotAvailable.to_html(), "<span class=\"not-available\">N/A</span>");
    }
}
