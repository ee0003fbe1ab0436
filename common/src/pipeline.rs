//! Dataset pipeline
//!
//! filter → sort → group by date → paginate per group.
//!
//! Every stage is a pure function over borrowed records. Nothing here mutates
//! the raw list; the derived view is rebuilt from the latest snapshot each
//! time any input changes. Page cursors are clamped inside the pipeline, so a
//! page outside `[1, page_count]` is never visible to callers.

use crate::collate::locale_cmp;
use crate::record::{Record, RecordField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rows per page within one date group.
pub const PAGE_SIZE: usize = 50;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Header indicator.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: RecordField,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: RecordField::DatePublished,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    /// Header click: an ascending active key flips to descending, anything
    /// else (a new key, or the active key while descending) sorts ascending.
    pub fn toggle(self, key: RecordField) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }
}

/// Per-character lowercase fold shared by the filter and the highlighter.
///
/// Final sigma folds to `σ` on both sides, so `Σ`, `σ` and `ς` all match.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

pub(crate) fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase().map(|l| if l == 'ς' { 'σ' } else { l })
}

/// Trim and case-fold a search string.
pub fn normalize_query(query: &str) -> String {
    fold_case(query.trim())
}

fn matches(record: &Record, folded_query: &str) -> bool {
    RecordField::SEARCHABLE.iter().any(|&field| {
        record
            .get(field)
            .map(|v| fold_case(v).contains(folded_query))
            .unwrap_or(false)
    })
}

/// Keep records with a searchable field containing `query`.
///
/// The query is normalized here; an empty query keeps everything.
pub fn filter<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let q = normalize_query(query);
    if q.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| matches(r, &q)).collect()
}

/// Stable sort on one column; no secondary key.
pub fn sort<'a>(records: &[&'a Record], config: SortConfig) -> Vec<&'a Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let (x, y) = (a.sort_value(config.key), b.sort_value(config.key));
        match config.direction {
            SortDirection::Asc => locale_cmp(x, y),
            SortDirection::Desc => locale_cmp(y, x),
        }
    });
    sorted
}

/// Records sharing one `date_published` bucket.
#[derive(Debug, Clone)]
pub struct DateGroup<'a> {
    pub key: String,
    pub records: Vec<&'a Record>,
}

/// Partition by date bucket, keeping first-appearance order of the buckets.
pub fn group_by_date<'a>(records: &[&'a Record]) -> Vec<DateGroup<'a>> {
    let mut groups: Vec<DateGroup<'a>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &record in records {
        let key = record.group_key();
        match index.get(key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key, groups.len());
                groups.push(DateGroup {
                    key: key.to_string(),
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Number of pages for `len` rows; an empty group still has one page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested 1-based page into the valid range for `len` rows.
pub fn clamp_page(requested: usize, len: usize, page_size: usize) -> usize {
    requested.clamp(1, page_count(len, page_size))
}

/// One date group as it should be displayed.
#[derive(Debug, Clone)]
pub struct GroupPage<'a> {
    pub key: String,
    /// Filtered records in the bucket, across all pages.
    pub total: usize,
    /// Clamped, 1-based.
    pub page: usize,
    pub page_count: usize,
    pub expanded: bool,
    /// 1-based position within the group of the first visible row.
    pub first_row_number: usize,
    pub rows: Vec<&'a Record>,
}

/// Slice every group to its current page.
pub fn paginate<'a>(
    groups: Vec<DateGroup<'a>>,
    cursors: &HashMap<String, usize>,
    expanded: &HashMap<String, bool>,
    page_size: usize,
) -> Vec<GroupPage<'a>> {
    let page_size = page_size.max(1);
    groups
        .into_iter()
        .map(|group| {
            let total = group.records.len();
            let requested = cursors.get(&group.key).copied().unwrap_or(1);
            let page = clamp_page(requested, total, page_size);
            let start = (page - 1) * page_size;
            let end = (start + page_size).min(total);
            let rows = group.records[start..end].to_vec();

            GroupPage {
                expanded: expanded.get(&group.key).copied().unwrap_or(false),
                page_count: page_count(total, page_size),
                first_row_number: start + 1,
                total,
                page,
                rows,
                key: group.key,
            }
        })
        .collect()
}

/// Fully derived view of a record list.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    /// Search-applied records in their original order (what export sees).
    pub filtered: Vec<&'a Record>,
    pub groups: Vec<GroupPage<'a>>,
    pub sort: SortConfig,
    pub query: String,
}

impl DatasetView<'_> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, key: &str) -> Option<&GroupPage<'_>> {
        self.groups.iter().find(|g| g.key == key)
    }
}

/// Run the whole pipeline.
pub fn derive_view<'a>(
    records: &'a [Record],
    query: &str,
    sort_config: SortConfig,
    cursors: &HashMap<String, usize>,
    expanded: &HashMap<String, bool>,
) -> DatasetView<'a> {
    let filtered = filter(records, query);
    let sorted = sort(&filtered, sort_config);
    let groups = group_by_date(&sorted);
    let groups = paginate(groups, cursors, expanded, PAGE_SIZE);

    DatasetView {
        filtered,
        groups,
        sort: sort_config,
        query: normalize_query(query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, court: &str, date: Option<&str>) -> Record {
        Record {
            name_of_deceased: Some(name.to_string()),
            court_station: Some(court.to_string()),
            date_published: date.map(|d| d.to_string()),
            ..Default::default()
        }
    }

    fn names<'a>(records: &[&'a Record]) -> Vec<&'a str> {
        records.iter().map(|r| r.sort_value(RecordField::NameOfDeceased)).collect()
    }

    #[test]
    fn test_filter_empty_query_is_identity() {
        let records = vec![record("A", "Nairobi", None), record("B", "Mombasa", None)];
        assert_eq!(filter(&records, "   ").len(), 2);
        assert_eq!(filter(&records, "").len(), 2);
    }

    #[test]
    fn test_filter_case_insensitive_trimmed() {
        let records = vec![
            record("JOHN KAMAU", "Nairobi", None),
            record("MARY ATIENO", "Kisumu", None),
        ];
        let hits = filter(&records, "  kamau ");
        assert_eq!(names(&hits), vec!["JOHN KAMAU"]);

        let hits = filter(&records, "KISU");
        assert_eq!(names(&hits), vec!["MARY ATIENO"]);
    }

    #[test]
    fn test_filter_folds_final_sigma_like_highlighter() {
        let records = vec![record("ΟΔΥΣΣΕΑΣ", "Nairobi", None)];
        let hits = filter(&records, "ας");
        assert_eq!(hits.len(), 1);

        let cell = crate::highlight::render_cell(hits[0].get(RecordField::NameOfDeceased), "ας");
        assert!(cell.to_html().contains("<mark>ΑΣ</mark>"), "{}", cell.to_html());
    }

    #[test]
    fn test_filter_ignores_id_and_absent_fields() {
        let records = vec![Record {
            id: Some("needle".to_string()),
            ..Default::default()
        }];
        assert!(filter(&records, "needle").is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let records = vec![record("B", "x", None), record("A", "y", None)];
        let before = records.clone();
        let filtered = filter(&records, "a");
        let _ = sort(&filtered, SortConfig::default().toggle(RecordField::NameOfDeceased));
        assert_eq!(records, before);
    }

    #[test]
    fn test_sort_asc_desc() {
        let records = vec![
            record("bravo", "", None),
            record("Alpha", "", None),
            record("charlie", "", None),
        ];
        let all = filter(&records, "");
        let asc = SortConfig { key: RecordField::NameOfDeceased, direction: SortDirection::Asc };
        assert_eq!(names(&sort(&all, asc)), vec!["Alpha", "bravo", "charlie"]);

        let desc = SortConfig { direction: SortDirection::Desc, ..asc };
        assert_eq!(names(&sort(&all, desc)), vec!["charlie", "bravo", "Alpha"]);
    }

    #[test]
    fn test_sort_absent_is_empty_string() {
        let records = vec![
            record("b", "", None),
            Record::default(),
            record("a", "", None),
        ];
        let all = filter(&records, "");
        let asc = SortConfig { key: RecordField::NameOfDeceased, direction: SortDirection::Asc };
        assert_eq!(names(&sort(&all, asc)), vec!["", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            record("first", "Nairobi", None),
            record("second", "Nairobi", None),
            record("third", "Nairobi", None),
        ];
        let all = filter(&records, "");
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let config = SortConfig { key: RecordField::CourtStation, direction };
            assert_eq!(names(&sort(&all, config)), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_toggle_sort() {
        let default = SortConfig::default();
        assert_eq!(default.direction, SortDirection::Desc);

        let date = default.toggle(RecordField::DatePublished);
        assert_eq!(date.direction, SortDirection::Asc);
        assert_eq!(date.toggle(RecordField::DatePublished).direction, SortDirection::Desc);

        let name = date.toggle(RecordField::NameOfDeceased);
        assert_eq!(name.key, RecordField::NameOfDeceased);
        assert_eq!(name.direction, SortDirection::Asc);
    }

    #[test]
    fn test_group_first_appearance_order() {
        let records = vec![
            record("a", "", Some("2024-02-02")),
            record("b", "", None),
            record("c", "", Some("2024-01-01")),
            record("d", "", Some("2024-02-02")),
            record("e", "", Some("")),
        ];
        let all = filter(&records, "");
        let groups = group_by_date(&all);

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-02-02", "Unknown Date", "2024-01-01"]);
        assert_eq!(names(&groups[0].records), vec!["a", "d"]);
        assert_eq!(names(&groups[1].records), vec!["b", "e"]);
    }

    #[test]
    fn test_paginate_120_records() {
        let records: Vec<Record> = (0..120)
            .map(|i| record(&format!("N{:03}", i), "", Some("2024-01-01")))
            .collect();

        let sizes: Vec<usize> = (1..=3)
            .map(|page| {
                let mut cursors = HashMap::new();
                cursors.insert("2024-01-01".to_string(), page);
                let view = derive_view(&records, "", SortConfig::default(), &cursors, &HashMap::new());
                let group = view.group("2024-01-01").unwrap();
                assert_eq!(group.page_count, 3);
                assert_eq!(group.page, page);
                group.rows.len()
            })
            .collect();

        assert_eq!(sizes, vec![50, 50, 20]);
    }

    #[test]
    fn test_paginate_clamps_out_of_range_cursor() {
        let records: Vec<Record> = (0..60)
            .map(|i| record(&format!("name {}", i), "", Some("2024-01-01")))
            .collect();
        let mut cursors = HashMap::new();
        cursors.insert("2024-01-01".to_string(), 9);

        let view = derive_view(&records, "", SortConfig::default(), &cursors, &HashMap::new());
        let group = view.group("2024-01-01").unwrap();
        assert_eq!(group.page, 2);
        assert_eq!(group.rows.len(), 10);
        assert_eq!(group.first_row_number, 51);

        // filter shrinks the group to one page: cursor 9 clamps to 1, never empty
        let view = derive_view(&records, "name 5", SortConfig::default(), &cursors, &HashMap::new());
        let group = view.group("2024-01-01").unwrap();
        assert_eq!(group.page, 1);
        assert_eq!(group.total, 11);
        assert_eq!(group.rows.len(), 11);
    }

    #[test]
    fn test_clamp_page_zero() {
        assert_eq!(clamp_page(0, 10, PAGE_SIZE), 1);
        assert_eq!(clamp_page(5, 0, PAGE_SIZE), 1);
        assert_eq!(page_count(0, PAGE_SIZE), 1);
        assert_eq!(page_count(100, PAGE_SIZE), 2);
        assert_eq!(page_count(101, PAGE_SIZE), 3);
    }

    #[test]
    fn test_expanded_flag_defaults_to_collapsed() {
        let records = vec![record("a", "", Some("2024-01-01")), record("b", "", Some("2024-01-02"))];
        let mut expanded = HashMap::new();
        expanded.insert("2024-01-02".to_string(), true);

        let view = derive_view(&records, "", SortConfig::default(), &HashMap::new(), &expanded);
        assert!(!view.group("2024-01-01").unwrap().expanded);
        assert!(view.group("2024-01-02").unwrap().expanded);
    }

    #[test]
    fn test_view_filtered_keeps_original_order() {
        let records = vec![
            record("b", "", Some("2024-01-01")),
            record("a", "", Some("2024-03-01")),
        ];
        let view = derive_view(&records, "", SortConfig::default(), &HashMap::new(), &HashMap::new());
        // display is date-desc, export order is the raw order
        assert_eq!(view.groups[0].key, "2024-03-01");
        assert_eq!(names(&view.filtered), vec!["b", "a"]);
    }
}
