//! Grouped, sortable, paginated result tables

use gazette_matcher_common::{render_cell, Record, RecordField, Session, SortConfig};
use leptos::prelude::*;

/// Owned copy of one date group, taken from the session's derived view.
#[derive(Clone)]
struct GroupModel {
    key: String,
    total: usize,
    page: usize,
    page_count: usize,
    expanded: bool,
    first_row_number: usize,
    rows: Vec<Record>,
}

struct TableModel {
    has_records: bool,
    groups: Vec<GroupModel>,
    sort: SortConfig,
    query: String,
}

fn snapshot(session: &Session) -> TableModel {
    let view = session.view();
    let groups = view
        .groups
        .iter()
        .map(|g| GroupModel {
            key: g.key.clone(),
            total: g.total,
            page: g.page,
            page_count: g.page_count,
            expanded: g.expanded,
            first_row_number: g.first_row_number,
            // collapsed groups render no rows
            rows: if g.expanded { g.rows.iter().map(|r| (*r).clone()).collect() } else { Vec::new() },
        })
        .collect();

    TableModel {
        has_records: !session.records().is_empty(),
        groups,
        sort: view.sort,
        query: session.view_state().search.clone(),
    }
}

#[component]
pub fn ResultsTable(session: RwSignal<Session>) -> impl IntoView {
    move || {
        let model = session.with(snapshot);

        if !model.has_records {
            return view! { <p class="text-muted">"No records found."</p> }.into_any();
        }
        if model.groups.is_empty() {
            return view! { <p class="text-muted">"No matches found."</p> }.into_any();
        }

        let sort = model.sort;
        let query = model.query;
        model
            .groups
            .into_iter()
            .map(|group| group_section(group, sort, &query, session))
            .collect_view()
            .into_any()
    }
}

fn group_section(group: GroupModel, sort: SortConfig, query: &str, session: RwSignal<Session>) -> impl IntoView {
    let toggle_key = group.key.clone();
    let marker = if group.expanded { "▾" } else { "▸" };

    let body = group.expanded.then(|| {
        view! {
            <table class="results-table">
                <thead>
                    <tr>{header_row(sort, session)}</tr>
                </thead>
                <tbody>
                    {group
                        .rows
                        .iter()
                        .enumerate()
                        .map(|(i, record)| record_row(group.first_row_number + i, record, query))
                        .collect_view()}
                </tbody>
            </table>
            {pager(group.key.clone(), group.page, group.page_count, session)}
        }
    });

    view! {
        <section class="date-group">
            <button
                class="group-header"
                on:click=move |_| session.update(|s| s.toggle_group(&toggle_key))
            >
                {marker} " " {group.key.clone()} " (" {group.total} ")"
            </button>
            {body}
        </section>
    }
}

fn header_row(sort: SortConfig, session: RwSignal<Session>) -> impl IntoView {
    RecordField::ALL
        .iter()
        .map(|&field| {
            let arrow = (field == sort.key).then(|| format!(" {}", sort.direction.arrow()));
            view! {
                <th class="sortable" on:click=move |_| session.update(|s| s.toggle_sort(field))>
                    {field.label()}
                    {arrow}
                </th>
            }
        })
        .collect_view()
}

/// "No." is the position within the group; the other cells are escaped
/// before highlight markers are added.
fn record_row(number: usize, record: &Record, query: &str) -> impl IntoView {
    let cells = RecordField::ALL
        .iter()
        .filter(|&&field| field != RecordField::Id)
        .map(|&field| {
            let html = render_cell(record.get(field), query).to_html();
            view! { <td inner_html=html></td> }
        })
        .collect_view();

    view! {
        <tr>
            <td>{number}</td>
            {cells}
        </tr>
    }
}

fn pager(key: String, page: usize, page_count: usize, session: RwSignal<Session>) -> impl IntoView {
    (page_count > 1).then(|| {
        let prev_key = key.clone();
        let next_key = key.clone();
        view! {
            <div class="pager">
                <button
                    disabled={page <= 1}
                    on:click=move |_| session.update(|s| s.prev_page(&prev_key))
                >
                    "Prev"
                </button>
                {(1..=page_count)
                    .map(|n| {
                        let key = key.clone();
                        view! {
                            <button
                                class:active={n == page}
                                on:click=move |_| session.update(|s| s.set_page(&key, n))
                            >
                                {n}
                            </button>
                        }
                    })
                    .collect_view()}
                <button
                    disabled={page >= page_count}
                    on:click=move |_| session.update(|s| s.next_page(&next_key))
                >
                    "Next"
                </button>
            </div>
        }
    })
}
