use clap::{Args, Parser, Subcommand};
use gazette_matcher_common::{ExportFormat, MatchMode, RecordField, Session, Threshold};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gazette-matcher")]
#[command(about = "Match gazette notices against a registry spreadsheet and explore the results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API base URL (overrides config and GAZETTE_MATCHER_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a gazette PDF and a registry spreadsheet for matching
    Match {
        /// Gazette PDF
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Registry spreadsheet (.xlsx/.xls)
        #[arg(long)]
        excel: Option<PathBuf>,

        /// exact: alias-normalized, tokens: order-insensitive, fuzzy: Levenshtein
        #[arg(short, long)]
        mode: Option<MatchMode>,

        /// Similarity cutoff for fuzzy mode (0.50-0.99)
        #[arg(short, long)]
        threshold: Option<Threshold>,

        #[command(flatten)]
        view: ViewArgs,

        /// Export the filtered results into this directory afterwards
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show the records currently stored on the server
    Records {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Export stored records (search applied) to a timestamped file
    Export {
        /// Only export records matching this search
        #[arg(short, long)]
        search: Option<String>,

        /// Output format (csv/xlsx)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every stored match on the server
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or edit the configuration
    Config {
        /// Set the API base URL
        #[arg(long)]
        set_api_base: Option<String>,

        /// Show the configuration
        #[arg(long)]
        show: bool,
    },
}

/// Search, sort, grouping and paging of the displayed records.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Case-insensitive search across all text columns
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort column (court_station, cause_no, name_of_deceased, ...)
    #[arg(long)]
    pub sort: Option<RecordField>,

    /// Toggle the sort column a second time (descending)
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Expand a date group (repeatable)
    #[arg(short, long = "expand", value_name = "DATE")]
    pub expand: Vec<String>,

    /// Expand every date group
    #[arg(long)]
    pub expand_all: bool,

    /// Page of a date group, e.g. 2024-01-01=2 (repeatable)
    #[arg(short, long = "page", value_name = "DATE=N", value_parser = parse_page)]
    pub page: Vec<(String, usize)>,
}

impl ViewArgs {
    /// Apply the options to a session in the order a user would click.
    pub fn apply(&self, session: &mut Session) {
        if let Some(search) = &self.search {
            session.set_search(search.clone());
        }
        if let Some(key) = self.sort {
            session.toggle_sort(key);
            if self.desc {
                session.toggle_sort(key);
            }
        }
        if self.expand_all {
            session.expand_all();
        }
        for key in &self.expand {
            if !session.view_state().expanded.get(key).copied().unwrap_or(false) {
                session.toggle_group(key);
            }
        }
        for (key, page) in &self.page {
            session.set_page(key, *page);
        }
    }
}

fn parse_page(s: &str) -> Result<(String, usize), String> {
    let (key, page) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected DATE=N, got: {}", s))?;
    let page: usize = page
        .trim()
        .parse()
        .map_err(|_| format!("Invalid page number: {}", page))?;
    Ok((key.trim().to_string(), page))
}
