//! Command-line arguments and their translation into a query.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mypup_query::{FilterSpec, ListingQuery, PageRequest, QueryProfile, SortKey};

/// Search, filter, sort and page a JSON file of MY PUP records.
#[derive(Debug, Parser)]
#[command(name = "mypup-explore", version, about)]
pub struct Args {
    /// JSON file holding an array of records.
    pub records: PathBuf,

    /// Built-in record domain.
    #[arg(short, long, value_enum, default_value_t = Domain::Listings)]
    pub domain: Domain,

    /// YAML or JSON profile replacing the built-in domain profile.
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Free-text search term.
    #[arg(short = 'q', long = "query", default_value = "")]
    pub term: String,

    /// Filter as key=value; repeatable. Ranges are lo..hi, lists a,b,c.
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Sort key.
    #[arg(short, long, default_value = "newest", value_parser = parse_sort_key)]
    pub sort: SortKey,

    /// Page number (1-based). Out-of-range values are clamped.
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub page: f64,

    /// Items per page; defaults to the profile's page size.
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub per_page: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the effective profile as YAML and exit.
    #[arg(long)]
    pub print_profile: bool,

    /// Log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    Listings,
    Education,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Listings => "listings",
            Domain::Education => "education",
        }
    }
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per record plus a pager footer.
    Text,
    /// The page serialized as JSON.
    Json,
    /// The page serialized as YAML.
    Yaml,
}

fn parse_sort_key(s: &str) -> std::result::Result<SortKey, String> {
    s.parse::<SortKey>().map_err(|e| {
        let names: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
        format!("{e} (expected one of: {})", names.join(", "))
    })
}

impl Args {
    /// Loads the profile from `--profile`, or the built-in domain profile.
    pub fn load_profile(&self) -> Result<QueryProfile> {
        let Some(path) = &self.profile else {
            return Ok(QueryProfile::builtin(self.domain.as_str())?);
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let profile = if is_json {
            QueryProfile::from_json_str(&text)
        } else {
            QueryProfile::from_yaml_str(&text)
        };
        profile.with_context(|| format!("failed to parse profile {}", path.display()))
    }

    /// Builds the query described by the arguments.
    pub fn to_query(&self) -> Result<ListingQuery> {
        let filters = FilterSpec::from_exprs(&self.filters)?;
        let mut query = ListingQuery::new()
            .search(self.term.clone())
            .filters(filters)
            .sort_by(self.sort);

        match self.per_page {
            Some(per_page) => query = query.request(PageRequest::from_raw(self.page, per_page)),
            None => query = query.page(PageRequest::from_raw(self.page, 1.0).page),
        }
        Ok(query)
    }
}
