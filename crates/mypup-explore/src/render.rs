//! Writes a result page in the selected output format.

use anyhow::Result;
use mypup_query::{FieldValue, Page, PageLink, QueryProfile, Record};

use crate::cli::OutputFormat;

/// Numbered links shown in the text pager.
const PAGER_WIDTH: usize = 7;

pub fn render(page: &Page<&Record>, profile: &QueryProfile, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(page, profile)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(page)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(page)?),
    }
}

/// One line per record, then a footer and the pager.
pub fn render_text(page: &Page<&Record>, profile: &QueryProfile) -> String {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str("No matching records.\n");
    }
    for record in &page.items {
        out.push_str(&record_line(record, &profile.searchable_fields));
        out.push('\n');
    }

    out.push_str(&format!(
        "Showing {}-{} of {} (page {}/{})\n",
        page.start_index, page.end_index, page.total_items, page.current_page, page.total_pages
    ));
    if page.total_pages > 1 {
        out.push_str(&pager(page));
        out.push('\n');
    }
    out
}

fn record_line(record: &Record, fields: &[String]) -> String {
    let id = record.get("id").map(display).unwrap_or_else(|| "-".to_string());
    let mut line = format!("[{id}]");
    for field in fields {
        match record.get(field) {
            None | Some(FieldValue::Null) => {}
            Some(value) => {
                line.push_str("  ");
                line.push_str(&display(value));
            }
        }
    }
    line
}

fn display(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::List(items) => items.join(", "),
    }
}

fn pager(page: &Page<&Record>) -> String {
    let links: Vec<String> = page
        .state()
        .page_links(PAGER_WIDTH)
        .into_iter()
        .map(|link| match link {
            PageLink::Page(n) if n == page.current_page => format!("[{n}]"),
            PageLink::Page(n) => n.to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect();
    links.join(" ")
}
