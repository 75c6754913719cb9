use serde::Serialize;

use crate::parser::sections;
use crate::parser::table;

const HEADING: &str = "## 2 Standards Comparison";
const TABLE_HEADER: &str = "Standard Item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StandardsStatus {
    Present,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandardsSummary {
    pub present: usize,
    pub partial: usize,
    pub missing: usize,
    /// Rows with a recognized status only; always present + partial + missing.
    pub total_items: usize,
    pub missing_items: Vec<String>,
    pub partial_items: Vec<String>,
}

pub fn extract(doc: &[&str]) -> StandardsSummary {
    let body = sections::section(doc, HEADING);
    let mut summary = StandardsSummary::default();

    // Stray pipe-containing lines before the real header are not data.
    let mut in_table = false;

    for line in body {
        let Some(cells) = table::parse_row(line) else {
            continue;
        };
        let first = cells.first().map(String::as_str).unwrap_or("");
        if !in_table {
            in_table = first == TABLE_HEADER;
            continue;
        }
        if table::is_separator_row(&cells) {
            continue;
        }
        if first.is_empty() || first == TABLE_HEADER {
            continue;
        }
        let Some(status) = cells.get(1).and_then(|c| status_symbol(c)) else {
            // Unrecognized status: the row joins no count and no list.
            continue;
        };

        summary.total_items += 1;
        match status {
            StandardsStatus::Present => summary.present += 1,
            StandardsStatus::Partial => {
                summary.partial += 1;
                summary.partial_items.push(first.to_string());
            }
            StandardsStatus::Missing => {
                summary.missing += 1;
                summary.missing_items.push(first.to_string());
            }
        }
    }

    summary
}

/// Symbol match in priority order: ✓ before ~ before ✗/x.
fn status_symbol(cell: &str) -> Option<StandardsStatus> {
    if cell.contains('✓') {
        Some(StandardsStatus::Present)
    } else if cell.contains('~') {
        Some(StandardsStatus::Partial)
    } else if cell.contains('✗') || cell.eq_ignore_ascii_case("x") {
        Some(StandardsStatus::Missing)
    } else {
        None
    }
}

// ── Tests ──
