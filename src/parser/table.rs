use super::lines::{self, Line};

/// First-cell labels that mark a row as table chrome rather than data.
const HEADER_LABELS: &[&str] = &["category", "standard item"];

/// Split a pipe-delimited markdown row into trimmed cells. Returns `None`
/// for anything that is not a table row. The empty cells produced by the
/// row's bounding pipes are dropped; interior empty cells are kept.
pub fn parse_row(line: &str) -> Option<Vec<String>> {
    let Line::TableRow(row) = lines::classify(line) else {
        return None;
    };
    let mut cells: Vec<String> = row.split('|').map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    Some(cells)
}

pub fn is_header_row(cells: &[String]) -> bool {
    cells
        .first()
        .is_some_and(|c| HEADER_LABELS.iter().any(|h| c.eq_ignore_ascii_case(h)))
}

/// `|---|:---:|` style alignment rows under a header.
pub fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

// ── Tests ──
