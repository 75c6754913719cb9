use serde::Serialize;

use crate::parser::lines::{self, Line};
use crate::parser::sections;

const HEADING: &str = "## 1 Basic Info";
const TITLE_URL_ANCHOR: &str = "**Card Title / URL:**";
const TYPE_ANCHOR: &str = "**Type:**";
const VERSION_ANCHOR: &str = "**Version / Date:**";
const OWNER_ANCHOR: &str = "**Owner / Contact:**";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicInfo {
    pub title: Option<String>,
    pub url: Option<String>,
    pub card_type: Option<String>,
    pub version: Option<String>,
    pub owner: Option<String>,
}

pub fn extract(doc: &[&str]) -> BasicInfo {
    let body = sections::section(doc, HEADING);
    let mut info = BasicInfo::default();

    for (i, line) in body.iter().enumerate() {
        if line.contains(TITLE_URL_ANCHOR) {
            capture_title_and_url(body, i, &mut info);
            continue;
        }
        if info.card_type.is_none() {
            info.card_type = field_value(body, i, line, TYPE_ANCHOR);
        }
        if info.version.is_none() {
            info.version = field_value(body, i, line, VERSION_ANCHOR);
        }
        if info.owner.is_none() {
            info.owner = field_value(body, i, line, OWNER_ANCHOR);
        }
    }

    info
}

/// The line after the title anchor is either the URL directly (no title
/// present) or the title, optionally followed by the URL on the line after.
fn capture_title_and_url(body: &[&str], anchor_idx: usize, info: &mut BasicInfo) {
    let Some((j, first)) = next_nonblank(body, anchor_idx + 1) else {
        return;
    };
    if is_label_line(first) {
        return;
    }
    if has_url_scheme(first) {
        if info.url.is_none() {
            info.url = Some(first.trim().to_string());
        }
        return;
    }
    if info.title.is_none() {
        info.title = Some(first.trim().to_string());
    }
    if let Some((_, second)) = next_nonblank(body, j + 1) {
        if has_url_scheme(second) && !is_label_line(second) && info.url.is_none() {
            info.url = Some(second.trim().to_string());
        }
    }
}

/// Trailing text after the anchor on the same line, else the next non-blank
/// line. Another label line is never captured as a value.
fn field_value(body: &[&str], anchor_idx: usize, line: &str, anchor: &str) -> Option<String> {
    let pos = line.find(anchor)?;
    let trailing = line[pos + anchor.len()..].trim();
    if !trailing.is_empty() {
        return Some(trailing.to_string());
    }
    let (_, next) = next_nonblank(body, anchor_idx + 1)?;
    if is_label_line(next) {
        return None;
    }
    Some(next.trim().to_string())
}

fn next_nonblank<'a>(body: &[&'a str], from: usize) -> Option<(usize, &'a str)> {
    body.iter()
        .enumerate()
        .skip(from)
        .find(|(_, l)| !matches!(lines::classify(l), Line::Blank))
        .map(|(i, l)| (i, *l))
}

fn is_label_line(line: &str) -> bool {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix("- ").unwrap_or(trimmed).trim_start();
    lines::bold_label(trimmed).is_some()
}

fn has_url_scheme(line: &str) -> bool {
    line.contains("http://") || line.contains("https://")
}

// ── Tests ──
