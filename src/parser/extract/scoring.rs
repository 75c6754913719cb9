use serde::Serialize;

use crate::parser::lines;
use crate::parser::sections;
use crate::parser::table;

const HEADING: &str = "## 4 Scoring";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringResult {
    pub categories: Vec<CategoryScore>,
    /// Total read verbatim from the document's total row; never recomputed
    /// from the category scores.
    pub raw_total: Option<f64>,
}

pub fn extract(doc: &[&str]) -> ScoringResult {
    let body = sections::section(doc, HEADING);
    let mut result = ScoringResult::default();

    for line in body {
        let Some(cells) = table::parse_row(line) else {
            continue;
        };
        if table::is_header_row(&cells) || table::is_separator_row(&cells) {
            continue;
        }
        let Some(name_cell) = cells.first() else {
            continue;
        };
        // Rows without a digit run in the score cell are not data.
        let Some(score) = cells.get(1).and_then(|c| lines::digit_run(c)) else {
            continue;
        };
        if name_cell.to_lowercase().contains("total") {
            // Last total row wins.
            result.raw_total = Some(f64::from(score));
        } else {
            result.categories.push(CategoryScore {
                name: lines::strip_emphasis(name_cell),
                score: Some(score),
            });
        }
    }

    result
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_total() {
        let doc = [
            "## 4 Scoring (0\u{2013}3 per category)",
            "| Category | Score | Notes |",
            "|----------|-------|-------|",
            "| Clarity | 3 | |",
            "| Completeness | 2 | |",
            "| **Total (/30)** | 5 | |",
        ];
        let r = extract(&doc);
        assert_eq!(r.categories.len(), 2);
        assert_eq!(r.categories[0], CategoryScore { name: "Clarity".into(), score: Some(3) });
        assert_eq!(r.categories[1], CategoryScore { name: "Completeness".into(), score: Some(2) });
        assert_eq!(r.raw_total, Some(5.0));
    }

    #[test]
    fn missing_section_is_empty() {
        let doc = ["## 1 Basic Info", "- **Type:** Model card"];
        let r = extract(&doc);
        assert!(r.categories.is_empty());
        assert_eq!(r.raw_total, None);
    }

    #[test]
    fn rows_without_digits_are_skipped() {
        let doc = [
            "## 4 Scoring",
            "| Clarity | 3 |",
            "| Completeness | n/a |",
            "| Licensing | - |",
        ];
        let r = extract(&doc);
        assert_eq!(r.categories.len(), 1);
        assert_eq!(r.categories[0].name, "Clarity");
    }

    #[test]
    fn digit_run_extracted_from_noisy_cell() {
        let doc = ["## 4 Scoring", "| Clarity | **2** / 3 |"];
        let r = extract(&doc);
        assert_eq!(r.categories[0].score, Some(2));
    }

    #[test]
    fn total_detected_case_insensitively() {
        let doc = ["## 4 Scoring", "| TOTAL | 21 |"];
        assert_eq!(extract(&doc).raw_total, Some(21.0));
    }

    #[test]
    fn last_total_row_wins() {
        let doc = ["## 4 Scoring", "| Total | 10 |", "| Total (/30) | 12 |"];
        assert_eq!(extract(&doc).raw_total, Some(12.0));
    }

    #[test]
    fn total_row_is_not_a_category() {
        let doc = ["## 4 Scoring", "| **Total (/30)** | 22 |"];
        assert!(extract(&doc).categories.is_empty());
    }

    #[test]
    fn stated_total_trusted_even_when_inconsistent() {
        let doc = [
            "## 4 Scoring",
            "| Clarity | 3 |",
            "| Completeness | 2 |",
            "| Total | 28 |",
        ];
        assert_eq!(extract(&doc).raw_total, Some(28.0));
    }
}
