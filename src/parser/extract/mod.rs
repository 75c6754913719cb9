pub mod basic_info;
pub mod gaps;
pub mod scoring;
pub mod standards;

use serde::Serialize;

use super::score::{self, NormalizedScore, DEFAULT_MAX_TOTAL};
use self::basic_info::BasicInfo;
use self::gaps::GapsRecord;
use self::scoring::{CategoryScore, ScoringResult};
use self::standards::StandardsSummary;

pub const SCORE_PARSED: &str = "Score parsed from evaluation template.";
pub const SCORE_MISSING: &str = "Could not parse score.";

/// Everything the grading layer consumes for one filled evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardReport {
    pub basic_info: BasicInfo,
    pub categories: Vec<CategoryScore>,
    pub raw_total: Option<f64>,
    pub standards: StandardsSummary,
    pub gaps: GapsRecord,
    pub score: NormalizedScore,
    pub details: String,
}

pub fn extract_all(doc: &[&str]) -> CardReport {
    let basic_info = basic_info::extract(doc);
    let ScoringResult { categories, raw_total } = scoring::extract(doc);
    let standards = standards::extract(doc);
    let gaps = gaps::extract(doc);
    let score = score::normalize(raw_total, DEFAULT_MAX_TOTAL);

    let details = if score.value.is_some() { SCORE_PARSED } else { SCORE_MISSING };

    CardReport {
        basic_info,
        categories,
        raw_total,
        standards,
        gaps,
        score,
        details: details.to_string(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::score::ScoreLabel;

    fn report(fixture: &str) -> CardReport {
        let md = std::fs::read_to_string(format!("tests/fixtures/{}.md", fixture)).unwrap();
        let doc: Vec<&str> = md.lines().collect();
        extract_all(&doc)
    }

    #[test]
    fn llama3_full_report() {
        let r = report("llama3");

        assert_eq!(r.basic_info.title.as_deref(), Some("Meta-Llama-3-8B-Instruct"));
        assert_eq!(
            r.basic_info.url.as_deref(),
            Some("https://huggingface.co/meta-llama/Meta-Llama-3-8B-Instruct")
        );
        assert_eq!(r.basic_info.card_type.as_deref(), Some("Model card"));
        assert_eq!(r.basic_info.version.as_deref(), Some("April 18, 2024"));
        assert_eq!(r.basic_info.owner.as_deref(), Some("Meta AI"));

        assert_eq!(r.categories.len(), 10);
        assert_eq!(r.raw_total, Some(22.0));

        assert_eq!(r.standards.present, 5);
        assert_eq!(r.standards.partial, 1);
        assert_eq!(r.standards.missing, 2);
        assert_eq!(r.standards.total_items, 8);
        assert_eq!(
            r.standards.missing_items,
            vec!["Bias & fairness analysis", "Energy / carbon footprint"]
        );

        assert!(r.gaps.missing.as_deref().unwrap().contains("carbon footprint"));
        assert!(r.gaps.inconsistent.is_some());
        assert!(r.gaps.ambiguous.is_some());

        let value = r.score.value.unwrap();
        assert!((value - 73.333).abs() < 0.01);
        assert_eq!(r.score.label, Some(ScoreLabel::Good));
        assert_eq!(r.details, SCORE_PARSED);
    }

    #[test]
    fn sparse_report_degrades_to_absent() {
        let r = report("sparse");

        // Scenario E: the line after the title anchor is directly a URL.
        assert_eq!(r.basic_info.title, None);
        assert_eq!(r.basic_info.url.as_deref(), Some("https://huggingface.co/datasets/example"));
        assert_eq!(r.basic_info.card_type, None);

        // Scenario D: no scoring heading at all.
        assert!(r.categories.is_empty());
        assert_eq!(r.raw_total, None);
        assert_eq!(r.score.value, None);
        assert_eq!(r.score.label, None);

        assert_eq!(r.standards, StandardsSummary::default());
        assert_eq!(r.gaps, GapsRecord::default());
        assert_eq!(r.details, SCORE_MISSING);
    }

    #[test]
    fn extraction_is_idempotent() {
        let md = std::fs::read_to_string("tests/fixtures/llama3.md").unwrap();
        let doc: Vec<&str> = md.lines().collect();
        assert_eq!(extract_all(&doc), extract_all(&doc));
    }

    #[test]
    fn empty_document() {
        let r = extract_all(&[]);
        assert_eq!(r.basic_info, BasicInfo::default());
        assert!(r.categories.is_empty());
        assert_eq!(r.details, SCORE_MISSING);
    }
}
