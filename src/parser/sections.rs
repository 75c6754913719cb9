use super::lines::{self, Line};

/// Slice of `doc` strictly between the first line whose trimmed content
/// starts with `anchor` and the next `##` heading or horizontal rule, or the
/// end of the document. An absent heading yields an empty slice, never an
/// error; downstream extractors then report all-absent fields.
pub fn section<'a>(doc: &'a [&'a str], anchor: &str) -> &'a [&'a str] {
    let Some(start) = doc.iter().position(|l| l.trim().starts_with(anchor)) else {
        return &[];
    };
    let body = &doc[start + 1..];
    let end = body.iter().position(|l| is_boundary(l)).unwrap_or(body.len());
    &body[..end]
}

fn is_boundary(line: &str) -> bool {
    match lines::classify(line) {
        Line::Rule => true,
        Line::Heading { level, .. } => level >= 2,
        _ => false,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[&str] = &[
        "# AI Card Review",
        "",
        "## 1 Basic Info",
        "- **Type:** Model card",
        "",
        "---",
        "",
        "## 4 Scoring (0\u{2013}3 per category)",
        "| Category | Score |",
        "| Clarity | 3 |",
    ];

    #[test]
    fn bounded_by_rule() {
        let body = section(DOC, "## 1 Basic Info");
        assert_eq!(body, &["- **Type:** Model card", ""]);
    }

    #[test]
    fn runs_to_end_of_document() {
        let body = section(DOC, "## 4 Scoring");
        assert_eq!(body, &["| Category | Score |", "| Clarity | 3 |"]);
    }

    #[test]
    fn bounded_by_next_heading() {
        let doc = ["## 2 Standards Comparison", "| a | ✓ |", "## 3 Gaps & Inconsistencies", "- x"];
        let body = section(&doc, "## 2 Standards Comparison");
        assert_eq!(body, &["| a | ✓ |"]);
    }

    #[test]
    fn subheading_also_terminates() {
        let doc = ["## 1 Basic Info", "text", "### Notes", "more"];
        assert_eq!(section(&doc, "## 1 Basic Info"), &["text"]);
    }

    #[test]
    fn top_level_heading_does_not_terminate() {
        let doc = ["## 1 Basic Info", "text", "# Appendix", "more"];
        assert_eq!(section(&doc, "## 1 Basic Info"), &["text", "# Appendix", "more"]);
    }

    #[test]
    fn missing_heading_is_empty() {
        assert!(section(DOC, "## 9 Nope").is_empty());
    }

    #[test]
    fn heading_matched_after_trim() {
        let doc = ["   ## 1 Basic Info  ", "value"];
        assert_eq!(section(&doc, "## 1 Basic Info"), &["value"]);
    }
}
