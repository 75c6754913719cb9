use std::sync::LazyLock;

use regex::Regex;

static BOLD_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+):\*\*\s*(.*)$").unwrap());
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3,}$").unwrap());
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Shape of a single evaluation line. Classification looks only at the line
/// itself; section context is the scanner's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Heading { level: usize, text: &'a str },
    Rule,
    TableRow(&'a str),
    BoldBullet { label: &'a str, rest: &'a str },
    Bullet(&'a str),
    Blank,
    Other(&'a str),
}

pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();

    if line.is_empty() {
        return Line::Blank;
    }
    if RULE_RE.is_match(line) {
        return Line::Rule;
    }
    if line.starts_with('#') {
        let level = line.chars().take_while(|c| *c == '#').count();
        return Line::Heading {
            level,
            text: line.trim_start_matches('#').trim(),
        };
    }
    if line.starts_with('|') {
        return Line::TableRow(line);
    }
    if let Some(rest) = line.strip_prefix("- ") {
        let rest = rest.trim_start();
        if let Some((label, text)) = bold_label(rest) {
            return Line::BoldBullet { label, rest: text };
        }
        return Line::Bullet(rest);
    }

    Line::Other(line)
}

/// Split a `**Label:** trailing text` string into label and trailing text.
pub fn bold_label(s: &str) -> Option<(&str, &str)> {
    let caps = BOLD_LABEL_RE.captures(s)?;
    let label = caps.get(1)?.as_str().trim();
    let rest = caps.get(2)?.as_str();
    Some((label, rest))
}

/// First run of decimal digits anywhere in `s`.
pub fn digit_run(s: &str) -> Option<u32> {
    DIGIT_RUN_RE.find(s).and_then(|m| m.as_str().parse().ok())
}

/// Drop markdown emphasis markers and surrounding whitespace.
pub fn strip_emphasis(s: &str) -> String {
    s.replace('*', "").trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading() {
        assert_eq!(
            classify("## 2 Standards Comparison"),
            Line::Heading { level: 2, text: "2 Standards Comparison" }
        );
        assert_eq!(classify("# AI Card Review"), Line::Heading { level: 1, text: "AI Card Review" });
    }

    #[test]
    fn rule() {
        assert_eq!(classify("---"), Line::Rule);
        assert_eq!(classify("  ------  "), Line::Rule);
        // two hyphens is not a rule
        assert!(matches!(classify("--"), Line::Other(_)));
    }

    #[test]
    fn table_row() {
        assert!(matches!(classify("| Clarity | 3 |"), Line::TableRow(_)));
        assert!(matches!(classify("  | a | b |"), Line::TableRow(_)));
    }

    #[test]
    fn bold_bullet() {
        let line = classify("- **Missing:** none noted");
        assert_eq!(line, Line::BoldBullet { label: "Missing", rest: "none noted" });
    }

    #[test]
    fn bold_bullet_empty_rest() {
        let line = classify("- **Ambiguous:**");
        assert_eq!(line, Line::BoldBullet { label: "Ambiguous", rest: "" });
    }

    #[test]
    fn plain_bullet() {
        assert_eq!(classify("- also check licensing"), Line::Bullet("also check licensing"));
    }

    #[test]
    fn blank_and_other() {
        assert_eq!(classify("   "), Line::Blank);
        assert!(matches!(classify("free text"), Line::Other("free text")));
        // a bare bold label without a bullet marker is not a bold bullet
        assert!(matches!(classify("**Missing:** x"), Line::Other(_)));
    }

    #[test]
    fn bold_label_split() {
        let (label, rest) = bold_label("**Inconsistent / conflicting:** a vs b").unwrap();
        assert_eq!(label, "Inconsistent / conflicting");
        assert_eq!(rest, "a vs b");
        assert!(bold_label("no label here").is_none());
    }

    #[test]
    fn digit_runs() {
        assert_eq!(digit_run("3"), Some(3));
        assert_eq!(digit_run("**2** / 3"), Some(2));
        assert_eq!(digit_run("score: 27 of 30"), Some(27));
        assert_eq!(digit_run("n/a"), None);
    }

    #[test]
    fn emphasis_stripped() {
        assert_eq!(strip_emphasis("**Total (/30)**"), "Total (/30)");
        assert_eq!(strip_emphasis(" *Clarity* "), "Clarity");
    }
}
