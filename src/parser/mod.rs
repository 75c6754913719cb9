pub mod extract;
pub mod lines;
pub mod score;
pub mod sections;
pub mod table;

use self::extract::CardReport;

/// Markdown → lines → section-scoped extraction → normalized report.
pub fn process_markdown(markdown: &str) -> CardReport {
    let doc: Vec<&str> = markdown.lines().collect();
    extract::extract_all(&doc)
}
