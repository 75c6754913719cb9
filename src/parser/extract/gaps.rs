use serde::Serialize;

use crate::parser::lines::{self, Line};
use crate::parser::sections;

const HEADING: &str = "## 3 Gaps & Inconsistencies";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapsRecord {
    pub missing: Option<String>,
    pub inconsistent: Option<String>,
    pub ambiguous: Option<String>,
}

#[derive(Clone, Copy)]
enum Bucket {
    Missing,
    Inconsistent,
    Ambiguous,
}

#[derive(Default)]
struct GapsBuilder {
    missing: Vec<String>,
    inconsistent: Vec<String>,
    ambiguous: Vec<String>,
}

impl GapsBuilder {
    fn push(&mut self, bucket: Bucket, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let parts = match bucket {
            Bucket::Missing => &mut self.missing,
            Bucket::Inconsistent => &mut self.inconsistent,
            Bucket::Ambiguous => &mut self.ambiguous,
        };
        parts.push(text.to_string());
    }

    fn finish(self) -> GapsRecord {
        GapsRecord {
            missing: join(self.missing),
            inconsistent: join(self.inconsistent),
            ambiguous: join(self.ambiguous),
        }
    }
}

fn join(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

pub fn extract(doc: &[&str]) -> GapsRecord {
    let body = sections::section(doc, HEADING);
    let mut builder = GapsBuilder::default();
    let mut current: Option<Bucket> = None;

    for line in body {
        match lines::classify(line) {
            Line::BoldBullet { label, rest } => match bucket_for(label) {
                Some(bucket) => {
                    current = Some(bucket);
                    builder.push(bucket, rest);
                }
                // A bullet with an unrecognized label is still a `- ` line:
                // its remainder continues the open bucket.
                None => {
                    if let Some(bucket) = current {
                        let remainder = line.trim().strip_prefix("- ").unwrap_or("");
                        builder.push(bucket, remainder);
                    }
                }
            },
            Line::Bullet(text) => {
                if let Some(bucket) = current {
                    builder.push(bucket, text);
                }
            }
            _ => {}
        }
    }

    builder.finish()
}

fn bucket_for(label: &str) -> Option<Bucket> {
    match label {
        "Missing" => Some(Bucket::Missing),
        "Inconsistent / conflicting" => Some(Bucket::Inconsistent),
        "Ambiguous" => Some(Bucket::Ambiguous),
        _ => None,
    }
}

// ── Tests ──
