// Input Records
// Tab-separated record parsing and per-decision output lines for the CLI

use serde::Serialize;

use crate::models::Decision;

/// Field count of a full crawler export row.
const FULL_RECORD_FIELDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRecord<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub url: &'a str,
}

impl SectionRecord<'_> {
    pub fn label(&self) -> String {
        format!("\"{}\"+\"{}\"+\"{}\"", self.title, self.body, self.url)
    }
}

/// Content of a single-text record: the 10th field of a full row, or the
/// whole line when it has no tabs.
pub fn parse_content_record(line: &str) -> Option<&str> {
    let fields: Vec<&str> = line.split('\t').collect();
    match fields.len() {
        FULL_RECORD_FIELDS => Some(fields[9]),
        1 => Some(fields[0]),
        _ => None,
    }
}

/// Title, body and url of a record: fields 9, 10 and 1 of a full row, or a
/// plain `title<TAB>body<TAB>url` triple.
pub fn parse_section_record(line: &str) -> Option<SectionRecord<'_>> {
    let fields: Vec<&str> = line.split('\t').collect();
    match fields.len() {
        FULL_RECORD_FIELDS => Some(SectionRecord {
            title: fields[8],
            body: fields[9],
            url: fields[0],
        }),
        3 => Some(SectionRecord {
            title: fields[0],
            body: fields[1],
            url: fields[2],
        }),
        _ => None,
    }
}

/// Tab-separated output line: quoted input (plus normalized text when
/// `debug_level > 0`), the feature list, and the decision with raw score and
/// confidence, or `=` when no decision was reached.
pub fn format_decision(label: &str, decision: &Decision, debug_level: u32) -> String {
    let mut out = String::new();

    out.push('"');
    out.push_str(label);
    if debug_level > 0 && !decision.normalized_content.is_empty() {
        out.push_str(";; ");
        out.push_str(&decision.normalized_content);
    }
    out.push_str("\"\t( ");
    for feature in &decision.matched_features {
        out.push_str(feature);
        out.push_str("; ");
    }
    out.push_str(")\t");

    if !decision.is_decided() {
        out.push('=');
    } else {
        let sign = match decision.decision {
            1 => "+1",
            -1 => "-1",
            _ => "0",
        };
        out.push_str(&format!(
            "{} ( raw={}; norm={} )",
            sign, decision.raw_score, decision.confidence
        ));
    }

    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLine<'a> {
    input: &'a str,
    label: &'a str,
    #[serde(flatten)]
    decision: &'a Decision,
}

pub fn format_decision_json(label: &str, decision: &Decision) -> Result<String, serde_json::Error> {
    serde_json::to_string(&JsonLine {
        input: label,
        label: decision.label(),
        decision,
    })
}
