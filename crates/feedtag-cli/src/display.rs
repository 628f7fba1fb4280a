//! Terminal rendering for analysis results.

use chrono::{SecondsFormat, Utc};
use feedtag_core::{AnalysisResult, Tag, TagSet};
use serde::Serialize;

/// Machine-readable output for `--json`.
#[derive(Serialize)]
struct AnalysisRecord<'a> {
    summary: &'a str,
    tag: Tag,
    analyzed_at: String,
}

/// Label shown next to a summary, e.g. `[NEWS]`.
pub fn tag_label(tag: Tag) -> String {
    format!("[{}]", tag.as_str().to_ascii_uppercase())
}

pub fn render_card(result: &AnalysisResult) -> String {
    format!(
        "=== Summary {label} ===\n{summary}\n",
        label = tag_label(result.tag),
        summary = result.summary,
    )
}

pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    let record = AnalysisRecord {
        summary: &result.summary,
        tag: result.tag,
        analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

pub fn print_result(result: &AnalysisResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render_json(result)?);
    } else {
        print!("{}", render_card(result));
    }
    Ok(())
}

pub fn print_tags(tag_set: TagSet) {
    println!("{} tags ({}):", tag_set.as_str(), tag_set.tags().len());
    for &tag in tag_set.tags() {
        let marker = if tag == Tag::DEFAULT { " (default)" } else { "" };
        println!("  {:<16}{}", tag.as_str(), marker);
    }
}
