//! Terminal output formatting.

use colored::Colorize;
use dkgpedia_core::{AnswerData, PaymentInfo, ProgressSnapshot, SearchHit};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const TITLE_WIDTH: usize = 36;
const TOPIC_WIDTH: usize = 24;

/// Print merged search results as a table.
pub fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    println!(
        "{} {} {}",
        pad_right("Topic", TOPIC_WIDTH),
        pad_right("Title", TITLE_WIDTH),
        "UAL"
    );
    println!("{}", "─".repeat(TOPIC_WIDTH + TITLE_WIDTH + 20));

    for hit in hits {
        let title = pad_right(&truncate_visual(&hit.title, TITLE_WIDTH), TITLE_WIDTH);
        let topic = pad_right(&truncate_visual(&hit.topic_id, TOPIC_WIDTH), TOPIC_WIDTH);
        if hit.is_suggestion {
            println!("{} {} {}", topic.dimmed(), title.dimmed(), "suggestion".yellow());
        } else {
            println!(
                "{} {} {}",
                topic.cyan(),
                title,
                hit.ual.as_deref().unwrap_or("-").dimmed()
            );
        }
    }

    let verified = hits.iter().filter(|h| !h.is_suggestion).count();
    println!();
    println!(
        "{} verified, {} suggestion(s)",
        verified,
        hits.len() - verified
    );
}

/// Print a paywall.
pub fn print_paywall(info: &PaymentInfo) {
    println!("{} {}", "Premium content:".yellow().bold(), info.title.bold());
    println!("  {}: ${}", "Price".bold(), info.display_price().green());
    println!("  {}: {}", "Pay to".bold(), info.wallet_address);
}

/// Print a corrected answer and a short analysis summary.
pub fn print_answer(answer: &AnswerData, show_original: bool) {
    println!("{}", answer.topic.cyan().bold());
    println!();

    let analysis = &answer.analysis_result;
    if let Some(id) = &analysis.analysis_id {
        println!("{}: {}", "Analysis".bold(), id.dimmed());
    }
    if let Some(count) = analysis.contradiction_count() {
        println!("{}: {}", "Contradictions".bold(), count);
    }
    if let Some(similarity) = analysis.average_similarity() {
        println!("{}: {:.2}", "Similarity".bold(), similarity);
    }
    if answer.has_corrections() {
        println!("{}", "Article corrected".green());
    } else {
        println!("{}", "No corrections needed".dimmed());
    }
    println!();

    if show_original {
        println!("{}", "Original".bold().underline());
        println!("{}", answer.original_content);
        println!();
        println!("{}", "Corrected".bold().underline());
    }
    println!("{}", answer.corrected_content);
}

/// Pretty-print JSON.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

/// Spinner shown while an analysis runs.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message(message.to_string());
    bar
}

/// One-line rendering of a progress snapshot.
pub fn snapshot_message(snapshot: &ProgressSnapshot) -> String {
    let mut message = snapshot.step.clone();
    if let (Some(index), Some(total)) = (snapshot.step_index, snapshot.total_steps) {
        message = format!("[{}/{}] {}", index, total, message);
    }
    if let Some(pct) = snapshot.percentage {
        message = format!("{} ({:.0}%)", message, pct);
    }
    message
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_visual() {
        assert_eq!(truncate_visual("Cattle", 10), "Cattle");
        assert_eq!(truncate_visual("Domestic cattle", 10), "Domestic..");
        assert_eq!(truncate_visual("牛牛牛牛牛牛", 7), "牛牛..");
        assert_eq!(truncate_visual("abcdef", 3), "...");
    }

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("牛", 4), "牛  ");
        assert_eq!(pad_right("abcdef", 4), "abcdef");
    }

    #[test]
    fn test_snapshot_message() {
        let snapshot = ProgressSnapshot {
            step: "Extracting triples".to_string(),
            step_index: Some(2),
            total_steps: Some(5),
            percentage: Some(40.0),
        };
        assert_eq!(snapshot_message(&snapshot), "[2/5] Extracting triples (40%)");

        let bare = ProgressSnapshot {
            step: "Fetching".to_string(),
            step_index: None,
            total_steps: None,
            percentage: None,
        };
        assert_eq!(snapshot_message(&bare), "Fetching");
    }
}
