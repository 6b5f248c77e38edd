//! Article paragraph splitting.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid blank-line pattern"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"={2,}[^=\n]+={2,}").expect("valid heading pattern"));

/// Split an article into paragraph units.
///
/// Blocks are separated by blank lines. A block containing a `== Heading ==`
/// marker is cut in front of every marker so a heading always starts a unit.
/// Units are trimmed and empty units dropped. Every returned unit is a literal
/// substring of `article`.
pub fn split_paragraphs(article: &str) -> Vec<&str> {
    let mut units = Vec::new();

    for block in BLANK_LINE.split(article) {
        let mut start = 0;
        for heading in HEADING.find_iter(block) {
            if heading.start() > start {
                push_unit(&mut units, &block[start..heading.start()]);
                start = heading.start();
            }
        }
        push_unit(&mut units, &block[start..]);
    }

    units
}

fn push_unit<'a>(units: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        units.push(trimmed);
    }
}
