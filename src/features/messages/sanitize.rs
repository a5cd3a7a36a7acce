//! Post-processing for generated reminder text
//!
//! Generated text is coerced into the layout the channel expects: one blank
//! line between lines, configured location links kept intact, and no
//! unbalanced markdown emphasis that would break rendering.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use regex::{NoExpand, Regex};
use std::ops::Range;
use std::sync::OnceLock;

/// Emphasis delimiters checked for balance
const DELIMITERS: [char; 3] = ['*', '_', '`'];

fn link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[([^\]\n]*)\]\(([^)\s]*)\)").expect("valid link regex"))
}

fn exact_link_regex() -> &'static Regex {
    static EXACT: OnceLock<Regex> = OnceLock::new();
    EXACT.get_or_init(|| {
        Regex::new(r"^\[([^\]\n]+)\]\(([^)\s]+)\)$").expect("valid exact link regex")
    })
}

/// Run the full pipeline: trim, normalize blank lines, restore the location
/// link, then drop unbalanced emphasis.
pub fn sanitize(text: &str, location: &str) -> String {
    let text = normalize_blank_lines(text);
    let text = restore_location_link(&text, location);
    balance_emphasis(&text)
}

/// Trim every line, drop blank ones, and join with exactly one blank line
pub fn normalize_blank_lines(text: &str) -> String {
    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split a `[name](url)` location into its parts
pub fn parse_link(location: &str) -> Option<(&str, &str)> {
    exact_link_regex().captures(location.trim()).and_then(|caps| {
        let name = caps.get(1)?.as_str();
        let url = caps.get(2)?.as_str();
        Some((name, url))
    })
}

/// Display name of a location, stripping link syntax
pub fn location_display_name(location: &str) -> &str {
    parse_link(location)
        .map(|(name, _)| name)
        .unwrap_or_else(|| location.trim())
}

/// Rewrite bare mentions of a linked location's name into the full link.
///
/// Only whole-word mentions outside any existing markdown link are rewritten.
/// Plain (non-link) locations leave the text untouched.
pub fn restore_location_link(text: &str, location: &str) -> String {
    let Some((name, _)) = parse_link(location) else {
        return text.to_string();
    };
    let Some(mention) = mention_regex(name) else {
        return text.to_string();
    };

    let link = location.trim();
    let mut result = String::with_capacity(text.len() + link.len());
    let mut cursor = 0;

    for existing in link_regex().find_iter(text) {
        let before = &text[cursor..existing.start()];
        result.push_str(&mention.replace_all(before, NoExpand(link)));
        result.push_str(existing.as_str());
        cursor = existing.end();
    }
    result.push_str(&mention.replace_all(&text[cursor..], NoExpand(link)));
    result
}

/// Whole-word matcher for a location name.
///
/// Word boundaries only apply at edges that are word characters, so names
/// ending in punctuation still match.
fn mention_regex(name: &str) -> Option<Regex> {
    let name = name.trim();
    let first = name.chars().next()?;
    let last = name.chars().last()?;
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let pattern = format!(
        "{}{}{}",
        if is_word(first) { r"\b" } else { "" },
        regex::escape(name),
        if is_word(last) { r"\b" } else { "" }
    );
    Regex::new(&pattern).ok()
}

/// Strip every occurrence of a delimiter whose count is odd.
///
/// Characters inside markdown links, name and URL alike, are neither
/// counted nor stripped.
pub fn balance_emphasis(text: &str) -> String {
    let protected = link_ranges(text);
    let is_protected = |idx: usize| protected.iter().any(|range| range.contains(&idx));

    let unbalanced: Vec<char> = DELIMITERS
        .iter()
        .copied()
        .filter(|delimiter| {
            text.char_indices()
                .filter(|(idx, c)| c == delimiter && !is_protected(*idx))
                .count()
                % 2
                == 1
        })
        .collect();

    if unbalanced.is_empty() {
        return text.to_string();
    }

    text.char_indices()
        .filter(|(idx, c)| !unbalanced.contains(c) || is_protected(*idx))
        .map(|(_, c)| c)
        .collect()
}

/// Byte ranges of every whole `[name](url)` link
fn link_ranges(text: &str) -> Vec<Range<usize>> {
    link_regex().find_iter(text).map(|m| m.range()).collect()
}
