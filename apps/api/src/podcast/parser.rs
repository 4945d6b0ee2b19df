//! Response Parser turns free-form oracle output into a structured briefing.
//!
//! Parsing never fails. Every field has a fallback, and key points are pulled
//! through an ordered table of named strategies; the first one that yields a
//! usable item wins.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::podcast::language::{FALLBACK_EPISODE_TITLE, SERIES_TITLE};
use crate::podcast::models::Source;

/// Items of this length or shorter are treated as noise.
const MIN_KEY_POINT_CHARS: usize = 10;
/// Cap on lines taken by the keyword scan.
const MAX_SCANNED_KEY_POINTS: usize = 8;

pub const FALLBACK_EPISODE_SUMMARY: &str =
    "Latest regulatory developments affecting Indian financial markets.";

pub const GENERIC_KEY_POINTS: [&str; 2] = [
    "Regulators continue to update rules affecting Indian financial markets",
    "Check official SEBI and RBI publications for the full text of today's changes",
];

pub const PLACEHOLDER_KEY_POINT: &str =
    "No specific regulatory updates could be extracted from today's briefing";

const SCAN_KEYWORDS: &str = r"(?i)\b(sebi|rbi|regulation|regulations|regulatory|regulator|compliance|circular|circulars|guideline|guidelines|policy|policies|framework|mandate|disclosure)\b";

// ────────────────────────────────────────────────────────────────────────────
// Output model
// ────────────────────────────────────────────────────────────────────────────

/// Where the key points of a parsed briefing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPointOrigin {
    /// Named strategy from [`KEY_POINT_STRATEGIES`].
    Strategy(&'static str),
    /// Episode block present but no strategy matched.
    GenericFallback,
    /// No episode block; lines picked by keyword.
    KeywordScan,
    /// No episode block and no keyword line.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedBriefing {
    pub podcast_title: String,
    /// Empty when the oracle skipped the summary section.
    pub market_summary: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub key_point_origin: KeyPointOrigin,
    pub category_hint: Option<String>,
    pub importance_hint: Option<String>,
    /// Never populated from oracle text.
    pub sources: Vec<Source>,
}

// ────────────────────────────────────────────────────────────────────────────
// Key point strategies
// ────────────────────────────────────────────────────────────────────────────

/// A pure extraction step: `Some` only when it found at least one usable item.
pub struct KeyPointStrategy {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<Vec<String>>,
}

/// Tried in order. Bold bullets come before plain bullets because every bold
/// bullet is also a plain bullet.
pub const KEY_POINT_STRATEGIES: &[KeyPointStrategy] = &[
    KeyPointStrategy { name: "bold_bullets", extract: bold_bullets },
    KeyPointStrategy { name: "star_bullets", extract: star_bullets },
    KeyPointStrategy { name: "numbered_lines", extract: numbered_lines },
    KeyPointStrategy { name: "dash_bullets", extract: dash_bullets },
];

fn bold_bullets(text: &str) -> Option<Vec<String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    collect_items(compiled(&RE, r"(?m)^[ \t]*\*[ \t]+(.*\*\*[^*\n]+\*\*.*)$"), text)
}

fn star_bullets(text: &str) -> Option<Vec<String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    collect_items(compiled(&RE, r"(?m)^[ \t]*\*[ \t]+(.+)$"), text)
}

fn numbered_lines(text: &str) -> Option<Vec<String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    collect_items(compiled(&RE, r"(?m)^[ \t]*\d+[.)][ \t]+(.+)$"), text)
}

fn dash_bullets(text: &str) -> Option<Vec<String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    collect_items(compiled(&RE, r"(?m)^[ \t]*[-•–—][ \t]+(.+)$"), text)
}

fn collect_items(re: &Regex, text: &str) -> Option<Vec<String>> {
    let items: Vec<String> = re
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| strip_markdown(m.as_str()))
        .filter(|item| item.chars().count() > MIN_KEY_POINT_CHARS)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Runs the strategy table over `text`, returning the first hit.
pub fn extract_key_points(text: &str) -> Option<(&'static str, Vec<String>)> {
    KEY_POINT_STRATEGIES
        .iter()
        .find_map(|s| (s.extract)(text).map(|items| (s.name, items)))
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses raw oracle output. `today` feeds the synthesized title.
pub fn parse(raw: &str, today: NaiveDate) -> ParsedBriefing {
    let podcast_title = capture(podcast_title_re(), raw)
        .map(|t| strip_markdown(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_podcast_title(today));

    let market_summary = capture(market_summary_re(), raw)
        .map(|s| strip_markdown(&s))
        .unwrap_or_default();

    let Some(block) = capture(episode_block_re(), raw) else {
        let (key_points, key_point_origin) = match scan_keyword_lines(raw) {
            Some(lines) => (lines, KeyPointOrigin::KeywordScan),
            None => (
                vec![PLACEHOLDER_KEY_POINT.to_string()],
                KeyPointOrigin::Placeholder,
            ),
        };
        return ParsedBriefing {
            podcast_title,
            market_summary,
            title: FALLBACK_EPISODE_TITLE.to_string(),
            summary: FALLBACK_EPISODE_SUMMARY.to_string(),
            key_points,
            key_point_origin,
            category_hint: None,
            importance_hint: None,
            sources: Vec::new(),
        };
    };

    let title = capture(field_title_re(), &block)
        .map(|t| strip_markdown(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_EPISODE_TITLE.to_string());

    let summary = capture(field_summary_re(), &block)
        .map(|s| strip_markdown(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_EPISODE_SUMMARY.to_string());

    // Without a keyPoints marker the whole block is searched for bullets.
    let key_point_text = capture(field_key_points_re(), &block).unwrap_or_else(|| block.clone());
    let (key_points, key_point_origin) = match extract_key_points(&key_point_text) {
        Some((name, items)) => (items, KeyPointOrigin::Strategy(name)),
        None => (
            GENERIC_KEY_POINTS.iter().map(|s| s.to_string()).collect(),
            KeyPointOrigin::GenericFallback,
        ),
    };

    ParsedBriefing {
        podcast_title,
        market_summary,
        title,
        summary,
        key_points,
        key_point_origin,
        category_hint: capture(field_category_re(), &block).map(|s| strip_markdown(&s)),
        importance_hint: capture(field_importance_re(), &block).map(|s| strip_markdown(&s)),
        sources: Vec::new(),
    }
}

pub fn default_podcast_title(today: NaiveDate) -> String {
    format!("{SERIES_TITLE} - {}", today.format("%b %-d, %Y"))
}

/// Picks lines mentioning a regulatory keyword. Section marker lines are skipped.
fn scan_keyword_lines(raw: &str) -> Option<Vec<String>> {
    static KEYWORDS: OnceLock<Regex> = OnceLock::new();
    static MARKER: OnceLock<Regex> = OnceLock::new();
    static BULLET: OnceLock<Regex> = OnceLock::new();
    let keywords = compiled(&KEYWORDS, SCAN_KEYWORDS);
    let marker = compiled(&MARKER, r"(?i)(podcast\s+title|regulatory\s+summary)\s*:");
    let bullet = compiled(&BULLET, r"^[\s>#*•–—-]*(\d+[.)]\s+)?");

    let lines: Vec<String> = raw
        .lines()
        .filter(|line| keywords.is_match(line) && !marker.is_match(line))
        .map(|line| strip_markdown(&bullet.replace(line, "")))
        .filter(|line| line.chars().count() >= MIN_KEY_POINT_CHARS)
        .take(MAX_SCANNED_KEY_POINTS)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

/// Removes bold/underline markers and surrounding whitespace.
fn strip_markdown(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_matches('*')
        .trim()
        .to_string()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static parser pattern must compile"))
}

fn podcast_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r#"(?i)PODCAST\s+TITLE\**\s*:\**\s*["“]([^"”\n]+)["”]"#)
}

fn market_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?is)REGULATORY\s+SUMMARY\**\s*:\**\s*(.*?)(?:\n[\s*#]*(?:SINGLE\s+EPISODE|EPISODES?|PODCAST\s+TITLE|SOURCES)\**\s*:|\z)",
    )
}

fn episode_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?is)SINGLE\s+EPISODE\**\s*:\**(.*)\z")
}

fn field_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r#"(?i)\btitle\**\s*:\**\s*["“]([^"”\n]+)["”]"#)
}

fn field_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?is)\bsummary\**\s*:\**\s*(.*?)(?:\n[\s*#-]*(?:key\s*points|category|importance|sources|title)\**\s*:|\z)",
    )
}

fn field_key_points_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?is)\bkey\s*points\**\s*:\**\s*(.*?)(?:\n[\s*#-]*(?:category|importance|sources)\**\s*:|\z)",
    )
}

fn field_category_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?im)^[\s*#-]*category\**\s*:\**[ \t]*([^\n]+)$")
}

fn field_importance_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?im)^[\s*#-]*importance\**\s*:\**[ \t]*([^\n]+)$")
}
