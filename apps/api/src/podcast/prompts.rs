// Prompt constants for the daily briefing generator.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for briefing generation.
pub const BRIEFING_SYSTEM: &str = "You are the scriptwriter of a short daily podcast that \
    explains Indian financial regulation to retail investors and students. \
    Write clearly, avoid jargon where possible, and keep every key point self-contained.";

/// Official sites the oracle is pointed at.
pub const SOURCE_HINTS: &[&str] = &[
    "sebi.gov.in (press releases, circulars, consultation papers)",
    "rbi.org.in (notifications, press releases, monetary policy statements)",
    "finmin.nic.in (Ministry of Finance announcements)",
    "nseindia.com and bseindia.com (exchange circulars)",
];

/// Topics a briefing should prioritize.
pub const FOCUS_TOPICS: &[&str] = &[
    "securities market regulation",
    "banking and monetary policy",
    "mutual funds and investor protection",
    "payments and digital lending",
];

/// Daily briefing prompt template.
/// Replace: {date}, {language_instruction}, {factuality_instruction},
///          {source_hints}, {focus_topics}
pub const BRIEFING_PROMPT_TEMPLATE: &str = r#"Today is {date}.

{factuality_instruction}

Prepare today's regulatory briefing covering the most important developments of the last 24 hours.

Prefer information published on:
{source_hints}

Focus on:
{focus_topics}

{language_instruction}

Answer using EXACTLY this layout:

PODCAST TITLE: "Daily Regulatory Briefing - <Mon D, YYYY>"

REGULATORY SUMMARY:
<two or three sentences on the overall regulatory climate today>

SINGLE EPISODE:
title: "<headline of the most important development>"
summary: <three to five sentences explaining the development and why it matters>
keyPoints:
* **<short label>**: <one sentence detail>
* **<short label>**: <one sentence detail>
* **<short label>**: <one sentence detail>
category: <SEBI | RBI | POLICY | GENERAL_REGULATORY>
importance: <HIGH | MEDIUM | LOW>"#;
