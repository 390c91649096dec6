//! Defensive parsing of agent replies.
//!
//! Replies are untrusted free text. A [`ResponseParser`] tries an ordered
//! chain of [`ResponseStrategy`] values and keeps the first that yields
//! anything:
//!
//! 1. [`FencedBlock`] - the first fenced code block that decodes as JSON,
//!    `json`-tagged fences first
//! 2. [`WholeBody`] - the whole trimmed reply, decoded as JSON
//! 3. [`PatternScan`] - permissive regexes over the raw reply
//!
//! JSON decoding accepts `{"exercises": [...]}` or a bare array. When strict
//! decoding fails, a second attempt runs after [`repair_latex_escapes`].
//! Entries that fail to decode on their own are skipped.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

use crate::types::candidate::{clamp_confidence, ExtractionMethod};
use crate::types::config::AgentConfig;

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[ \t]*(?P<lang>[A-Za-z0-9_+-]*)[ \t]*\r?\n?(?P<body>.*?)```").unwrap();

    // "id": "...", ... "title": "...", ... "content": "..." in a broken JSON reply
    static ref JSON_LIKE_ENTRY: Regex = Regex::new(
        r#"(?is)"id"\s*:\s*"([^"]+)".*?"title"\s*:\s*"([^"]*)".*?"content"\s*:\s*"((?:[^"\\]|\\.)*)""#
    )
    .unwrap();

    // Exercise 1.1.A: text, one per line, in a prose reply
    static ref PROSE_ENTRY: Regex = Regex::new(
        r"(?im)^[ \t*\-]*Exercise\s+(\d+\.\d+\.[A-Z])\**[:.\s]+([^\n]+)"
    )
    .unwrap();
}

/// One exercise recovered from a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    /// Reported label, if the entry had a usable one
    pub id: Option<String>,
    pub title: String,
    /// Trimmed, never empty
    pub content: String,
    /// Already clamped into [0.0, 1.0]
    pub confidence: f32,
}

/// What a strategy recovered, tagged with the pathway that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub method: ExtractionMethod,
    pub entries: Vec<ParsedEntry>,
}

/// One way of reading an agent reply.
pub trait ResponseStrategy: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// `None` when this strategy does not apply to the reply.
    fn parse(&self, response: &str) -> Option<ParsedResponse>;
}

/// The first fenced code block that decodes as an exercise list.
///
/// Replies often echo LaTeX or prose in other fences, so `json`-tagged
/// fences are tried before the rest, each group in reply order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FencedBlock {
    pub default_confidence: f32,
}

impl ResponseStrategy for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced_block"
    }

    fn parse(&self, response: &str) -> Option<ParsedResponse> {
        let (tagged, untagged): (Vec<_>, Vec<_>) = FENCED_BLOCK
            .captures_iter(response)
            .filter_map(|caps| {
                let lang = caps.name("lang").map_or("", |m| m.as_str());
                Some((lang.eq_ignore_ascii_case("json"), caps.name("body")?.as_str()))
            })
            .partition(|(is_json, _)| *is_json);

        tagged
            .into_iter()
            .chain(untagged)
            .find_map(|(_, block)| structured(block, self.default_confidence))
    }
}

/// The entire reply body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WholeBody {
    pub default_confidence: f32,
}

impl ResponseStrategy for WholeBody {
    fn name(&self) -> &'static str {
        "whole_body"
    }

    fn parse(&self, response: &str) -> Option<ParsedResponse> {
        structured(response, self.default_confidence)
    }
}

/// Regex scan for `(id, title, content)` triples when nothing decodes.
///
/// JSON-shaped fragments are tried first; `Exercise 1.1.A: ...` lines only
/// when no fragment was found. Every entry gets the same fixed confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternScan {
    pub confidence: f32,
}

impl ResponseStrategy for PatternScan {
    fn name(&self) -> &'static str {
        "pattern_scan"
    }

    fn parse(&self, response: &str) -> Option<ParsedResponse> {
        let mut entries: Vec<ParsedEntry> = JSON_LIKE_ENTRY
            .captures_iter(response)
            .filter_map(|caps| {
                self.entry(
                    caps.get(1)?.as_str(),
                    &unescape_fragment(caps.get(2)?.as_str()),
                    &unescape_fragment(caps.get(3)?.as_str()),
                )
            })
            .collect();

        if entries.is_empty() {
            entries = PROSE_ENTRY
                .captures_iter(response)
                .filter_map(|caps| self.entry(caps.get(1)?.as_str(), "", caps.get(2)?.as_str()))
                .collect();
        }

        if entries.is_empty() {
            return None;
        }

        Some(ParsedResponse {
            method: ExtractionMethod::AgentFallback,
            entries,
        })
    }
}

impl PatternScan {
    fn entry(&self, id: &str, title: &str, content: &str) -> Option<ParsedEntry> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        Some(ParsedEntry {
            id: non_empty(id),
            title: title.trim().to_string(),
            content: content.to_string(),
            confidence: clamp_confidence(self.confidence, self.confidence),
        })
    }
}

/// Ordered first-success composition of strategies.
#[derive(Debug)]
pub struct ResponseParser {
    strategies: Vec<Box<dyn ResponseStrategy>>,
}

impl ResponseParser {
    /// The standard chain: fenced block, whole body, pattern scan.
    pub fn new(config: &AgentConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(FencedBlock {
                default_confidence: config.default_confidence,
            }),
            Box::new(WholeBody {
                default_confidence: config.default_confidence,
            }),
            Box::new(PatternScan {
                confidence: config.fallback_confidence,
            }),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ResponseStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Result of the first strategy that applies, if any.
    pub fn parse(&self, response: &str) -> Option<ParsedResponse> {
        for strategy in &self.strategies {
            match strategy.parse(response) {
                Some(parsed) => {
                    debug!(
                        strategy = strategy.name(),
                        entries = parsed.entries.len(),
                        "Agent reply parsed"
                    );
                    return Some(parsed);
                }
                None => trace!(strategy = strategy.name(), "Strategy did not apply"),
            }
        }
        None
    }
}

/// Wire shape of one entry in the reply.
#[derive(Debug, Deserialize)]
struct AIExercise {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    content: String,
    #[serde(default)]
    confidence: Option<Value>,
}

fn structured(json: &str, default_confidence: f32) -> Option<ParsedResponse> {
    let json = json.trim();
    let value: Value = serde_json::from_str(json)
        .or_else(|_| serde_json::from_str(&repair_latex_escapes(json)))
        .ok()?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("exercises")? {
            Value::Array(items) => items,
            _ => return None,
        },
        _ => return None,
    };

    let entries = items
        .into_iter()
        .filter_map(|item| decode_entry(item, default_confidence))
        .collect();

    Some(ParsedResponse {
        method: ExtractionMethod::AgentStructured,
        entries,
    })
}

fn decode_entry(item: Value, default_confidence: f32) -> Option<ParsedEntry> {
    let entry: AIExercise = match serde_json::from_value(item) {
        Ok(entry) => entry,
        Err(e) => {
            trace!(error = %e, "Skipping undecodable entry");
            return None;
        }
    };

    let content = entry.content.trim();
    if content.is_empty() {
        return None;
    }

    let id = match entry.id {
        Some(Value::String(s)) => non_empty(&s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let confidence = entry
        .confidence
        .as_ref()
        .and_then(Value::as_f64)
        .map_or(default_confidence, |c| {
            clamp_confidence(c as f32, default_confidence)
        });

    Some(ParsedEntry {
        id,
        title: entry.title.unwrap_or_default().trim().to_string(),
        content: content.to_string(),
        confidence,
    })
}

/// Double backslashes that do not start a valid JSON escape.
///
/// LaTeX commands such as `\subsection` or `\{` inside JSON strings are the
/// usual culprits. `\b`, `\f`, `\n`, `\r` and `\t` directly followed by a
/// letter are read as commands (`\frac`, `\textbf`) and doubled too.
pub fn repair_latex_escapes(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let keep = match next {
            Some('"' | '\\' | '/') => true,
            Some('u') => chars[i + 2..]
                .iter()
                .take(4)
                .filter(|c| c.is_ascii_hexdigit())
                .count()
                == 4,
            Some('b' | 'f' | 'n' | 'r' | 't') => {
                !chars.get(i + 2).is_some_and(|c| c.is_ascii_alphabetic())
            }
            _ => false,
        };

        match (keep, next) {
            (true, Some(escaped)) => {
                out.push('\\');
                out.push(escaped);
                i += 2;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }

    out
}

fn unescape_fragment(raw: &str) -> String {
    let quoted = format!("\"{}\"", raw);
    serde_json::from_str::<String>(&quoted)
        .or_else(|_| serde_json::from_str::<String>(&repair_latex_escapes(&quoted)))
        .unwrap_or_else(|_| raw.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ResponseParser {
        ResponseParser::new(&AgentConfig::default())
    }

    #[test]
    fn test_chain_order() {
        assert_eq!(
            parser().strategy_names(),
            vec!["fenced_block", "whole_body", "pattern_scan"]
        );
    }

    #[test]
    fn test_fenced_block() {
        let reply = "Here you go:\n```json\n{\"exercises\":[{\"id\":\"1.1.B\",\"title\":\"Exercise\",\"content\":\"Prove X.\",\"confidence\":0.95}]}\n```\nDone.";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        assert_eq!(
            parsed.entries,
            vec![ParsedEntry {
                id: Some("1.1.B".to_string()),
                title: "Exercise".to_string(),
                content: "Prove X.".to_string(),
                confidence: 0.95,
            }]
        );
    }

    #[test]
    fn test_untagged_fence_and_bare_array() {
        let reply = "```\n[{\"id\":\"2.1.A\",\"content\":\"Show Y.\"}]\n```";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].title, "");
        assert_eq!(parsed.entries[0].confidence, 0.8);
    }

    #[test]
    fn test_json_fence_after_other_fences() {
        let reply = "The source reads:\n```latex\n\\subsubsection*{1.1.B. EXERCISE.}\nProve X.\n```\n\
                     Result:\n```json\n{\"exercises\":[{\"id\":\"1.1.B\",\"title\":\"Exercise\",\"content\":\"Prove X.\",\"confidence\":0.95}]}\n```";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].id.as_deref(), Some("1.1.B"));
        assert_eq!(parsed.entries[0].confidence, 0.95);
    }

    #[test]
    fn test_untagged_fences_tried_in_order() {
        let reply = "```\nnot json at all\n```\nand\n```\n[{\"id\":\"2.1.A\",\"content\":\"Show Y.\"}]\n```";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        assert_eq!(parsed.entries[0].id.as_deref(), Some("2.1.A"));
    }

    #[test]
    fn test_whole_body() {
        let reply = "  {\"exercises\":[{\"id\":\"1.2.A\",\"title\":\"T\",\"content\":\"Body.\",\"confidence\":\"high\"}]}  ";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        // Non-numeric confidence falls back to the default
        assert_eq!(parsed.entries[0].confidence, 0.8);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let reply = r#"[{"id":"1.1.A","content":"a","confidence":3.5},{"id":"1.1.B","content":"b","confidence":-1}]"#;
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.entries[0].confidence, 1.0);
        assert_eq!(parsed.entries[1].confidence, 0.0);
    }

    #[test]
    fn test_unescaped_latex_is_repaired() {
        let reply = r#"{"exercises":[{"id":"1.1.A","title":"Ex","content":"Use \subsection and \frac{1}{2} and \{x\}","confidence":0.9}]}"#;
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        assert_eq!(
            parsed.entries[0].content,
            r"Use \subsection and \frac{1}{2} and \{x\}"
        );
    }

    #[test]
    fn test_repair_keeps_valid_escapes() {
        assert_eq!(repair_latex_escapes(r#""a\n \"q\" \\ é""#), r#""a\n \"q\" \\ é""#);
        assert_eq!(repair_latex_escapes(r"\sum \textbf \n"), r"\\sum \\textbf \n");
        assert_eq!(repair_latex_escapes("end\\"), "end\\\\");
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let reply = r#"{"exercises":[{"id":"1.1.A","content":"Good."},{"id":"1.1.B"},{"id":"1.1.C","content":"   "},{"id":7,"content":"Numbered."}]}"#;
        let parsed = parser().parse(reply).unwrap();
        let ids: Vec<_> = parsed.entries.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1.1.A"), Some("7")]);
    }

    #[test]
    fn test_empty_exercise_list_is_structured() {
        let parsed = parser().parse("{\"exercises\": []}").unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentStructured);
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_pattern_scan_on_broken_json() {
        let reply = r#"{"exercises": [{"id": "1.1.A", "title": "Groupoids", "content": "Describe a groupoid.", "confidence": 0.9}, {"id": "1.1.B", "title": "Trunc"#;
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentFallback);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].id.as_deref(), Some("1.1.A"));
        assert_eq!(parsed.entries[0].title, "Groupoids");
        assert_eq!(parsed.entries[0].content, "Describe a groupoid.");
        assert_eq!(parsed.entries[0].confidence, 0.6);
    }

    #[test]
    fn test_pattern_scan_on_prose() {
        let reply = "I found these:\n- Exercise 1.1.A: Show that F is full.\n**Exercise 1.1.B** Prove the converse.";
        let parsed = parser().parse(reply).unwrap();
        assert_eq!(parsed.method, ExtractionMethod::AgentFallback);
        let ids: Vec<_> = parsed.entries.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1.1.A"), Some("1.1.B")]);
        assert_eq!(parsed.entries[1].content, "Prove the converse.");
    }

    #[test]
    fn test_nothing_recoverable() {
        assert_eq!(parser().parse("Sorry, I cannot help with that."), None);
        assert_eq!(parser().parse(""), None);
    }
}
