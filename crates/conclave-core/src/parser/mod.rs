//! Response parser: turns free-form LLM text into a typed action.
//!
//! The grammar is line-oriented and case-sensitive. Directives are
//! bracketed tags; the first action tag wins, everything else in the text
//! becomes visible content. The parser is a pure function and never fails:
//! unparseable input degrades to an `Answer` carrying the raw text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::persona::PersonaRole;
use crate::session::MessageKind;

static DELEGATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[DELEGATE:([^\]]+)\]\s*(.*)$").unwrap());
static STORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[STORE:([^\]]+)\]\s*(.*)$").unwrap());
static REMEMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[REMEMBER:([^\]]+)\]").unwrap());

const CLARIFY_TAG: &str = "[CLARIFY]";
const SOLUTION_TAG: &str = "[SOLUTION]";
const STUCK_TAG: &str = "[STUCK]";
const DECLINE_TAG: &str = "[DECLINE]";
const REASONING_OPEN: &str = "[REASONING]";
const REASONING_CLOSE: &str = "[/REASONING]";

/// The typed outcome of one persona turn.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonaAction {
    /// Hand the task to another roster member.
    Delegate {
        target: PersonaRole,
        context: String,
    },
    /// Ask the user a question; pauses the session.
    Clarify { question: String },
    /// Present a result (final when it comes from the Coordinator).
    Solution { text: String },
    /// Declare no progress can be made.
    Stuck { reason: String },
    /// Decline the delegated work.
    Decline { reason: String },
    /// A plain response carrying no directive.
    Answer { text: String },
}

impl PersonaAction {
    /// The message kind a message reflecting this action carries.
    pub fn kind(&self) -> MessageKind {
        match self {
            PersonaAction::Delegate { .. } => MessageKind::Delegation,
            PersonaAction::Clarify { .. } => MessageKind::Clarification,
            PersonaAction::Solution { .. } => MessageKind::Solution,
            PersonaAction::Stuck { .. } => MessageKind::Stuck,
            PersonaAction::Decline { .. } => MessageKind::Decline,
            PersonaAction::Answer { .. } => MessageKind::Answer,
        }
    }

    /// Renders the action back to its canonical tag form.
    ///
    /// Delegations use the canonical display name, so parsing
    /// `[DELEGATE:businessanalyst] x` and re-rendering yields
    /// `[DELEGATE:Business Analyst] x`.
    pub fn render(&self) -> String {
        match self {
            PersonaAction::Delegate { target, context } => {
                format!("[DELEGATE:{}] {}", target.display_name(), context)
            }
            PersonaAction::Clarify { question } => format!("[CLARIFY] {question}"),
            PersonaAction::Solution { text } => format!("[SOLUTION] {text}"),
            PersonaAction::Stuck { reason } => format!("[STUCK] {reason}"),
            PersonaAction::Decline { reason } => format!("[DECLINE] {reason}"),
            PersonaAction::Answer { text } => text.clone(),
        }
    }
}

/// A `[STORE:identifier] content` directive found alongside the action.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDirective {
    pub identifier: String,
    pub content: String,
}

/// Everything extracted from one LLM response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// The winning action (first action tag, or an inferred Answer).
    pub action: PersonaAction,
    /// Visible content: the response with all tags removed.
    pub content: String,
    /// Internal reasoning from `[REASONING]` blocks, plus parser notes.
    pub reasoning: Option<String>,
    /// Memory writes to run after the action is recorded.
    pub stores: Vec<StoreDirective>,
    /// Memory identifiers to resolve into context on the next turn.
    pub remembers: Vec<String>,
    /// The unmodified response, kept for diagnostics.
    pub raw: String,
}

/// Parses one LLM response. Pure, total, never panics.
pub fn parse(text: &str) -> ParsedResponse {
    let raw = text.to_string();
    let (working, reasoning) = extract_reasoning(text);

    let mut stores = Vec::new();
    let mut remembers = Vec::new();
    let mut visible_lines: Vec<String> = Vec::new();
    let mut action: Option<PersonaAction> = None;
    let mut notes: Vec<String> = Vec::new();
    let mut solution_lines: Vec<String> = Vec::new();
    let mut in_solution_block = false;

    for line in working.lines() {
        let trimmed = line.trim();

        if let Some(captures) = STORE_RE.captures(trimmed) {
            stores.push(StoreDirective {
                identifier: captures[1].trim().to_string(),
                content: captures[2].trim().to_string(),
            });
            continue;
        }

        // Full-line REMEMBER directives disappear; inline ones are
        // stripped below but still collected.
        for captures in REMEMBER_RE.captures_iter(trimmed) {
            remembers.push(captures[1].trim().to_string());
        }
        if REMEMBER_RE.replace_all(trimmed, "").trim().is_empty() && !trimmed.is_empty() {
            continue;
        }

        if action.is_none() && !in_solution_block {
            if let Some(captures) = DELEGATE_RE.captures(trimmed) {
                let name = captures[1].trim();
                let context = captures[2].trim().to_string();
                match PersonaRole::match_name(name) {
                    Some(target) => {
                        action = Some(PersonaAction::Delegate { target, context });
                    }
                    None => {
                        // Unknown target demotes the whole response to an
                        // Answer; the note survives in reasoning.
                        notes.push(format!("Unknown delegate target: {name}"));
                        visible_lines.push(strip_tags(line));
                    }
                }
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix(CLARIFY_TAG) {
                action = Some(PersonaAction::Clarify {
                    question: rest.trim().to_string(),
                });
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix(SOLUTION_TAG) {
                // A solution may span lines: the trailing block belongs to it.
                in_solution_block = true;
                let first = rest.trim();
                if !first.is_empty() {
                    solution_lines.push(first.to_string());
                }
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix(STUCK_TAG) {
                action = Some(PersonaAction::Stuck {
                    reason: rest.trim().to_string(),
                });
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix(DECLINE_TAG) {
                action = Some(PersonaAction::Decline {
                    reason: rest.trim().to_string(),
                });
                continue;
            }
        }

        if in_solution_block {
            solution_lines.push(strip_tags(line));
        } else {
            visible_lines.push(strip_tags(line));
        }
    }

    if in_solution_block {
        action = Some(PersonaAction::Solution {
            text: join_trimmed(&solution_lines),
        });
    }

    let content = join_trimmed(&visible_lines);
    let action = action.unwrap_or_else(|| {
        let text = if content.is_empty() {
            raw.clone()
        } else {
            content.clone()
        };
        PersonaAction::Answer { text }
    });

    let reasoning = merge_reasoning(reasoning, notes);

    ParsedResponse {
        action,
        content,
        reasoning,
        stores,
        remembers,
        raw,
    }
}

/// Extracts `[REMEMBER:id]` references from raw response text, in order.
pub fn remember_refs(text: &str) -> Vec<String> {
    REMEMBER_RE
        .captures_iter(text)
        .map(|captures| captures[1].trim().to_string())
        .collect()
}

/// Removes `[REASONING]...[/REASONING]` blocks, returning the remaining
/// text and the concatenated inner reasoning.
fn extract_reasoning(text: &str) -> (String, Option<String>) {
    let mut working = text.to_string();
    let mut pieces: Vec<String> = Vec::new();

    while let Some(open) = working.find(REASONING_OPEN) {
        let after_open = open + REASONING_OPEN.len();
        match working[after_open..].find(REASONING_CLOSE) {
            Some(offset) => {
                let close = after_open + offset;
                let inner = working[after_open..close].trim().to_string();
                if !inner.is_empty() {
                    pieces.push(inner);
                }
                working.replace_range(open..close + REASONING_CLOSE.len(), "");
            }
            None => {
                // Unterminated block: take everything to the end.
                let inner = working[after_open..].trim().to_string();
                if !inner.is_empty() {
                    pieces.push(inner);
                }
                working.truncate(open);
                break;
            }
        }
    }

    let reasoning = if pieces.is_empty() {
        None
    } else {
        Some(pieces.join("\n"))
    };
    (working, reasoning)
}

fn merge_reasoning(reasoning: Option<String>, notes: Vec<String>) -> Option<String> {
    let mut pieces: Vec<String> = reasoning.into_iter().collect();
    pieces.extend(notes);
    if pieces.is_empty() {
        None
    } else {
        Some(pieces.join("\n"))
    }
}

/// Strips inline REMEMBER tags from a visible line.
fn strip_tags(line: &str) -> String {
    REMEMBER_RE.replace_all(line, "").trim_end().to_string()
}

fn join_trimmed(lines: &[String]) -> String {
    let joined = lines.join("\n");
    joined.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_with_valid_persona() {
        let parsed = parse("[DELEGATE:BusinessAnalyst] gather requirements");
        assert_eq!(
            parsed.action,
            PersonaAction::Delegate {
                target: PersonaRole::BusinessAnalyst,
                context: "gather requirements".to_string(),
            }
        );
        assert_eq!(parsed.action.kind(), MessageKind::Delegation);
    }

    #[test]
    fn test_delegate_render_round_trip() {
        let parsed = parse("[DELEGATE:businessanalyst] gather requirements");
        assert_eq!(
            parsed.action.render(),
            "[DELEGATE:Business Analyst] gather requirements"
        );
    }

    #[test]
    fn test_unknown_delegate_demotes_to_answer() {
        let parsed = parse("[DELEGATE:Intern] please do this");
        assert!(matches!(parsed.action, PersonaAction::Answer { .. }));
        assert!(
            parsed
                .reasoning
                .as_deref()
                .unwrap()
                .contains("Unknown delegate target: Intern")
        );
    }

    #[test]
    fn test_clarify() {
        let parsed = parse("[CLARIFY] Which language should the CLI use?");
        assert_eq!(
            parsed.action,
            PersonaAction::Clarify {
                question: "Which language should the CLI use?".to_string(),
            }
        );
    }

    #[test]
    fn test_single_line_solution() {
        let parsed = parse("[SOLUTION] The answer is 4");
        assert_eq!(
            parsed.action,
            PersonaAction::Solution {
                text: "The answer is 4".to_string(),
            }
        );
    }

    #[test]
    fn test_multi_line_solution_takes_trailing_block() {
        let parsed = parse("[SOLUTION] ## Final\nStep one.\nStep two.");
        match parsed.action {
            PersonaAction::Solution { text } => {
                assert!(text.starts_with("## Final"));
                assert!(text.contains("Step two."));
            }
            other => panic!("expected solution, got {other:?}"),
        }
    }

    #[test]
    fn test_stuck_and_decline() {
        assert_eq!(
            parse("[STUCK] no idea").action,
            PersonaAction::Stuck {
                reason: "no idea".to_string()
            }
        );
        assert_eq!(
            parse("[DECLINE] too complex").action,
            PersonaAction::Decline {
                reason: "too complex".to_string()
            }
        );
    }

    #[test]
    fn test_first_action_tag_wins() {
        let parsed = parse("[CLARIFY] first?\n[STUCK] second");
        assert_eq!(
            parsed.action,
            PersonaAction::Clarify {
                question: "first?".to_string()
            }
        );
    }

    #[test]
    fn test_plain_text_is_answer() {
        let parsed = parse("I think we should use a queue here.");
        assert_eq!(
            parsed.action,
            PersonaAction::Answer {
                text: "I think we should use a queue here.".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_response_is_answer_with_raw() {
        let parsed = parse("");
        assert_eq!(parsed.action, PersonaAction::Answer { text: String::new() });
        assert_eq!(parsed.raw, "");
    }

    #[test]
    fn test_store_directives_collected_alongside_action() {
        let parsed = parse(
            "[DELEGATE:TechnicalArchitect] design it\n[STORE:requirements] REST API with auth",
        );
        assert!(matches!(parsed.action, PersonaAction::Delegate { .. }));
        assert_eq!(
            parsed.stores,
            vec![StoreDirective {
                identifier: "requirements".to_string(),
                content: "REST API with auth".to_string(),
            }]
        );
    }

    #[test]
    fn test_remember_directives_collected_and_stripped() {
        let parsed = parse("[REMEMBER:requirements]\nUsing the stored requirements now.");
        assert_eq!(parsed.remembers, vec!["requirements".to_string()]);
        assert_eq!(parsed.content, "Using the stored requirements now.");
    }

    #[test]
    fn test_reasoning_extracted_and_hidden() {
        let parsed = parse("[REASONING]they probably want Go[/REASONING][CLARIFY] Which language?");
        assert_eq!(parsed.reasoning.as_deref(), Some("they probably want Go"));
        assert_eq!(
            parsed.action,
            PersonaAction::Clarify {
                question: "Which language?".to_string()
            }
        );
        assert!(!parsed.content.contains("probably"));
    }

    #[test]
    fn test_unterminated_reasoning_block() {
        let parsed = parse("Answer text\n[REASONING]half a thought");
        assert_eq!(parsed.reasoning.as_deref(), Some("half a thought"));
        assert_eq!(
            parsed.action,
            PersonaAction::Answer {
                text: "Answer text".to_string()
            }
        );
    }

    #[test]
    fn test_raw_is_always_preserved() {
        let text = "[SOLUTION] done\n[STORE:k] v";
        assert_eq!(parse(text).raw, text);
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let parsed = parse("[solution] lowercase tags do not count");
        assert!(matches!(parsed.action, PersonaAction::Answer { .. }));
    }

    #[test]
    fn test_store_after_solution_excluded_from_text() {
        let parsed = parse("[SOLUTION] the result\n[STORE:note] keep this\nmore detail");
        match parsed.action {
            PersonaAction::Solution { text } => {
                assert!(text.contains("the result"));
                assert!(text.contains("more detail"));
                assert!(!text.contains("keep this"));
            }
            other => panic!("expected solution, got {other:?}"),
        }
        assert_eq!(parsed.stores.len(), 1);
    }
}
