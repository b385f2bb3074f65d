//! Persona engine: one turn of one persona.
//!
//! The engine assembles the LLM request from the persona's configuration,
//! the conversation slice and the persona's memories, invokes the client,
//! and runs the parser. STORE directives are executed here, after parsing
//! and before the action is handed back; a failed store is logged and never
//! fails the turn. The engine itself is stateless and idempotent per call.

use std::sync::Arc;

use tracing::{debug, warn};

use conclave_core::config::OrchestratorConfig;
use conclave_core::llm::{ChatMessage, ChatRole, CompletionRequest, LlmClient};
use conclave_core::memory::{Memory, MemoryStore};
use conclave_core::parser::{self, ParsedResponse, PersonaAction};
use conclave_core::persona::{PersonaConfiguration, PersonaRole};
use conclave_core::session::{Message, Session};

/// Builds requests, invokes the LLM and parses the outcome for one turn.
pub struct PersonaEngine {
    llm: Arc<dyn LlmClient>,
    memory_store: Arc<MemoryStore>,
    config: OrchestratorConfig,
}

impl PersonaEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        memory_store: Arc<MemoryStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            llm,
            memory_store,
            config,
        }
    }

    /// Runs one turn for `persona`.
    ///
    /// Never fails: an LLM transport or provider error degrades to a Stuck
    /// action carrying the provider message, which lets the Coordinator try
    /// an alternative instead of killing the loop.
    pub async fn process(
        &self,
        persona: &PersonaConfiguration,
        incoming: &Message,
        session: &Session,
        memories: &[Memory],
        history: &[Message],
    ) -> ParsedResponse {
        let request = self
            .build_request(persona, incoming, session, memories, history)
            .await;

        let response = match self.llm.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    persona = %persona.role,
                    "[PersonaEngine] LLM call failed: {}",
                    e
                );
                let reason = format!("LLM error: {e}");
                return ParsedResponse {
                    action: PersonaAction::Stuck {
                        reason: reason.clone(),
                    },
                    content: reason,
                    reasoning: None,
                    stores: Vec::new(),
                    remembers: Vec::new(),
                    raw: String::new(),
                };
            }
        };

        let parsed = parser::parse(&response.content);
        self.run_store_directives(session, persona.role, &parsed)
            .await;
        parsed
    }

    /// Assembles the message list: summary line, recent memories, the
    /// conversation window, recalled notes, then the incoming message.
    async fn build_request(
        &self,
        persona: &PersonaConfiguration,
        incoming: &Message,
        session: &Session,
        memories: &[Memory],
        history: &[Message],
    ) -> CompletionRequest {
        let mut messages = Vec::new();

        messages.push(ChatMessage::user(format!(
            "Session: {}\nProblem: {}",
            session.title, session.problem_statement
        )));

        if !memories.is_empty() {
            let rendered: Vec<String> = memories
                .iter()
                .take(self.config.recent_memories_window)
                .map(|m| format!("{}: {}", m.identifier, m.content))
                .collect();
            messages.push(ChatMessage::user(format!(
                "Your notes:\n{}",
                rendered.join("\n")
            )));
        }

        let window = self.config.conversation_window;
        let slice: Vec<&Message> = history
            .iter()
            .filter(|m| m.id != incoming.id)
            .collect();
        let start = slice.len().saturating_sub(window);
        for message in &slice[start..] {
            let role = if message.from == persona.role {
                ChatRole::Assistant
            } else {
                ChatRole::User
            };
            messages.push(ChatMessage {
                role,
                content: format!("{}: {}", message.from.display_name(), message.content),
            });
        }

        for recalled in self.resolve_remembers(session, persona.role, incoming).await {
            messages.push(recalled);
        }

        messages.push(ChatMessage::user(format!(
            "{}: {}",
            incoming.from.display_name(),
            incoming.content
        )));

        CompletionRequest {
            model: persona.model.clone(),
            system_prompt: persona.system_prompt.clone(),
            messages,
            temperature: persona.temperature,
            max_tokens: persona.max_tokens,
        }
    }

    /// Resolves `[REMEMBER:id]` references carried by the incoming message
    /// against this persona's memories. Unknown identifiers are skipped.
    async fn resolve_remembers(
        &self,
        session: &Session,
        persona: PersonaRole,
        incoming: &Message,
    ) -> Vec<ChatMessage> {
        let source = incoming.raw_response.as_deref().unwrap_or(&incoming.content);
        let mut recalled = Vec::new();
        for identifier in parser::remember_refs(source) {
            match self
                .memory_store
                .get_by_identifier(&session.id, persona, &identifier)
                .await
            {
                Ok(Some(memory)) => {
                    recalled.push(ChatMessage::user(format!(
                        "Recalled note {}: {}",
                        memory.identifier, memory.content
                    )));
                }
                Ok(None) => {
                    debug!(
                        session_id = %session.id,
                        "[PersonaEngine] No memory for recalled identifier '{}'",
                        identifier
                    );
                }
                Err(e) => {
                    warn!(
                        session_id = %session.id,
                        "[PersonaEngine] Memory recall failed for '{}': {}",
                        identifier, e
                    );
                }
            }
        }
        recalled
    }

    /// Store directives run as a post-action phase within the turn.
    async fn run_store_directives(
        &self,
        session: &Session,
        persona: PersonaRole,
        parsed: &ParsedResponse,
    ) {
        for directive in &parsed.stores {
            if let Err(e) = self
                .memory_store
                .store(&session.id, persona, &directive.identifier, &directive.content)
                .await
            {
                warn!(
                    session_id = %session.id,
                    persona = %persona,
                    "[PersonaEngine] Failed to store memory '{}': {}",
                    directive.identifier, e
                );
            }
        }
    }
}
