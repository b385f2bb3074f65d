//! Session orchestrator: lifecycle operations and the dispatch loop.
//!
//! The orchestrator owns every session mutation. Writes are serialized per
//! session through a lock map; the dispatch loop runs on a registered
//! background task with a cancellation handle, so multiple sessions
//! progress in parallel while each one stays strictly sequential.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use conclave_core::config::OrchestratorConfig;
use conclave_core::error::{ConclaveError, Result};
use conclave_core::event::{EventBroadcaster, SessionEvent};
use conclave_core::memory::MemoryStore;
use conclave_core::parser::PersonaAction;
use conclave_core::persona::{PersonaConfigRepository, PersonaConfiguration, PersonaRole};
use conclave_core::session::{
    Message, MessageKind, MessageRecord, MessageRepository, Session, SessionRepository,
    SessionStatus, SessionSummary,
};

use crate::engine::PersonaEngine;
use crate::loop_guard::DelegationTracker;

/// Answers longer than this are routed to the Coordinator for compilation.
const ANSWER_ROUTE_THRESHOLD: usize = 100;

/// How many trailing messages make up partial results when a stuck session
/// has produced no solutions at all.
const PARTIAL_RESULT_TRAIL: usize = 10;

/// A registered background dispatch task for one session.
struct Worker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives sessions from problem submission to a terminal outcome.
pub struct Orchestrator {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageRepository>,
    personas: Arc<dyn PersonaConfigRepository>,
    memory_store: Arc<MemoryStore>,
    engine: PersonaEngine,
    broadcaster: Arc<dyn EventBroadcaster>,
    config: OrchestratorConfig,
    /// Per-session serialization: every state-touching operation acquires
    /// the session's lock before reading or writing.
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Background dispatch tasks, keyed by session id so cancel can signal
    /// the worker.
    workers: Mutex<HashMap<String, Worker>>,
    /// Self-reference handed to spawned workers.
    me: Weak<Orchestrator>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageRepository>,
        personas: Arc<dyn PersonaConfigRepository>,
        memory_store: Arc<MemoryStore>,
        llm: Arc<dyn conclave_core::llm::LlmClient>,
        broadcaster: Arc<dyn EventBroadcaster>,
        config: OrchestratorConfig,
    ) -> Arc<Self> {
        let engine = PersonaEngine::new(llm, memory_store.clone(), config.clone());
        Arc::new_cyclic(|me| Self {
            sessions,
            messages,
            personas,
            memory_store,
            engine,
            broadcaster,
            config,
            session_locks: Mutex::new(HashMap::new()),
            workers: Mutex::new(HashMap::new()),
            me: me.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle operations
    // ------------------------------------------------------------------

    /// Creates a session for the given problem statement.
    ///
    /// Appends the problem-statement message and puts the Coordinator on
    /// deck, but does not drive the dispatch loop; call
    /// [`Orchestrator::spawn_processing`] (or [`Orchestrator::process`]
    /// directly) afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the problem is empty or whitespace.
    pub async fn initialize(&self, problem: &str) -> Result<Session> {
        let problem = problem.trim();
        if problem.is_empty() {
            return Err(ConclaveError::InvalidInput(
                "Problem statement cannot be empty".to_string(),
            ));
        }

        let session = Session::new(problem.to_string());
        let lock = self.session_lock(&session.id).await;
        let _guard = lock.lock().await;

        info!(session_id = %session.id, "[Orchestrator] Creating session: {}", session.title);

        self.sessions
            .save(&session)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))?;

        let statement = Message::new(
            &session.id,
            PersonaRole::User,
            MessageKind::ProblemStatement,
            problem,
        );
        self.messages
            .append(&statement)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))?;

        self.emit(
            &session.id,
            SessionEvent::MessageReceived {
                message: MessageRecord::from(&statement),
            },
        )
        .await;
        self.emit_status(&session).await;

        Ok(session)
    }

    /// Schedules the dispatch loop for a session on a background task.
    ///
    /// The task is registered with a cancellation token; it is never
    /// detached without a handle.
    pub async fn spawn_processing(&self, session_id: &str) {
        let Some(orchestrator) = self.me.upgrade() else {
            return;
        };
        let token = CancellationToken::new();
        let id = session_id.to_string();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = orchestrator.process_with_token(&id, task_token).await {
                error!(session_id = %id, "[Orchestrator] Dispatch loop failed: {}", e);
            }
        });

        let mut workers = self.workers.lock().await;
        workers.insert(session_id.to_string(), Worker { token, handle });
    }

    /// Awaits the registered background task for a session, if any.
    pub async fn join_worker(&self, session_id: &str) {
        let worker = {
            let mut workers = self.workers.lock().await;
            workers.remove(session_id)
        };
        if let Some(worker) = worker {
            if let Err(e) = worker.handle.await {
                error!(session_id = %session_id, "[Orchestrator] Worker task panicked: {}", e);
            }
        }
    }

    /// Runs the dispatch loop synchronously with respect to the session.
    ///
    /// Idempotent against terminal and waiting states: the loop returns
    /// without side effects when the session is not Active.
    pub async fn process(&self, session_id: &str) -> Result<()> {
        self.process_with_token(session_id, CancellationToken::new())
            .await
    }

    async fn process_with_token(&self, session_id: &str, cancel: CancellationToken) -> Result<()> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        match self.dispatch_loop(session_id, &cancel).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.mark_error(session_id, &e).await;
                Err(e)
            }
        }
    }

    /// Resumes a paused session with the user's answer to a clarification.
    ///
    /// # Errors
    ///
    /// `NotFound` when the session does not resolve; `InvalidState` unless
    /// the session is waiting for clarification.
    pub async fn handle_user_clarification(
        &self,
        session_id: &str,
        response: &str,
    ) -> Result<Message> {
        let message = {
            let lock = self.session_lock(session_id).await;
            let _guard = lock.lock().await;

            let mut session = self.load_session(session_id).await?;
            if session.status != SessionStatus::WaitingForClarification {
                return Err(ConclaveError::InvalidState(format!(
                    "Session {} is {}, not waiting for clarification",
                    session_id, session.status
                )));
            }

            let conversation = self
                .messages
                .list_for_session(session_id)
                .await
                .map_err(|e| ConclaveError::Internal(e.to_string()))?;
            let clarification = conversation
                .iter()
                .rev()
                .find(|m| m.kind == MessageKind::Clarification)
                .ok_or_else(|| {
                    ConclaveError::Internal(
                        "Session is waiting but has no clarification message".to_string(),
                    )
                })?;
            let clarifier = clarification.from;

            let message = Message::new(
                session_id,
                PersonaRole::User,
                MessageKind::UserResponse,
                response,
            )
            .with_parent(clarification.id.clone())
            .with_to(clarifier);
            self.messages
                .append(&message)
                .await
                .map_err(|e| ConclaveError::Internal(e.to_string()))?;
            self.emit(
                session_id,
                SessionEvent::MessageReceived {
                    message: MessageRecord::from(&message),
                },
            )
            .await;

            session.status = SessionStatus::Active;
            session.current_persona = Some(clarifier);
            session.touch();
            self.sessions
                .save(&session)
                .await
                .map_err(|e| ConclaveError::Internal(e.to_string()))?;
            self.emit_status(&session).await;

            info!(
                session_id = %session_id,
                persona = %clarifier,
                "[Orchestrator] Clarification received, resuming"
            );
            message
        };

        self.spawn_processing(session_id).await;
        Ok(message)
    }

    /// Restarts a stuck, interrupted or errored session from the Coordinator.
    ///
    /// # Errors
    ///
    /// `NotFound` when the session does not resolve; `InvalidState` outside
    /// {Stuck, Interrupted, Error}.
    pub async fn resume(&self, session_id: &str) -> Result<Session> {
        let session = {
            let lock = self.session_lock(session_id).await;
            let _guard = lock.lock().await;

            let mut session = self.load_session(session_id).await?;
            if !session.status.is_resumable() {
                return Err(ConclaveError::InvalidState(format!(
                    "Session {} cannot be resumed from {}",
                    session_id, session.status
                )));
            }

            session.status = SessionStatus::Active;
            session.current_persona = Some(PersonaRole::Coordinator);
            session.touch();
            self.sessions
                .save(&session)
                .await
                .map_err(|e| ConclaveError::Internal(e.to_string()))?;
            self.emit_status(&session).await;

            info!(session_id = %session_id, "[Orchestrator] Session resumed");
            session
        };

        self.spawn_processing(session_id).await;
        Ok(session)
    }

    /// Cancels a session. Idempotent.
    ///
    /// Deliberately does not take the session lock: a running dispatch loop
    /// holds it for the whole run and must observe the flipped status at
    /// its next turn boundary instead.
    ///
    /// # Errors
    ///
    /// `NotFound` when the session does not resolve.
    pub async fn cancel(&self, session_id: &str) -> Result<()> {
        let mut session = self.load_session(session_id).await?;

        if session.status.holds_persona() {
            session.status = SessionStatus::Cancelled;
            session.current_persona = None;
            session.touch();
            self.sessions
                .save(&session)
                .await
                .map_err(|e| ConclaveError::Internal(e.to_string()))?;
            self.emit_status(&session).await;
            info!(session_id = %session_id, "[Orchestrator] Session cancelled");
        }

        let workers = self.workers.lock().await;
        if let Some(worker) = workers.get(session_id) {
            worker.token.cancel();
        }
        Ok(())
    }

    /// Fetches a session by id.
    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.load_session(session_id).await
    }

    /// Lists all sessions, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.sessions
            .list_all()
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))
    }

    /// Returns the full conversation for a session, oldest first.
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        self.load_session(session_id).await?;
        self.messages
            .list_for_session(session_id)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Dispatch loop
    // ------------------------------------------------------------------

    async fn dispatch_loop(&self, session_id: &str, cancel: &CancellationToken) -> Result<()> {
        let mut depth: u32 = 0;
        let mut stuck_streak: u32 = 0;
        let mut tracker = DelegationTracker::new();
        let mut synthetic_incoming: Option<Message> = None;

        loop {
            // Turn boundary: cancellation and status are both observed here.
            if cancel.is_cancelled() {
                return Ok(());
            }
            let mut session = self.load_session(session_id).await?;
            if session.status != SessionStatus::Active {
                return Ok(());
            }

            if depth >= self.config.max_depth {
                warn!(
                    session_id = %session_id,
                    depth,
                    "[Orchestrator] Depth cap reached"
                );
                self.terminate_stuck(&mut session).await?;
                return Ok(());
            }

            let current = session.current_persona.ok_or_else(|| {
                ConclaveError::Internal("Active session has no persona on deck".to_string())
            })?;

            let conversation = match self.messages.list_for_session(session_id).await {
                Ok(conversation) => conversation,
                Err(e) => {
                    // Transient backend failure: degrade to a stuck turn so
                    // the Coordinator can try an alternative.
                    if self
                        .record_backend_stuck(
                            &mut session,
                            current,
                            &e.to_string(),
                            &mut stuck_streak,
                        )
                        .await?
                    {
                        return Ok(());
                    }
                    depth += 1;
                    continue;
                }
            };

            let incoming = match synthetic_incoming
                .take()
                .or_else(|| select_incoming(&conversation, current))
            {
                Some(incoming) => incoming,
                None => {
                    return Err(ConclaveError::Internal(
                        "Session has no incoming message to process".to_string(),
                    ));
                }
            };

            let persona = match self.dispatchable_persona(current).await? {
                Some(persona) => persona,
                None => {
                    // Misconfigured specialist: hand the work back.
                    warn!(
                        session_id = %session_id,
                        persona = %current,
                        "[Orchestrator] Persona unavailable, routing to Coordinator"
                    );
                    session.current_persona = Some(PersonaRole::Coordinator);
                    session.touch();
                    self.save_session(&session).await?;
                    depth += 1;
                    continue;
                }
            };

            let memories = match self
                .memory_store
                .get_recent(
                    session_id,
                    current,
                    Some(self.config.recent_memories_window),
                )
                .await
            {
                Ok(memories) => memories,
                Err(e) => {
                    warn!(session_id = %session_id, "[Orchestrator] Memory load failed: {}", e);
                    Vec::new()
                }
            };

            info!(
                session_id = %session_id,
                persona = %current,
                depth,
                "[Orchestrator] Dispatching turn"
            );
            let parsed = self
                .engine
                .process(&persona, &incoming, &session, &memories, &conversation)
                .await;

            // The LLM call is the long suspension point: re-check the
            // session before persisting anything. A result produced for a
            // session that was cancelled (or otherwise moved on) while we
            // were waiting is discarded, not persisted.
            let fresh = self.load_session(session_id).await?;
            if fresh.status != SessionStatus::Active || cancel.is_cancelled() {
                info!(
                    session_id = %session_id,
                    "[Orchestrator] Session left Active during turn, discarding result"
                );
                return Ok(());
            }
            session = fresh;

            let action = parsed.action.clone();
            let mut reasoning = parsed.reasoning.clone();

            // Loop detection runs before the message is built so the note
            // lands on the message itself.
            let mut delegation_loop = false;
            if let PersonaAction::Delegate { target, context } = &action {
                if tracker.is_loop(depth, current, *target, context) {
                    delegation_loop = true;
                    let note = format!(
                        "Delegation loop detected ({} -> {}), redirecting to Coordinator",
                        current.display_name(),
                        target.display_name()
                    );
                    warn!(session_id = %session_id, "[Orchestrator] {}", note);
                    reasoning = Some(match reasoning {
                        Some(existing) => format!("{existing}\n{note}"),
                        None => note,
                    });
                }
                tracker.record(depth, current, *target, context);
            }

            let message = self
                .build_turn_message(
                    &session,
                    current,
                    &action,
                    delegation_loop,
                    reasoning,
                    &incoming,
                    &parsed.raw,
                )
                .await?;

            self.emit(
                session_id,
                SessionEvent::MessageReceived {
                    message: MessageRecord::from(&message),
                },
            )
            .await;

            // Apply the action.
            match action {
                PersonaAction::Solution { text } => {
                    if current == PersonaRole::Coordinator {
                        session.final_solution = Some(text);
                        session.status = SessionStatus::Completed;
                        session.current_persona = None;
                        session.touch();
                        self.save_session(&session).await?;
                        self.emit_status(&session).await;
                        self.emit(
                            session_id,
                            SessionEvent::SolutionReady {
                                session: SessionSummary::from(&session),
                            },
                        )
                        .await;
                        info!(session_id = %session_id, "[Orchestrator] Session completed");
                        return Ok(());
                    }
                    // Intermediate result: the Coordinator compiles it.
                    session.current_persona = Some(PersonaRole::Coordinator);
                    stuck_streak = 0;
                }
                PersonaAction::Delegate { target, .. } => {
                    if delegation_loop {
                        session.current_persona = Some(PersonaRole::Coordinator);
                        stuck_streak += 1;
                    } else {
                        session.current_persona = Some(target);
                        stuck_streak = 0;
                    }
                }
                PersonaAction::Clarify { .. } => {
                    session.status = SessionStatus::WaitingForClarification;
                    session.touch();
                    self.save_session(&session).await?;
                    self.emit(
                        session_id,
                        SessionEvent::ClarificationRequested {
                            message: MessageRecord::from(&message),
                        },
                    )
                    .await;
                    self.emit_status(&session).await;
                    info!(session_id = %session_id, "[Orchestrator] Waiting for clarification");
                    return Ok(());
                }
                PersonaAction::Stuck { .. } => {
                    stuck_streak += 1;
                    if current == PersonaRole::Coordinator
                        || stuck_streak >= self.config.stuck_streak_limit
                    {
                        self.terminate_stuck(&mut session).await?;
                        return Ok(());
                    }
                    // Give the Coordinator a chance to try an alternative.
                    session.current_persona = Some(PersonaRole::Coordinator);
                }
                PersonaAction::Decline { .. } => {
                    session.current_persona = Some(PersonaRole::Coordinator);
                }
                PersonaAction::Answer { ref text } => {
                    if current != PersonaRole::Coordinator
                        || text.chars().count() > ANSWER_ROUTE_THRESHOLD
                    {
                        session.current_persona = Some(PersonaRole::Coordinator);
                    } else {
                        // A short Coordinator answer with no directive:
                        // demand an explicit decision on the next turn.
                        synthetic_incoming = Some(
                            Message::new(
                                session_id,
                                PersonaRole::User,
                                MessageKind::Question,
                                "Decide now: produce [SOLUTION] with the final result, or \
                                 [DELEGATE:<Persona Name>] the next step.",
                            )
                            .with_to(PersonaRole::Coordinator),
                        );
                    }
                }
            }

            if stuck_streak >= self.config.stuck_streak_limit {
                self.terminate_stuck(&mut session).await?;
                return Ok(());
            }

            session.touch();
            self.save_session(&session).await?;
            depth += 1;
        }
    }

    /// Builds and appends the message reflecting a turn's action.
    #[allow(clippy::too_many_arguments)]
    async fn build_turn_message(
        &self,
        session: &Session,
        current: PersonaRole,
        action: &PersonaAction,
        delegation_loop: bool,
        reasoning: Option<String>,
        incoming: &Message,
        raw: &str,
    ) -> Result<Message> {
        let (content, to) = match action {
            PersonaAction::Delegate { target, context } => {
                let to = if delegation_loop {
                    PersonaRole::Coordinator
                } else {
                    *target
                };
                (context.clone(), Some(to))
            }
            PersonaAction::Clarify { question } => (question.clone(), None),
            PersonaAction::Solution { text } => {
                let to = if current == PersonaRole::Coordinator {
                    None
                } else {
                    Some(PersonaRole::Coordinator)
                };
                (text.clone(), to)
            }
            PersonaAction::Stuck { reason } => {
                let to = if current == PersonaRole::Coordinator {
                    None
                } else {
                    Some(PersonaRole::Coordinator)
                };
                (reason.clone(), to)
            }
            PersonaAction::Decline { reason } => {
                (reason.clone(), Some(PersonaRole::Coordinator))
            }
            PersonaAction::Answer { text } => (text.clone(), Some(PersonaRole::Coordinator)),
        };

        let mut message = Message::new(&session.id, current, action.kind(), content)
            .with_parent(incoming.id.clone());
        if let Some(to) = to {
            message = message.with_to(to);
        }
        if let Some(reasoning) = reasoning {
            message = message.with_reasoning(reasoning);
        }
        if let PersonaAction::Delegate { target, context } = action {
            message = message.with_delegation(*target, context.clone());
        }
        if matches!(action, PersonaAction::Stuck { .. }) {
            message = message.with_stuck();
        }
        if !raw.is_empty() {
            message = message.with_raw_response(raw);
        }

        self.messages
            .append(&message)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))?;
        Ok(message)
    }

    /// Terminates a session as Stuck, publishing best-effort partial results.
    async fn terminate_stuck(&self, session: &mut Session) -> Result<()> {
        session.status = SessionStatus::Stuck;
        session.current_persona = None;
        session.touch();
        self.save_session(session).await?;

        let partial = match self.messages.list_for_session(&session.id).await {
            Ok(conversation) => partial_results(&conversation),
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    "[Orchestrator] Could not assemble partial results: {}",
                    e
                );
                String::new()
            }
        };

        self.emit_status(session).await;
        self.emit(
            &session.id,
            SessionEvent::SessionStuck {
                session: SessionSummary::from(&*session),
                partial_results: partial,
            },
        )
        .await;
        info!(session_id = %session.id, "[Orchestrator] Session stuck");
        Ok(())
    }

    /// Degrades a mid-turn backend failure to a Stuck message. Returns true
    /// when the failure terminated the session.
    async fn record_backend_stuck(
        &self,
        session: &mut Session,
        current: PersonaRole,
        detail: &str,
        stuck_streak: &mut u32,
    ) -> Result<bool> {
        warn!(
            session_id = %session.id,
            "[Orchestrator] Backend failure inside turn: {}",
            detail
        );
        let message = Message::new(
            &session.id,
            current,
            MessageKind::Stuck,
            format!("Backend error: {detail}"),
        )
        .with_stuck();
        if let Err(e) = self.messages.append(&message).await {
            return Err(ConclaveError::Internal(e.to_string()));
        }
        self.emit(
            &session.id,
            SessionEvent::MessageReceived {
                message: MessageRecord::from(&message),
            },
        )
        .await;

        *stuck_streak += 1;
        if current == PersonaRole::Coordinator || *stuck_streak >= self.config.stuck_streak_limit {
            self.terminate_stuck(session).await?;
            return Ok(true);
        }
        session.current_persona = Some(PersonaRole::Coordinator);
        session.touch();
        self.save_session(session).await?;
        Ok(false)
    }

    /// Looks up an enabled configuration for the persona about to run.
    ///
    /// Missing or disabled specialists yield `None` (the work is routed
    /// back); a missing Coordinator is a roster misconfiguration.
    async fn dispatchable_persona(
        &self,
        role: PersonaRole,
    ) -> Result<Option<PersonaConfiguration>> {
        let found = self
            .personas
            .find_by_role(role)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))?;
        match found {
            Some(persona) if persona.enabled => Ok(Some(persona)),
            _ if role == PersonaRole::Coordinator => Err(ConclaveError::Internal(
                "Coordinator persona is missing or disabled".to_string(),
            )),
            _ => Ok(None),
        }
    }

    /// Marks a session as Error after an unexpected failure, best-effort.
    async fn mark_error(&self, session_id: &str, cause: &ConclaveError) {
        error!(session_id = %session_id, "[Orchestrator] Internal failure: {}", cause);
        match self.sessions.find_by_id(session_id).await {
            Ok(Some(mut session)) if session.status == SessionStatus::Active => {
                session.status = SessionStatus::Error;
                session.current_persona = None;
                session.touch();
                if let Err(e) = self.sessions.save(&session).await {
                    error!(session_id = %session_id, "[Orchestrator] Could not persist Error status: {}", e);
                    return;
                }
                self.emit_status(&session).await;
            }
            Ok(_) => {}
            Err(e) => {
                error!(session_id = %session_id, "[Orchestrator] Could not load session to mark Error: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Small helpers
    // ------------------------------------------------------------------

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_session(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .find_by_id(session_id)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))?
            .ok_or_else(|| ConclaveError::NotFound(format!("Session not found: {session_id}")))
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .save(session)
            .await
            .map_err(|e| ConclaveError::Internal(e.to_string()))
    }

    async fn emit(&self, session_id: &str, event: SessionEvent) {
        self.broadcaster.broadcast(session_id, event).await;
    }

    async fn emit_status(&self, session: &Session) {
        self.emit(
            &session.id,
            SessionEvent::SessionStatusChanged {
                session: SessionSummary::from(session),
            },
        )
        .await;
    }
}

/// Picks the message the current persona should respond to: the last
/// non-user message directed at it, else the last user message (which on
/// the very first turn is the problem statement).
fn select_incoming(conversation: &[Message], current: PersonaRole) -> Option<Message> {
    conversation
        .iter()
        .rev()
        .find(|m| m.from != PersonaRole::User && m.to == Some(current))
        .or_else(|| {
            conversation
                .iter()
                .rev()
                .find(|m| m.from == PersonaRole::User)
        })
        .cloned()
}

/// Partial results for a stuck session: every solution produced so far, or
/// the trailing conversation when there are none.
fn partial_results(conversation: &[Message]) -> String {
    let solutions: Vec<&str> = conversation
        .iter()
        .filter(|m| m.kind == MessageKind::Solution)
        .map(|m| m.content.as_str())
        .collect();
    if !solutions.is_empty() {
        return solutions.join("\n\n");
    }

    let trail: Vec<&str> = conversation
        .iter()
        .rev()
        .take(PARTIAL_RESULT_TRAIL)
        .map(|m| m.content.as_str())
        .collect();
    trail
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: PersonaRole, to: Option<PersonaRole>, kind: MessageKind, content: &str) -> Message {
        let mut m = Message::new("s", from, kind, content);
        m.to = to;
        m
    }

    #[test]
    fn test_select_incoming_prefers_directed_message() {
        let conversation = vec![
            message(PersonaRole::User, None, MessageKind::ProblemStatement, "problem"),
            message(
                PersonaRole::Coordinator,
                Some(PersonaRole::SeniorDeveloper),
                MessageKind::Delegation,
                "build it",
            ),
        ];
        let incoming = select_incoming(&conversation, PersonaRole::SeniorDeveloper).unwrap();
        assert_eq!(incoming.kind, MessageKind::Delegation);
    }

    #[test]
    fn test_select_incoming_falls_back_to_user_message() {
        let conversation = vec![message(
            PersonaRole::User,
            None,
            MessageKind::ProblemStatement,
            "problem",
        )];
        let incoming = select_incoming(&conversation, PersonaRole::Coordinator).unwrap();
        assert_eq!(incoming.kind, MessageKind::ProblemStatement);
    }

    #[test]
    fn test_partial_results_prefers_solutions() {
        let conversation = vec![
            message(PersonaRole::User, None, MessageKind::ProblemStatement, "p"),
            message(PersonaRole::SeniorDeveloper, None, MessageKind::Solution, "draft one"),
            message(PersonaRole::Coordinator, None, MessageKind::Answer, "noted"),
            message(PersonaRole::SeniorQa, None, MessageKind::Solution, "draft two"),
        ];
        assert_eq!(partial_results(&conversation), "draft one\n\ndraft two");
    }

    #[test]
    fn test_partial_results_falls_back_to_trailing_messages() {
        let conversation: Vec<Message> = (0..15)
            .map(|i| {
                message(
                    PersonaRole::Coordinator,
                    None,
                    MessageKind::Answer,
                    &format!("note {i}"),
                )
            })
            .collect();
        let partial = partial_results(&conversation);
        assert!(partial.starts_with("note 5"));
        assert!(partial.ends_with("note 14"));
        assert_eq!(partial.lines().count(), 10);
    }
}
