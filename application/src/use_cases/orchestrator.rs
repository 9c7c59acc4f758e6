//! Orchestrator: the single entry point for handling user requests.
//!
//! Owns the tool server session and its catalog. Each turn runs
//! resolve → (direct reply | invoke → compose) and always produces a
//! [`ConversationTurn`]; only [`OrchestratorError::NotConnected`] and
//! [`OrchestratorError::Connect`] fail a call outright.
//!
//! Connect, disconnect and catalog refresh take the write side of one
//! [`RwLock`], so they wait for in-flight turns and turns wait for them.
//! Turns take the read side and may run concurrently.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::tool_server::{ToolServerSession, ToolServerTransport};
use crate::use_cases::compose_response::ComposeResponseUseCase;
use crate::use_cases::invoke_tool::InvokeToolUseCase;
use crate::use_cases::negotiate_transport::{ConnectError, TransportNegotiator};
use crate::use_cases::resolve_intent::ResolveIntentUseCase;
use concierge_domain::util::preview;
use concierge_domain::{
    ConversationTurn, OrchestratorState, PromptTemplate, SessionStatus, ToolArguments,
    ToolCatalog, ToolDescriptor, ToolInvocationResult, TransportKind, UserInput,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Errors that fail an orchestrator call outright
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Not connected to the tool server")]
    NotConnected,

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Per-turn options
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    /// Overrides the configured turn timeout for this call
    pub timeout: Option<Duration>,
}

impl TurnOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

struct ActiveSession {
    session: Box<dyn ToolServerSession>,
    kind: TransportKind,
    endpoint: String,
    catalog: Arc<ToolCatalog>,
}

/// Decrements the in-flight counter when a turn ends, however it ends
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    negotiator: TransportNegotiator,
    gateway: Arc<dyn LlmGateway>,
    resolver: ResolveIntentUseCase,
    invoker: InvokeToolUseCase,
    composer: ComposeResponseUseCase,
    conversation_logger: Arc<dyn ConversationLogger>,
    behavior: BehaviorConfig,
    active: RwLock<Option<ActiveSession>>,
    lifecycle: Mutex<OrchestratorState>,
    in_flight: AtomicUsize,
}

impl Orchestrator {
    /// `transports` are tried in order on every connect.
    pub fn new(
        transports: Vec<Arc<dyn ToolServerTransport>>,
        gateway: Arc<dyn LlmGateway>,
        behavior: BehaviorConfig,
    ) -> Self {
        Self {
            negotiator: TransportNegotiator::new(transports, behavior.client_identity.clone()),
            resolver: ResolveIntentUseCase::new(gateway.clone()),
            invoker: InvokeToolUseCase::new(behavior.strict_validation),
            composer: ComposeResponseUseCase::new(gateway.clone()),
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
            behavior,
            active: RwLock::new(None),
            lifecycle: Mutex::new(OrchestratorState::Uninitialized),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    // ==================== Lifecycle ====================

    /// Connect to the tool server and load its catalog.
    ///
    /// Does nothing when already connected. A session whose server side has
    /// gone away is closed and a new one negotiated.
    pub async fn connect(&self) -> Result<(), OrchestratorError> {
        let mut active = self.active.write().await;
        if let Some(current) = active.as_ref() {
            let lost = current.session.is_closed();
            if self.lifecycle() == OrchestratorState::Ready && !lost {
                debug!("connect() called while already connected");
                return Ok(());
            }
            if lost {
                warn!("{} session to {} was lost", current.kind, current.endpoint);
            }
            self.disconnect_locked(&mut active).await;
        }
        self.connect_locked(&mut active).await
    }

    /// Close the session. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let mut active = self.active.write().await;
        self.disconnect_locked(&mut active).await;
    }

    /// Drop the current session (if any) and negotiate a new one.
    pub async fn reconnect(&self) -> Result<(), OrchestratorError> {
        let mut active = self.active.write().await;
        self.disconnect_locked(&mut active).await;
        self.connect_locked(&mut active).await
    }

    /// Re-read the tool list from the server, replacing the catalog.
    ///
    /// Returns the number of tools now available.
    pub async fn refresh_tools(&self) -> Result<usize, OrchestratorError> {
        let mut active = self.active.write().await;
        let session = active.as_mut().ok_or(OrchestratorError::NotConnected)?;
        let catalog = load_catalog(session.session.as_ref()).await;
        let count = catalog.len();
        session.catalog = Arc::new(catalog);
        Ok(count)
    }

    async fn connect_locked(
        &self,
        active: &mut Option<ActiveSession>,
    ) -> Result<(), OrchestratorError> {
        self.set_lifecycle(OrchestratorState::Connecting);

        let negotiated = match self.negotiator.negotiate().await {
            Ok(negotiated) => negotiated,
            Err(e) => {
                self.set_lifecycle(OrchestratorState::Disconnected);
                return Err(e.into());
            }
        };

        let catalog = load_catalog(negotiated.session.as_ref()).await;
        info!(
            "Ready: {} tool(s) via {} at {}",
            catalog.len(),
            negotiated.kind,
            negotiated.endpoint
        );
        self.conversation_logger.log(ConversationEvent::new(
            "connected",
            json!({
                "transport": negotiated.kind.as_str(),
                "endpoint": negotiated.endpoint,
                "tools": catalog.names().collect::<Vec<_>>(),
            }),
        ));

        *active = Some(ActiveSession {
            session: negotiated.session,
            kind: negotiated.kind,
            endpoint: negotiated.endpoint,
            catalog: Arc::new(catalog),
        });
        self.set_lifecycle(OrchestratorState::Ready);
        Ok(())
    }

    async fn disconnect_locked(&self, active: &mut Option<ActiveSession>) {
        if let Some(session) = active.take() {
            if let Err(e) = session.session.close().await {
                warn!("Error while closing {} session: {}", session.kind, e);
            }
            info!("Disconnected from {}", session.endpoint);
            self.conversation_logger.log(ConversationEvent::new(
                "disconnected",
                json!({ "transport": session.kind.as_str(), "endpoint": session.endpoint }),
            ));
        }
        self.set_lifecycle(OrchestratorState::Disconnected);
    }

    // ==================== Accessors ====================

    /// Current lifecycle state. A session lost since the last request is
    /// reported as `Disconnected` right away.
    pub fn state(&self) -> OrchestratorState {
        match self.lifecycle() {
            OrchestratorState::Ready if self.session_lost() => OrchestratorState::Disconnected,
            OrchestratorState::Ready if self.in_flight.load(Ordering::SeqCst) > 0 => {
                OrchestratorState::Processing
            }
            state => state,
        }
    }

    /// Whether the held session reports its server side gone. While connect
    /// or disconnect holds the lock the lifecycle state is authoritative.
    fn session_lost(&self) -> bool {
        self.active
            .try_read()
            .map(|active| active.as_ref().is_some_and(|a| a.session.is_closed()))
            .unwrap_or(false)
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            OrchestratorState::Ready | OrchestratorState::Processing
        )
    }

    /// Tools in the current catalog, in server order. Empty when disconnected.
    pub async fn list_available_tools(&self) -> Vec<ToolDescriptor> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| a.catalog.all().to_vec())
            .unwrap_or_default()
    }

    pub async fn status(&self) -> SessionStatus {
        let active = self.active.read().await;
        SessionStatus {
            state: self.state(),
            transport: active.as_ref().map(|a| a.kind),
            endpoint: active
                .as_ref()
                .map(|a| a.endpoint.clone())
                .unwrap_or_else(|| self.negotiator.primary_endpoint().to_string()),
            tool_count: active.as_ref().map(|a| a.catalog.len()).unwrap_or_default(),
            model: self.gateway.model_id().to_string(),
        }
    }

    // ==================== Requests ====================

    /// Handle one user request end to end.
    ///
    /// Fails only when not connected; every other problem is reported inside
    /// the returned turn.
    pub async fn process_user_input(
        &self,
        text: &str,
        options: TurnOptions,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<ConversationTurn, OrchestratorError> {
        let guard = self.active.read().await;
        let active = self.ready_session(guard.as_ref())?;
        let _in_flight = InFlight::enter(&self.in_flight);
        let started = Instant::now();

        let turn = match UserInput::try_new(text) {
            Ok(input) => {
                info!("Processing: {}", preview(input.content(), 100));
                let work = self.run_turn(active, input.content(), progress);
                match options.timeout.or(self.behavior.turn_timeout) {
                    Some(limit) => match tokio::time::timeout(limit, work).await {
                        Ok(turn) => turn,
                        Err(_) => {
                            warn!("Turn timed out after {:?}", limit);
                            ConversationTurn::failed(
                                input.content(),
                                "request timed out",
                                format!("Request timed out after {}s", limit.as_secs_f64()),
                            )
                        }
                    },
                    None => work.await,
                }
            }
            Err(e) => ConversationTurn::failed(text, "input rejected", e.to_string()),
        };

        let turn = turn.with_duration_ms(elapsed_ms(started));
        progress.on_turn_complete(&turn);
        self.conversation_logger.log(ConversationEvent::new(
            "turn_completed",
            json!({
                "userInput": turn.user_input,
                "toolUsed": turn.tool_used,
                "succeeded": turn.succeeded,
                "finalResponse": turn.final_response,
                "errorMessage": turn.error_message,
                "durationMs": turn.duration_ms,
            }),
        ));
        Ok(turn)
    }

    /// Call a tool directly, bypassing the language model.
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: &ToolArguments,
    ) -> Result<ToolInvocationResult, OrchestratorError> {
        let guard = self.active.read().await;
        let active = self.ready_session(guard.as_ref())?;
        let _in_flight = InFlight::enter(&self.in_flight);

        let result = self
            .invoker
            .execute(active.session.as_ref(), &active.catalog, tool_name, arguments)
            .await;
        self.log_tool_invoked(tool_name, arguments, &result);
        Ok(result)
    }

    async fn run_turn(
        &self,
        active: &ActiveSession,
        input: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> ConversationTurn {
        progress.on_intent_start();
        let selection = self.resolver.execute(input, &active.catalog).await;
        progress.on_intent_resolved(&selection);
        self.conversation_logger.log(ConversationEvent::new(
            "intent_selected",
            json!({
                "userInput": input,
                "toolName": selection.tool_name,
                "parameters": selection.parameters.to_json(),
                "reasoning": selection.reasoning,
            }),
        ));

        let Some(tool_name) = selection.tool_name.clone() else {
            debug!("No tool selected; asking the model directly");
            return match self
                .gateway
                .generate(&PromptTemplate::direct_reply(input))
                .await
            {
                Ok(reply) => ConversationTurn::direct_reply(input, selection, reply),
                Err(e) => {
                    warn!("Direct reply failed: {}", e);
                    ConversationTurn::failed(
                        input,
                        selection.reasoning,
                        format!("The language model could not answer: {}", e),
                    )
                }
            };
        };

        progress.on_tool_start(&tool_name);
        let result = self
            .invoker
            .execute(
                active.session.as_ref(),
                &active.catalog,
                &tool_name,
                &selection.parameters,
            )
            .await;
        progress.on_tool_complete(&tool_name, result.succeeded());
        self.log_tool_invoked(&tool_name, &selection.parameters, &result);

        if !result.succeeded() {
            return ConversationTurn::tool_failure(input, selection, result);
        }

        progress.on_compose_start();
        let response = self.composer.execute(input, &selection, &result).await;
        ConversationTurn::tool_success(input, selection, result, response)
    }

    /// The session, if the orchestrator may accept requests right now.
    ///
    /// A session whose server side has gone away moves the orchestrator to
    /// `Disconnected`.
    fn ready_session<'a>(
        &self,
        active: Option<&'a ActiveSession>,
    ) -> Result<&'a ActiveSession, OrchestratorError> {
        let active = active.ok_or(OrchestratorError::NotConnected)?;
        if active.session.is_closed() {
            warn!("{} session to {} was lost", active.kind, active.endpoint);
            self.set_lifecycle(OrchestratorState::Disconnected);
            return Err(OrchestratorError::NotConnected);
        }
        if self.lifecycle() != OrchestratorState::Ready {
            return Err(OrchestratorError::NotConnected);
        }
        Ok(active)
    }

    fn log_tool_invoked(
        &self,
        tool_name: &str,
        arguments: &ToolArguments,
        result: &ToolInvocationResult,
    ) {
        self.conversation_logger.log(ConversationEvent::new(
            "tool_invoked",
            json!({
                "toolName": tool_name,
                "parameters": arguments.to_json(),
                "succeeded": result.succeeded(),
                "error": result.raw_error(),
                "durationMs": result.duration_ms(),
            }),
        ));
    }

    fn lifecycle(&self) -> OrchestratorState {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, state: OrchestratorState) {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

async fn load_catalog(session: &dyn ToolServerSession) -> ToolCatalog {
    match session.list_tools().await {
        Ok(tools) => ToolCatalog::new(tools),
        Err(e) => {
            warn!("Could not list tools, continuing with none: {}", e);
            ToolCatalog::default()
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
