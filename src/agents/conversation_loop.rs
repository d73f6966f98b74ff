//! Tool-calling conversation loop.
//!
//! A [`ConversationLoop`] alternates model calls and local tool dispatch over a
//! [`ConversationHistory`]. Each model call sees a freshly built system message followed
//! by the history; the system message itself is never stored. Tool calls are dispatched
//! strictly in the order the model emitted them, and the [`Termination`] predicate
//! decides whether another round runs.
//!
//! Model errors abort the step and propagate. Unknown tools and failing tools are
//! reported back to the model as tool-result text.

use crate::error::{Result, ToolchatError};
use crate::llm::broker::LlmBroker;
use crate::llm::gateway::CompletionConfig;
use crate::llm::history::ConversationHistory;
use crate::llm::models::{LlmMessage, MessageRole};
use crate::llm::tools::ToolRegistry;
use tracing::{debug, info};

/// Decision taken by a termination predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Continue,
    End,
}

/// Termination predicate of a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Continue while the latest message requests tools (ReAct, RAG)
    PendingToolCalls,
    /// End once a tool result carries the `completes_session` flag (brainstormer)
    SessionCompleted,
    /// End once a tool result's text says something was saved.
    ///
    /// Matches `saved` together with `document` or `content`, case-insensitively. Kept
    /// for compatibility with transcripts produced before tools reported completion
    /// explicitly; prefer [`Termination::SessionCompleted`].
    SavedPhrase,
    /// No predicate; the driver stops on an exit command
    Never,
}

impl Termination {
    pub fn evaluate(&self, messages: &[LlmMessage]) -> Route {
        match self {
            Termination::PendingToolCalls => match messages.last() {
                Some(last) if last.has_tool_calls() => Route::Continue,
                _ => Route::End,
            },
            Termination::SessionCompleted => {
                let completed = messages
                    .iter()
                    .rev()
                    .any(|m| m.role == MessageRole::Tool && m.completes_session);
                if completed {
                    Route::End
                } else {
                    Route::Continue
                }
            }
            Termination::SavedPhrase => {
                let saved = messages.iter().rev().any(|m| {
                    if m.role != MessageRole::Tool {
                        return false;
                    }
                    let text = m.text().to_lowercase();
                    text.contains("saved") && (text.contains("document") || text.contains("content"))
                });
                if saved {
                    Route::End
                } else {
                    Route::Continue
                }
            }
            Termination::Never => Route::Continue,
        }
    }

    /// Whether the predicate looks at tool results, and so runs after dispatch
    fn inspects_tool_results(&self) -> bool {
        matches!(self, Termination::SessionCompleted | Termination::SavedPhrase)
    }
}

/// Result of one [`ConversationLoop::step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The model answered without requesting tools
    Reply(String),
    /// The model requested tools; this many results were appended
    ToolsDispatched(usize),
}

type PromptFn = Box<dyn Fn() -> String + Send + Sync>;

enum SystemPrompt {
    Fixed(String),
    Dynamic(PromptFn),
}

/// Model/tool cycle over a conversation history
pub struct ConversationLoop {
    broker: LlmBroker,
    tools: ToolRegistry,
    system_prompt: Option<SystemPrompt>,
    termination: Termination,
    config: CompletionConfig,
    max_steps: Option<usize>,
}

impl ConversationLoop {
    pub const DEFAULT_MAX_STEPS: usize = 25;

    pub fn builder(broker: LlmBroker) -> ConversationLoopBuilder {
        ConversationLoopBuilder::new(broker)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// System message for the next model call, rebuilt on every call
    pub fn system_message(&self) -> Option<LlmMessage> {
        self.system_prompt.as_ref().map(|prompt| match prompt {
            SystemPrompt::Fixed(text) => LlmMessage::system(text.clone()),
            SystemPrompt::Dynamic(build) => LlmMessage::system(build()),
        })
    }

    fn request(&self, history: &ConversationHistory) -> Vec<LlmMessage> {
        match self.system_message() {
            Some(system) => history.with_system(system),
            None => history.messages().to_vec(),
        }
    }

    /// Call the model and append its message to the history
    pub async fn call_model(&self, history: &mut ConversationHistory) -> Result<()> {
        let request = self.request(history);
        let tools = if self.tools.is_empty() { None } else { Some(&self.tools) };
        let message = self.broker.complete(&request, tools, Some(self.config.clone())).await?;
        history.push(message)
    }

    /// Run the tool calls of the latest assistant message, appending one result per call
    pub fn dispatch_tools(&self, history: &mut ConversationHistory) -> Result<usize> {
        let calls = match history.last() {
            Some(last) if last.role == MessageRole::Assistant && last.has_tool_calls() => {
                last.requested_tool_calls().to_vec()
            }
            _ => return Ok(0),
        };

        info!("Dispatching {} tool call(s)", calls.len());
        history.extend(self.tools.dispatch_all(&calls))?;
        Ok(calls.len())
    }

    /// One model call followed by dispatch of whatever tools it requested
    pub async fn step(&self, history: &mut ConversationHistory) -> Result<StepOutcome> {
        self.call_model(history).await?;
        let dispatched = self.dispatch_tools(history)?;
        if dispatched == 0 {
            Ok(StepOutcome::Reply(last_text(history)))
        } else {
            Ok(StepOutcome::ToolsDispatched(dispatched))
        }
    }

    pub fn should_continue(&self, history: &ConversationHistory) -> Route {
        self.termination.evaluate(history.messages())
    }

    /// Cycle until the model answers without tools or the predicate ends the run
    ///
    /// Returns the text of the last assistant message.
    pub async fn run(&self, history: &mut ConversationHistory) -> Result<String> {
        let mut steps = 0;
        loop {
            steps += 1;
            if let Some(max) = self.max_steps {
                if steps > max {
                    return Err(ToolchatError::StepLimitExceeded(max));
                }
            }
            debug!("Loop step {}", steps);

            self.call_model(history).await?;
            // a reply without tool calls always ends the turn
            if !history.last().is_some_and(|m| m.has_tool_calls()) {
                return Ok(last_text(history));
            }
            if !self.termination.inspects_tool_results()
                && self.should_continue(history) == Route::End
            {
                return Ok(last_text(history));
            }

            self.dispatch_tools(history)?;
            if self.termination.inspects_tool_results() && self.should_continue(history) == Route::End
            {
                info!("Session completed after {} step(s)", steps);
                return Ok(last_text(history));
            }
        }
    }
}

/// Text of the most recent assistant message
fn last_text(history: &ConversationHistory) -> String {
    history
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
        .map(|m| m.text().to_string())
        .unwrap_or_default()
}

/// Builder for constructing a `ConversationLoop`
pub struct ConversationLoopBuilder {
    broker: LlmBroker,
    tools: ToolRegistry,
    system_prompt: Option<SystemPrompt>,
    termination: Termination,
    config: CompletionConfig,
    max_steps: Option<usize>,
}

impl ConversationLoopBuilder {
    fn new(broker: LlmBroker) -> Self {
        Self {
            broker,
            tools: ToolRegistry::new(),
            system_prompt: None,
            termination: Termination::PendingToolCalls,
            config: CompletionConfig::default(),
            max_steps: Some(ConversationLoop::DEFAULT_MAX_STEPS),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(SystemPrompt::Fixed(prompt.into()));
        self
    }

    /// Build the system prompt from session state before every model call
    pub fn system_prompt_fn<F>(mut self, build: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.system_prompt = Some(SystemPrompt::Dynamic(Box::new(build)));
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Set the temperature for generation (default: 0.0)
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Cap the number of model calls per [`ConversationLoop::run`]; `None` disables the cap
    pub fn max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn build(self) -> ConversationLoop {
        ConversationLoop {
            broker: self.broker,
            tools: self.tools,
            system_prompt: self.system_prompt,
            termination: self.termination,
            config: self.config,
            max_steps: self.max_steps,
        }
    }
}
