//! Tool-calling agent loop.
//!
//! One run takes the user's text, drives up to `max_rounds` chat/tool rounds
//! against the session's [`MessageStore`], then asks the model to summarize
//! the tool activity and to rewrite the answer for voice.
//!
//! Two views of the conversation are kept during a run:
//! - the store, which only holds plain role/content turns and outlives the run;
//! - a local wire list, which also carries tool calls and call ids, because
//!   the endpoint rejects tool results that don't answer a preceding call.

pub mod mapping;
pub mod prompts;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::conversation::protocol::{to_wire, WireMessage};
use crate::conversation::{MessageStore, Turn};
use crate::llm::{ChatBackend, ChatRequest};
use crate::tools::ToolProvider;

pub use mapping::{map_tool_results, ToolResultMapping};

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub max_rounds: usize,
    /// Slugs of the tools the model may call.
    pub tools: Vec<String>,
}

pub struct AgentRunner {
    chat: Arc<dyn ChatBackend>,
    tools: Arc<dyn ToolProvider>,
    settings: AgentSettings,
}

impl AgentRunner {
    pub fn new(chat: Arc<dyn ChatBackend>, tools: Arc<dyn ToolProvider>, settings: AgentSettings) -> Self {
        Self {
            chat,
            tools,
            settings,
        }
    }

    /// Run the agent for one user message and return the voice-ready reply.
    ///
    /// Chat and tool-provider failures abort the run; turns appended before
    /// the failure stay in the store.
    pub async fn run(&self, store: &MessageStore, user_text: &str) -> anyhow::Result<String> {
        self.tools.ensure_registered();
        store.append(Turn::user(user_text));

        let schemas = self.tools.tools(&self.settings.tools).await?;
        let mut local = to_wire(&store.snapshot());
        let mut last_text = String::new();
        let mut rounds = 0;
        let mut settled = false;

        while rounds < self.settings.max_rounds {
            rounds += 1;

            let request =
                ChatRequest::new(self.settings.model.as_str(), local.clone()).with_tools(schemas.clone());
            let completion = self.chat.complete(&request).await?;

            let text = completion.text();
            if !text.is_empty() {
                store.append(Turn::assistant(text));
                last_text = text.to_string();
            }

            let calls = completion.tool_calls().to_vec();
            local.push(WireMessage::assistant(text, calls.clone()));

            if calls.is_empty() {
                debug!(round = rounds, "No tool calls, ending loop");
                settled = true;
                break;
            }

            info!(
                round = rounds,
                calls = calls.len(),
                tools = ?calls.iter().map(|c| c.function.name.as_str()).collect::<Vec<_>>(),
                "Executing tool calls"
            );
            let output = self.tools.handle_tool_calls(&completion).await?;
            map_tool_results(&calls, &output).apply(&mut local, store);
        }

        if !settled {
            warn!(max_rounds = self.settings.max_rounds, "Agent loop hit its round limit");
        }

        let summary = self.follow_up(store, prompts::SUMMARY_INSTRUCTION).await?;
        if !summary.is_empty() {
            store.append(Turn::assistant(summary.as_str()));
        }

        let rewrite = self.follow_up(store, prompts::REWRITE_INSTRUCTION).await?;

        info!(rounds, turns = store.len(), "Agent run complete");
        Ok(pick_reply(rewrite, summary, last_text))
    }

    /// One tool-less completion over the store plus a trailing instruction.
    async fn follow_up(&self, store: &MessageStore, instruction: &str) -> anyhow::Result<String> {
        let mut messages = to_wire(&store.snapshot());
        messages.push(WireMessage::system(instruction));
        let request = ChatRequest::new(self.settings.model.as_str(), messages);
        let completion = self.chat.complete(&request).await?;
        Ok(completion.text().trim().to_string())
    }
}

/// First non-empty of rewrite, summary, last in-loop text.
fn pick_reply(rewrite: String, summary: String, last_text: String) -> String {
    [rewrite, summary, last_text]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}
