//! In-process fakes for the backend traits, shared by unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::llm::{ChatBackend, ChatCompletion, ChatRequest};
use crate::stt::{AudioClip, Transcriber};
use crate::tts::SpeechEngine;
use crate::tools::{function_schema, ToolOutput, ToolProvider};

/// Replays scripted completions in order and records every request.
pub struct ScriptedChat {
    script: Mutex<VecDeque<anyhow::Result<ChatCompletion>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new(script: Vec<anyhow::Result<ChatCompletion>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

impl ChatBackend for ScriptedChat {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ChatCompletion>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().push(request.clone());
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
        })
    }
}

/// Tool provider returning canned outputs.
pub struct FakeTools {
    outputs: Mutex<VecDeque<ToolOutput>>,
    repeat: Option<ToolOutput>,
    registrations: AtomicUsize,
    executions: AtomicUsize,
}

impl FakeTools {
    pub fn new(outputs: Vec<ToolOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            repeat: None,
            registrations: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
        }
    }

    /// Return `output` for every batch.
    pub fn repeating(output: ToolOutput) -> Self {
        Self {
            repeat: Some(output),
            ..Self::new(vec![])
        }
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl ToolProvider for FakeTools {
    fn ensure_registered(&self) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
    }

    fn tools<'a>(
        &'a self,
        slugs: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Value>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(slugs
                .iter()
                .map(|slug| function_schema(slug, "fake", json!({"type": "object"})))
                .collect())
        })
    }

    fn handle_tool_calls<'a>(
        &'a self,
        _completion: &'a ChatCompletion,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.executions.fetch_add(1, Ordering::SeqCst);
            if let Some(output) = &self.repeat {
                return Ok(output.clone());
            }
            self.outputs
                .lock()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no tool output scripted"))
        })
    }
}

/// Transcriber returning a fixed transcript.
pub struct FixedTranscriber(pub String);

impl Transcriber for FixedTranscriber {
    fn transcribe<'a>(
        &'a self,
        _clip: &'a AudioClip,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

/// Speech engine that echoes the input text as "audio" and records it.
#[derive(Default)]
pub struct EchoSpeech {
    inputs: Mutex<Vec<String>>,
}

impl EchoSpeech {
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

impl SpeechEngine for EchoSpeech {
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.inputs.lock().push(text.to_string());
            Ok(text.as_bytes().to_vec())
        })
    }

    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }
}
