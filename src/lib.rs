//! Voice Preview: a voice-driven website assistant.
//!
//! Speech comes in from the browser, is transcribed, handed to a
//! tool-calling chat agent (which may rewrite the live `preview.html` page),
//! and the agent's reply is synthesized back to speech.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod http;
pub mod llm;
pub mod services;
pub mod stt;
pub mod tools;
pub mod tts;

#[cfg(test)]
mod testing;
