//! Shared fixtures for the routing integration tests
//!
//! `ScriptedLlmClient` replays canned responses in order and records every
//! prompt it receives, so tests can assert both what the router did with
//! the answer and what it sent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use recharge_router::{
    CapabilityError, LlmClient, MovieRouter, MusicRouter, RuleBook, SeededRandom,
};

/// One recorded `chat_json`/`chat` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// What the next call should return
pub enum Reply {
    Text(String),
    Fail(CapabilityError),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn unavailable() -> Self {
        Reply::Fail(CapabilityError::Api {
            provider: "Scripted",
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

#[derive(Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// A client that must never be called
    pub fn silent() -> Arc<Self> {
        Self::new([])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(err)) => Err(err),
            None => Err(CapabilityError::EmptyResponse("Scripted")),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CapabilityError> {
        self.next(system_prompt, user_prompt)
    }

    async fn chat_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CapabilityError> {
        self.next(system_prompt, user_prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "Scripted"
    }
}

pub fn rules() -> Arc<RuleBook> {
    Arc::new(RuleBook::builtin().expect("built-in rules load"))
}

pub fn movie_router(llm: Arc<ScriptedLlmClient>, seed: u64) -> MovieRouter {
    MovieRouter::new(rules(), llm, Arc::new(SeededRandom::new(seed)))
}

pub fn music_router(llm: Arc<ScriptedLlmClient>, seed: u64) -> MusicRouter {
    MusicRouter::new(rules(), llm, Arc::new(SeededRandom::new(seed)))
}
