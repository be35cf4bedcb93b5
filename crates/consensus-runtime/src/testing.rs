//! Scripted judge for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::providers::{JudgeClient, JudgeReply, JudgmentRequest, ProviderError, TokenUsage};

enum Script {
    Reply(String, TokenUsage),
    Fault(fn() -> ProviderError),
}

/// A judge that returns a fixed reply (or fault) and records every request.
pub struct ScriptedJudge {
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<JudgmentRequest>>,
}

impl ScriptedJudge {
    pub fn replying(reply: &str) -> Self {
        Self::replying_with_usage(reply, TokenUsage::default())
    }

    pub fn replying_with_usage(reply: &str, usage: TokenUsage) -> Self {
        Self::with_script(Script::Reply(reply.to_string(), usage))
    }

    pub fn failing(fault: fn() -> ProviderError) -> Self {
        Self::with_script(Script::Fault(fault))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<JudgmentRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl JudgeClient for ScriptedJudge {
    async fn judge(&self, request: &JudgmentRequest) -> Result<JudgeReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        // Yield so concurrent callers interleave.
        tokio::task::yield_now().await;

        match &self.script {
            Script::Reply(content, usage) => Ok(JudgeReply {
                content: content.clone(),
                model: "scripted".to_string(),
                usage: *usage,
                finish_reason: Some("stop".to_string()),
            }),
            Script::Fault(fault) => Err(fault()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
