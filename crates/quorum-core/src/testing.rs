use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use quorum_providers::{ChatMessage, Completion, Provider, ProviderError, ProviderInfo};

pub fn valid_candidate_json() -> String {
    serde_json::json!({
        "plan": "Plan",
        "patch": "diff --git a/file b/file\n@@\n+change",
        "test_plan": "echo test",
        "risks": "Low",
        "assumptions": "None",
        "confidence": 0.7
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub enum ScriptItem {
    Ok(String),
    Err(ProviderError),
    /// Never resolves; exercises the per-call timeout.
    Hang,
}

/// Provider double that replays a fixed response sequence. Once the script is
/// down to its last item, that item repeats for every further call (the shape
/// of the original sequence-adapter test harness).
pub struct ScriptedProvider {
    id: String,
    script: Mutex<VecDeque<ScriptItem>>,
    calls: AtomicUsize,
    message_counts: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(id: &str, items: Vec<ScriptItem>) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(items.into()),
            calls: AtomicUsize::new(0),
            message_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok(id: &str) -> Self {
        Self::new(id, vec![ScriptItem::Ok(valid_candidate_json())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn message_counts(&self) -> Vec<usize> {
        self.message_counts.lock().unwrap().clone()
    }

    fn next_item(&self) -> ScriptItem {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| ScriptItem::Ok(valid_candidate_json()))
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.id.clone(),
            name: self.id.clone(),
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _model: &str,
        _temperature: f32,
    ) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.message_counts.lock().unwrap().push(messages.len());
        match self.next_item() {
            ScriptItem::Ok(content) => Ok(Completion {
                content,
                latency_ms: 1,
            }),
            ScriptItem::Err(err) => Err(err),
            ScriptItem::Hang => std::future::pending().await,
        }
    }
}
