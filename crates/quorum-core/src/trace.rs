use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quorum_types::{AgentReport, FinalResult, JudgeVerdict};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SECRET_MASK: &str = "***";

/// Persisted record of one full run, written once per invocation when
/// tracing is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub trace_id: String,
    pub started_at: DateTime<Utc>,
    pub prompt: String,
    pub opts: Value,
    pub agents: Vec<AgentReport>,
    pub judge: JudgeVerdict,
    #[serde(rename = "final")]
    pub final_result: FinalResult,
}

/// Recursively mask values under secret-like keys (names containing `key` or
/// `token`, case-insensitive) before anything reaches storage.
pub fn redact_secrets(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(redact_secrets).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    let lowered = key.to_lowercase();
                    if lowered.contains("key") || lowered.contains("token") {
                        (key.clone(), Value::String(SECRET_MASK.to_string()))
                    } else {
                        (key.clone(), redact_secrets(item))
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

#[derive(Debug, Clone)]
pub struct TraceStore {
    dir: PathBuf,
}

impl TraceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        PathBuf::from(".quorum").join("traces")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn write(&self, record: &TraceRecord) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", record.trace_id));
        let payload = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, payload).await?;
        Ok(path)
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}
