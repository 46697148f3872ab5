use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quorum_types::{AgentOutcome, AgentSpec};
use tokio::sync::{Mutex, Semaphore};
use tracing::warn;

use crate::runner::AgentRunner;

/// Fans out agent runs with bounded per-provider parallelism.
///
/// One limiter exists per distinct provider id, created lazily on first use
/// and kept for the scheduler's lifetime. A single agent's failure — even a
/// panicked task — never interrupts its siblings; `run_all` settles every
/// submission and returns outcomes index-aligned with the input specs.
pub struct Scheduler {
    limiters: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            limiters: Mutex::new(HashMap::new()),
        }
    }

    async fn limiter(&self, provider: &str, max_in_flight: usize) -> Arc<Semaphore> {
        let mut limiters = self.limiters.lock().await;
        limiters
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(max_in_flight.max(1))))
            .clone()
    }

    pub async fn run_all(
        &self,
        runner: Arc<AgentRunner>,
        specs: &[AgentSpec],
        prompt: &str,
        repo_context: Option<&str>,
        max_in_flight: usize,
        timeout: Duration,
    ) -> Vec<AgentOutcome> {
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            let limiter = self.limiter(&spec.provider, max_in_flight).await;
            let runner = Arc::clone(&runner);
            let spec = spec.clone();
            let prompt = prompt.to_string();
            let repo_context = repo_context.map(str::to_string);
            handles.push(tokio::spawn(async move {
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return AgentOutcome::failure(spec, "provider limiter closed", 0);
                    }
                };
                runner
                    .run(&spec, &prompt, repo_context.as_deref(), timeout)
                    .await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (handle, spec) in handles.into_iter().zip(specs.iter()) {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(agent = spec.id_str(), error = %err, "agent task aborted");
                    outcomes.push(AgentOutcome::failure(
                        spec.clone(),
                        format!("agent task failed: {err}"),
                        0,
                    ));
                }
            }
        }
        outcomes
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
