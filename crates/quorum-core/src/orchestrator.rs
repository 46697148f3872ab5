use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quorum_providers::ProviderRegistry;
use quorum_types::{
    AgentCandidate, AgentOutcome, AgentSpec, RunReport, RunRequest, MAX_AGENTS, MIN_AGENTS,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::judge::judge_candidates;
use crate::presets::build_agents;
use crate::retry::RetryPolicy;
use crate::runner::AgentRunner;
use crate::scheduler::Scheduler;
use crate::synthesizer::synthesize_final;
use crate::trace::{redact_secrets, TraceRecord, TraceStore};

/// Orchestration entry point. One instance lives for the server's lifetime;
/// the per-provider limiters inside the scheduler are the only state shared
/// between runs.
pub struct Orchestrator {
    runner: Arc<AgentRunner>,
    scheduler: Scheduler,
    traces: TraceStore,
}

impl Orchestrator {
    pub fn new(providers: Arc<ProviderRegistry>, traces: TraceStore) -> Self {
        Self {
            runner: Arc::new(AgentRunner::new(providers, RetryPolicy::default())),
            scheduler: Scheduler::new(),
            traces,
        }
    }

    pub async fn run(&self, request: RunRequest) -> Result<RunReport, OrchestratorError> {
        validate_request(&request)?;

        let preset = request.preset.unwrap_or_default();
        let agents = ensure_agent_ids(
            request
                .agents
                .clone()
                .unwrap_or_else(|| build_agents(preset, request.n_agents)),
        );
        let timeout = Duration::from_millis(request.timeout_ms());
        let trace_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        info!(
            trace_id = %trace_id,
            agents = agents.len(),
            preset = preset.as_str(),
            "starting orchestration run"
        );

        let outcomes = self
            .scheduler
            .run_all(
                Arc::clone(&self.runner),
                &agents,
                &request.prompt,
                request.repo_context.as_deref(),
                request.max_in_flight(),
                timeout,
            )
            .await;

        let candidates: Vec<AgentCandidate> = outcomes
            .iter()
            .filter_map(|outcome| outcome.candidate().cloned())
            .collect();
        if candidates.is_empty() {
            warn!(trace_id = %trace_id, "all agents failed");
            return Err(OrchestratorError::AllAgentsFailed);
        }

        let judge = judge_candidates(&candidates);
        let best = &candidates[judge.best_index];
        let final_result = synthesize_final(best, &judge);
        let report = RunReport {
            trace_id: trace_id.clone(),
            agents: outcomes.iter().map(AgentOutcome::report).collect(),
            judge,
            final_result,
        };

        if request.trace_enabled() {
            let record = TraceRecord {
                trace_id: trace_id.clone(),
                started_at,
                prompt: request.prompt.clone(),
                opts: redact_secrets(&serde_json::json!({
                    "nAgents": request.n_agents,
                    "preset": preset.as_str(),
                    "maxInFlight": request.max_in_flight(),
                    "timeoutMs": request.timeout_ms(),
                })),
                agents: report.agents.clone(),
                judge: report.judge.clone(),
                final_result: report.final_result.clone(),
            };
            if let Err(err) = self.traces.write(&record).await {
                warn!(trace_id = %trace_id, error = %err, "failed to persist trace");
            }
        }

        info!(
            trace_id = %trace_id,
            successes = candidates.len(),
            best_index = report.judge.best_index,
            "orchestration run finished"
        );
        Ok(report)
    }
}

fn validate_request(request: &RunRequest) -> Result<(), OrchestratorError> {
    if !(MIN_AGENTS..=MAX_AGENTS).contains(&request.n_agents) {
        return Err(OrchestratorError::InvalidInput(format!(
            "nAgents must be between {MIN_AGENTS} and {MAX_AGENTS}"
        )));
    }
    if let Some(agents) = &request.agents {
        if agents.len() != request.n_agents {
            return Err(OrchestratorError::InvalidInput(
                "agents length must match nAgents".to_string(),
            ));
        }
        for agent in agents {
            if let Some(temperature) = agent.temperature {
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(OrchestratorError::InvalidInput(format!(
                        "temperature must be within 0..2, got {temperature}"
                    )));
                }
            }
        }
    }
    if request.max_in_flight_per_provider == Some(0) {
        return Err(OrchestratorError::InvalidInput(
            "maxInFlightPerProvider must be positive".to_string(),
        ));
    }
    if request.timeout_ms == Some(0) {
        return Err(OrchestratorError::InvalidInput(
            "timeoutMs must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Assign deterministic ids (`agent-<index+1>`) to specs that arrive without
/// one. Explicit ids are kept untouched.
fn ensure_agent_ids(agents: Vec<AgentSpec>) -> Vec<AgentSpec> {
    agents
        .into_iter()
        .enumerate()
        .map(|(index, mut agent)| {
            if agent.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
                agent.id = Some(format!("agent-{}", index + 1));
            }
            agent
        })
        .collect()
}
