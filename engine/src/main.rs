use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io::Read};

use anyhow::Context;
use clap::{Parser, Subcommand};
use quorum_core::{review_patch, Orchestrator, TraceStore};
use quorum_observability::{
    canonical_logs_dir_from_root, emit_event, init_process_logging, ObservabilityEvent,
    ProcessKind,
};
use quorum_providers::{AppConfig, ProviderRegistry};
use quorum_server::RpcServer;
use quorum_types::{Preset, RunRequest};
use tracing::info;

const SUPPORTED_PROVIDER_IDS: [&str; 8] = [
    "openai",
    "openrouter",
    "anthropic",
    "ollama",
    "groq",
    "mistral",
    "together",
    "local",
];

#[derive(Parser, Debug)]
#[command(name = "quorum-engine")]
#[command(about = "Headless quorum multi-agent backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the framed JSON-RPC protocol over stdio.
    Serve {
        #[arg(long)]
        state_dir: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Run one orchestration and print the report as JSON.
    Run {
        prompt: String,
        #[arg(long, default_value_t = 4)]
        n_agents: usize,
        #[arg(long, default_value = "balanced")]
        preset: String,
        /// Repo context: inline text, `@path`, or `-` for stdin.
        #[arg(long)]
        repo_context: Option<String>,
        #[arg(long, default_value_t = false)]
        no_trace: bool,
        #[arg(long)]
        state_dir: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Review a patch: inline text, `@path`, or `-` for stdin.
    Review {
        patch: String,
        #[arg(long)]
        criteria: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            state_dir,
            api_key,
            provider,
            model,
            config,
        } => {
            let provider = normalize_and_validate_provider(provider)?;
            let state_dir = resolve_state_dir(state_dir);
            let logs_dir = canonical_logs_dir_from_root(&state_dir);
            let (_log_guard, log_info) = init_process_logging(ProcessKind::Engine, &logs_dir, 14)?;
            emit_event(
                tracing::Level::INFO,
                ProcessKind::Engine,
                ObservabilityEvent {
                    event: "logging.initialized",
                    component: "engine.main",
                    trace_id: None,
                    agent_id: None,
                    provider_id: None,
                    model_id: None,
                    status: Some("ok"),
                    detail: Some("engine jsonl logging initialized"),
                },
            );
            info!("engine logging initialized: {:?}", log_info);

            let orchestrator = build_runtime(
                &state_dir,
                config.map(PathBuf::from),
                api_key,
                provider,
                model,
            )?;
            let server = RpcServer::new(orchestrator);
            info!("serving framed JSON-RPC over stdio");
            server
                .serve(tokio::io::stdin(), tokio::io::stdout())
                .await?;
        }
        Command::Run {
            prompt,
            n_agents,
            preset,
            repo_context,
            no_trace,
            state_dir,
            api_key,
            provider,
            model,
            config,
        } => {
            let provider = normalize_and_validate_provider(provider)?;
            let state_dir = resolve_state_dir(state_dir);
            let orchestrator = build_runtime(
                &state_dir,
                config.map(PathBuf::from),
                api_key,
                provider,
                model,
            )?;
            let request = RunRequest {
                preset: Some(parse_preset(&preset)?),
                repo_context: repo_context.map(|raw| read_text_arg(&raw)).transpose()?,
                trace: Some(!no_trace),
                ..RunRequest::new(prompt, n_agents)
            };
            let report = orchestrator.run(request).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Review { patch, criteria } => {
            let patch = read_text_arg(&patch)?;
            let report = review_patch(&patch, &criteria);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn build_runtime(
    state_dir: &Path,
    config_path: Option<PathBuf>,
    api_key: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) -> anyhow::Result<Arc<Orchestrator>> {
    let mut config = load_config(state_dir, config_path)?;
    apply_cli_overrides(&mut config, api_key, provider, model);
    let registry = Arc::new(ProviderRegistry::new(&config));
    let traces = TraceStore::new(state_dir.join("traces"));
    Ok(Arc::new(Orchestrator::new(registry, traces)))
}

fn load_config(state_dir: &Path, override_path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let path = override_path.unwrap_or_else(|| state_dir.join("config.json"));
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid config at {}", path.display()))
}

fn apply_cli_overrides(
    config: &mut AppConfig,
    api_key: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) {
    if let Some(provider) = &provider {
        config.default_provider = Some(provider.clone());
        config.providers.entry(provider.clone()).or_default();
    }

    if api_key.is_none() && model.is_none() {
        return;
    }

    // Key/model overrides target the selected provider, defaulting to openai.
    let target = provider.unwrap_or_else(|| "openai".to_string());
    let entry = config.providers.entry(target).or_default();
    if let Some(key) = api_key {
        entry.api_key = Some(key);
    }
    if let Some(model) = model {
        entry.default_model = Some(model);
    }
}

fn normalize_and_validate_provider(provider: Option<String>) -> anyhow::Result<Option<String>> {
    let Some(provider) = provider else {
        return Ok(None);
    };
    let normalized = provider.trim().to_lowercase();
    if normalized.is_empty() {
        anyhow::bail!(
            "provider cannot be empty. supported providers: {}",
            SUPPORTED_PROVIDER_IDS.join(", ")
        );
    }
    if SUPPORTED_PROVIDER_IDS.contains(&normalized.as_str()) {
        return Ok(Some(normalized));
    }
    anyhow::bail!(
        "unsupported provider `{}`. supported providers: {}",
        provider,
        SUPPORTED_PROVIDER_IDS.join(", ")
    );
}

fn parse_preset(raw: &str) -> anyhow::Result<Preset> {
    match raw.trim().to_lowercase().as_str() {
        "balanced" => Ok(Preset::Balanced),
        "quality" => Ok(Preset::Quality),
        "speed" => Ok(Preset::Speed),
        "security" => Ok(Preset::Security),
        other => anyhow::bail!(
            "unknown preset `{other}`. supported presets: balanced, quality, speed, security"
        ),
    }
}

fn resolve_state_dir(flag: Option<String>) -> PathBuf {
    if let Some(dir) = flag {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("QUORUM_STATE_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(".quorum")
}

fn read_text_arg(input: &str) -> anyhow::Result<String> {
    if input.trim() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    if let Some(path) = input.strip_prefix('@') {
        return Ok(fs::read_to_string(path)
            .with_context(|| format!("failed to read {path}"))?);
    }
    Ok(input.to_string())
}
