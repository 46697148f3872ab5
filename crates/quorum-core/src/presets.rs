use quorum_types::{AgentSpec, Preset};

fn default_model() -> String {
    std::env::var("QUORUM_DEFAULT_MODEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "gpt-4o-mini".to_string())
}

fn base_roles(preset: Preset) -> &'static [(&'static str, f32)] {
    match preset {
        Preset::Balanced => &[
            ("planner", 0.2),
            ("implementer", 0.4),
            ("tester", 0.3),
            ("reviewer", 0.1),
        ],
        Preset::Quality => &[
            ("architect", 0.2),
            ("refiner", 0.2),
            ("risk-analyst", 0.1),
            ("tester", 0.3),
        ],
        Preset::Speed => &[
            ("fast-planner", 0.5),
            ("implementer", 0.6),
            ("summarizer", 0.5),
            ("tester", 0.4),
        ],
        Preset::Security => &[
            ("threat-modeler", 0.1),
            ("security-reviewer", 0.1),
            ("implementer", 0.2),
            ("tester", 0.2),
        ],
    }
}

/// Expand a preset to `n_agents` specs, cycling through the preset's role
/// table. Ids are `<preset>-<index+1>`.
pub fn build_agents(preset: Preset, n_agents: usize) -> Vec<AgentSpec> {
    let model = default_model();
    let base = base_roles(preset);
    (0..n_agents)
        .map(|index| {
            let (role, temperature) = base[index % base.len()];
            AgentSpec {
                role: role.to_string(),
                provider: "openai".to_string(),
                model: model.clone(),
                temperature: Some(temperature),
                id: Some(format!("{}-{}", preset.as_str(), index + 1)),
            }
        })
        .collect()
}
