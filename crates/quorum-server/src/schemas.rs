use quorum_types::ToolSchema;
use serde_json::{json, Value};

pub const TOOL_RUN: &str = "quorum_run";
pub const TOOL_REVIEW: &str = "quorum_review";

pub fn tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: TOOL_RUN.to_string(),
            description: "Run the quorum engine with parallel agents and synthesize one answer."
                .to_string(),
            input_schema: run_schema(),
        },
        ToolSchema {
            name: TOOL_REVIEW.to_string(),
            description: "Review a patch or diff for risks.".to_string(),
            input_schema: review_schema(),
        },
    ]
}

pub fn run_schema() -> Value {
    json!({
        "type":"object",
        "properties":{
            "prompt":{
                "description":"Task for every agent to attempt.",
                "type":"string"
            },
            "nAgents":{
                "description":"Number of agents to fan out (4-12).",
                "type":"integer",
                "minimum":4,
                "maximum":12
            },
            "preset":{
                "description":"Role table used when no explicit agent list is given.",
                "type":"string",
                "enum":["balanced","quality","speed","security"]
            },
            "agents":{
                "description":"Explicit agent list; length must equal nAgents.",
                "type":"array",
                "items":{
                    "type":"object",
                    "properties":{
                        "role":{"type":"string"},
                        "provider":{"type":"string"},
                        "model":{"type":"string"},
                        "temperature":{"type":"number","minimum":0,"maximum":2},
                        "id":{"type":"string"}
                    },
                    "required":["role","provider","model"],
                    "additionalProperties":false
                }
            },
            "repoContext":{
                "description":"Optional repository context appended to the prompt.",
                "type":"string"
            },
            "maxInFlightPerProvider":{
                "description":"Concurrent in-flight calls allowed per provider.",
                "type":"integer",
                "minimum":1
            },
            "timeoutMs":{
                "description":"Per-call timeout in milliseconds.",
                "type":"integer",
                "minimum":1
            },
            "trace":{
                "description":"Persist a trace record for this run.",
                "type":"boolean"
            }
        },
        "required":["prompt","nAgents"],
        "additionalProperties":false
    })
}

pub fn review_schema() -> Value {
    json!({
        "type":"object",
        "properties":{
            "patchOrDiff":{
                "description":"Patch or unified diff text to review.",
                "type":"string"
            },
            "criteria":{
                "description":"Extra review criteria to evaluate.",
                "type":"array",
                "items":{"type":"string"}
            }
        },
        "required":["patchOrDiff"],
        "additionalProperties":false
    })
}
