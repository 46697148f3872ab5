use std::sync::Arc;

use quorum_core::{review_patch, Orchestrator, OrchestratorError};
use quorum_types::{ReviewRequest, RunRequest};
use quorum_wire::{
    encode_frame, FrameDecoder, JsonRpcRequest, JsonRpcResponse, APPLICATION_ERROR,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::schemas::{tool_schemas, TOOL_REVIEW, TOOL_RUN};

pub const SERVER_NAME: &str = "quorum-engine";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Request/response loop over a framed byte stream. Messages are handled one
/// at a time per connection; anything arriving while a call is in flight
/// queues in the input buffer. Malformed frames and bodies are answered with
/// framed errors and never terminate the loop.
pub struct RpcServer {
    orchestrator: Arc<Orchestrator>,
}

impl RpcServer {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut decoder = FrameDecoder::new();
        let mut chunk = vec![0u8; 8192];
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            decoder.extend(&chunk[..n]);
            loop {
                match decoder.next_frame() {
                    Ok(Some(body)) => {
                        let response = self.handle_frame(&body).await;
                        write_frame(&mut writer, &response).await?;
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "dropping malformed frame header");
                        let response = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
                        write_frame(&mut writer, &response).await?;
                    }
                }
            }
        }
        debug!("input stream closed, stopping server loop");
        Ok(())
    }

    async fn handle_frame(&self, body: &[u8]) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "unparseable request body");
                return JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
            }
        };
        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => JsonRpcResponse::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                    "capabilities": {"tools": {}},
                }),
            ),
            "tools/list" => JsonRpcResponse::ok(id, json!({"tools": tool_schemas()})),
            "tools/call" => self.handle_tool_call(id, request.params).await,
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "Method not found"),
        }
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Invalid params");
        };
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Invalid params");
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match name {
            TOOL_RUN => {
                let input: RunRequest = match serde_json::from_value(arguments) {
                    Ok(input) => input,
                    Err(err) => {
                        return JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            format!("invalid {TOOL_RUN} input: {err}"),
                        )
                    }
                };
                match self.orchestrator.run(input).await {
                    Ok(report) => respond_with(id, &report),
                    Err(OrchestratorError::InvalidInput(message)) => {
                        JsonRpcResponse::error(id, INVALID_PARAMS, message)
                    }
                    Err(err) => JsonRpcResponse::error(id, APPLICATION_ERROR, err.to_string()),
                }
            }
            TOOL_REVIEW => {
                let input: ReviewRequest = match serde_json::from_value(arguments) {
                    Ok(input) => input,
                    Err(err) => {
                        return JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            format!("invalid {TOOL_REVIEW} input: {err}"),
                        )
                    }
                };
                let report = review_patch(&input.patch_or_diff, &input.criteria);
                respond_with(id, &report)
            }
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown tool: {other}"))
            }
        }
    }
}

fn respond_with<T: serde::Serialize>(id: Option<Value>, payload: &T) -> JsonRpcResponse {
    match serde_json::to_value(payload) {
        Ok(value) => JsonRpcResponse::ok(id, value),
        Err(err) => JsonRpcResponse::error(id, APPLICATION_ERROR, err.to_string()),
    }
}

async fn write_frame<W>(writer: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(response)?;
    writer.write_all(&encode_frame(&payload)).await?;
    writer.flush().await?;
    Ok(())
}
