// ABOUTME: McpServer - hosts a tool Registry over line-delimited JSON-RPC 2.0.
// ABOUTME: Handles initialize, ping, tools/list and tools/call; reads and writes any async stream.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::types::*;
use crate::error::{McpError, ToolError};
use crate::tool::{Registry, args_from_value};

const SERVER_NAME: &str = "orchestra";
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Serves the tools of a registry to a JSON-RPC peer.
pub struct McpServer {
    tools: Registry,
    tool_timeout: Duration,
}

impl McpServer {
    pub fn new(tools: Registry) -> Self {
        Self {
            tools,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Bound each tools/call execution.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn tools(&self) -> &Registry {
        &self.tools
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparsable request");
                return Some(McpResponse::failure(Value::Null, PARSE_ERROR, "Parse error"));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: McpRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(McpResponse::failure(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid Request: {}", e),
                ));
            }
        };

        self.handle(request).await
    }

    /// Handle a decoded request. Returns `None` for notifications.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::failure(
                id,
                INVALID_REQUEST,
                format!("unsupported jsonrpc version {}", request.jsonrpc),
            ));
        }

        debug!(method = %request.method, "request received");
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(McpRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", other),
                data: None,
            }),
        };

        Some(match outcome {
            Ok(result) => McpResponse::success(id, result),
            Err(error) => McpResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                result: None,
                error: Some(error),
            },
        })
    }

    fn initialize(&self) -> Value {
        let result = McpInitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: McpServerCapabilities {
                tools: Some(serde_json::json!({})),
            },
            server_info: McpImplementationInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        to_value(result)
    }

    fn list_tools(&self) -> Value {
        let tools = self
            .tools
            .all()
            .iter()
            .map(|t| McpToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect();
        to_value(McpToolsListResult { tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, McpRpcError> {
        let params: McpToolCallParams = params
            .ok_or_else(|| invalid_params("missing params"))
            .and_then(|p| serde_json::from_value(p).map_err(|e| invalid_params(e.to_string())))?;

        let args = args_from_value(params.arguments.unwrap_or(Value::Null))
            .map_err(|e| invalid_params(e.to_string()))?;
        let tool = self
            .tools
            .lookup(&params.name)
            .map_err(|e| invalid_params(e.to_string()))?;

        let outcome = match tokio::time::timeout(self.tool_timeout, tool.execute(args)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool: params.name.clone(),
                after: self.tool_timeout,
            }),
        };

        let result = match outcome {
            Ok(text) => {
                info!(tool = %params.name, "tool call served");
                McpToolResult::text(text)
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, "tool call failed");
                McpToolResult::error(e.to_string())
            }
        };
        Ok(to_value(result))
    }

    /// Serve requests from `reader` until end of input, one JSON object per line.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(tools = self.tools.count(), "tool host listening");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }

        info!("input closed, tool host stopping");
        Ok(())
    }

    /// Serve over the process's stdin and stdout.
    pub async fn serve_stdio(&self) -> Result<(), McpError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn invalid_params(message: impl Into<String>) -> McpRpcError {
    McpRpcError {
        code: INVALID_PARAMS,
        message: message.into(),
        data: None,
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
