// ABOUTME: Tests for the Orchestrator chat loop - memory updates, splicing, failures.
// ABOUTME: Uses a scripted LLM client and small in-process tools.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::config::Config;
use crate::error::{ConfigError, LlmError, OrchestraError, ParseError, ToolError};
use crate::llm::{LlmClient, Request, Response, Role, Usage};
use crate::tool::{Args, Tool, required_str};

/// Replays canned completions and records every request.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<Request>>,
    delay: Duration,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Ok("late".to_string())])),
            requests: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider(&self) -> &str {
        "Scripted"
    }

    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().unwrap().push(req.clone());
        tokio::time::sleep(self.delay).await;
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("no more replies".to_string()))?;
        Ok(Response {
            id: "resp".into(),
            text: reply,
            model: req.model.clone(),
            usage: Usage::default(),
        })
    }
}

/// Returns its `x` argument verbatim.
struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the x argument."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "x": { "type": "string", "description": "text" } },
            "required": ["x"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        Ok(required_str(&args, "x")?.to_string())
    }
}

/// Sleeps longer than any test timeout.
struct StuckTool;

#[async_trait]
impl Tool for StuckTool {
    fn name(&self) -> &str {
        "stuck"
    }

    fn description(&self) -> &str {
        "Never finishes in time."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Args) -> Result<String, ToolError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".into())
    }
}

fn agent(client: Arc<ScriptedClient>) -> Orchestrator {
    Orchestrator::builder(client).tool(EchoTool).build()
}

fn roles(agent: &Orchestrator) -> Vec<Role> {
    agent.memory().snapshot().iter().map(|m| m.role).collect()
}

#[tokio::test]
async fn test_echo_tool_is_spliced() {
    let client = ScriptedClient::new(vec![Ok("Look up [TOOL:echo]\n{\"x\":\"1\"}\n[/TOOL] please")]);
    let mut agent = agent(client);

    let reply = agent.chat("find it").await.unwrap();

    assert_eq!(reply, "Look up 1 please");
    assert_eq!(agent.memory().messages()[1].content, "Look up 1 please");
}

#[tokio::test]
async fn test_two_chats_leave_four_messages() {
    let client = ScriptedClient::new(vec![Ok("first"), Ok("second")]);
    let mut agent = agent(client.clone());

    agent.chat("one").await.unwrap();
    agent.chat("two").await.unwrap();

    assert_eq!(
        roles(&agent),
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );

    // The second request carries the system message plus the full history.
    let second = &client.requests()[1];
    assert_eq!(second.messages[0].role, Role::System);
    assert_eq!(second.messages.len(), 4);
    assert_eq!(second.messages[3].content, "two");
}

#[tokio::test]
async fn test_request_settings() {
    let client = ScriptedClient::new(vec![Ok("hi")]);
    let mut agent = Orchestrator::builder(client.clone())
        .model("gpt-test")
        .tool(EchoTool)
        .build();

    agent.chat("hello").await.unwrap();

    let req = &client.requests()[0];
    assert_eq!(req.model, "gpt-test");
    assert_eq!(req.max_tokens, Some(1000));
    assert_eq!(req.temperature, Some(0.1));
    assert_eq!(req.messages[0].content, agent.system_prompt());
    assert!(agent.system_prompt().contains("- echo: Echo the x argument."));
}

#[tokio::test]
async fn test_model_failure_keeps_only_user_message() {
    let client = ScriptedClient::new(vec![Err(LlmError::EmptyResponse {
        provider: "OpenAI".into(),
    })]);
    let mut agent = agent(client);

    let err = agent.chat("hello").await.unwrap_err();

    assert!(matches!(err, OrchestraError::Llm(LlmError::EmptyResponse { .. })));
    assert_eq!(roles(&agent), vec![Role::User]);
}

#[tokio::test]
async fn test_model_timeout() {
    let client = ScriptedClient::slow(Duration::from_millis(500));
    let mut agent = Orchestrator::builder(client)
        .completion_timeout(Duration::from_millis(20))
        .build();

    let err = agent.chat("hello").await.unwrap_err();
    assert!(matches!(err, OrchestraError::Llm(LlmError::Timeout(_))));
}

#[tokio::test]
async fn test_truncated_marker_is_returned_verbatim() {
    let text = "Done [TOOL:echo]\n{\"x\":\"1\"}\n[/TOOL], next [TOOL:echo]\n{\"x\":";
    let client = ScriptedClient::new(vec![Ok(text)]);
    let mut agent = agent(client);

    let reply = agent.chat("go").await.unwrap();

    assert_eq!(reply, "Done 1, next [TOOL:echo]\n{\"x\":");
}

#[tokio::test]
async fn test_malformed_json_after_splice_reports_partial_text() {
    let text = "A [TOOL:echo]\n{\"x\":\"1\"}\n[/TOOL] B [TOOL:echo]\n{broken}\n[/TOOL]";
    let client = ScriptedClient::new(vec![Ok(text)]);
    let mut agent = agent(client);

    let err = agent.chat("go").await.unwrap_err();

    match &err {
        OrchestraError::ToolCall { partial, source } => {
            assert_eq!(partial, "A 1 B [TOOL:echo]\n{broken}\n[/TOOL]");
            assert!(matches!(
                **source,
                OrchestraError::Parse(ParseError::InvalidJson { .. })
            ));
        }
        other => panic!("Expected ToolCall, got {:?}", other),
    }
    assert_eq!(err.partial_text(), Some("A 1 B [TOOL:echo]\n{broken}\n[/TOOL]"));
    assert_eq!(roles(&agent), vec![Role::User]);
}

#[tokio::test]
async fn test_unknown_tool_is_an_error() {
    let client = ScriptedClient::new(vec![Ok("[TOOL:missing]\n{}\n[/TOOL]")]);
    let mut agent = agent(client);

    let err = agent.chat("go").await.unwrap_err();

    match err {
        OrchestraError::ToolCall { source, .. } => assert!(matches!(
            *source,
            OrchestraError::Tool(ToolError::NotFound(ref name)) if name == "missing"
        )),
        other => panic!("Expected ToolCall, got {:?}", other),
    }
}

#[tokio::test]
async fn test_tool_argument_error_propagates() {
    let client = ScriptedClient::new(vec![Ok("[TOOL:echo]\n{\"y\":\"1\"}\n[/TOOL]")]);
    let mut agent = agent(client);

    let err = agent.chat("go").await.unwrap_err();
    assert!(err.to_string().contains("x argument is required"));
}

#[tokio::test]
async fn test_tool_timeout() {
    let client = ScriptedClient::new(vec![Ok("[TOOL:stuck]\n{}\n[/TOOL]")]);
    let mut agent = Orchestrator::builder(client)
        .tool(StuckTool)
        .tool_timeout(Duration::from_millis(20))
        .build();

    let err = agent.chat("go").await.unwrap_err();
    match err {
        OrchestraError::ToolCall { source, .. } => assert!(matches!(
            *source,
            OrchestraError::Tool(ToolError::Timeout { .. })
        )),
        other => panic!("Expected ToolCall, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reset_memory_keeps_tools() {
    let client = ScriptedClient::new(vec![Ok("hi")]);
    let mut agent = agent(client);
    agent.chat("hello").await.unwrap();

    agent.reset_memory();

    assert!(agent.memory().is_empty());
    assert!(agent.tools().contains("echo"));
}

#[test]
fn test_from_config_requires_openai_key() {
    let err = Orchestrator::from_config(&Config::default()).err().unwrap();
    assert_eq!(
        err,
        ConfigError::MissingCredential {
            provider: "openai",
            var: "OPENAI_API_KEY"
        }
    );
}

#[test]
fn test_from_config_registers_default_tools() {
    let config = Config {
        openai_api_key: Some("sk-test".into()),
        agent_model: "gpt-4o-mini".into(),
        ..Config::default()
    };
    let agent = Orchestrator::from_config(&config).unwrap();

    assert_eq!(agent.settings().model, "gpt-4o-mini");
    assert!(agent.tools().contains("zipcode_lookup"));
    assert!(agent.tools().contains("ai_comparison"));
    assert!(agent.system_prompt().contains("ask_claude"));
}
