// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Provider and postal-code HTTP endpoints are served by wiremock.

use std::sync::Arc;
use std::time::Duration;

use orchestra::prelude::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_completion(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
}

#[tokio::test]
async fn test_orchestrator_runs_zipcode_lookup_end_to_end() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(
            "Here it is:\n[TOOL:zipcode_lookup]\n{\"zipcode\": \"01310-100\"}\n[/TOOL]\nAnything else?",
        )))
        .expect(1)
        .mount(&llm)
        .await;

    let viacep = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        })))
        .expect(1)
        .mount(&viacep)
        .await;

    let client = Arc::new(OpenAIClient::new("sk-test").with_base_url(llm.uri()));
    let zipcode = ZipcodeTool::new(MemoryCache::shared(Duration::from_secs(60)), Duration::from_secs(5))
        .with_base_url(viacep.uri());
    let mut agent = Orchestrator::builder(client).tool(zipcode).build();

    let reply = agent.chat("Where is CEP 01310-100?").await.unwrap();

    assert_eq!(
        reply,
        "Here it is:\nAddress for CEP 01310-100:\nStreet: Avenida Paulista\nNeighborhood: Bela Vista\nCity: São Paulo - SP\nAnything else?"
    );
    let roles: Vec<Role> = agent.memory().snapshot().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
}

#[tokio::test]
async fn test_orchestrator_sends_system_prompt_and_settings() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 1000,
            "temperature": 0.1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("Hello!")))
        .expect(1)
        .mount(&llm)
        .await;

    let client = Arc::new(OpenAIClient::new("sk-test").with_base_url(llm.uri()));
    let mut agent = Orchestrator::builder(client)
        .tools(&default_tools(&Config::default()))
        .build();

    assert_eq!(agent.chat("hi").await.unwrap(), "Hello!");

    let requests = llm.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(
        body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("- ai_comparison: Compare responses from multiple AI providers.")
    );
    assert_eq!(body["messages"][1]["content"], "hi");
}

#[tokio::test]
async fn test_comparison_over_real_clients() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("Paris")))
        .mount(&openai)
        .await;

    let mistral = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&mistral)
        .await;

    let openai_client = Arc::new(OpenAIClient::new("sk-o").with_base_url(openai.uri()));
    let mistral_client = Arc::new(OpenAIClient::mistral("sk-m").with_base_url(mistral.uri()));

    let comparison = ComparisonTool::new()
        .with_provider("mistral", Arc::new(Provider::new(mistral_client, "mistral-tiny")))
        .with_provider("openai", Arc::new(Provider::new(openai_client, "gpt-3.5-turbo")));

    let args = orchestra::tool::args_from_value(serde_json::json!({
        "question": "Capital of France?",
        "providers": ["mistral", "openai"]
    }))
    .unwrap();
    let out = comparison.execute(args).await.unwrap();

    assert_eq!(
        out,
        "AI Comparison for: \"Capital of France?\"\n\nMISTRAL:\nError: upstream call failed: API error (500): overloaded\n\nOPENAI:\nParis"
    );
}

#[tokio::test]
async fn test_tool_host_serves_file_tools() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("notes").join("todo.txt");
    let file_str = file.to_str().unwrap();

    let server = McpServer::new(default_tools(&Config::default()));
    let requests = [
        serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        serde_json::json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        serde_json::json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": {"name": "write_file", "arguments": {"file_path": file_str, "content": "buy milk"}}}),
        serde_json::json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "search_files", "arguments": {"directory": dir.path().to_str().unwrap(), "pattern": "milk"}}}),
        serde_json::json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "ask_claude", "arguments": {"question": "hi"}}}),
    ];
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut output = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "orchestra");
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "buy milk");

    let search = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(search.starts_with("Found 1 matches"));
    assert!(search.contains("todo.txt:1: buy milk"));

    // No Claude key configured: a tool failure, not a protocol error.
    assert_eq!(responses[3]["result"]["isError"], true);
    assert!(
        responses[3]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("CLAUDE_API_KEY")
    );
}

#[tokio::test]
async fn test_zipcode_file_cache_survives_new_tool_instance() {
    let dir = tempfile::TempDir::new().unwrap();
    let viacep = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/20040002/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "20040-002",
            "logradouro": "Rua da Assembleia",
            "bairro": "Centro",
            "localidade": "Rio de Janeiro",
            "uf": "RJ"
        })))
        .expect(1)
        .mount(&viacep)
        .await;

    let config = Config {
        cache_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let first = ZipcodeTool::from_config(&config).with_base_url(viacep.uri());
    let second = ZipcodeTool::from_config(&config).with_base_url(viacep.uri());

    let a = first.lookup("20040-002").await.unwrap();
    let b = second.lookup("20040002").await.unwrap();

    assert_eq!(a, b);
    assert!(dir.path().join("cep20040002").exists());
}
