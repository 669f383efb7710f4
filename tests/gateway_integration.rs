use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use litellm_mcp_agent::config::GatewaySettings;
use litellm_mcp_agent::error::ErrorKind;
use litellm_mcp_agent::llm::{
    ChatCompletionsDriver, FunctionTool, LlmDriver, LlmRequest, Message, ModelDecision,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

/// Serve `reply` with `status` on `/v1/chat/completions`, capturing the request.
async fn spawn_gateway(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();
    let state = captured.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let state = state.clone();
            let reply = reply.clone();
            async move {
                *state.auth.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *state.body.lock().unwrap() = Some(body);
                (status, Json(reply))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn driver(base_url: &str, api_key: Option<&str>) -> ChatCompletionsDriver {
    ChatCompletionsDriver::new(&GatewaySettings {
        base_url: base_url.to_string(),
        api_key: api_key.map(str::to_string),
        timeout_secs: 5,
    })
    .unwrap()
}

fn weather_request(with_tools: bool) -> LlmRequest {
    LlmRequest {
        model: "gpt-4".to_string(),
        messages: vec![Message::user("What's the weather in Tokyo?")],
        tools: if with_tools {
            vec![FunctionTool::new(
                "get_weather",
                "Get the current weather",
                json!({
                    "type": "object",
                    "properties": { "location": { "type": "string" } },
                    "required": ["location"]
                }),
            )]
        } else {
            Vec::new()
        },
    }
}

#[tokio::test]
async fn test_tool_call_reply_is_decoded() {
    let (url, captured) = spawn_gateway(
        StatusCode::OK,
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "{\"location\":\"Tokyo\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60 }
        }),
    )
    .await;

    let reply = driver(&url, Some("sk-test"))
        .complete(weather_request(true))
        .await
        .unwrap();

    match reply.decision {
        ModelDecision::ToolCalls(calls) => {
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].id, "call_abc");
            assert_eq!(calls[0].function.name, "get_weather");
            assert_eq!(
                calls[0].parsed_arguments().unwrap(),
                json!({ "location": "Tokyo" })
            );
        }
        other => panic!("expected tool calls, got {other:?}"),
    }
    assert_eq!(reply.usage.unwrap().total_tokens, 60);

    assert_eq!(
        captured.auth.lock().unwrap().as_deref(),
        Some("Bearer sk-test")
    );
    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["tool_choice"], "auto");
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "get_weather");
    assert_eq!(body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_plain_answer_without_tools() {
    let (url, captured) = spawn_gateway(
        StatusCode::OK,
        json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello there" } }]
        }),
    )
    .await;

    let reply = driver(&url, None)
        .complete(weather_request(false))
        .await
        .unwrap();

    assert_eq!(reply.decision, ModelDecision::FinalAnswer("Hello there".to_string()));
    assert!(reply.usage.is_none());

    assert!(captured.auth.lock().unwrap().is_none());
    let body = captured.body.lock().unwrap().clone().unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
}

#[tokio::test]
async fn test_rejected_key_is_authentication_error() {
    let (url, _) = spawn_gateway(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Invalid API key" } }),
    )
    .await;

    let err = driver(&url, Some("sk-wrong"))
        .complete(weather_request(true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_server_error_is_gateway_error() {
    let (url, _) = spawn_gateway(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "upstream provider unavailable" }),
    )
    .await;

    let err = driver(&url, None)
        .complete(weather_request(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Gateway);
    assert!(err.to_string().contains("upstream provider unavailable"));
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let (url, _) = spawn_gateway(StatusCode::OK, json!({ "choices": [] })).await;

    let err = driver(&url, None)
        .complete(weather_request(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_unreachable_gateway_is_connectivity_error() {
    let err = driver("http://127.0.0.1:9", None)
        .complete(weather_request(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
}
