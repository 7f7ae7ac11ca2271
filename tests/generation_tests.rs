use mock_pilot::{
    fill::{FillResponse, FillSettings, trigger_fill},
    form::field_model::{FieldDescriptor, FieldValue},
    generation::{
        GenerationError, ValueGenerator, build_generator,
        generator::parse_values_content,
        mock::{MockGenerator, guess_value},
        ollama::OllamaGenerator,
        openai::{DEFAULT_OPENAI_ENDPOINT, OpenAiGenerator},
        prompt::{SYSTEM_PROMPT, build_user_prompt, describe_field},
    },
};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

mod common;

use crate::common::fixtures::{by_id, load_fixture};

fn email_field() -> FieldDescriptor {
    let mut field = FieldDescriptor::new("email", "email", "email");
    field.label = Some("Email".to_string());
    field.required = Some(true);
    field.context = Some("Contact".to_string());
    field
}

fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

// ============================================================================
// Prompt
// ============================================================================

#[test]
fn describe_field_lists_present_properties_only() {
    assert_eq!(
        describe_field(&email_field()),
        "Field ID: email\nType: email\nLabel: Email\nRequired: Yes\nContext: Contact\n"
    );

    let mut plan = FieldDescriptor::new("plan", "plan", "select");
    plan.required = Some(false);
    plan.placeholder = Some(String::new());
    plan.options = Some(vec!["Free".to_string(), "Pro".to_string()]);
    assert_eq!(describe_field(&plan), "Field ID: plan\nType: select\nOptions: Free, Pro\n");
}

#[test]
fn user_prompt_separates_fields() {
    let prompt = build_user_prompt(&[email_field(), FieldDescriptor::new("bio", "", "textarea")]);

    assert!(prompt.contains("Context: Contact\n\n---\nField ID: bio\nType: textarea\n"));
    assert!(prompt.contains("Respond ONLY with a JSON object"));
}

// ============================================================================
// Parsing model output
// ============================================================================

#[test]
fn parse_values_accepts_plain_and_fenced_json() {
    let plain = parse_values_content(r#"{"email":"a@b.com","agree":true,"age":36}"#).unwrap();
    assert_eq!(plain.get("email"), Some(&FieldValue::from("a@b.com")));
    assert_eq!(plain.get("agree"), Some(&FieldValue::Bool(true)));
    assert_eq!(plain.get("age"), Some(&FieldValue::from("36")));

    let fenced = parse_values_content("```json\n{\"email\": \"a@b.com\"}\n```\n").unwrap();
    assert_eq!(fenced.get("email"), Some(&FieldValue::from("a@b.com")));
}

#[test]
fn parse_values_keeps_service_order_and_drops_unusable_values() {
    let values = parse_values_content(r#"{"z":"1","a":null,"m":["x"],"b":"2"}"#).unwrap();
    let ids: Vec<&str> = values.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["z", "b"]);
}

#[test]
fn parse_values_rejects_non_objects() {
    for content in ["", "not json", "[1,2]", "\"text\"", "```\nnope\n```"] {
        assert_eq!(parse_values_content(content), Err(GenerationError::Parse), "{:?}", content);
    }
}

#[test]
fn api_error_prefers_service_message() {
    let err = GenerationError::from_error_body(401, r#"{"error":{"message":"Invalid API key"}}"#);
    assert_eq!(err.to_string(), "Invalid API key");

    let err = GenerationError::from_error_body(404, r#"{"error":"model 'llama9' not found"}"#);
    assert_eq!(err.to_string(), "model 'llama9' not found");

    let err = GenerationError::from_error_body(502, "<html>Bad gateway</html>");
    assert_eq!(err.to_string(), "API request failed with status 502");
}

// ============================================================================
// Mock generator
// ============================================================================

#[test]
fn guess_value_uses_label_then_type() {
    assert_eq!(guess_value("Work email", None), "user@example.com");
    assert_eq!(guess_value("Zip code", Some("text")), "90210");
    assert_eq!(guess_value("", Some("url")), "https://example.com");
    assert_eq!(guess_value("Anything", Some("text")), "test");
}

#[test]
fn guess_value_matches_short_keys_as_whole_words() {
    assert_eq!(guess_value("Age", None), "42");
    assert_eq!(guess_value("Tel.", None), "555-0100");
    assert_eq!(guess_value("Your message", Some("text")), "test");
    assert_eq!(guess_value("Page title", Some("text")), "test");
    assert_eq!(guess_value("Hotel name", Some("text")), "Jane Doe");
}

#[tokio::test]
async fn mock_generator_picks_first_radio_and_first_real_option() {
    let mut plan = FieldDescriptor::new("plan", "plan", "select");
    plan.options = Some(vec!["".to_string(), "Free".to_string()]);
    let fields = vec![
        FieldDescriptor::new("r1", "size", "radio"),
        FieldDescriptor::new("r2", "size", "radio"),
        FieldDescriptor::new("agree", "agree", "checkbox"),
        plan,
    ];

    let values = MockGenerator.generate(&fields).await.unwrap();

    assert_eq!(values.get("r1"), Some(&FieldValue::Bool(true)));
    assert_eq!(values.get("r2"), Some(&FieldValue::Bool(false)));
    assert_eq!(values.get("agree"), Some(&FieldValue::Bool(true)));
    assert_eq!(values.get("plan"), Some(&FieldValue::from("Free")));
}

#[tokio::test]
async fn mock_generator_prefers_option_values_and_keeps_first_value_per_id() {
    let mut plan = FieldDescriptor::new("plan", "plan", "select");
    plan.options = Some(vec!["Choose a plan".to_string(), "Free".to_string()]);
    plan.option_values = Some(vec!["".to_string(), "free".to_string()]);
    let fields = vec![
        plan,
        FieldDescriptor::new("size", "size", "radio"),
        FieldDescriptor::new("size", "size", "radio"),
    ];

    let values = MockGenerator.generate(&fields).await.unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values.get("plan"), Some(&FieldValue::from("free")));
    assert_eq!(values.get("size"), Some(&FieldValue::Bool(true)));
}

// ============================================================================
// OpenAI backend
// ============================================================================

#[tokio::test]
async fn openai_sends_chat_request_and_parses_content() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chat/completions"))
        .and(matchers::header("authorization", "Bearer test-key"))
        .and(matchers::body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion(r#"{"email":"a@b.com","agree":true}"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("test-key", "gpt-4o-mini", &mock_server.uri());
    let values = generator.generate(&[email_field()]).await.unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values.get("email"), Some(&FieldValue::from("a@b.com")));
    assert_eq!(values.get("agree"), Some(&FieldValue::Bool(true)));
}

#[tokio::test]
async fn openai_request_carries_system_and_user_prompts() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("{}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("k", "m", &format!("{}/", mock_server.uri()));
    generator.generate(&[email_field()]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("Field ID: email"));
}

#[tokio::test]
async fn openai_error_message_is_passed_through() {
    let mock_server = MockServer::start().await;

    let error_body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("bad", "gpt-4o-mini", &mock_server.uri());
    let err = generator.generate(&[email_field()]).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::Api {
            status: 401,
            message: "Incorrect API key provided".to_string()
        }
    );
}

#[tokio::test]
async fn openai_error_without_message_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("k", "m", &mock_server.uri());
    let err = generator.generate(&[email_field()]).await.unwrap_err();

    assert_eq!(err.to_string(), "API request failed with status 500");
}

#[tokio::test]
async fn openai_unparseable_content_is_a_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion("Sure! Here are some values")),
        )
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("k", "m", &mock_server.uri());
    assert_eq!(
        generator.generate(&[email_field()]).await.unwrap_err(),
        GenerationError::Parse
    );
}

#[tokio::test]
async fn openai_response_without_choices_is_a_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let generator = OpenAiGenerator::with_endpoint("k", "m", &mock_server.uri());
    assert_eq!(
        generator.generate(&[email_field()]).await.unwrap_err(),
        GenerationError::Parse
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let generator = OpenAiGenerator::with_endpoint("k", "m", "http://127.0.0.1:1");
    let err = generator.generate(&[email_field()]).await.unwrap_err();

    match &err {
        GenerationError::Transport { provider, .. } => assert_eq!(provider, "openai"),
        other => panic!("expected transport error, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Request to openai failed: "));
}

#[test]
fn openai_defaults() {
    let generator = OpenAiGenerator::new("k", "gpt-3.5-turbo");
    assert_eq!(generator.endpoint, DEFAULT_OPENAI_ENDPOINT);
    assert_eq!(generator.completions_url(), "https://api.openai.com/v1/chat/completions");
    assert_eq!(generator.provider(), "openai");
}

// ============================================================================
// Ollama backend
// ============================================================================

#[tokio::test]
async fn ollama_requests_json_format_and_parses_response_field() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/generate"))
        .and(matchers::body_partial_json(serde_json::json!({
            "model": "qwen2.5:1.5b",
            "stream": false,
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "qwen2.5:1.5b",
            "response": "{\"email\": \"ollama@example.com\"}",
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/generate", mock_server.uri());
    let generator = OllamaGenerator::new(&endpoint, "qwen2.5:1.5b");
    let values = generator.generate(&[email_field()]).await.unwrap();

    assert_eq!(values.get("email"), Some(&FieldValue::from("ollama@example.com")));
}

#[tokio::test]
async fn ollama_plain_error_string_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"model \"nope\" not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let generator = OllamaGenerator::new(&mock_server.uri(), "nope");
    let err = generator.generate(&[email_field()]).await.unwrap_err();

    assert_eq!(err.to_string(), "model \"nope\" not found");
}

// ============================================================================
// Provider selection
// ============================================================================

#[test]
fn build_generator_selects_by_provider_name() {
    let mock = build_generator(&FillSettings::default().with_provider("MOCK")).unwrap();
    assert_eq!(mock.provider(), "mock");

    let ollama =
        build_generator(&FillSettings::default().with_provider("ollama").with_model("llama3")).unwrap();
    assert_eq!(ollama.provider(), "ollama");

    let openai = build_generator(
        &FillSettings::default()
            .with_provider("openai")
            .with_model("gpt-4o-mini")
            .with_api_key("sk-test"),
    )
    .unwrap();
    assert_eq!(openai.provider(), "openai");
}

#[tokio::test]
async fn trigger_fills_page_through_openai_compatible_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion(r#"{"email":"a@b.com"}"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let settings = FillSettings::default()
        .with_provider("openai")
        .with_model("gpt-4o-mini")
        .with_api_key("sk-test")
        .with_endpoint(mock_server.uri());
    let mut doc = load_fixture("contact.html");

    let response = trigger_fill(&mut doc, &settings).await;

    assert_eq!(response, FillResponse::ok());
    assert_eq!(doc.value(by_id(&doc, "email")), "a@b.com");
}

#[tokio::test]
async fn trigger_reports_service_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"error":{"message":"Rate limit reached"}}"#),
        )
        .mount(&mock_server)
        .await;

    let settings = FillSettings::default()
        .with_provider("openai")
        .with_model("gpt-4o-mini")
        .with_api_key("sk-test")
        .with_endpoint(mock_server.uri());
    let mut doc = load_fixture("contact.html");

    let response = trigger_fill(&mut doc, &settings).await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Rate limit reached"));
}
