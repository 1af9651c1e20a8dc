use tracing::warn;

use crate::llm::{CompletionClient, CompletionResult};

/// Fixed fallback whenever the completion endpoint is unavailable for any
/// reason. Resolution never fails and never returns an empty string.
pub const APOLOGY: &str =
    "ごめんなさい、いまはうまく考えがまとまりません…少し時間をおいてもう一度話しかけてください 🙏";

/// Resolve free-form text into exactly one reply: the trimmed completion on
/// success, the apology on any unavailability.
pub async fn resolve(client: &CompletionClient, user_text: &str) -> String {
    match client.complete(user_text).await {
        CompletionResult::Success(text) => text.trim().to_string(),
        CompletionResult::Unavailable(reason) => {
            warn!("Completion unavailable ({}), falling back", reason);
            APOLOGY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(endpoint: String, api_key: Option<&str>) -> CompletionClient {
        CompletionClient::new(ApiConfig {
            api_key: api_key.map(str::to_string),
            model: "test-model".to_string(),
            endpoint,
            system_prompt: "test".to_string(),
            max_tokens: 64,
            temperature: 0.8,
            timeout: Duration::from_millis(500),
        })
    }

    #[tokio::test]
    async fn success_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  答えです。\n"}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Some("k"));
        assert_eq!(resolve(&client, "質問").await, "答えです。");
    }

    #[tokio::test]
    async fn no_credential_resolves_to_apology() {
        let client = client_for("http://127.0.0.1:1/".to_string(), None);
        assert_eq!(resolve(&client, "質問").await, APOLOGY);
    }

    #[tokio::test]
    async fn http_error_resolves_to_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Some("k"));
        assert_eq!(resolve(&client, "質問").await, APOLOGY);
    }

    #[tokio::test]
    async fn transport_error_resolves_to_apology() {
        let client = client_for("http://127.0.0.1:1/".to_string(), Some("k"));
        assert_eq!(resolve(&client, "質問").await, APOLOGY);
    }
}
