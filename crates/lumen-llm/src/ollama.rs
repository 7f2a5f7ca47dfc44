use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
    embedding_model: String,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(base_url: &str, model: String, embedding_model: String) -> Self {
        let (host, port) = parse_host_port(base_url);
        Self {
            client: Ollama::builder().host(host.as_str()).port(port).build(),
            model,
            embedding_model,
        }
    }

    /// Check if Ollama is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection to Ollama fails.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        self.client.list_local_models().await.map_err(|e| {
            LlmError::Other(format!("failed to connect to Ollama, is it running? {e}"))
        })?;
        Ok(())
    }
}

impl LlmProvider for OllamaProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let ollama_messages: Vec<ChatMessage> = messages.iter().map(convert_message).collect();
        let request = ChatMessageRequest::new(self.model.clone(), ollama_messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| LlmError::Other(format!("Ollama chat request failed: {e}")))?;

        Ok(response.message.content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::from(text),
        );

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| LlmError::Other(format!("Ollama embedding request failed: {e}")))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse { provider: "ollama" })
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

fn convert_message(msg: &Message) -> ChatMessage {
    let text = msg.content.clone();
    match msg.role {
        Role::System => ChatMessage::system(text),
        Role::User => ChatMessage::user(text),
        Role::Assistant => ChatMessage::assistant(text),
    }
}

fn parse_host_port(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    if let Some(colon_pos) = url.rfind(':') {
        let port_str = &url[colon_pos + 1..];
        if let Ok(port) = port_str.parse::<u16>() {
            return (url[..colon_pos].to_string(), port);
        }
    }
    (url.to_string(), DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OllamaProvider {
        OllamaProvider::new(
            "http://localhost:11434",
            "llama3.2".into(),
            "nomic-embed-text".into(),
        )
    }

    #[test]
    fn parse_host_port_with_port() {
        assert_eq!(
            parse_host_port("http://localhost:11434"),
            ("http://localhost".to_string(), 11434)
        );
    }

    #[test]
    fn parse_host_port_without_port() {
        assert_eq!(
            parse_host_port("http://localhost"),
            ("http://localhost".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn parse_host_port_trailing_slash() {
        assert_eq!(
            parse_host_port("http://example.com:8080/"),
            ("http://example.com".to_string(), 8080)
        );
    }

    #[test]
    fn parse_host_port_invalid_port_falls_back() {
        let (host, port) = parse_host_port("http://localhost:notaport");
        assert_eq!(host, "http://localhost:notaport");
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    fn client_targets_configured_host_and_port() {
        let p = OllamaProvider::new("http://example.com:8080/", "m".into(), "e".into());
        assert_eq!(p.client.url_str(), "http://example.com:8080/");
        assert_eq!(provider().client.url().port(), Some(11434));
    }

    #[test]
    fn convert_message_keeps_content() {
        assert_eq!(convert_message(&Message::user("hello")).content, "hello");
        assert_eq!(
            convert_message(&Message::system("be brief")).content,
            "be brief"
        );
    }

    #[test]
    fn provider_reports_capabilities() {
        let p = provider();
        assert!(p.supports_embeddings());
        assert_eq!(p.name(), "ollama");
        assert_eq!(p.model, "llama3.2");
        assert_eq!(p.embedding_model, "nomic-embed-text");
    }

    #[tokio::test]
    async fn chat_unreachable_host_errors() {
        let p = OllamaProvider::new("http://127.0.0.1:1", "m".into(), "e".into());
        let err = p.chat(&[Message::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("Ollama chat request failed"));
    }
}
