use url::Url;

use super::super::{Document, DocumentError, DocumentMetadata};

/// Default cap on a fetched page body: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, td";

/// Fetches an HTML page and reduces it to its readable text.
#[derive(Debug, Clone)]
pub struct WebLoader {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl Default for WebLoader {
    fn default() -> Self {
        Self {
            client: lumen_llm::http::default_client(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl WebLoader {
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::Load`] on network failure, non-success status,
    /// oversized or non-UTF-8 body.
    pub async fn load(&self, url: &Url) -> Result<Document, DocumentError> {
        let html = self.fetch_html(url).await?;
        let page = tokio::task::spawn_blocking(move || extract_page(&html))
            .await
            .map_err(|e| DocumentError::load(url.as_str(), e))?;

        tracing::debug!(url = %url, chars = page.text.len(), "fetched web page");

        let mut metadata = DocumentMetadata::new(url.as_str(), "text/html");
        if let Some(title) = page.title {
            metadata = metadata.with("title", title);
        }

        Ok(Document {
            source_id: url.to_string(),
            content: page.text,
            metadata,
        })
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, DocumentError> {
        let fail = |reason: String| DocumentError::load(url.as_str(), reason);

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }

        let bytes = resp.bytes().await.map_err(|e| fail(e.to_string()))?;
        if bytes.len() > self.max_body_bytes {
            return Err(fail(format!(
                "response too large: {} bytes (max: {})",
                bytes.len(),
                self.max_body_bytes
            )));
        }

        String::from_utf8(bytes.to_vec()).map_err(|e| fail(e.to_string()))
    }
}

struct Page {
    title: Option<String>,
    text: String,
}

fn extract_page(html: &str) -> Page {
    let soup = scrape_core::Soup::parse(html);

    let title = soup
        .find_all("title")
        .ok()
        .and_then(|tags| tags.into_iter().next())
        .map(|t| collapse_whitespace(&t.text()))
        .filter(|t| !t.is_empty());

    let mut blocks: Vec<String> = soup
        .find_all(CONTENT_SELECTOR)
        .map(|tags| {
            tags.into_iter()
                .map(|t| collapse_whitespace(&t.text()))
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if blocks.is_empty() {
        blocks = soup
            .find_all("body")
            .map(|tags| {
                tags.into_iter()
                    .map(|t| collapse_whitespace(&t.text()))
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
    }

    Page {
        title,
        text: blocks.join("\n\n"),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PAGE: &str = "<html><head><title> LLM Powered\n Agents </title></head>\
        <body><h1>Agents</h1><p>Planning is   a key component.</p>\
        <p>Memory is another.</p></body></html>";

    #[test]
    fn extract_page_reads_title_and_paragraphs() {
        let page = extract_page(PAGE);
        assert_eq!(page.title.as_deref(), Some("LLM Powered Agents"));
        assert!(page.text.contains("Planning is a key component."));
        assert!(page.text.contains("Memory is another."));
        assert!(page.text.contains("\n\n"));
    }

    #[test]
    fn extract_page_falls_back_to_body() {
        let page = extract_page("<html><body><div>only a div</div></body></html>");
        assert!(page.title.is_none());
        assert_eq!(page.text, "only a div");
    }

    #[test]
    fn collapse_whitespace_joins_words() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[tokio::test]
    async fn load_fetches_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/agent/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/posts/agent/", server.uri())).unwrap();
        let doc = WebLoader::default().load(&url).await.unwrap();
        assert_eq!(doc.source_id, url.as_str());
        assert_eq!(doc.metadata.source, url.as_str());
        assert_eq!(doc.metadata.content_type, "text/html");
        assert_eq!(doc.metadata.title(), Some("LLM Powered Agents"));
        assert!(doc.content.contains("Planning"));
    }

    #[tokio::test]
    async fn non_success_status_is_load_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = WebLoader::default().load(&url).await.unwrap_err();
        match err {
            DocumentError::Load { descriptor, reason } => {
                assert_eq!(descriptor, url.as_str());
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = WebLoader::default()
            .with_max_body_bytes(10)
            .load(&url)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("response too large"));
    }
}
