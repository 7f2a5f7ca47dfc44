use serde::Deserialize;
use url::Url;

use crate::executor::{BoxFuture, QueryParams, Tool, ToolError, ToolOutput, parse_query_input};
use crate::registry::ToolDef;

pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";
pub const DEFAULT_TOP_K: usize = 3;
/// Cap on the combined summaries returned in one observation.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// Looks up general knowledge on Wikipedia: a full-text search followed by
/// the lead summary of each of the top hits.
#[derive(Debug, Clone)]
pub struct WikipediaTool {
    client: reqwest::Client,
    base_url: String,
    top_k: usize,
}

impl WikipediaTool {
    /// Tool for the `lang` edition, e.g. `en` for `https://en.wikipedia.org`.
    #[must_use]
    pub fn new(lang: &str, top_k: usize) -> Self {
        Self::with_base_url(&format!("https://{lang}.wikipedia.org"), top_k)
    }

    #[must_use]
    pub fn with_base_url(base_url: &str, top_k: usize) -> Self {
        Self {
            client: lumen_llm::http::default_client(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            top_k: top_k.max(1),
        }
    }

    async fn run(&self, input: &str) -> Result<ToolOutput, ToolError> {
        let query = parse_query_input(input)?;
        let titles = self.search(&query).await?;
        tracing::debug!(query = %query, hits = titles.len(), "wikipedia search");

        let mut pages = Vec::with_capacity(titles.len());
        for title in titles {
            // a missing summary only drops that page
            match self.summary(&title).await {
                Ok(Some(extract)) => pages.push(format!("Page: {title}\nSummary: {extract}")),
                Ok(None) => {}
                Err(e) => tracing::warn!(title = %title, "wikipedia summary failed: {e}"),
            }
        }

        let summary = if pages.is_empty() {
            NO_RESULT.to_owned()
        } else {
            truncate_chars(&pages.join("\n\n"), MAX_CONTENT_CHARS)
        };

        Ok(ToolOutput {
            tool_name: "wikipedia".into(),
            summary,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let limit = self.top_k.to_string();
        let url = Url::parse_with_params(
            &format!("{}/w/api.php", self.base_url),
            &[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("utf8", "1"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ],
        )
        .map_err(|e| ToolError::Execution(format!("invalid Wikipedia URL: {e}")))?;

        let resp: SearchResponse = self.get_json(url).await?.ok_or_else(|| {
            ToolError::Execution("Wikipedia search endpoint not found".into())
        })?;

        Ok(resp
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .take(self.top_k)
            .map(|hit| hit.title)
            .collect())
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, ToolError> {
        let mut url = Url::parse(&format!("{}/api/rest_v1/page/summary/", self.base_url))
            .map_err(|e| ToolError::Execution(format!("invalid Wikipedia URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::Execution("Wikipedia base URL cannot be a base".into()))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));

        let page: Option<SummaryResponse> = self.get_json(url).await?;
        Ok(page
            .and_then(|p| p.extract)
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty()))
    }

    /// GET `url` and decode JSON; `Ok(None)` on 404.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<Option<T>, ToolError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ToolError::Execution(format!("Wikipedia HTTP {status}")));
        }

        resp.json::<T>()
            .await
            .map(Some)
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}

impl Tool for WikipediaTool {
    fn definition(&self) -> ToolDef {
        ToolDef {
            id: "wikipedia",
            description: "Search Wikipedia for general knowledge.",
            schema: schemars::schema_for!(QueryParams),
        }
    }

    fn invoke<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(self.run(input))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
}
