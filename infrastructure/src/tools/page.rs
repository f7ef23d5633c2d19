//! **Page tools**: `page_open`, `page_extract`, `page_reset`
//!
//! A minimal browser-like session: one current page, fetched over HTTP and
//! queried with CSS selectors. All three tools share a single
//! [`ExclusiveResource<PageSessionFactory>`], so calls against the session
//! never overlap.
//!
//! Gated behind the `web-tools` Cargo feature flag.
//!
//! | Tool | Arguments | Effect |
//! |------|-----------|--------|
//! | `page_open` | `url`, `max_length`? | fetch the URL into the session, return its text |
//! | `page_extract` | `selector`, `limit`? | text of elements matching a CSS selector |
//! | `page_reset` | none | discard the session and start a fresh one |

use super::resource::{ExclusiveResource, ResourceFactory};
use async_trait::async_trait;
use pmcro_domain::util::truncate_str;
use pmcro_domain::{ToolDescriptor, ToolError, ToolHandler, parse_arguments};
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

pub const PAGE_OPEN: &str = "page_open";
pub const PAGE_EXTRACT: &str = "page_extract";
pub const PAGE_RESET: &str = "page_reset";

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Default max output text size (50 KB)
const DEFAULT_MAX_TEXT: usize = 50 * 1024;

/// Default number of matches returned by `page_extract`
const DEFAULT_EXTRACT_LIMIT: usize = 20;

/// The page currently loaded in a session.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub status: u16,
    pub html: String,
}

/// One browser-like session: an HTTP client plus the current page.
pub struct PageSession {
    client: reqwest::Client,
    page: Option<LoadedPage>,
}

impl PageSession {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, page: None }
    }

    /// Replace the current page without fetching.
    pub fn load_html(&mut self, url: impl Into<String>, status: u16, html: impl Into<String>) {
        self.page = Some(LoadedPage {
            url: url.into(),
            status,
            html: html.into(),
        });
    }

    pub fn page(&self) -> Option<&LoadedPage> {
        self.page.as_ref()
    }

    async fn open(&mut self, url: &str) -> Result<&LoadedPage, ToolError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "pmcro/0.1 (Page Tool)")
            .send()
            .await
            .map_err(|e| ToolError::execution_failed(format!("Failed to fetch URL: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution_failed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if response.content_length().unwrap_or(0) > MAX_BODY_SIZE as u64 {
            return Err(ToolError::execution_failed(format!(
                "Response too large (max: {} bytes)",
                MAX_BODY_SIZE
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            ToolError::execution_failed(format!("Failed to read response body: {}", e))
        })?;
        if body.len() > MAX_BODY_SIZE {
            return Err(ToolError::execution_failed(format!(
                "Response too large: {} bytes",
                body.len()
            )));
        }

        self.load_html(url, status.as_u16(), String::from_utf8_lossy(&body));
        self.page
            .as_ref()
            .ok_or_else(|| ToolError::execution_failed("Page was not loaded"))
    }
}

/// Creates page sessions sharing one configured HTTP client.
pub struct PageSessionFactory {
    client: reqwest::Client,
}

impl PageSessionFactory {
    pub fn new(timeout: Duration) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::execution_failed(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFactory for PageSessionFactory {
    type Resource = PageSession;

    fn label(&self) -> &str {
        "page_session"
    }

    async fn create(&self) -> Result<PageSession, ToolError> {
        Ok(PageSession::new(self.client.clone()))
    }
}

pub type SharedPageSession = Arc<ExclusiveResource<PageSessionFactory>>;

/// The three page tools, sharing `session`.
pub fn page_tools(session: SharedPageSession) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(PageOpenTool::new(session.clone())),
        Arc::new(PageExtractTool::new(session.clone())),
        Arc::new(PageResetTool::new(session)),
    ]
}

#[derive(Deserialize)]
struct OpenInput {
    url: String,
    max_length: Option<usize>,
}

pub struct PageOpenTool {
    session: SharedPageSession,
}

impl PageOpenTool {
    pub fn new(session: SharedPageSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ToolHandler for PageOpenTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            PAGE_OPEN,
            "Open a web page in the session and return its readable text.",
        )
        .with_input_schema(json!({
            "type": "object",
            "required": ["url"],
            "properties": {
                "url": {"type": "string", "minLength": 1, "description": "The URL to open"},
                "max_length": {"type": "integer", "minimum": 1, "description": "Maximum text length in bytes (default: 51200)"}
            }
        }))
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let input: OpenInput = parse_arguments(PAGE_OPEN, arguments)?;
        let max_length = input.max_length.unwrap_or(DEFAULT_MAX_TEXT);

        let mut session = self.session.acquire().await?;
        let page = session.open(&input.url).await?;
        Ok(page_summary(page, max_length))
    }
}

#[derive(Deserialize)]
struct ExtractInput {
    selector: String,
    limit: Option<usize>,
}

pub struct PageExtractTool {
    session: SharedPageSession,
}

impl PageExtractTool {
    pub fn new(session: SharedPageSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ToolHandler for PageExtractTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            PAGE_EXTRACT,
            "Extract the text of elements matching a CSS selector on the open page.",
        )
        .with_input_schema(json!({
            "type": "object",
            "required": ["selector"],
            "properties": {
                "selector": {"type": "string", "minLength": 1, "description": "CSS selector, e.g. \"h1\" or \"a.title\""},
                "limit": {"type": "integer", "minimum": 1, "description": "Maximum number of matches (default: 20)"}
            }
        }))
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let input: ExtractInput = parse_arguments(PAGE_EXTRACT, arguments)?;
        let limit = input.limit.unwrap_or(DEFAULT_EXTRACT_LIMIT);

        let session = self.session.acquire().await?;
        // Parsed types stay on this side of the await
        let selector = Selector::parse(&input.selector).map_err(|e| {
            ToolError::invalid_arguments(format!("Invalid selector '{}': {}", input.selector, e))
        })?;
        let page = session
            .page()
            .ok_or_else(|| ToolError::execution_failed("No page is open; call page_open first"))?;

        let document = Html::parse_document(&page.html);
        let matches: Vec<String> = document
            .select(&selector)
            .map(|element| clean_whitespace(&collect_element_text(element).join(" ")))
            .filter(|text| !text.is_empty())
            .take(limit)
            .collect();

        Ok(json!({
            "url": page.url,
            "selector": input.selector,
            "count": matches.len(),
            "matches": matches,
        }))
    }
}

pub struct PageResetTool {
    session: SharedPageSession,
}

impl PageResetTool {
    pub fn new(session: SharedPageSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ToolHandler for PageResetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            PAGE_RESET,
            "Discard the current page session and start a fresh one.",
        )
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        self.session.reset().await?;
        Ok(json!({ "reset": true }))
    }
}

fn page_summary(page: &LoadedPage, max_length: usize) -> Value {
    let document = Html::parse_document(&page.html);
    let title = Selector::parse("title")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|t| clean_whitespace(&t.text().collect::<String>()));

    let text = html_to_text(&page.html);
    let shown = truncate_str(&text, max_length);

    json!({
        "url": page.url,
        "status": page.status,
        "title": title,
        "text": shown,
        "truncated": shown.len() < text.len(),
        "totalBytes": text.len(),
    })
}

/// Extract readable text from HTML, stripping tags, scripts, and styles
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    // Try to use <body>, fall back to the whole document
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    clean_whitespace(&collect_element_text(root).join(" "))
}

/// Tags whose entire subtree is ignored
const SKIP_TAGS: [&str; 4] = ["script", "style", "noscript", "svg"];

fn collect_element_text(element: ElementRef) -> Vec<String> {
    if SKIP_TAGS.contains(&element.value().name()) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts
}

/// Collapse runs of whitespace into single spaces
fn clean_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmcro_domain::ToolErrorKind;

    const HTML: &str = r#"<html><head><title> Fixture  Page </title><style>p{}</style></head>
        <body><h1>Hello</h1><script>var x = 1;</script>
        <ul><li class="item">one</li><li class="item">two <b>bold</b></li><li>three</li></ul>
        </body></html>"#;

    fn session() -> SharedPageSession {
        Arc::new(ExclusiveResource::new(
            PageSessionFactory::new(Duration::from_secs(5)).unwrap(),
        ))
    }

    async fn load(session: &SharedPageSession) {
        session
            .acquire()
            .await
            .unwrap()
            .load_html("https://fixture.test/", 200, HTML);
    }

    #[test]
    fn test_html_to_text_skips_scripts() {
        let text = html_to_text(HTML);
        assert_eq!(text, "Hello one two bold three");
    }

    #[test]
    fn test_page_summary() {
        let page = LoadedPage {
            url: "u".into(),
            status: 200,
            html: HTML.into(),
        };
        let summary = page_summary(&page, 8);
        assert_eq!(summary["title"], "Fixture Page");
        assert_eq!(summary["text"], "Hello on");
        assert_eq!(summary["truncated"], true);
    }

    #[tokio::test]
    async fn test_extract_matches() {
        let session = session();
        load(&session).await;

        let out = PageExtractTool::new(session)
            .call(json!({"selector": "li.item"}))
            .await
            .unwrap();
        assert_eq!(out["count"], 2);
        assert_eq!(out["matches"], json!(["one", "two bold"]));
    }

    #[tokio::test]
    async fn test_extract_limit() {
        let session = session();
        load(&session).await;

        let out = PageExtractTool::new(session)
            .call(json!({"selector": "li", "limit": 1}))
            .await
            .unwrap();
        assert_eq!(out["matches"], json!(["one"]));
    }

    #[tokio::test]
    async fn test_extract_without_page_fails() {
        let err = PageExtractTool::new(session())
            .call(json!({"selector": "h1"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::ExecutionFailure);
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let session = session();
        load(&session).await;
        let err = PageExtractTool::new(session)
            .call(json!({"selector": "li[["}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[tokio::test]
    async fn test_reset_clears_page_and_is_idempotent() {
        let session = session();
        load(&session).await;
        let reset = PageResetTool::new(session.clone());

        reset.call(json!({})).await.unwrap();
        reset.call(json!({})).await.unwrap();

        assert!(session.is_acquired().await);
        assert!(session.acquire().await.unwrap().page().is_none());
    }

    #[test]
    fn test_page_tools_names() {
        let names: Vec<String> = page_tools(session())
            .iter()
            .map(|t| t.descriptor().name)
            .collect();
        assert_eq!(names, vec![PAGE_OPEN, PAGE_EXTRACT, PAGE_RESET]);
    }
}
