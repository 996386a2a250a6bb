//! Web page loader

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{info, warn};

use crate::http::{check_response, create_client};

use super::Document;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|template)\b[^>]*>.*?</(script|style|noscript|template)\s*>")
        .expect("valid regex")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(p|div|section|article|li|ul|ol|pre|table|tr|h[1-6])\s*>|<br\s*/?>")
        .expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Fetches pages over HTTP and converts them to plain text
pub struct WebLoader {
    client: Client,
}

impl WebLoader {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: create_client(timeout_secs),
        }
    }

    /// Load one page; metadata carries `source`, `title` and `language`
    pub async fn load(&self, url: &str) -> anyhow::Result<Document> {
        let response = self.client.get(url).send().await?;
        let response = check_response(response, url).await?;

        let language = response
            .headers()
            .get(reqwest::header::CONTENT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let html = response.text().await?;

        let text = html_to_text(&html);
        if text.is_empty() {
            warn!("{} contains no extractable text", url);
        }
        info!("Loaded {} ({} chars)", url, text.len());

        let mut doc = Document::new(text, url);
        if let Some(obj) = doc.metadata.as_object_mut() {
            if let Some(title) = page_title(&html) {
                obj.insert("title".to_string(), title.into());
            }
            if let Some(language) = language {
                obj.insert("language".to_string(), language.into());
            }
        }
        Ok(doc)
    }
}

/// Strip markup, keeping block boundaries as blank lines
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(html, "");
    let text = COMMENT.replace_all(&text, "");
    let text = BLOCK_END.replace_all(&text, "\n\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    BLANK_RUNS.replace_all(joined.trim(), "\n\n").into_owned()
}

fn page_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|t| !t.is_empty())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><title>Ownership</title>
<style>p { color: red; }</style>
<script>var x = "<p>not text</p>";</script></head>
<body><h1>Ownership</h1><p>Each value has an <b>owner</b>.</p>
<!-- hidden -->
<p>Borrowing uses &amp;T &lt;refs&gt;.</p></body></html>"#;

        let text = html_to_text(html);
        assert!(text.contains("Each value has an owner."));
        assert!(text.contains("Borrowing uses &T <refs>."));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("not text"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_block_ends_become_paragraphs() {
        let text = html_to_text("<p>one</p><p>two</p>");
        assert_eq!(text, "one\n\ntwo");
    }

    #[test]
    fn test_page_title() {
        assert_eq!(
            page_title("<head><title> Tokio &amp; async </title></head>"),
            Some("Tokio & async".to_string())
        );
        assert_eq!(page_title("<p>no title</p>"), None);
    }
}
