//! Extraction orchestrator.
//!
//! One call to [`ThemeExtractor::extract_theme`] walks these stages:
//!
//! ```text
//! FetchingHtml ─▶ ExtractingInlineCss ─▶ DiscoveringStylesheets
//!      │                                        │
//!      ▼                                        ▼
//!   Failed        Done ◀── Analyzing ◀── FetchingStylesheets
//! ```
//!
//! Only the page fetch can fail the run. Stylesheets are fetched concurrently
//! and any that fail simply contribute no CSS. Analysis itself is pure and
//! infallible: when nothing useful is found the classifier's defaults apply.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::classify;
use crate::config::FetchConfig;
use crate::extract::{self, extract};
use crate::fetch::{FetchError, HttpFetcher, PageFetcher};
use crate::models::{ExtractionDebug, ExtractionResult, Seeds};
use crate::synth::{site_display_name, synthesize};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(#[source] FetchError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stages of one extraction run, used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingHtml,
    ExtractingInlineCss,
    DiscoveringStylesheets,
    FetchingStylesheets,
    Analyzing,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchingHtml => "fetching_html",
            Stage::ExtractingInlineCss => "extracting_inline_css",
            Stage::DiscoveringStylesheets => "discovering_stylesheets",
            Stage::FetchingStylesheets => "fetching_stylesheets",
            Stage::Analyzing => "analyzing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches a site and turns it into a theme.
#[derive(Clone)]
pub struct ThemeExtractor {
    fetcher: Arc<dyn PageFetcher>,
    max_stylesheets: usize,
}

impl ThemeExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_stylesheets: usize) -> Self {
        Self {
            fetcher,
            max_stylesheets,
        }
    }

    /// Extractor over a real HTTP client built from `config`.
    pub fn from_config(config: &FetchConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), config.max_stylesheets))
    }

    /// Runs the full pipeline for a user-supplied URL.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidUrl`] before any network access;
    /// - [`ExtractError::Fetch`] when the page itself cannot be retrieved;
    /// - [`ExtractError::Internal`] when the page body cannot be read.
    pub async fn extract_theme(&self, raw_url: &str) -> Result<ExtractionResult, ExtractError> {
        let url = parse_target_url(raw_url)?;

        enter(Stage::FetchingHtml, &url);
        let html = self
            .fetcher
            .fetch_text(&url)
            .await
            .map_err(|e| match e {
                FetchError::Body { .. } => ExtractError::Internal(e.to_string()),
                other => ExtractError::Fetch(other),
            })
            .inspect_err(|e| warn!(stage = %Stage::Failed, url = %url, error = %e, "page fetch failed"))?;

        enter(Stage::ExtractingInlineCss, &url);
        let mut css = extract::inline_css(&html);

        enter(Stage::DiscoveringStylesheets, &url);
        let sheets = discover_stylesheets(&html, &url, self.max_stylesheets);
        debug!(url = %url, count = sheets.len(), "stylesheets discovered");

        enter(Stage::FetchingStylesheets, &url);
        let bodies = join_all(sheets.iter().map(|sheet| self.fetch_stylesheet(sheet))).await;
        for body in bodies.into_iter().flatten() {
            css.push_str(&body);
            css.push('\n');
        }

        enter(Stage::Analyzing, &url);
        let site_name = site_display_name(url.host_str().unwrap_or_default());
        let result = analyze_documents(&html, &css, &site_name);

        enter(Stage::Done, &url);
        info!(
            url = %url,
            colors = result.colors_found,
            is_dark = result.is_dark,
            fonts = result.fonts.len(),
            "theme extracted"
        );
        Ok(result)
    }

    async fn fetch_stylesheet(&self, url: &Url) -> Option<String> {
        match self.fetcher.fetch_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url = %url, error = %e, "skipping stylesheet");
                None
            }
        }
    }
}

fn enter(stage: Stage, url: &Url) {
    debug!(stage = %stage, url = %url, "extraction stage");
}

/// Runs extraction, classification and synthesis over already-retrieved
/// page text.
pub fn analyze_documents(html: &str, css: &str, site_name: &str) -> ExtractionResult {
    let scan = extract(html, css);
    let seeds = classify(&scan.inventory, &scan.css_vars);
    let theme = synthesize(&seeds, site_name);

    ExtractionResult {
        success: true,
        theme,
        fonts: scan.fonts,
        colors_found: scan.inventory.len(),
        is_dark: seeds.is_dark,
        debug: ExtractionDebug {
            backgrounds_found: scan.inventory.backgrounds.len(),
            foregrounds_found: scan.inventory.foregrounds.len(),
            accents_found: scan.inventory.accents.len(),
            css_vars_found: scan.css_vars.len(),
            seeds: Seeds {
                background: seeds.background.into(),
                foreground: seeds.foreground.into(),
                accent: seeds.accent.into(),
            },
        },
    }
}

/// Parses the URL a caller asked for. Scheme-relative input (`//host/path`)
/// is upgraded to https; anything else must be an absolute http(s) URL.
pub fn parse_target_url(raw: &str) -> Result<Url, ExtractError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };
    let invalid = || ExtractError::InvalidUrl(raw.to_string());
    let url = Url::parse(&candidate).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Resolves a stylesheet `href` against the page it appeared on.
///
/// Protocol-relative hrefs become https; root-relative ones hang off the
/// page's origin; anything else is joined with the page URL. Non-http(s)
/// results are dropped.
pub fn resolve_stylesheet_url(page: &Url, href: &str) -> Option<Url> {
    let href = href.trim().replace("&amp;", "&");
    let resolved = match href.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{}", rest)).ok()?,
        None => page.join(&href).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// The first `limit` resolvable stylesheet links on the page.
pub fn discover_stylesheets(html: &str, page: &Url, limit: usize) -> Vec<Url> {
    extract::stylesheet_hrefs(html)
        .iter()
        .filter_map(|href| resolve_stylesheet_url(page, href))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies; unknown URLs answer 404. Records every request.
    #[derive(Default)]
    struct InMemoryFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl InMemoryFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for InMemoryFetcher {
        async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url.as_str()).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn extractor(fetcher: Arc<InMemoryFetcher>) -> ThemeExtractor {
        ThemeExtractor::new(fetcher, 5)
    }

    #[tokio::test]
    async fn test_dark_site_end_to_end() {
        let html = "<html><head><style>body{background:#101010;color:#f5f5f5} \
                    .btn{background:#ff6600}</style></head><body></body></html>";
        let fetcher = Arc::new(InMemoryFetcher::default().with("https://www.acme.dev/", html));
        let result = extractor(fetcher)
            .extract_theme("https://www.acme.dev/")
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.is_dark);
        assert_eq!(result.theme.preview.accent, "#ff6600");
        assert_eq!(result.theme.preview.bg, "#101010");
        assert!(result.theme.dark.background.starts_with("oklch(0.10 "));
        assert_eq!(result.theme.light.accent, "oklch(0.55 0.20 24)");
        assert_eq!(result.theme.name, "Acme");
        assert_eq!(result.debug.seeds.accent.hex, "#ff6600");
        assert_eq!(result.debug.accents_found, 1);
        assert_eq!(result.debug.backgrounds_found, 2);
        assert_eq!(result.debug.foregrounds_found, 1);
        assert_eq!(result.colors_found, 3);
    }

    #[tokio::test]
    async fn test_stylesheets_capped_and_failures_tolerated() {
        let links: String = (0..10)
            .map(|i| format!("<link rel=\"stylesheet\" href=\"/css/s{}.css\">", i))
            .collect();
        let html = format!("<html><head>{}</head></html>", links);
        let mut fetcher = InMemoryFetcher::default().with("https://site.test/", &html);
        // s2 is missing and answers 404.
        for i in [0, 1, 3, 4] {
            fetcher = fetcher.with(
                &format!("https://site.test/css/s{}.css", i),
                ".cta { background: #7c3aed; }",
            );
        }
        let fetcher = Arc::new(fetcher);
        let result = extractor(fetcher.clone())
            .extract_theme("https://site.test/")
            .await
            .unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1 + 5, "page plus five stylesheets: {requests:?}");
        assert!(!requests.iter().any(|r| r.ends_with("s5.css")));
        assert_eq!(result.theme.preview.accent, "#7c3aed");
        assert_eq!(result.debug.accents_found, 4);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let fetcher = Arc::new(InMemoryFetcher::default());
        let err = extractor(fetcher.clone())
            .extract_theme("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_page_fetch_failure() {
        let fetcher = Arc::new(InMemoryFetcher::default());
        let err = extractor(fetcher)
            .extract_theme("https://gone.test/")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Fetch(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_empty_page_uses_defaults() {
        let fetcher = Arc::new(InMemoryFetcher::default().with("http://blank.test/", ""));
        let result = extractor(fetcher)
            .extract_theme("http://blank.test/")
            .await
            .unwrap();
        assert!(!result.is_dark);
        assert_eq!(result.colors_found, 0);
        assert!(result.fonts.is_empty());
        assert_eq!(result.theme.preview.accent, "#2563eb");
        assert_eq!(result.theme.preview.bg, "#ffffff");
        assert_eq!(result.debug.seeds.foreground.hex, "#171717");
    }

    #[test]
    fn test_parse_target_url() {
        assert_eq!(
            parse_target_url("//example.com/x").unwrap().as_str(),
            "https://example.com/x"
        );
        assert_eq!(
            parse_target_url("  https://example.com ").unwrap().as_str(),
            "https://example.com/"
        );
        for bad in ["not a url", "example.com", "ftp://example.com/", "mailto:a@b.c", ""] {
            assert!(
                matches!(parse_target_url(bad), Err(ExtractError::InvalidUrl(_))),
                "{bad:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_resolve_stylesheet_url() {
        let page = Url::parse("http://example.com/blog/post.html").unwrap();
        let resolve = |href: &str| resolve_stylesheet_url(&page, href).map(|u| u.to_string());
        assert_eq!(resolve("//cdn.example.com/a.css").as_deref(), Some("https://cdn.example.com/a.css"));
        assert_eq!(resolve("/static/site.css").as_deref(), Some("http://example.com/static/site.css"));
        assert_eq!(resolve("theme.css").as_deref(), Some("http://example.com/blog/theme.css"));
        assert_eq!(resolve("../x.css?a=1&amp;b=2").as_deref(), Some("http://example.com/x.css?a=1&b=2"));
        assert_eq!(resolve("https://other.org/b.css").as_deref(), Some("https://other.org/b.css"));
        assert_eq!(resolve("data:text/css,a.css"), None);
    }

    #[test]
    fn test_discovery_caps_at_limit() {
        let page = Url::parse("https://example.com/").unwrap();
        let html: String = (0..10)
            .map(|i| format!("<link rel=\"stylesheet\" href=\"/{}.css\">", i))
            .collect();
        let sheets = discover_stylesheets(&html, &page, 5);
        assert_eq!(sheets.len(), 5);
        assert_eq!(sheets[0].as_str(), "https://example.com/0.css");
        assert_eq!(sheets[4].as_str(), "https://example.com/4.css");
    }

    #[tokio::test]
    async fn test_root_variables_survive_inline_style_attributes() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"/site.css\"></head>\
                    <body style=\"padding:4px\"></body></html>";
        let fetcher = Arc::new(
            InMemoryFetcher::default()
                .with("https://site.test/", html)
                .with(
                    "https://site.test/site.css",
                    ":root { --background: 0 0 0; }\nmain { background: #ffffff; }",
                ),
        );
        let result = extractor(fetcher)
            .extract_theme("https://site.test/")
            .await
            .unwrap();
        assert_eq!(result.debug.css_vars_found, 1);
        assert!(result.is_dark);
    }

    #[test]
    fn test_charset_preamble_keeps_root_variables() {
        let result = analyze_documents("", "@charset \"UTF-8\";:root{--background:0 0 0}", "Acme");
        assert_eq!(result.debug.css_vars_found, 1);
        assert!(result.is_dark);
    }

    #[test]
    fn test_link_variable_in_style_attribute_is_not_an_accent() {
        let html = "<a style=\"color: var(--link-fg)\">Docs</a>";
        let css = format!("{}footer{{background:#e11d48}}", extract::inline_css(html));
        let result = analyze_documents(html, &css, "Acme");
        assert_eq!(result.debug.accents_found, 0);
    }

    #[test]
    fn test_analyze_documents_reports_fonts() {
        let css = "body { font-family: 'Inter', sans-serif; background: #fff; color: #111 }";
        let result = analyze_documents("", css, "Acme");
        assert_eq!(result.fonts, vec!["Inter"]);
        assert!(!result.is_dark);
        assert_eq!(result.theme.preview.bg, "#ffffff");
        assert_eq!(result.debug.seeds.foreground.hex, "#111111");
    }
}
