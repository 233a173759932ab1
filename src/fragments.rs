//! Shared page chrome: the navigation bar and the footer are kept in their
//! own files and injected into placeholders on every page.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::html;

/// A standalone snippet and the placeholder it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub file: &'static str,
    pub placeholder: &'static str,
}

pub const NAV: Fragment = Fragment {
    file: "nav.html",
    placeholder: "nav-placeholder",
};

pub const FOOTER: Fragment = Fragment {
    file: "footer.html",
    placeholder: "footer-placeholder",
};

#[derive(Debug)]
pub enum FragmentError {
    NotFound(String),
    Status(u16),
    Io(String),
    Http(String),
}

impl std::fmt::Display for FragmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentError::NotFound(name) => write!(f, "{name} not found"),
            FragmentError::Status(code) => write!(f, "HTTP error! status: {code}"),
            FragmentError::Io(msg) => write!(f, "IO error: {msg}"),
            FragmentError::Http(msg) => write!(f, "HTTP request failed: {msg}"),
        }
    }
}

impl std::error::Error for FragmentError {}

#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, file: &str) -> Result<String, FragmentError>;
}

/// Reads fragments from the site directory.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FragmentSource for FsSource {
    async fn fetch(&self, file: &str) -> Result<String, FragmentError> {
        match tokio::fs::read_to_string(self.root.join(file)).await {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FragmentError::NotFound(file.to_string()))
            }
            Err(e) => Err(FragmentError::Io(e.to_string())),
        }
    }
}

/// Fetches fragments over HTTP, for sites whose chrome is hosted elsewhere.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FragmentSource for HttpSource {
    async fn fetch(&self, file: &str) -> Result<String, FragmentError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), file);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FragmentError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FragmentError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| FragmentError::Http(e.to_string()))
    }
}

async fn fetch_logged(source: &dyn FragmentSource, fragment: &Fragment) -> Option<String> {
    match source.fetch(fragment.file).await {
        Ok(html) => Some(html),
        Err(e) => {
            tracing::warn!("Could not load {}: {e}", fragment.file);
            None
        }
    }
}

fn apply(page: String, fragment: &Fragment, html: Option<String>) -> String {
    let Some(html) = html else {
        return page;
    };

    match html::replace_inner(&page, fragment.placeholder, &html) {
        Some(injected) => injected,
        None => {
            tracing::warn!("Element {} not found", fragment.placeholder);
            page
        }
    }
}

/// Load one fragment into its placeholder. Failures leave `page` unchanged.
pub async fn load_fragment(
    page: String,
    fragment: &Fragment,
    source: &dyn FragmentSource,
) -> String {
    let html = fetch_logged(source, fragment).await;
    apply(page, fragment, html)
}

pub async fn load_navigation(page: String, source: &dyn FragmentSource) -> String {
    load_fragment(page, &NAV, source).await
}

pub async fn load_footer(page: String, source: &dyn FragmentSource) -> String {
    load_fragment(page, &FOOTER, source).await
}

/// Load navigation and footer concurrently. One failing does not affect
/// the other.
pub async fn load_chrome(page: String, source: &dyn FragmentSource) -> String {
    let (nav, footer) = tokio::join!(fetch_logged(source, &NAV), fetch_logged(source, &FOOTER));
    let page = apply(page, &NAV, nav);
    apply(page, &FOOTER, footer)
}
