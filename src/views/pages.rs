use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::response::Html;

use crate::error::AppError;
use crate::fragments::{self, FOOTER, NAV};
use crate::state::SharedState;

pub async fn index(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    render(&state, "index.html").await.map(Html)
}

pub async fn show(
    State(state): State<SharedState>,
    Path(page): Path<String>,
) -> Result<Html<String>, AppError> {
    render(&state, &page).await.map(Html)
}

/// Read a page from the site directory with its navigation and footer in
/// place. Fragment files are returned as they are.
pub async fn render(state: &SharedState, name: &str) -> Result<String, AppError> {
    let raw = read_page(&state.config.site_dir, name).await?;

    if name == NAV.file || name == FOOTER.file {
        return Ok(raw);
    }

    Ok(fragments::load_chrome(raw, state.fragments.as_ref()).await)
}

async fn read_page(site_dir: &FsPath, name: &str) -> Result<String, AppError> {
    if !is_page_name(name) {
        return Err(AppError::NotFound("Page not found".to_string()));
    }

    match tokio::fs::read_to_string(site_dir.join(name)).await {
        Ok(html) => Ok(html),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("Page not found".to_string()))
        }
        Err(e) => Err(AppError::Internal(format!("Failed to read {name}: {e}"))),
    }
}

/// A bare `*.html` file name; anything that could leave the site directory
/// is refused.
fn is_page_name(name: &str) -> bool {
    name.ends_with(".html")
        && name.len() > ".html".len()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}
