//! Writing batch results to disk.

use crate::batch::BatchResult;
use crate::error::LookupError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tracing::info;

/// Render results as JSON indented with four spaces.
pub fn render_results<T: Serialize>(results: &BatchResult<T>) -> Result<String, LookupError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    results.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write results to `path`, replacing any existing file.
///
/// Returns the rendered JSON so callers can echo it.
pub async fn write_results<T: Serialize>(
    path: impl AsRef<Path>,
    results: &BatchResult<T>,
) -> Result<String, LookupError> {
    let path = path.as_ref();
    let rendered = render_results(results)?;
    tokio::fs::write(path, &rendered).await?;
    info!(path = %path.display(), count = results.len(), "Results saved");
    Ok(rendered)
}
