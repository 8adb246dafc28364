//! JSON snapshot output.
//!
//! The snapshot is a plain array of [`Job`] objects, pretty-printed with a
//! 4-space indent. serde_json writes non-ASCII characters as-is.
//!
//! Writes go to a sibling temporary file first and are renamed over the
//! target, so a reader never sees a half-written snapshot and every run fully
//! replaces the previous one.

use crate::models::Job;
use crate::utils::parent_dir;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Render jobs as an indented JSON array.
pub fn render(jobs: &[Job]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    jobs.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8(buf).unwrap_or_default())
}

/// Write `jobs` to `path`, replacing any previous snapshot.
///
/// # Errors
///
/// Returns an error if serialization fails or the directory cannot be created
/// or written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = jobs.len()))]
pub async fn write_jobs(jobs: &[Job], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = render(jobs)?;

    let dir = parent_dir(path);
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create output directory");
        return Err(e.into());
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| format!("output path {} has no file name", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = dir.join(tmp_name);

    fs::write(&tmp_path, json.as_bytes()).await?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    info!("Wrote job snapshot");
    Ok(())
}
