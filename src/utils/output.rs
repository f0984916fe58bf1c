//! Final artifact writer

use std::io;
use std::path::Path;

use tracing::info;

/// Write `bytes` to `path`, creating missing parent directories
pub async fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Output written");
    Ok(())
}
