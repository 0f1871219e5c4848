//! Document loading from disk for cold-start scenarios.
//!
//! An editor that already had a file open when the server starts may not
//! send a `didOpen` for it before the first request arrives — a hover or
//! go-to-definition on an unknown URI falls back to reading the file off
//! disk rather than returning an empty result.

use crate::error::{LspError, Result};
use tower_lsp_server::lsp_types::Uri;

/// Files larger than this are rejected outright rather than loaded.
const MAX_FILE_SIZE: u64 = 50_000_000;

pub async fn load_document_from_disk(uri: &Uri) -> Result<String> {
    let path = uri.to_file_path().ok_or_else(|| LspError::InvalidUri(format!("{uri:?}")))?;

    tracing::debug!(?path, "loading document from disk");

    let metadata = tokio::fs::metadata(&path).await?;
    if metadata.len() > MAX_FILE_SIZE {
        tracing::error!(size = metadata.len(), limit = MAX_FILE_SIZE, ?path, "document exceeds size limit");
        return Err(LspError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("file too large: {} bytes (max: {MAX_FILE_SIZE})", metadata.len()),
        )));
    }

    let content = tokio::fs::read_to_string(&path).await?;
    tracing::debug!(?path, bytes = content.len(), "loaded document from disk");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn loads_an_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"class Foo {}").unwrap();
        file.flush().unwrap();

        let uri = Uri::from_file_path(file.path()).unwrap();
        let loaded = load_document_from_disk(&uri).await.unwrap();
        assert_eq!(loaded, "class Foo {}");
    }

    #[tokio::test]
    async fn a_missing_file_is_an_io_error() {
        let uri = Uri::from_file_path("/nonexistent/path/to/Foo.groovy").unwrap();
        assert!(load_document_from_disk(&uri).await.is_err());
    }

    #[tokio::test]
    async fn an_empty_file_loads_as_an_empty_string() {
        let file = NamedTempFile::new().unwrap();
        let uri = Uri::from_file_path(file.path()).unwrap();
        assert_eq!(load_document_from_disk(&uri).await.unwrap(), "");
    }
}
