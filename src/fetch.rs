//! Single-document download.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use futures::StreamExt;
use regex::Regex;
use tokio::io::AsyncWriteExt;

use crate::catalog::transport::{FileBody, Transport};
use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::layout::bare_filename;

static DISPOSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"attachment; filename="([^"]+)""#).expect("valid regex"));

/// Extracts the filename from an `attachment; filename="<name>"` header value.
#[must_use]
pub fn filename_from_disposition(header: &str) -> Option<&str> {
    DISPOSITION_RE
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Final location of the file.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Streams catalog documents to disk.
pub struct DocumentFetcher<T: Transport, F: FileSystem = TokioFileSystem> {
    transport: T,
    fs: F,
    chunk_size: usize,
}

impl<T: Transport> DocumentFetcher<T, TokioFileSystem> {
    /// Creates a fetcher writing through `tokio::fs`.
    #[must_use]
    pub fn new(transport: T, chunk_size: usize) -> Self {
        Self::with_fs(transport, TokioFileSystem, chunk_size)
    }
}

impl<T: Transport, F: FileSystem> DocumentFetcher<T, F> {
    /// Creates a fetcher with a custom file system implementation.
    #[must_use]
    pub fn with_fs(transport: T, fs: F, chunk_size: usize) -> Self {
        Self {
            transport,
            fs,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Returns the file system the fetcher writes through.
    #[must_use]
    pub const fn fs(&self) -> &F {
        &self.fs
    }

    /// Downloads file `file_id` into `destination_dir`.
    ///
    /// The filename is `filename_override` when it is given and non-empty,
    /// otherwise it is taken from the response's `Content-Disposition`
    /// header. Either way it is stripped to a bare, sanitized name.
    ///
    /// A failure while streaming leaves the truncated file in place.
    ///
    /// # Errors
    ///
    /// - [`Error::FilenameResolution`] if no usable name can be determined.
    /// - transport errors for the request or while reading the body.
    /// - I/O errors creating the directory or writing the file.
    pub async fn fetch(
        &self,
        file_id: u64,
        destination_dir: &Path,
        filename_override: Option<&str>,
    ) -> Result<FetchedDocument> {
        let FileBody {
            content_disposition,
            mut body,
        } = self.transport.get_file(&format!("/api/files/{file_id}")).await?;

        let raw_name = match filename_override.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => content_disposition
                .as_deref()
                .and_then(filename_from_disposition)
                .ok_or(Error::FilenameResolution { file_id })?,
        };
        let filename = bare_filename(raw_name).ok_or(Error::FilenameResolution { file_id })?;

        self.fs.create_dir_all(destination_dir).await?;
        let path = destination_dir.join(filename);
        let mut file = self.fs.create_file(&path).await?;

        let mut bytes = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(self.chunk_size) {
                file.write_all(piece).await?;
                bytes += piece.len() as u64;
            }
        }
        file.flush().await?;

        log::debug!("Wrote file {file_id} to {} ({bytes} bytes)", path.display());
        Ok(FetchedDocument { path, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;
    use tempfile::TempDir;

    #[test]
    fn disposition_parsing() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="scheme.jpg""#),
            Some("scheme.jpg")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="a b.pdf"; size=10"#),
            Some("a b.pdf")
        );
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition("attachment; filename=plain.txt"), None);
    }

    #[tokio::test]
    async fn override_name_wins() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_file(
            7,
            Some(r#"attachment; filename="server.pdf""#),
            b"hello",
        );
        let fetcher = DocumentFetcher::new(transport, 2048);

        let doc = fetcher
            .fetch(7, &dir.path().join("nested/dir"), Some("sub/desc.pdf"))
            .await
            .unwrap();
        assert_eq!(doc.path, dir.path().join("nested/dir/desc.pdf"));
        assert_eq!(doc.bytes, 5);
        assert_eq!(std::fs::read(&doc.path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn header_name_used_without_override() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_file(
            8,
            Some(r#"attachment; filename="../../evil/report.doc""#),
            b"data",
        );
        let fetcher = DocumentFetcher::new(transport, 2048);

        let doc = fetcher.fetch(8, dir.path(), None).await.unwrap();
        assert_eq!(doc.path, dir.path().join("report.doc"));

        let empty_override = fetcher.fetch(8, dir.path(), Some("")).await.unwrap();
        assert_eq!(empty_override.path, doc.path);
    }

    #[tokio::test]
    async fn missing_header_is_filename_error() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .with_file(9, None, b"x")
            .with_file(10, Some("inline"), b"x");
        let fetcher = DocumentFetcher::new(transport, 2048);

        assert!(matches!(
            fetcher.fetch(9, dir.path(), None).await,
            Err(Error::FilenameResolution { file_id: 9 })
        ));
        assert!(matches!(
            fetcher.fetch(10, dir.path(), None).await,
            Err(Error::FilenameResolution { file_id: 10 })
        ));
    }

    #[tokio::test]
    async fn large_body_written_completely() {
        let dir = TempDir::new().unwrap();
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let transport = MockTransport::new().with_file(11, None, &payload);
        let fetcher = DocumentFetcher::new(transport, 2048);

        let doc = fetcher.fetch(11, dir.path(), Some("big.bin")).await.unwrap();
        assert_eq!(doc.bytes, 10_000);
        assert_eq!(std::fs::read(&doc.path).unwrap(), payload);
    }

    #[tokio::test]
    async fn missing_file_is_transport_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = DocumentFetcher::new(MockTransport::new(), 2048);
        let err = fetcher.fetch(99, dir.path(), Some("x.pdf")).await.unwrap_err();
        assert!(err.is_transport());
    }
}
