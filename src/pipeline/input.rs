//! Input resolution: turn a user-supplied path or URL into PDF bytes.
//!
//! The upload surface already hands us bytes; this stage exists for the CLI
//! and for library callers that start from a path or a link to lecture
//! notes. Both sources are checked for the `%PDF` magic before anything is
//! handed to pdfium, so a stray HTML error page fails with `NotAPdf` rather
//! than an opaque parse error.

use crate::error::QuizError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Header marker searched for by [`check_pdf_magic`].
const PDF_HEADER: &[u8] = b"%PDF-";

/// PDF readers accept a header anywhere in this many leading bytes.
pub const HEADER_SEARCH_WINDOW: usize = 1024;

/// Check if the input string looks like a URL we can download.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read the document named by `input`.
///
/// `http://` and `https://` inputs are downloaded with `timeout_secs` as the
/// whole-request timeout; anything else with a `scheme://` prefix is
/// rejected; the rest is treated as a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Vec<u8>, QuizError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QuizError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(trimmed) {
        download_url(trimmed, timeout_secs).await
    } else if trimmed.contains("://") {
        Err(QuizError::InvalidInput {
            input: trimmed.to_string(),
        })
    } else {
        read_local(trimmed).await
    }
}

/// Fail with `NotAPdf` unless a `%PDF-` header appears within the first
/// [`HEADER_SEARCH_WINDOW`] bytes.
///
/// Leading junk (a BOM, stray line breaks, mail residue) is tolerated; pdfium
/// makes the real validity call.
pub fn check_pdf_magic(bytes: &[u8], source_name: &str) -> Result<(), QuizError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_HEADER.len()).any(|w| w == PDF_HEADER) {
        Ok(())
    } else {
        Err(QuizError::NotAPdf {
            source_name: source_name.to_string(),
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        })
    }
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, QuizError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(QuizError::PermissionDenied { path });
        }
        Err(_) => return Err(QuizError::FileNotFound { path }),
    };

    check_pdf_magic(&bytes, path_str)?;
    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, QuizError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| QuizError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            QuizError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            QuizError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    check_pdf_magic(&bytes, url)?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/notes.pdf"));
        assert!(is_url("http://example.com/notes.pdf"));
        assert!(!is_url("/tmp/notes.pdf"));
        assert!(!is_url("notes.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn magic_check() {
        assert!(check_pdf_magic(b"%PDF-1.4\n...", "a.pdf").is_ok());
        match check_pdf_magic(b"<html>", "page") {
            Err(QuizError::NotAPdf { source_name, magic }) => {
                assert_eq!(source_name, "page");
                assert_eq!(magic, b"<htm".to_vec());
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(matches!(
            check_pdf_magic(b"", "empty"),
            Err(QuizError::NotAPdf { .. })
        ));
    }

    #[test]
    fn header_after_line_break_is_accepted() {
        assert!(check_pdf_magic(b"\r\n%PDF-1.7\n...", "upload").is_ok());
    }

    #[test]
    fn header_after_bom_is_accepted() {
        assert!(check_pdf_magic(b"\xEF\xBB\xBF%PDF-1.4\n...", "upload").is_ok());
    }

    #[test]
    fn header_past_search_window_is_rejected() {
        let mut bytes = vec![b' '; HEADER_SEARCH_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        match check_pdf_magic(&bytes, "late") {
            Err(QuizError::NotAPdf { magic, .. }) => assert_eq!(magic, b"    ".to_vec()),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/here.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn unsupported_scheme_and_blank_input_are_invalid() {
        assert!(matches!(
            resolve_input("ftp://host/notes.pdf", 5).await,
            Err(QuizError::InvalidInput { .. })
        ));
        assert!(matches!(
            resolve_input("   ", 5).await,
            Err(QuizError::InvalidInput { .. })
        ));
    }
}
