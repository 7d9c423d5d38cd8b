//! Per-file transfer and integrity checks.

use std::io;
use std::path::Path;

use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use storedl_core::{
    AuthErrorCode, DownloadErrorCode, ErrorRecord, ManifestFile, PayloadStream, ProgressSnapshot,
    ProviderError,
};

use crate::progress::ProgressThrottle;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Running byte count for a job, forwarded through a throttle.
pub struct ProgressCounter<'a> {
    current: u64,
    total: u64,
    throttle: ProgressThrottle,
    sink: &'a (dyn Fn(ProgressSnapshot) + Send + Sync),
}

impl<'a> ProgressCounter<'a> {
    pub fn new(
        total: u64,
        throttle: ProgressThrottle,
        sink: &'a (dyn Fn(ProgressSnapshot) + Send + Sync),
    ) -> Self {
        Self {
            current: 0,
            total,
            throttle,
            sink,
        }
    }

    pub const fn current(&self) -> u64 {
        self.current
    }

    /// Publish the current position if the throttle allows it.
    pub fn report(&mut self) {
        if self.throttle.should_emit_progress(self.current, self.total) {
            (self.sink)(ProgressSnapshot::new(self.current, self.total));
        }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.current = self.current.saturating_add(bytes).min(self.total);
        self.report();
    }
}

/// Normalize a provider failure seen while opening or reading a payload.
pub fn map_payload_error(err: ProviderError) -> ErrorRecord {
    match err {
        ProviderError::Unauthorized => ErrorRecord::new(AuthErrorCode::SessionExpired),
        ProviderError::AccessDenied(detail) => {
            ErrorRecord::with_detail(DownloadErrorCode::ManifestFailed, detail)
        }
        other => ErrorRecord::with_detail(DownloadErrorCode::NetworkError, other.to_string()),
    }
}

fn io_error(err: &io::Error) -> ErrorRecord {
    ErrorRecord::from_io_error(err)
}

fn mismatch(file: &ManifestFile, reason: &str) -> ErrorRecord {
    ErrorRecord::with_detail(
        DownloadErrorCode::ChecksumMismatch,
        format!("{}: {reason}", file.path),
    )
}

/// Stream `payload` into `dest`, checking size and digest against `file`.
///
/// Cancellation is observed between chunks; a chunk already received is
/// written before the cancel is honoured.
pub async fn write_payload(
    mut payload: PayloadStream,
    file: &ManifestFile,
    dest: &Path,
    cancel: &CancellationToken,
    progress: &mut ProgressCounter<'_>,
) -> Result<(), ErrorRecord> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(&e))?;
    }
    let mut out = tokio::fs::File::create(dest)
        .await
        .map_err(|e| io_error(&e))?;
    let mut hasher = Sha256::new();
    let mut written: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;

            () = cancel.cancelled() => return Err(ErrorRecord::cancelled()),

            next = payload.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(map_payload_error)?;

        let len = chunk.len() as u64;
        if written.saturating_add(len) > file.size {
            return Err(mismatch(file, "payload is larger than announced"));
        }
        out.write_all(&chunk).await.map_err(|e| io_error(&e))?;
        hasher.update(&chunk[..]);
        written += len;
        progress.advance(len);
    }

    out.flush().await.map_err(|e| io_error(&e))?;
    out.sync_all().await.map_err(|e| io_error(&e))?;

    if written != file.size {
        return Err(mismatch(
            file,
            &format!("expected {} bytes, received {written}", file.size),
        ));
    }
    let digest = hex::encode(hasher.finalize());
    if !digest.eq_ignore_ascii_case(&file.sha256) {
        return Err(mismatch(file, "sha256 does not match"));
    }
    Ok(())
}

/// Whether the installed copy at `path` matches `file`.
///
/// Missing or unreadable files simply need repair.
pub async fn installed_copy_is_valid(
    path: &Path,
    file: &ManifestFile,
    cancel: &CancellationToken,
) -> Result<bool, ErrorRecord> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            tracing::warn!(
                target: "storedl.transfer",
                path = %path.display(),
                error = %e,
                "cannot inspect installed file"
            );
            return Ok(false);
        }
    };
    if !metadata.is_file() || metadata.len() != file.size {
        return Ok(false);
    }

    match hash_file(path, cancel).await {
        Ok(Some(digest)) => Ok(digest.eq_ignore_ascii_case(&file.sha256)),
        Ok(None) => Err(ErrorRecord::cancelled()),
        Err(e) => {
            tracing::warn!(
                target: "storedl.transfer",
                path = %path.display(),
                error = %e,
                "cannot read installed file"
            );
            Ok(false)
        }
    }
}

/// Hex SHA-256 of a file, or `None` when cancelled part way.
async fn hash_file(path: &Path, cancel: &CancellationToken) -> io::Result<Option<String>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hex::encode(hasher.finalize())))
}
