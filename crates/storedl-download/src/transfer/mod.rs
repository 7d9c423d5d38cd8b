//! Payload transfer with staging and atomic commit.
//!
//! # Design
//!
//! - Every byte goes to the staging directory first
//! - Progress is counted against `Manifest::total_size` and throttled
//! - Cancellation is checked around every network await and chunk
//! - Any failure removes the staging directory; the install is only touched
//!   by the final commit

mod layout;
mod payload;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use storedl_core::{
    DownloadMode, ErrorRecord, Manifest, ProgressSnapshot, ProviderClientPort, SessionToken,
};

use crate::progress::ProgressThrottle;

pub use layout::InstallLayout;
use payload::{ProgressCounter, installed_copy_is_valid, map_payload_error, write_payload};

/// Inputs of one transfer.
pub struct TransferRequest<'a> {
    pub token: &'a SessionToken,
    pub manifest: &'a Manifest,
    pub mode: DownloadMode,
    pub cancel: &'a CancellationToken,
}

/// What a successful transfer did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Files fetched from the provider.
    pub fetched: usize,
    /// Installed files found intact in verify mode.
    pub kept: usize,
    /// Bytes received from the provider.
    pub bytes_fetched: u64,
}

/// Streams manifest files into an install directory.
pub struct TransferEngine {
    provider: Arc<dyn ProviderClientPort>,
    install_root: PathBuf,
    progress_interval: Duration,
}

impl TransferEngine {
    pub fn new(
        provider: Arc<dyn ProviderClientPort>,
        install_root: PathBuf,
        progress_interval: Duration,
    ) -> Self {
        Self {
            provider,
            install_root,
            progress_interval,
        }
    }

    pub fn layout_for(&self, manifest: &Manifest) -> InstallLayout {
        InstallLayout::plan(&self.install_root, &manifest.version)
    }

    /// Run the transfer for `request`, reporting progress through `on_progress`.
    ///
    /// The first report is `(0, total)`; the last one of a successful run is
    /// `(total, total)`.
    pub async fn run(
        &self,
        request: TransferRequest<'_>,
        on_progress: &(dyn Fn(ProgressSnapshot) + Send + Sync),
    ) -> Result<TransferSummary, ErrorRecord> {
        let layout = self.layout_for(request.manifest);
        tokio::fs::create_dir_all(&self.install_root)
            .await
            .map_err(|e| ErrorRecord::from_io_error(&e))?;
        layout
            .prepare_staging()
            .await
            .map_err(|e| ErrorRecord::from_io_error(&e))?;

        // Verify against a missing install is a plain download.
        let repair_in_place = request.mode.is_verify() && layout.has_install().await;

        tracing::info!(
            target: "storedl.transfer",
            version = %request.manifest.version,
            mode = request.mode.as_str(),
            files = request.manifest.files.len(),
            bytes = request.manifest.total_size(),
            repair_in_place,
            "starting transfer"
        );

        let staged = self
            .fill_staging(&request, &layout, repair_in_place, on_progress)
            .await;

        let (summary, repaired) = match staged {
            Ok(staged) => staged,
            Err(e) => {
                layout.discard_staging().await;
                return Err(e);
            }
        };

        if request.cancel.is_cancelled() {
            layout.discard_staging().await;
            return Err(ErrorRecord::cancelled());
        }

        let committed = if repair_in_place {
            layout.commit_repairs(&repaired).await
        } else {
            layout.commit_replace().await
        };
        if let Err(e) = committed {
            tracing::error!(
                target: "storedl.transfer",
                path = %layout.install_dir.display(),
                error = %e,
                "failed to commit transfer"
            );
            layout.discard_staging().await;
            return Err(ErrorRecord::from_io_error(&e));
        }

        tracing::info!(
            target: "storedl.transfer",
            version = %request.manifest.version,
            fetched = summary.fetched,
            kept = summary.kept,
            bytes = summary.bytes_fetched,
            "transfer committed"
        );
        Ok(summary)
    }

    /// Write every file that needs fetching into staging. Returns the summary
    /// and the manifest paths that were staged.
    async fn fill_staging(
        &self,
        request: &TransferRequest<'_>,
        layout: &InstallLayout,
        repair_in_place: bool,
        on_progress: &(dyn Fn(ProgressSnapshot) + Send + Sync),
    ) -> Result<(TransferSummary, Vec<String>), ErrorRecord> {
        let total = request.manifest.total_size();
        let mut progress =
            ProgressCounter::new(total, ProgressThrottle::new(self.progress_interval), on_progress);
        progress.report();

        let mut summary = TransferSummary::default();
        let mut staged = Vec::new();

        for file in &request.manifest.files {
            if request.cancel.is_cancelled() {
                return Err(ErrorRecord::cancelled());
            }

            if repair_in_place
                && installed_copy_is_valid(&layout.installed(&file.path), file, request.cancel)
                    .await?
            {
                tracing::debug!(target: "storedl.transfer", path = %file.path, "installed file is intact");
                summary.kept += 1;
                progress.advance(file.size);
                continue;
            }

            tracing::debug!(
                target: "storedl.transfer",
                path = %file.path,
                size = file.size,
                "fetching file"
            );
            let opened = tokio::select! {
                biased;

                () = request.cancel.cancelled() => return Err(ErrorRecord::cancelled()),

                opened = self.provider.open_payload(request.token, file) => opened,
            };
            let payload = opened.map_err(map_payload_error)?;

            let before = progress.current();
            write_payload(
                payload,
                file,
                &layout.staged(&file.path),
                request.cancel,
                &mut progress,
            )
            .await?;

            summary.fetched += 1;
            summary.bytes_fetched += progress.current() - before;
            staged.push(file.path.clone());
        }

        Ok((summary, staged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use storedl_core::{
        BuildVersion, DownloadErrorCode, ErrorCode, ManifestFile, ManifestRequest, PayloadStream,
        ProviderError, ProviderResult,
    };
    use tempfile::tempdir;

    /// Serves payload bodies by URL and counts how often each was opened.
    #[derive(Default)]
    struct BlobProvider {
        blobs: HashMap<String, ProviderResult<Vec<u8>>>,
        opened: Mutex<Vec<String>>,
    }

    impl BlobProvider {
        fn with_blob(mut self, url: &str, body: &[u8]) -> Self {
            self.blobs.insert(url.to_string(), Ok(body.to_vec()));
            self
        }

        fn with_failure(mut self, url: &str, err: ProviderError) -> Self {
            self.blobs.insert(url.to_string(), Err(err));
            self
        }

        fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProviderClientPort for BlobProvider {
        async fn fetch_manifest(
            &self,
            _token: &SessionToken,
            _request: &ManifestRequest,
        ) -> ProviderResult<Manifest> {
            unreachable!("engine never fetches manifests")
        }

        async fn open_payload(
            &self,
            _token: &SessionToken,
            file: &ManifestFile,
        ) -> ProviderResult<PayloadStream> {
            self.opened.lock().unwrap().push(file.url.clone());
            let body = self.blobs.get(&file.url).cloned().unwrap_or_else(|| {
                Err(ProviderError::NotFound(file.url.clone()))
            })?;
            let chunks: Vec<ProviderResult<Bytes>> = body
                .chunks(2)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(Box::pin(futures_util::stream::iter(chunks)))
        }
    }

    fn entry(path: &str, body: &[u8]) -> ManifestFile {
        ManifestFile {
            path: path.to_string(),
            size: body.len() as u64,
            sha256: hex::encode(Sha256::digest(body)),
            url: format!("blobs/{path}"),
        }
    }

    fn manifest(files: Vec<ManifestFile>) -> Manifest {
        Manifest {
            version: BuildVersion::parse("1.29.1").unwrap(),
            files,
        }
    }

    fn token() -> SessionToken {
        SessionToken::new("FRLtoken").unwrap()
    }

    async fn run(
        engine: &TransferEngine,
        manifest: &Manifest,
        mode: DownloadMode,
        cancel: &CancellationToken,
    ) -> (Result<TransferSummary, ErrorRecord>, Vec<ProgressSnapshot>) {
        let seen = Mutex::new(Vec::new());
        let sink = |s: ProgressSnapshot| seen.lock().unwrap().push(s);
        let token = token();
        let result = engine
            .run(
                TransferRequest {
                    token: &token,
                    manifest,
                    mode,
                    cancel,
                },
                &sink,
            )
            .await;
        (result, seen.into_inner().unwrap())
    }

    #[tokio::test]
    async fn download_commits_all_files() {
        let root = tempdir().unwrap();
        let provider = Arc::new(
            BlobProvider::default()
                .with_blob("blobs/Game.exe", b"binary")
                .with_blob("blobs/Data/level0", b"lvl"),
        );
        let engine = TransferEngine::new(provider, root.path().to_path_buf(), Duration::ZERO);
        let manifest = manifest(vec![entry("Game.exe", b"binary"), entry("Data/level0", b"lvl")]);

        let (result, progress) =
            run(&engine, &manifest, DownloadMode::Download, &CancellationToken::new()).await;
        let summary = result.unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.bytes_fetched, 9);
        let layout = engine.layout_for(&manifest);
        assert_eq!(std::fs::read(layout.installed("Game.exe")).unwrap(), b"binary");
        assert_eq!(std::fs::read(layout.installed("Data/level0")).unwrap(), b"lvl");
        assert!(!layout.staging_dir.exists());

        assert_eq!(progress.first(), Some(&ProgressSnapshot::new(0, 9)));
        assert_eq!(progress.last(), Some(&ProgressSnapshot::new(9, 9)));
        assert!(progress.windows(2).all(|w| w[0].current <= w[1].current));
    }

    #[tokio::test]
    async fn checksum_failure_leaves_no_install() {
        let root = tempdir().unwrap();
        let provider = Arc::new(BlobProvider::default().with_blob("blobs/Game.exe", b"tampered"));
        let engine = TransferEngine::new(provider, root.path().to_path_buf(), Duration::ZERO);
        let manifest = manifest(vec![entry("Game.exe", b"binary!!")]);

        let (result, _) =
            run(&engine, &manifest, DownloadMode::Download, &CancellationToken::new()).await;
        let err = result.unwrap_err();

        assert_eq!(
            err.code,
            ErrorCode::Download(DownloadErrorCode::ChecksumMismatch)
        );
        let layout = engine.layout_for(&manifest);
        assert!(!layout.install_dir.exists());
        assert!(!layout.staging_dir.exists());
    }

    #[tokio::test]
    async fn verify_repairs_only_broken_files() {
        let root = tempdir().unwrap();
        let provider = Arc::new(
            BlobProvider::default()
                .with_blob("blobs/Game.exe", b"binary")
                .with_blob("blobs/Data/level0", b"lvl"),
        );
        let engine = TransferEngine::new(
            Arc::clone(&provider) as Arc<dyn ProviderClientPort>,
            root.path().to_path_buf(),
            Duration::ZERO,
        );
        let manifest = manifest(vec![entry("Game.exe", b"binary"), entry("Data/level0", b"lvl")]);
        let layout = engine.layout_for(&manifest);
        std::fs::create_dir_all(layout.install_dir.join("Data")).unwrap();
        std::fs::write(layout.installed("Game.exe"), b"binary").unwrap();
        std::fs::write(layout.installed("Data/level0"), b"xyz").unwrap();
        std::fs::write(layout.installed("user.cfg"), b"mine").unwrap();

        let (result, progress) =
            run(&engine, &manifest, DownloadMode::Verify, &CancellationToken::new()).await;
        let summary = result.unwrap();

        assert_eq!(summary.kept, 1);
        assert_eq!(summary.fetched, 1);
        assert_eq!(provider.opened(), vec!["blobs/Data/level0".to_string()]);
        assert_eq!(std::fs::read(layout.installed("Data/level0")).unwrap(), b"lvl");
        assert_eq!(std::fs::read(layout.installed("user.cfg")).unwrap(), b"mine");
        assert_eq!(progress.last(), Some(&ProgressSnapshot::new(9, 9)));
    }

    #[tokio::test]
    async fn verify_without_install_downloads_everything() {
        let root = tempdir().unwrap();
        let provider = Arc::new(BlobProvider::default().with_blob("blobs/Game.exe", b"binary"));
        let engine = TransferEngine::new(provider, root.path().to_path_buf(), Duration::ZERO);
        let manifest = manifest(vec![entry("Game.exe", b"binary")]);

        let (result, _) =
            run(&engine, &manifest, DownloadMode::Verify, &CancellationToken::new()).await;
        assert_eq!(result.unwrap().fetched, 1);
        assert!(engine.layout_for(&manifest).installed("Game.exe").exists());
    }

    #[tokio::test]
    async fn failed_download_keeps_previous_install() {
        let root = tempdir().unwrap();
        let provider = Arc::new(
            BlobProvider::default()
                .with_failure("blobs/Game.exe", ProviderError::Unreachable("reset".into())),
        );
        let engine = TransferEngine::new(provider, root.path().to_path_buf(), Duration::ZERO);
        let manifest = manifest(vec![entry("Game.exe", b"binary")]);
        let layout = engine.layout_for(&manifest);
        std::fs::create_dir_all(&layout.install_dir).unwrap();
        std::fs::write(layout.installed("Game.exe"), b"older").unwrap();

        let (result, _) =
            run(&engine, &manifest, DownloadMode::Download, &CancellationToken::new()).await;
        assert_eq!(
            result.unwrap_err().code,
            ErrorCode::Download(DownloadErrorCode::NetworkError)
        );
        assert_eq!(std::fs::read(layout.installed("Game.exe")).unwrap(), b"older");
        assert!(!layout.staging_dir.exists());
    }

    #[tokio::test]
    async fn cancelled_transfer_is_soft_and_clean() {
        let root = tempdir().unwrap();
        let provider = Arc::new(BlobProvider::default().with_blob("blobs/Game.exe", b"binary"));
        let engine = TransferEngine::new(
            Arc::clone(&provider) as Arc<dyn ProviderClientPort>,
            root.path().to_path_buf(),
            Duration::ZERO,
        );
        let manifest = manifest(vec![entry("Game.exe", b"binary")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (result, _) = run(&engine, &manifest, DownloadMode::Download, &cancel).await;
        let err = result.unwrap_err();
        assert!(err.is_soft_cancel());
        assert!(provider.opened().is_empty());
        assert!(!engine.layout_for(&manifest).staging_dir.exists());
    }
}
