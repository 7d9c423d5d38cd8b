//! Shared fixtures for session manager integration tests.
//!
//! `ScriptedProvider` is an in-memory content provider; `MockLogin` is a
//! mockall double of the login surface. Credentials use the real file store
//! inside a temp dir.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use mockall::mock;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use storedl_core::{
    BuildVersion, JobOutcome, JobUpdate, LoginOutcome, LoginSurfacePort, Manifest, ManifestFile,
    ManifestRequest, PayloadStream, ProgressEvent, ProviderClientPort, ProviderError,
    ProviderResult, SessionToken,
};
use storedl_download::{
    FileCredentialStore, JobUpdateStream, SessionManager, SessionManagerConfig,
    SessionManagerDeps, build_session_manager,
};

const CHUNK: usize = 4;

mock! {
    pub Login {}

    #[async_trait]
    impl LoginSurfacePort for Login {
        async fn login(&self) -> LoginOutcome;
    }
}

impl MockLogin {
    /// A login surface that must never be shown.
    pub fn unused() -> Self {
        let mut login = Self::new();
        login.expect_login().never();
        login
    }

    /// A login surface that completes `times` times with `raw`.
    pub fn completing(raw: &'static str, times: usize) -> Self {
        let mut login = Self::new();
        login
            .expect_login()
            .times(times)
            .returning(move || LoginOutcome::Completed(token(raw)));
        login
    }
}

pub fn token(raw: &str) -> SessionToken {
    SessionToken::new(raw).unwrap()
}

pub fn version(raw: &str) -> BuildVersion {
    BuildVersion::parse(raw).unwrap()
}

/// In-memory provider serving one manifest and its blobs.
#[derive(Default)]
pub struct ScriptedProvider {
    manifests: HashMap<String, Manifest>,
    blobs: HashMap<String, Vec<u8>>,
    denied: HashMap<String, String>,
    /// When set, only this token is accepted.
    accepted_token: Option<String>,
    /// The next payload stalls after its first chunk.
    stall_next: AtomicBool,
    manifest_tokens: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `files` as the payload of `version`.
    pub fn with_version(mut self, raw: &str, files: &[(&str, &[u8])]) -> Self {
        let entries = files
            .iter()
            .map(|(path, body)| {
                let url = format!("blobs/{raw}/{path}");
                self.blobs.insert(url.clone(), body.to_vec());
                ManifestFile {
                    path: (*path).to_string(),
                    size: body.len() as u64,
                    sha256: hex::encode(Sha256::digest(body)),
                    url,
                }
            })
            .collect();
        self.manifests.insert(
            raw.to_string(),
            Manifest {
                version: version(raw),
                files: entries,
            },
        );
        self
    }

    /// Refuse `version` as not owned by the account.
    pub fn denying(mut self, raw: &str) -> Self {
        self.denied
            .insert(raw.to_string(), format!("account does not own {raw}"));
        self
    }

    pub fn accepting_only(mut self, raw: &str) -> Self {
        self.accepted_token = Some(raw.to_string());
        self
    }

    /// The next payload stream delivers one chunk and then hangs.
    pub fn stalling_once(self) -> Self {
        self.stall_next.store(true, Ordering::SeqCst);
        self
    }

    /// Tokens presented to the manifest endpoint, in order.
    pub fn manifest_tokens(&self) -> Vec<String> {
        self.manifest_tokens.lock().unwrap().clone()
    }

    fn authorize(&self, token: &SessionToken) -> ProviderResult<()> {
        match &self.accepted_token {
            Some(accepted) if accepted != token.expose() => Err(ProviderError::Unauthorized),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ProviderClientPort for ScriptedProvider {
    async fn fetch_manifest(
        &self,
        token: &SessionToken,
        request: &ManifestRequest,
    ) -> ProviderResult<Manifest> {
        self.manifest_tokens
            .lock()
            .unwrap()
            .push(token.expose().to_string());
        self.authorize(token)?;

        let key = request.version.as_str();
        if let Some(reason) = self.denied.get(key) {
            return Err(ProviderError::AccessDenied(reason.clone()));
        }
        self.manifests
            .get(key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("versions/{key}/manifest")))
    }

    async fn open_payload(
        &self,
        token: &SessionToken,
        file: &ManifestFile,
    ) -> ProviderResult<PayloadStream> {
        self.authorize(token)?;
        let body = self
            .blobs
            .get(&file.url)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(file.url.clone()))?;
        let chunks: Vec<ProviderResult<Bytes>> = body
            .chunks(CHUNK)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        if self.stall_next.swap(false, Ordering::SeqCst) {
            let first = futures_util::stream::iter(chunks.into_iter().take(1));
            return Ok(Box::pin(first.chain(futures_util::stream::pending())));
        }
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

/// A manager wired to in-memory collaborators inside a temp dir.
pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub provider: Arc<ScriptedProvider>,
    pub store: Arc<FileCredentialStore>,
    pub install_root: PathBuf,
    _dir: TempDir,
}

impl Harness {
    pub fn new(provider: ScriptedProvider, login: MockLogin) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let install_root = dir.path().join("versions");
        let store = Arc::new(FileCredentialStore::new(
            dir.path().join("session").join("provider-session.json"),
        ));
        let provider = Arc::new(provider);

        let manager = build_session_manager(SessionManagerDeps {
            provider: Arc::clone(&provider),
            credentials: Arc::clone(&store),
            login: Arc::new(login),
            config: SessionManagerConfig::new(install_root.clone())
                .with_progress_interval(Duration::ZERO),
        });

        Self {
            manager: Arc::new(manager),
            provider,
            store,
            install_root,
            _dir: dir,
        }
    }

    pub fn installed(&self, raw_version: &str, path: &str) -> PathBuf {
        self.install_root.join(raw_version).join(path)
    }

    pub fn staging(&self, raw_version: &str) -> PathBuf {
        self.install_root.join(format!(".{raw_version}.staging"))
    }
}

/// Consume a job stream, returning its progress events and outcome.
pub async fn drain(mut updates: JobUpdateStream) -> (Vec<ProgressEvent>, JobOutcome) {
    let mut progress = Vec::new();
    while let Some(update) = updates.next().await {
        match update {
            JobUpdate::Progress(event) => progress.push(event),
            JobUpdate::Finished(outcome) => {
                assert!(updates.next().await.is_none(), "updates after Finished");
                return (progress, outcome);
            }
        }
    }
    panic!("stream ended without a Finished update");
}

/// Read updates until bytes have actually moved.
pub async fn wait_for_bytes(updates: &mut JobUpdateStream) {
    while let Some(update) = updates.next().await {
        match update {
            JobUpdate::Progress(event) if event.current > 0 => return,
            JobUpdate::Progress(_) => {}
            JobUpdate::Finished(outcome) => panic!("job finished early: {outcome:?}"),
        }
    }
    panic!("stream ended without progress");
}
