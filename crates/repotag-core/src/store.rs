//! Fingerprint sources for a cohort.
//!
//! [`FingerprintStore`] is the injectable data source; [`CohortLoader`] fetches
//! every repository concurrently and turns per-repository failures into
//! [`ExtractionFailure`]s so a single bad repository never aborts a run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::domain::{
    ClassifyError, ExtractionFailure, Fingerprint, RepoId, RepositoryFingerprintSet, Result,
};
use crate::obs;

/// Injectable source of repositories and their fingerprints.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Every repository in the cohort, in a stable order.
    async fn list_all_repos(&self) -> Result<Vec<RepoId>>;

    /// All fingerprints recorded for `repo_id`.
    async fn list_fingerprints(&self, repo_id: &RepoId) -> Result<Vec<Fingerprint>>;
}

/// Loads a whole cohort from a [`FingerprintStore`].
pub struct CohortLoader {
    store: Arc<dyn FingerprintStore>,
}

impl CohortLoader {
    pub fn new(store: Arc<dyn FingerprintStore>) -> Self {
        Self { store }
    }

    /// Fetch every repository concurrently, preserving `list_all_repos` order.
    ///
    /// Only a failure to list the cohort itself is an error.
    pub async fn load(&self) -> Result<Vec<RepositoryFingerprintSet>> {
        let repo_ids = self.store.list_all_repos().await?;

        let mut join_set = JoinSet::new();
        for (idx, repo_id) in repo_ids.iter().cloned().enumerate() {
            let store = Arc::clone(&self.store);
            join_set.spawn(async move {
                let fetched = store.list_fingerprints(&repo_id).await;
                (idx, fetched)
            });
        }

        let mut slots: Vec<Option<Result<Vec<Fingerprint>>>> =
            repo_ids.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (idx, fetched) = joined.map_err(|e| {
                ClassifyError::Store(format!("fingerprint fetch task join error: {e}"))
            })?;
            slots[idx] = Some(fetched);
        }

        let sets: Vec<RepositoryFingerprintSet> = repo_ids
            .into_iter()
            .zip(slots)
            .map(|(repo_id, slot)| match slot {
                Some(Ok(fingerprints)) => RepositoryFingerprintSet::new(repo_id, fingerprints),
                Some(Err(e)) => RepositoryFingerprintSet::failed(
                    repo_id,
                    ExtractionFailure::repository(e.to_string()),
                ),
                None => RepositoryFingerprintSet::failed(
                    repo_id,
                    ExtractionFailure::repository("missing fingerprint fetch result"),
                ),
            })
            .collect();

        let failed = sets.iter().filter(|s| s.extraction_failed()).count();
        obs::emit_cohort_loaded(sets.len(), failed);
        Ok(sets)
    }
}

/// Store backed by an in-memory map. Repositories list in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    order: Vec<RepoId>,
    fingerprints: BTreeMap<RepoId, Vec<Fingerprint>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a repository's fingerprints.
    pub fn insert(&mut self, repo_id: RepoId, fingerprints: Vec<Fingerprint>) {
        if !self.fingerprints.contains_key(&repo_id) {
            self.order.push(repo_id.clone());
        }
        self.fingerprints.insert(repo_id, fingerprints);
    }

    pub fn with_repo(mut self, repo_id: impl Into<String>, fingerprints: Vec<Fingerprint>) -> Self {
        self.insert(RepoId::new(repo_id), fingerprints);
        self
    }
}

#[async_trait]
impl FingerprintStore for InMemoryStore {
    async fn list_all_repos(&self) -> Result<Vec<RepoId>> {
        Ok(self.order.clone())
    }

    async fn list_fingerprints(&self, repo_id: &RepoId) -> Result<Vec<Fingerprint>> {
        self.fingerprints
            .get(repo_id)
            .cloned()
            .ok_or_else(|| ClassifyError::Store(format!("unknown repository '{repo_id}'")))
    }
}

/// Store reading one `<owner>__<name>.json` file per repository.
///
/// Each file holds a JSON array of fingerprints. Repositories list sorted by id.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

const OWNER_SEPARATOR: &str = "__";

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `org/name` -> `org__name.json`
    pub fn file_name(repo_id: &RepoId) -> String {
        format!("{}.json", repo_id.as_str().replacen('/', OWNER_SEPARATOR, 1))
    }

    fn repo_id_from_stem(stem: &str) -> RepoId {
        RepoId::new(stem.replacen(OWNER_SEPARATOR, "/", 1))
    }

    fn path_for(&self, repo_id: &RepoId) -> PathBuf {
        self.root.join(Self::file_name(repo_id))
    }
}

#[async_trait]
impl FingerprintStore for DirectoryStore {
    async fn list_all_repos(&self) -> Result<Vec<RepoId>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut repos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                repos.push(Self::repo_id_from_stem(stem));
            }
        }
        repos.sort();
        Ok(repos)
    }

    async fn list_fingerprints(&self, repo_id: &RepoId) -> Result<Vec<Fingerprint>> {
        let path = self.path_for(repo_id);
        let bytes = tokio::fs::read(&path).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClassifyError::Store(format!("invalid fingerprints in {}: {e}", path.display()))
        })
    }
}
