//! Mesh sources.
//!
//! A [`MeshSource`] receives a path and a [`LoadCompletion`]. It may complete
//! inline or from another thread; either way the stage only sees the result when
//! it drains its load channel at the start of a frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use dissolve_core::{DissolveError, Mesh, Result};

use crate::model::ModelId;

/// Result of one load, as delivered to the stage.
#[derive(Debug)]
pub struct LoadEvent {
    pub model: ModelId,
    pub path: PathBuf,
    pub result: Result<Mesh>,
}

/// Completion handle for a single load request.
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    model: ModelId,
    path: PathBuf,
    tx: flume::Sender<LoadEvent>,
}

impl LoadCompletion {
    pub(crate) fn new(model: ModelId, path: PathBuf, tx: flume::Sender<LoadEvent>) -> Self {
        Self { model, path, tx }
    }

    /// Returns the path being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delivers the load result. Results for a dropped stage are discarded.
    pub fn complete(self, result: Result<Mesh>) {
        let event = LoadEvent {
            model: self.model,
            path: self.path,
            result,
        };
        if self.tx.send(event).is_err() {
            log::debug!("load finished after its stage was dropped");
        }
    }
}

/// Produces meshes for model files.
pub trait MeshSource {
    /// Starts loading `path`. Must eventually call [`LoadCompletion::complete`]
    /// exactly once, unless the stage is dropped first.
    fn load(&self, path: &Path, completion: LoadCompletion);
}

/// Serves meshes registered up front, completing synchronously.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    meshes: HashMap<PathBuf, Mesh>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh under `path`.
    #[must_use]
    pub fn with_mesh(mut self, path: impl Into<PathBuf>, mesh: Mesh) -> Self {
        self.insert(path, mesh);
        self
    }

    /// Registers a mesh under `path`, replacing an earlier one.
    pub fn insert(&mut self, path: impl Into<PathBuf>, mesh: Mesh) {
        self.meshes.insert(path.into(), mesh);
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshSource for MemorySource {
    fn load(&self, path: &Path, completion: LoadCompletion) {
        let result = self
            .meshes
            .get(path)
            .cloned()
            .ok_or_else(|| DissolveError::LoadFailed {
                path: path.display().to_string(),
                reason: "no such mesh".into(),
            });
        completion.complete(result);
    }
}

type LoadFn = dyn Fn(&Path) -> Result<Mesh> + Send + Sync;

/// Runs a blocking load function on a worker thread per request.
#[derive(Clone)]
pub struct ThreadedSource {
    load: Arc<LoadFn>,
}

impl ThreadedSource {
    pub fn new<F>(load: F) -> Self
    where
        F: Fn(&Path) -> Result<Mesh> + Send + Sync + 'static,
    {
        Self {
            load: Arc::new(load),
        }
    }
}

impl std::fmt::Debug for ThreadedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedSource").finish_non_exhaustive()
    }
}

impl MeshSource for ThreadedSource {
    fn load(&self, path: &Path, completion: LoadCompletion) {
        let load = Arc::clone(&self.load);
        let path = path.to_path_buf();
        let fallback = completion.clone();

        let spawned = thread::Builder::new()
            .name(format!("dissolve-load-{}", path.display()))
            .spawn(move || {
                let result = load(&path);
                completion.complete(result);
            });

        if let Err(e) = spawned {
            log::error!("could not spawn loader thread: {e}");
            let path = fallback.path().display().to_string();
            fallback.complete(Err(DissolveError::LoadFailed {
                path,
                reason: e.to_string(),
            }));
        }
    }
}
