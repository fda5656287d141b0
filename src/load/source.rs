use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::foundation::error::{ReelError, ReelResult};

/// Where frame bytes come from.
///
/// Implementations are shared across fetch workers and must be thread-safe. A fetch either
/// returns the encoded image bytes or an error; the loader turns errors into gap-filled slots.
pub trait FrameSource: Send + Sync + 'static {
    /// Fetch the encoded bytes behind `locator` (a rendered frame URL or path).
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>>;
}

/// Frames read from a local directory tree.
///
/// Locators are resolved relative to `root`; absolute locators and `..` segments are rejected.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serve frames below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory locators are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path a locator resolves to.
    pub fn resolve(&self, locator: &str) -> ReelResult<PathBuf> {
        let rel = normalize_rel_locator(locator)?;
        Ok(self.root.join(Path::new(&rel)))
    }
}

impl FrameSource for DirSource {
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>> {
        let path = self.resolve(locator)?;
        std::fs::read(&path)
            .map_err(|e| ReelError::fetch(format!("read '{}': {e}", path.display())))
    }
}

/// Frames held in memory, keyed by locator.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `locator`.
    pub fn insert(&mut self, locator: impl Into<String>, bytes: Vec<u8>) {
        self.frames.insert(locator.into(), bytes);
    }

    /// Number of registered locators.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>> {
        self.frames
            .get(locator)
            .cloned()
            .ok_or_else(|| ReelError::fetch(format!("no frame at '{locator}'")))
    }
}

/// Frames fetched over HTTP(S) with a shared `ureq` agent.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpSource {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Agent with a global per-request timeout.
    pub fn new(timeout: std::time::Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }
}

#[cfg(feature = "http")]
impl FrameSource for HttpSource {
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>> {
        let resp = self
            .agent
            .get(locator)
            .call()
            .map_err(|e| ReelError::fetch(format!("GET '{locator}': {e}")))?;
        resp.into_body()
            .read_to_vec()
            .map_err(|e| ReelError::fetch(format!("read body of '{locator}': {e}")))
    }
}

/// Normalize and validate a directory-relative frame locator.
///
/// The result uses `/` separators and drops `.` segments; absolute locators and parent
/// traversals (`..`) are rejected.
pub(crate) fn normalize_rel_locator(locator: &str) -> ReelResult<String> {
    let s = locator.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ReelError::fetch(format!(
            "frame locator '{locator}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::fetch(format!(
                "frame locator '{locator}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::fetch("frame locator must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/load/source.rs"]
mod tests;
