use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::error::{VitrineError, VitrineResult};

pub mod decode;

pub use decode::decode_image;

/// Decoded texture in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Progress of one requested texture load.
#[derive(Clone, Debug)]
pub enum LoadStatus {
    /// Requested but not resolved yet.
    Pending,
    /// Resolved; pixels are shared and immutable.
    Ready(Arc<Texture>),
    /// Resolved with an error; carries the rendered cause chain.
    Failed(String),
}

/// Source of textures for the compositor. The only place external IO happens.
///
/// Loads are keyed by store-relative paths (`/`-separated, no `..`). `request`
/// adds one reference to the path and begins loading it if needed; `release`
/// drops one reference, and the store may evict the entry once no references
/// remain. `status` reports progress without blocking, so a single-threaded
/// embedder can poll from its frame loop.
pub trait TextureStore {
    /// Begin a load for `path`, or add a reference to an existing one.
    fn request(&mut self, path: &str);

    /// Current state of the load for `path`.
    fn status(&self, path: &str) -> LoadStatus;

    /// Drop one reference to `path`; the entry is evicted when none remain.
    fn release(&mut self, path: &str);
}

/// Filesystem-backed [`TextureStore`] rooted at a directory.
///
/// Loads resolve synchronously at request time and are memoized per
/// normalized path, so `status` never reports [`LoadStatus::Pending`] and a
/// path is decoded at most once while any reference to it is live.
pub struct FsTextureStore {
    root: PathBuf,
    entries: HashMap<String, FsEntry>,
}

struct FsEntry {
    refs: u32,
    decode_count: u32,
    outcome: Result<Arc<Texture>, String>,
}

impl FsTextureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: HashMap::new(),
        }
    }

    /// Whether any live entry exists for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&store_key(path))
    }

    /// How many times `path` has been decoded since it was first requested.
    /// Eviction resets the count. Intended for cache-behavior tests.
    pub fn decode_count(&self, path: &str) -> u32 {
        self.entries
            .get(&store_key(path))
            .map(|e| e.decode_count)
            .unwrap_or(0)
    }

    fn load(&self, norm_path: &str) -> VitrineResult<Texture> {
        let path = self.root.join(Path::new(norm_path));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read texture bytes from '{}'", path.display()))?;
        decode::decode_image(&bytes)
    }
}

impl TextureStore for FsTextureStore {
    fn request(&mut self, path: &str) {
        let (key, outcome) = match normalize_rel_path(path) {
            Ok(norm) => {
                if let Some(entry) = self.entries.get_mut(&norm) {
                    entry.refs += 1;
                    return;
                }
                let outcome = self
                    .load(&norm)
                    .map(Arc::new)
                    .map_err(|err| format!("{err:#}"));
                (norm, outcome)
            }
            Err(err) => {
                if let Some(entry) = self.entries.get_mut(path) {
                    entry.refs += 1;
                    return;
                }
                (path.to_string(), Err(err.to_string()))
            }
        };

        let decode_count = u32::from(outcome.is_ok());
        self.entries.insert(
            key,
            FsEntry {
                refs: 1,
                decode_count,
                outcome,
            },
        );
    }

    fn status(&self, path: &str) -> LoadStatus {
        match self.entries.get(&store_key(path)) {
            Some(entry) => match &entry.outcome {
                Ok(texture) => LoadStatus::Ready(texture.clone()),
                Err(cause) => LoadStatus::Failed(cause.clone()),
            },
            None => LoadStatus::Failed(format!("texture '{path}' was never requested")),
        }
    }

    fn release(&mut self, path: &str) {
        let key = store_key(path);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.refs = entry.refs.saturating_sub(1);
            if entry.refs == 0 {
                self.entries.remove(&key);
            }
        }
    }
}

// Paths that fail normalization are tracked under their raw spelling so that
// request/status/release stay symmetric for them.
fn store_key(path: &str) -> String {
    normalize_rel_path(path).unwrap_or_else(|_| path.to_string())
}

/// Normalize and validate store-relative texture paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> VitrineResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(VitrineError::validation("texture paths must be relative"));
    }
    if s.is_empty() {
        return Err(VitrineError::validation("texture path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(VitrineError::validation(
                "texture paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(VitrineError::validation(
            "texture path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_cross_platform() {
        assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
        assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
        assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
        assert!(normalize_rel_path("../x.png").is_err());
        assert!(normalize_rel_path("/abs/x.png").is_err());
        assert!(normalize_rel_path("").is_err());
    }

    #[test]
    fn status_of_unrequested_path_is_failed() {
        let store = FsTextureStore::new(".");
        let LoadStatus::Failed(cause) = store.status("assets/none.png") else {
            panic!("expected failed status");
        };
        assert!(cause.contains("never requested"));
    }

    #[test]
    fn release_of_unknown_path_is_a_noop() {
        let mut store = FsTextureStore::new(".");
        store.release("assets/none.png");
        assert!(!store.contains("assets/none.png"));
    }

    #[test]
    fn invalid_path_requests_resolve_to_failed() {
        let mut store = FsTextureStore::new(".");
        store.request("../escape.png");
        let LoadStatus::Failed(cause) = store.status("../escape.png") else {
            panic!("expected failed status");
        };
        assert!(cause.contains(".."));
        store.release("../escape.png");
        assert!(!store.contains("../escape.png"));
    }
}
