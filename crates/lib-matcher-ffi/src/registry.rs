//! Process-wide table of engine entry points.
//!
//! Built once by [`initialize`] and read-only afterwards, so it can be shared
//! by sessions on any thread without locking.

use crate::loader::{MatcherLibrary, Symbols};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

static UNRESOLVED: Symbols = Symbols::UNRESOLVED;

/// Outcome of loading the engine library.
pub struct Registry {
    path: PathBuf,
    library: Result<MatcherLibrary, String>,
}

impl Registry {
    fn build(path: &Path) -> Self {
        let library = MatcherLibrary::load(path).map_err(|e| {
            tracing::warn!(error = %e, "matcher registry initialization failed");
            e.to_string()
        });
        Self {
            path: path.to_path_buf(),
            library,
        }
    }

    /// Whether the library loaded and every entry point resolved.
    pub fn is_ready(&self) -> bool {
        self.library.as_ref().is_ok_and(MatcherLibrary::is_ready)
    }

    /// Path the registry was built from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved entry points. Every entry is `None` when the library itself
    /// failed to load.
    pub fn symbols(&self) -> &Symbols {
        match &self.library {
            Ok(library) => library.symbols(),
            Err(_) => &UNRESOLVED,
        }
    }

    /// Entry points that could not be resolved.
    pub fn missing(&self) -> Vec<&'static str> {
        match &self.library {
            Ok(library) => library.missing().to_vec(),
            Err(_) => Symbols::NAMES.to_vec(),
        }
    }

    /// Why the library failed to load, if it did.
    pub fn load_error(&self) -> Option<&str> {
        self.library.as_ref().err().map(String::as_str)
    }
}

/// Load the engine and resolve every entry point.
///
/// Runs at most once per process. Later calls return the stored readiness
/// without touching the library again.
pub fn initialize<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let registry = REGISTRY.get_or_init(|| Registry::build(path));
    if registry.path != path {
        tracing::warn!(
            requested = %path.display(),
            loaded = %registry.path.display(),
            "matcher registry already initialized from another library"
        );
    }
    registry.is_ready()
}

/// The registry, once [`initialize`] has run.
pub fn get() -> Option<&'static Registry> {
    REGISTRY.get()
}

/// Whether the registry is initialized and complete.
pub fn is_ready() -> bool {
    get().is_some_and(Registry::is_ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloadable_library_is_not_ready() {
        let registry = Registry::build(Path::new("/nonexistent/libIBScanMatcher.so"));
        assert!(!registry.is_ready());
        assert!(registry.load_error().is_some());
        assert_eq!(registry.missing().len(), Symbols::NAMES.len());
        assert!(registry.symbols().match_templates.is_none());
    }
}
