//! Native library registry.
//!
//! Some vendor SDKs ship shared libraries that must be loaded once per
//! process before the first call. The registry is an explicit value: create
//! one at startup, share it (it is `Clone`), and pass it to the adapters that
//! need it. It records what was loaded so repeated loads are no-ops, and it
//! skips resources built for another platform based on the file extension.
//!
//! The actual loading is delegated to a caller-supplied loader, so this
//! crate never opens a shared object itself.

use crate::Result;
use dashmap::DashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uhfkit_core::Error;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
    Other,
}

/// Operating system and CPU architecture of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: &'static str,
}

impl Platform {
    /// Platform of the running process.
    pub fn current() -> Self {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Platform from OS and architecture names, normalizing aliases
    /// (`amd64` is `x86_64`, `arm64` is `aarch64`, `i686` is `x86`).
    pub fn from_names(os: &str, arch: &str) -> Self {
        let os = match os.to_ascii_lowercase().as_str() {
            o if o.starts_with("windows") => Os::Windows,
            "macos" | "darwin" | "mac os x" => Os::MacOs,
            "linux" => Os::Linux,
            _ => Os::Other,
        };
        let arch = match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => "x86_64",
            "x86" | "i386" | "i486" | "i586" | "i686" => "x86",
            "aarch64" | "arm64" => "aarch64",
            "arm" | "armv7" | "armv7l" => "arm",
            _ => "unknown",
        };
        Self { os, arch }
    }

    /// Whether a resource with this file name is meant for this platform.
    ///
    /// Unknown extensions are assumed to be portable.
    pub fn accepts(&self, resource: &str) -> bool {
        let extension = Path::new(resource)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("dll") => self.os == Os::Windows,
            Some("dylib") | Some("jnilib") => self.os == Os::MacOs,
            Some("so") => self.os == Os::Linux,
            _ => true,
        }
    }
}

/// Outcome of [`NativeLibraries::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The loader ran and succeeded.
    Loaded,
    /// The resource had been loaded earlier.
    AlreadyLoaded,
    /// The resource targets another platform.
    Skipped,
}

type Loader = dyn Fn(&Path) -> std::io::Result<()> + Send + Sync;

struct Inner {
    platform: Platform,
    loaded: DashSet<String>,
    lock: Mutex<()>,
    loader: Box<Loader>,
}

/// Process-scoped record of loaded native libraries.
#[derive(Clone)]
pub struct NativeLibraries {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NativeLibraries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibraries")
            .field("platform", &self.inner.platform)
            .field("loaded", &self.inner.loaded.len())
            .finish()
    }
}

impl NativeLibraries {
    /// Registry for the current platform.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static,
    {
        Self::with_platform(Platform::current(), loader)
    }

    /// Registry pretending to run on `platform`.
    pub fn with_platform<F>(platform: Platform, loader: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                platform,
                loaded: DashSet::new(),
                lock: Mutex::new(()),
                loader: Box::new(loader),
            }),
        }
    }

    /// Platform used to filter resources.
    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// Load `resource` unless it was already loaded or targets another
    /// platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::NativeLibrary` if the loader fails. A failed resource
    /// is not recorded, so a later call retries it.
    pub fn load(&self, resource: &str) -> Result<LoadOutcome> {
        if !self.inner.platform.accepts(resource) {
            debug!(resource, platform = ?self.inner.platform, "Skipping native library for another platform");
            return Ok(LoadOutcome::Skipped);
        }
        if self.inner.loaded.contains(resource) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.inner.loaded.contains(resource) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        (self.inner.loader)(Path::new(resource))
            .map_err(|source| Error::NativeLibrary {
                resource: resource.to_string(),
                source,
            })?;

        self.inner.loaded.insert(resource.to_string());
        info!(resource, "Native library loaded");
        Ok(LoadOutcome::Loaded)
    }

    /// Load every resource in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first loader failure.
    pub fn load_all(&self, resources: &[&str]) -> Result<()> {
        for resource in resources {
            self.load(resource)?;
        }
        Ok(())
    }

    /// Whether `resource` has been loaded.
    pub fn is_loaded(&self, resource: &str) -> bool {
        self.inner.loaded.contains(resource)
    }
}
