//! Byte container for the input log.
//!
//! This type provides a minimal, read-only view over the log bytes that can
//! be backed by either an mmap (production) or owned in-memory bytes (tests
//! and benches). It avoids tying the pipeline to OS-backed file handles
//! while preserving zero-copy access on the scan path.
//!
//! Clones are cheap: the underlying bytes are reference-counted and treated
//! as immutable for the lifetime of any `BytesView`. The API exposes shared
//! slices only, so workers can read the same region concurrently with no
//! synchronization and no possibility of a mutable alias.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::AnalyzeError;

/// Read-only byte view over the input log.
#[derive(Clone, Debug)]
pub struct BytesView {
    inner: BytesInner,
}

#[derive(Clone, Debug)]
enum BytesInner {
    Mapped(Arc<Mmap>),
    Owned(Arc<[u8]>),
}

impl BytesView {
    /// Opens `path` and maps it read-only.
    ///
    /// A zero-length file is returned as an empty owned view: mapping zero
    /// bytes is an error on most platforms, and the planner treats an empty
    /// view as the no-data case anyway.
    pub fn open(path: &Path) -> Result<Self, AnalyzeError> {
        let file = File::open(path).map_err(|source| AnalyzeError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let len = file
            .metadata()
            .map_err(|source| AnalyzeError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len == 0 {
            return Ok(Self::from_vec(Vec::new()));
        }

        // SAFETY: the mapping is read-only and the input log is treated as
        // immutable for the duration of the run.
        let map = unsafe { Mmap::map(&file) }.map_err(|source| AnalyzeError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        // The whole region is consumed front to back by the workers.
        #[cfg(unix)]
        let _ = map.advise(memmap2::Advice::Sequential);

        Ok(Self {
            inner: BytesInner::Mapped(Arc::new(map)),
        })
    }

    /// Wrap shared, in-memory bytes.
    #[must_use]
    pub fn from_arc(bytes: Arc<[u8]>) -> Self {
        Self {
            inner: BytesInner::Owned(bytes),
        }
    }

    /// Wrap owned bytes.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::from_arc(Arc::from(bytes))
    }

    /// Returns the underlying bytes as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.inner {
            BytesInner::Mapped(map) => map.as_ref(),
            BytesInner::Owned(bytes) => bytes.as_ref(),
        }
    }

    /// Returns the length of the byte view.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the view is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl AsRef<[u8]> for BytesView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
