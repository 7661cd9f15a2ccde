use crate::{
    node::BoxNode,
    parser::Result,
    registry::{Registry, default_registry},
    util::read_head,
};
use std::path::Path;

/// How many leading bytes [`Mp4Head::from_path`] reads when the caller has no
/// better bound. Enough for the `moov` of short clips that put it first.
pub const DEFAULT_HEAD_MAX: u64 = 50_000;

/// An in-memory MP4 prefix plus the decoders used to read it.
///
/// This owns the buffer; every [`BoxNode`] obtained from [`Mp4Head::root`]
/// borrows it.
///
/// # Example
/// ```no_run
/// use mp4atoms::{Child, Mp4Head, DEFAULT_HEAD_MAX};
///
/// let head = Mp4Head::from_path("video.mp4", DEFAULT_HEAD_MAX)?;
/// let root = head.root();
/// for moov in root.child("moov")? {
///     if let Child::Node(moov) = moov {
///         println!("{moov}");
///     }
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Mp4Head {
    data: Vec<u8>,
    registry: Registry,
    strict: bool,
}

impl Mp4Head {
    /// Wrap bytes already in memory, using the default decoders.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            registry: default_registry(),
            strict: false,
        }
    }

    /// Load at most `max_bytes` from the start of the file at `path`.
    pub fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let data = read_head(path, max_bytes)?;
        log::debug!("loaded {} bytes from {}", data.len(), path.display());
        Ok(Self::from_bytes(data))
    }

    /// Replace the decoder registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable eager bounds checks while scanning.
    ///
    /// Turn this on when the buffer holds the whole file; leave it off when
    /// working from a deliberately truncated prefix.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Root node spanning the whole loaded buffer.
    pub fn root(&self) -> BoxNode<'_> {
        BoxNode::root(&self.data, &self.registry, self.strict)
    }
}
