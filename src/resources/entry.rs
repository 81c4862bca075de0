use crate::resources::{GpuResource, ResourceKind, Texture, TextureFilter};
use std::time::{Duration, Instant};

/// Registry slot owning one GPU resource
#[derive(Debug)]
pub(crate) struct ResourceEntry {
    pub(crate) resource: GpuResource,
    pub(crate) last_accessed_at: Instant,
    pub(crate) approximate_size_bytes: usize,
}

impl ResourceEntry {
    /// A zero or missing hint falls back to the kind's estimate
    pub(crate) fn new(resource: GpuResource, size_hint: Option<usize>, now: Instant) -> Self {
        let approximate_size_bytes = match size_hint {
            Some(hint) if hint > 0 => hint,
            _ => resource.size_estimate(),
        };
        Self {
            resource,
            last_accessed_at: now,
            approximate_size_bytes,
        }
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
    }

    pub(crate) fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at)
    }

    pub(crate) fn info(&self, key: &str) -> EntryInfo {
        EntryInfo {
            key: key.to_string(),
            kind: self.resource.kind(),
            last_accessed_at: self.last_accessed_at,
            approximate_size_bytes: self.approximate_size_bytes,
        }
    }
}

/// Read-only view of a registry entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    pub kind: ResourceKind,
    pub last_accessed_at: Instant,
    pub approximate_size_bytes: usize,
}

/// Texture-specific view returned by texture preloads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub approximate_size_bytes: usize,
    pub generate_mipmaps: bool,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
}

impl TextureInfo {
    pub(crate) fn new(key: &str, texture: &Texture, approximate_size_bytes: usize) -> Self {
        Self {
            key: key.to_string(),
            width: texture.width(),
            height: texture.height(),
            approximate_size_bytes,
            generate_mipmaps: texture.generate_mipmaps(),
            min_filter: texture.min_filter(),
            mag_filter: texture.mag_filter(),
        }
    }
}

/// Outcome of a model preload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreloadStatus {
    /// Already registered; recency refreshed
    Resident,
    /// The load cache says this model was requested before, but no local
    /// entry exists
    Requested,
    /// Loaded and registered by this call (or the in-flight call it joined)
    Loaded(EntryInfo),
}
