use crate::resources::entry::ResourceEntry;
use crate::resources::GpuResource;
use serde::Serialize;
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Aggregate memory and frame statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResourceStats {
    pub textures_loaded: usize,
    pub texture_memory_mb: f64,
    pub geometries_loaded: usize,
    pub geometry_memory_mb: f64,
    pub materials_loaded: usize,
    pub models_loaded: usize,
    pub draw_calls: u64,
    pub triangles: u64,
    pub fps: u32,
}

impl ResourceStats {
    /// Fold registry entries into a snapshot. Model geometry counts toward
    /// the geometry totals.
    pub(crate) fn collect<'a>(entries: impl IntoIterator<Item = &'a ResourceEntry>) -> Self {
        let mut stats = ResourceStats::default();
        let mut texture_bytes = 0usize;
        let mut geometry_bytes = 0usize;

        for entry in entries {
            match &entry.resource {
                GpuResource::Texture(_) => {
                    stats.textures_loaded += 1;
                    texture_bytes += entry.approximate_size_bytes;
                }
                GpuResource::Geometry(_) => {
                    stats.geometries_loaded += 1;
                    geometry_bytes += entry.approximate_size_bytes;
                }
                GpuResource::Material(_) => stats.materials_loaded += 1,
                GpuResource::Model(model) => {
                    stats.models_loaded += 1;
                    stats.geometries_loaded += model.mesh_count();
                    geometry_bytes += entry.approximate_size_bytes;
                }
            }
        }

        stats.texture_memory_mb = bytes_to_mb(texture_bytes);
        stats.geometry_memory_mb = bytes_to_mb(geometry_bytes);
        stats
    }

    /// Total tracked memory in MB
    pub fn total_memory_mb(&self) -> f64 {
        self.texture_memory_mb + self.geometry_memory_mb
    }
}

/// Bytes to MB, rounded to 2 decimals
pub fn bytes_to_mb(bytes: usize) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// `frames * 1000 / elapsed_ms`, rounded. Zero when no time has passed.
pub fn frames_per_second(frames: u64, elapsed: Duration) -> u32 {
    let elapsed_ms = elapsed.as_millis();
    if elapsed_ms == 0 {
        return 0;
    }
    (frames as f64 * 1000.0 / elapsed_ms as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Geometry, Material, Mesh, ModelNode, NativeHandle, Texture};
    use std::time::Instant;

    struct Noop;

    impl NativeHandle for Noop {
        fn release(self: Box<Self>) {}
    }

    #[test]
    fn test_bytes_to_mb_rounding() {
        assert_eq!(bytes_to_mb(1_048_576), 1.0);
        assert_eq!(bytes_to_mb(0), 0.0);
        // 1.5 MB + a few bytes
        assert_eq!(bytes_to_mb(1_572_870), 1.5);
        assert_eq!(bytes_to_mb(12_000), 0.01);
    }

    #[test]
    fn test_frames_per_second() {
        assert_eq!(frames_per_second(300, Duration::from_secs(5)), 60);
        assert_eq!(frames_per_second(10, Duration::ZERO), 0);
        assert_eq!(frames_per_second(0, Duration::from_secs(5)), 0);
        assert_eq!(frames_per_second(149, Duration::from_millis(5000)), 30);
    }

    #[test]
    fn test_collect_by_kind() {
        let now = Instant::now();
        let model = ModelNode::new("necklace")
            .with_mesh(Mesh::new(Geometry::new(1000, Noop), Material::new(Noop)))
            .with_child(
                ModelNode::new("pendant")
                    .with_mesh(Mesh::new(Geometry::new(500, Noop), Material::new(Noop))),
            );
        let entries = vec![
            ResourceEntry::new(Texture::new(512, 512, Noop).into(), None, now),
            ResourceEntry::new(Texture::new(256, 256, Noop).into(), None, now),
            ResourceEntry::new(Geometry::new(1000, Noop).into(), None, now),
            ResourceEntry::new(Material::new(Noop).into(), None, now),
            ResourceEntry::new(model.into(), None, now),
        ];

        let stats = ResourceStats::collect(&entries);
        assert_eq!(stats.textures_loaded, 2);
        assert_eq!(stats.texture_memory_mb, 1.25);
        assert_eq!(stats.geometries_loaded, 3);
        assert_eq!(stats.geometry_memory_mb, bytes_to_mb(2500 * 12));
        assert_eq!(stats.materials_loaded, 1);
        assert_eq!(stats.models_loaded, 1);
        assert_eq!(stats.fps, 0);
        assert_eq!(
            stats.total_memory_mb(),
            stats.texture_memory_mb + stats.geometry_memory_mb
        );
    }
}
