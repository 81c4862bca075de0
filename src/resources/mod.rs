pub mod entry;
pub mod manager;
pub mod resource;
pub mod stats;

pub use entry::{EntryInfo, PreloadStatus, TextureInfo};
pub use manager::{MaintenanceReport, ResourceManager, ResourceManagerBuilder};
pub use resource::{
    Geometry, GpuResource, Material, MaterialSlot, Mesh, ModelNode, NativeHandle, ResourceKind,
    Texture, TextureFilter,
};
pub use stats::ResourceStats;
