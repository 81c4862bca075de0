//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use ar_resources::prelude::*;
//! ```

pub use crate::assets::{LoadCache, ProgressCallback, RendererInfo, ResourceLoader};
pub use crate::config::ManagerConfig;
pub use crate::error::{ResourceError, Result};
pub use crate::resources::{
    EntryInfo, Geometry, GpuResource, Material, Mesh, ModelNode, NativeHandle, PreloadStatus,
    ResourceKind, ResourceManager, ResourceStats, Texture, TextureInfo,
};
pub use crate::time::{Clock, ManualClock, SystemClock};
