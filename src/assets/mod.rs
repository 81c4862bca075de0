// Asset Loading Module
//
// Collaborators the resource manager drives:
// - Loaders that fetch textures and models
// - A load cache recording which URLs were requested
// - Renderer counters and GPU cache eviction

pub mod cache;
pub mod loader;
pub mod renderer;

pub use cache::{LoadCache, MemoryLoadCache};
pub use loader::{LoadProgress, ProgressCallback, ResourceLoader};
pub use renderer::{NullRenderer, RendererInfo};
