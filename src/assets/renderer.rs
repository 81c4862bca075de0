/// Read-only renderer counters plus global GPU cache eviction
pub trait RendererInfo: Send + Sync {
    /// Draw calls submitted in the last frame
    fn draw_calls(&self) -> u64;

    /// Triangles submitted in the last frame
    fn triangles(&self) -> u64;

    /// Ask the renderer to drop any GPU memory it can reclaim
    fn release_cached_memory(&self);
}

/// Renderer stand-in for headless hosts
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl RendererInfo for NullRenderer {
    fn draw_calls(&self) -> u64 {
        0
    }

    fn triangles(&self) -> u64 {
        0
    }

    fn release_cached_memory(&self) {}
}
