use crate::error::Result;
use crate::resources::{ModelNode, Texture};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Progress report from a model load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded_bytes: u64,
    /// `None` when the server did not send a content length
    pub total_bytes: Option<u64>,
}

impl LoadProgress {
    /// Fraction in `0.0..=1.0`, if the total is known
    pub fn fraction(&self) -> Option<f32> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.loaded_bytes as f32 / total as f32).min(1.0)),
            None => None,
        }
    }
}

/// Callback invoked as model bytes arrive
pub type ProgressCallback = Arc<dyn Fn(LoadProgress) + Send + Sync>;

/// Fetches and decodes GPU resources.
///
/// Returned futures must not borrow the loader or the URL; implementations
/// clone what they need.
pub trait ResourceLoader: Send + Sync {
    /// Load a composite model (scene subtree)
    fn load_model(
        &self,
        url: &str,
        progress: Option<ProgressCallback>,
    ) -> BoxFuture<'static, Result<ModelNode>>;

    /// Load a single texture
    fn load_texture(&self, url: &str) -> BoxFuture<'static, Result<Texture>>;
}
