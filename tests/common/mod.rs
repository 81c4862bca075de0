#![allow(dead_code)]

use ar_resources::{
    Geometry, LoadProgress, Material, Mesh, ModelNode, NativeHandle, ProgressCallback,
    RendererInfo, ResourceError, ResourceLoader, ResourceManager, Result, Texture,
};
use ar_resources::time::ManualClock;
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Native handle that records how often it was released
pub struct Counted(pub Arc<AtomicUsize>);

impl NativeHandle for Counted {
    fn release(self: Box<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Model with `meshes` meshes; mesh `i` carries `i + 1` materials
pub fn model(meshes: usize, released: &Arc<AtomicUsize>) -> ModelNode {
    let mut root = ModelNode::new("root");
    for i in 0..meshes {
        let materials: Vec<Material> = (0..=i)
            .map(|_| Material::new(Counted(released.clone())))
            .collect();
        let mesh = Mesh::new(Geometry::new(100, Counted(released.clone())), materials);
        root.add_child(ModelNode::new(format!("mesh-{i}")).with_mesh(mesh));
    }
    root
}

/// Loader answering from a script of per-URL results
#[derive(Default)]
pub struct ScriptedLoader {
    pub released: Arc<AtomicUsize>,
    texture_sizes: Mutex<HashMap<String, (u32, u32)>>,
    model_meshes: Mutex<HashMap<String, usize>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    pub texture_loads: AtomicUsize,
    pub model_loads: AtomicUsize,
    pub progress_events: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(self, url: &str, width: u32, height: u32) -> Self {
        self.texture_sizes
            .lock()
            .insert(url.to_string(), (width, height));
        self
    }

    pub fn with_model(self, url: &str, meshes: usize) -> Self {
        self.model_meshes.lock().insert(url.to_string(), meshes);
        self
    }

    /// Hold the next load of `url` until the returned sender fires
    pub fn gate(&self, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(url.to_string(), rx);
        tx
    }

    fn take_gate(&self, url: &str) -> Option<oneshot::Receiver<()>> {
        self.gates.lock().remove(url)
    }
}

impl ResourceLoader for ScriptedLoader {
    fn load_model(
        &self,
        url: &str,
        progress: Option<ProgressCallback>,
    ) -> BoxFuture<'static, Result<ModelNode>> {
        self.model_loads.fetch_add(1, Ordering::SeqCst);
        let meshes = self.model_meshes.lock().get(url).copied();
        let gate = self.take_gate(url);
        let released = self.released.clone();
        let events = self.progress_events.clone();
        let url = url.to_string();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if let Some(progress) = progress {
                progress(LoadProgress {
                    loaded_bytes: 1024,
                    total_bytes: Some(1024),
                });
                events.fetch_add(1, Ordering::SeqCst);
            }
            match meshes {
                Some(meshes) => Ok(model(meshes, &released)),
                None => Err(ResourceError::load(url, "404 Not Found")),
            }
        }
        .boxed()
    }

    fn load_texture(&self, url: &str) -> BoxFuture<'static, Result<Texture>> {
        self.texture_loads.fetch_add(1, Ordering::SeqCst);
        let size = self.texture_sizes.lock().get(url).copied();
        let gate = self.take_gate(url);
        let released = self.released.clone();
        let url = url.to_string();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match size {
                Some((width, height)) => Ok(Texture::new(width, height, Counted(released))),
                None => Err(ResourceError::load(url, "404 Not Found")),
            }
        }
        .boxed()
    }
}

/// Renderer with fixed counters that records cache releases
#[derive(Default)]
pub struct FakeRenderer {
    pub draw_calls: u64,
    pub triangles: u64,
    pub cache_releases: AtomicU64,
}

impl RendererInfo for FakeRenderer {
    fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    fn triangles(&self) -> u64 {
        self.triangles
    }

    fn release_cached_memory(&self) {
        self.cache_releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn manager(loader: Arc<ScriptedLoader>) -> (ResourceManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let manager = ResourceManager::builder(loader)
        .clock(clock.clone())
        .build()
        .expect("default config is valid");
    (manager, clock)
}
