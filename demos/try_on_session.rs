use ar_resources::prelude::*;
use futures::executor::block_on;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Stand-in for a GPU buffer or texture object
struct FakeGpuObject(&'static str);

impl NativeHandle for FakeGpuObject {
    fn release(self: Box<Self>) {
        println!("  released {}", self.0);
    }
}

/// Loader that "downloads" fixed-size assets
struct DemoLoader;

impl ResourceLoader for DemoLoader {
    fn load_model(
        &self,
        url: &str,
        progress: Option<ProgressCallback>,
    ) -> BoxFuture<'static, Result<ModelNode>> {
        let url = url.to_string();
        async move {
            if let Some(progress) = progress {
                progress(ar_resources::LoadProgress {
                    loaded_bytes: 4096,
                    total_bytes: Some(4096),
                });
            }
            if url.ends_with(".glb") {
                let frame = Mesh::new(
                    Geometry::new(2048, FakeGpuObject("frame geometry")),
                    Material::new(FakeGpuObject("frame material")),
                );
                Ok(ModelNode::new("glasses").with_mesh(frame))
            } else {
                Err(ResourceError::load(url, "unsupported model format"))
            }
        }
        .boxed()
    }

    fn load_texture(&self, _url: &str) -> BoxFuture<'static, Result<Texture>> {
        async move { Ok(Texture::new(512, 512, FakeGpuObject("lipstick texture"))) }.boxed()
    }
}

fn main() {
    println!("AR Try-On Resource Session");

    let manager = ResourceManager::new(Arc::new(DemoLoader));

    // 1. Preload what the try-on view needs
    let status = block_on(manager.preload_model("models/aviator.glb"));
    println!("model preload: {status:?}");

    let texture = block_on(manager.preload_texture("textures/ruby.png"));
    println!("texture preload: {texture:?}");

    let failed = block_on(manager.preload_model("models/aviator.fbx"));
    println!("unsupported preload: {failed:?}");

    // 2. Frames go by
    for _ in 0..60 {
        manager.record_frame();
        manager.tick();
    }
    println!("stats: {:?}", manager.update_stats());

    // 3. User leaves the try-on view
    manager.pause_rendering();
    println!("memory before teardown: {} bytes", manager.memory_usage());
    let cleared = manager.clear_resources();
    println!("cleared {cleared} resources");
}
