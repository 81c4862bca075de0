// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resource manager: registry of GPU objects with idle-based disposal

use crate::assets::{
    LoadCache, LoadProgress, MemoryLoadCache, NullRenderer, ProgressCallback, RendererInfo,
    ResourceLoader,
};
use crate::config::ManagerConfig;
use crate::error::{ResourceError, Result};
use crate::resources::entry::ResourceEntry;
use crate::resources::stats::frames_per_second;
use crate::resources::{
    EntryInfo, GpuResource, PreloadStatus, ResourceKind, ResourceStats, TextureFilter, TextureInfo,
};
use crate::time::{Clock, IntervalTimer, SystemClock};
use ahash::AHashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span};

/// Value stored in the load cache once a model has been fetched
const MODEL_REQUESTED_MARKER: &str = "requested";

type SharedLoad<T> = Shared<BoxFuture<'static, Result<T>>>;

fn model_cache_key(url: &str) -> String {
    format!("model:{url}")
}

/// Result of polling the periodic timers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaintenanceReport {
    /// Entries released by the idle sweep, if it ran
    pub disposed: Option<usize>,
    /// Fresh snapshot, if the stats timer fired
    pub stats: Option<ResourceStats>,
}

struct Registry {
    entries: AHashMap<String, ResourceEntry>,
    stats: ResourceStats,
    frames: u64,
    last_stats_at: Instant,
    stats_timer: IntervalTimer,
    sweep_timer: IntervalTimer,
}

/// Pending loads keyed by URL. Each carries the id it was started with so a
/// finishing load only removes its own slot.
#[derive(Default)]
struct InFlight {
    next_id: u64,
    textures: AHashMap<String, (u64, SharedLoad<TextureInfo>)>,
    models: AHashMap<String, (u64, SharedLoad<PreloadStatus>)>,
}

impl InFlight {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn len(&self) -> usize {
        self.textures.len() + self.models.len()
    }
}

fn remove_if_current<T>(
    loads: &mut AHashMap<String, (u64, SharedLoad<T>)>,
    url: &str,
    id: u64,
) {
    if loads.get(url).is_some_and(|(current, _)| *current == id) {
        loads.remove(url);
    }
}

/// Either an immediate answer or a load to wait on
enum Preload<T> {
    Ready(Result<T>),
    Pending(SharedLoad<T>),
}

struct Inner {
    // Lock order: `in_flight` before `registry`
    registry: Mutex<Registry>,
    in_flight: Mutex<InFlight>,
    rendering: AtomicBool,
    loader: Arc<dyn ResourceLoader>,
    cache: Arc<dyn LoadCache>,
    renderer: Arc<dyn RendererInfo>,
    clock: Arc<dyn Clock>,
    config: ManagerConfig,
}

impl Inner {
    fn register(&self, key: &str, resource: GpuResource, size_hint: Option<usize>) -> EntryInfo {
        let entry = ResourceEntry::new(resource, size_hint, self.clock.now());
        let info = entry.info(key);

        let mut registry = self.registry.lock();
        if let Some(previous) = registry.entries.insert(key.to_string(), entry) {
            let released = previous.resource.release();
            debug!(key, released, "replaced registered resource");
        }
        drop(registry);

        debug!(
            key,
            kind = %info.kind,
            size_bytes = info.approximate_size_bytes,
            "registered resource"
        );
        info
    }

    fn touch(&self, key: &str) -> Option<EntryInfo> {
        let now = self.clock.now();
        let mut registry = self.registry.lock();
        let entry = registry.entries.get_mut(key)?;
        entry.touch(now);
        Some(entry.info(key))
    }

    /// Refresh a registered texture, or report that the key holds something else
    fn touch_texture(&self, key: &str) -> Option<Result<TextureInfo>> {
        let now = self.clock.now();
        let mut registry = self.registry.lock();
        let entry = registry.entries.get_mut(key)?;

        let info = match &entry.resource {
            GpuResource::Texture(texture) => {
                Ok(TextureInfo::new(key, texture, entry.approximate_size_bytes))
            }
            other => Err(ResourceError::KindMismatch {
                key: key.to_string(),
                expected: ResourceKind::Texture,
                found: other.kind(),
            }),
        };
        if info.is_ok() {
            entry.touch(now);
        }
        Some(info)
    }

    fn unregister(&self, key: &str) -> bool {
        let mut registry = self.registry.lock();
        match registry.entries.remove(key) {
            Some(entry) => {
                let kind = entry.resource.kind();
                let released = entry.resource.release();
                debug!(key, %kind, released, "unregistered resource");
                true
            }
            None => false,
        }
    }

    fn dispose_unused(&self) -> usize {
        let _span = info_span!("resources.dispose_unused").entered();
        let now = self.clock.now();
        let threshold = self.config.idle_threshold();

        let mut registry = self.registry.lock();
        let stale: Vec<String> = registry
            .entries
            .iter()
            .filter(|(_, entry)| entry.idle_for(now) > threshold)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            if let Some(entry) = registry.entries.remove(key) {
                let released = entry.resource.release();
                debug!(key = key.as_str(), released, "disposed idle resource");
            }
        }

        if !stale.is_empty() {
            info!(
                disposed = stale.len(),
                remaining = registry.entries.len(),
                "disposed unused resources"
            );
        }
        stale.len()
    }

    fn clear(&self) -> usize {
        let _span = info_span!("resources.clear").entered();
        let mut registry = self.registry.lock();
        let count = registry.entries.len();
        for (_, entry) in registry.entries.drain() {
            entry.resource.release();
        }
        if count > 0 {
            info!(count, "cleared all resources");
        }
        count
    }

    fn update_stats(&self) -> ResourceStats {
        let now = self.clock.now();
        let mut registry = self.registry.lock();

        let mut stats = ResourceStats::collect(registry.entries.values());
        stats.draw_calls = self.renderer.draw_calls();
        stats.triangles = self.renderer.triangles();
        stats.fps = frames_per_second(
            registry.frames,
            now.saturating_duration_since(registry.last_stats_at),
        );

        registry.frames = 0;
        registry.last_stats_at = now;
        registry.stats_timer.reset(now);
        registry.stats = stats.clone();
        stats
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let registry = self.registry.get_mut();
        let count = registry.entries.len();
        for (_, entry) in registry.entries.drain() {
            entry.resource.release();
        }
        if count > 0 {
            debug!(count, "released resources on teardown");
        }
    }
}

/// Builder for [`ResourceManager`]
pub struct ResourceManagerBuilder {
    loader: Arc<dyn ResourceLoader>,
    cache: Option<Arc<dyn LoadCache>>,
    renderer: Option<Arc<dyn RendererInfo>>,
    clock: Option<Arc<dyn Clock>>,
    config: ManagerConfig,
}

impl ResourceManagerBuilder {
    /// External load cache. Defaults to a [`MemoryLoadCache`] on the manager's clock.
    pub fn cache(mut self, cache: Arc<dyn LoadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Renderer counters. Defaults to [`NullRenderer`].
    pub fn renderer(mut self, renderer: Arc<dyn RendererInfo>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ResourceManager> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> ResourceManager {
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let cache: Arc<dyn LoadCache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(MemoryLoadCache::new(clock.clone())),
        };
        let renderer: Arc<dyn RendererInfo> = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(NullRenderer),
        };

        let now = clock.now();
        let registry = Registry {
            entries: AHashMap::new(),
            stats: ResourceStats::default(),
            frames: 0,
            last_stats_at: now,
            stats_timer: IntervalTimer::new(self.config.stats_interval(), now),
            sweep_timer: IntervalTimer::new(self.config.sweep_interval(), now),
        };

        ResourceManager {
            inner: Arc::new(Inner {
                registry: Mutex::new(registry),
                in_flight: Mutex::new(InFlight::default()),
                rendering: AtomicBool::new(self.config.start_rendering),
                loader: self.loader,
                cache,
                renderer,
                clock,
                config: self.config,
            }),
        }
    }
}

/// Central GPU resource manager
///
/// Cloning yields another handle to the same registry. The registry and
/// every native object still in it are released when the last handle drops.
#[derive(Clone)]
pub struct ResourceManager {
    inner: Arc<Inner>,
}

impl ResourceManager {
    /// Manager with default collaborators and configuration
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self::builder(loader).assemble()
    }

    pub fn builder(loader: Arc<dyn ResourceLoader>) -> ResourceManagerBuilder {
        ResourceManagerBuilder {
            loader,
            cache: None,
            renderer: None,
            clock: None,
            config: ManagerConfig::default(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// Insert or replace a resource.
    ///
    /// A missing or zero `size_hint` uses the kind's size estimate.
    /// Re-registering a key releases the previous payload and refreshes recency.
    pub fn register(
        &self,
        key: &str,
        resource: impl Into<GpuResource>,
        size_hint: Option<usize>,
    ) -> EntryInfo {
        self.inner.register(key, resource.into(), size_hint)
    }

    /// Release and remove a resource. Returns false if the key was absent.
    pub fn unregister(&self, key: &str) -> bool {
        self.inner.unregister(key)
    }

    /// Look up an entry and refresh its recency
    pub fn touch(&self, key: &str) -> Option<EntryInfo> {
        self.inner.touch(key)
    }

    /// Look up an entry without refreshing it
    pub fn entry(&self, key: &str) -> Option<EntryInfo> {
        self.inner
            .registry
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.info(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.registry.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.lock().entries.is_empty()
    }

    /// Registered keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.inner.registry.lock().entries.keys().cloned().collect()
    }

    /// Sum of approximate sizes in bytes
    pub fn memory_usage(&self) -> usize {
        self.inner
            .registry
            .lock()
            .entries
            .values()
            .map(|entry| entry.approximate_size_bytes)
            .sum()
    }

    /// Load a model and register it under `url`.
    ///
    /// Concurrent calls for the same URL share one load. Load failures are
    /// logged and returned.
    pub async fn preload_model(&self, url: &str) -> Result<PreloadStatus> {
        match self.begin_model_preload(url) {
            Preload::Ready(result) => result,
            Preload::Pending(load) => load.await,
        }
    }

    /// Load a texture, tune it for memory and register it under `url`.
    ///
    /// Mipmap generation is turned off and both filters set to linear.
    pub async fn preload_texture(&self, url: &str) -> Result<TextureInfo> {
        match self.begin_texture_preload(url) {
            Preload::Ready(result) => result,
            Preload::Pending(load) => load.await,
        }
    }

    fn begin_model_preload(&self, url: &str) -> Preload<PreloadStatus> {
        let mut in_flight = self.inner.in_flight.lock();

        if self.inner.touch(url).is_some() {
            // A load left behind by a dropped caller has nothing left to do
            if in_flight.models.remove(url).is_some() {
                debug!(url, "discarded stale model load");
            }
            debug!(url, "model already resident");
            return Preload::Ready(Ok(PreloadStatus::Resident));
        }
        if let Some((_, load)) = in_flight.models.get(url) {
            debug!(url, "joining in-flight model load");
            return Preload::Pending(load.clone());
        }
        if self.inner.cache.get(&model_cache_key(url)).is_some() {
            debug!(url, "model load already requested");
            return Preload::Ready(Ok(PreloadStatus::Requested));
        }

        let id = in_flight.next_id();
        let load = self.spawn_model_load(url, id);
        in_flight.models.insert(url.to_string(), (id, load.clone()));
        Preload::Pending(load)
    }

    fn begin_texture_preload(&self, url: &str) -> Preload<TextureInfo> {
        let mut in_flight = self.inner.in_flight.lock();

        if let Some(hit) = self.inner.touch_texture(url) {
            if hit.is_ok() && in_flight.textures.remove(url).is_some() {
                debug!(url, "discarded stale texture load");
            }
            return Preload::Ready(hit);
        }
        if let Some((_, load)) = in_flight.textures.get(url) {
            debug!(url, "joining in-flight texture load");
            return Preload::Pending(load.clone());
        }

        let id = in_flight.next_id();
        let load = self.spawn_texture_load(url, id);
        in_flight.textures.insert(url.to_string(), (id, load.clone()));
        Preload::Pending(load)
    }

    fn spawn_model_load(&self, url: &str, id: u64) -> SharedLoad<PreloadStatus> {
        let progress_url = url.to_string();
        let progress: ProgressCallback = Arc::new(move |progress: LoadProgress| {
            debug!(
                url = progress_url.as_str(),
                loaded = progress.loaded_bytes,
                total = ?progress.total_bytes,
                "model load progress"
            );
        });
        let load = self.inner.loader.load_model(url, Some(progress));
        let weak = Arc::downgrade(&self.inner);
        let url = url.to_string();

        async move {
            let result = load.await;
            // Only a `Weak` is held so the in-flight map does not keep the
            // manager alive. Any caller polling this owns a handle, so the
            // upgrade fails only if the future is polled through some other
            // path after teardown.
            let Some(inner) = weak.upgrade() else {
                if let Ok(model) = result {
                    GpuResource::from(model).release();
                }
                return Err(ResourceError::Shutdown(url));
            };

            let outcome = match result {
                Ok(model) => {
                    let info = inner.register(&url, model.into(), None);
                    inner.cache.set(
                        &model_cache_key(&url),
                        MODEL_REQUESTED_MARKER.to_string(),
                        inner.config.model_cache_ttl(),
                    );
                    Ok(PreloadStatus::Loaded(info))
                }
                Err(err) => {
                    error!(url = url.as_str(), error = %err, "model preload failed");
                    Err(err)
                }
            };
            remove_if_current(&mut inner.in_flight.lock().models, &url, id);
            outcome
        }
        .boxed()
        .shared()
    }

    fn spawn_texture_load(&self, url: &str, id: u64) -> SharedLoad<TextureInfo> {
        let load = self.inner.loader.load_texture(url);
        let weak = Arc::downgrade(&self.inner);
        let url = url.to_string();

        async move {
            let result = load.await;
            // Only a `Weak` is held so the in-flight map does not keep the
            // manager alive. Any caller polling this owns a handle, so the
            // upgrade fails only if the future is polled through some other
            // path after teardown.
            let Some(inner) = weak.upgrade() else {
                if let Ok(texture) = result {
                    GpuResource::from(texture).release();
                }
                return Err(ResourceError::Shutdown(url));
            };

            let outcome = match result {
                Ok(mut texture) => {
                    texture.set_generate_mipmaps(false);
                    texture.set_filters(TextureFilter::Linear, TextureFilter::Linear);
                    let size = texture.size_estimate();
                    let info = TextureInfo::new(&url, &texture, size);
                    inner.register(&url, texture.into(), Some(size));
                    Ok(info)
                }
                Err(err) => {
                    error!(url = url.as_str(), error = %err, "texture preload failed");
                    Err(err)
                }
            };
            remove_if_current(&mut inner.in_flight.lock().textures, &url, id);
            outcome
        }
        .boxed()
        .shared()
    }

    /// Number of loads currently in flight, textures and models combined
    pub fn pending_loads(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Release every entry idle longer than the configured threshold
    pub fn dispose_unused_resources(&self) -> usize {
        self.inner.dispose_unused()
    }

    /// Release every entry. Safe on an empty registry.
    pub fn clear_resources(&self) -> usize {
        self.inner.clear()
    }

    /// Idle sweep, then ask the renderer to drop its own GPU caches
    pub fn optimize_memory_usage(&self) -> usize {
        let disposed = self.inner.dispose_unused();
        self.inner.renderer.release_cached_memory();
        debug!(disposed, "optimized memory usage");
        disposed
    }

    pub fn pause_rendering(&self) {
        self.inner.rendering.store(false, Ordering::Release);
    }

    pub fn resume_rendering(&self) {
        self.inner.rendering.store(true, Ordering::Release);
    }

    pub fn is_rendering(&self) -> bool {
        self.inner.rendering.load(Ordering::Acquire)
    }

    /// Count one presented frame toward the next FPS sample
    pub fn record_frame(&self) {
        self.inner.registry.lock().frames += 1;
    }

    /// Recompute the stats snapshot now
    pub fn update_stats(&self) -> ResourceStats {
        self.inner.update_stats()
    }

    /// Last computed stats snapshot
    pub fn get_stats(&self) -> ResourceStats {
        self.inner.registry.lock().stats.clone()
    }

    /// Run whichever periodic jobs are due. Call once per frame.
    ///
    /// The sweep runs before the stats recompute so a snapshot taken on the
    /// same tick reflects the disposals.
    pub fn tick(&self) -> MaintenanceReport {
        let now = self.inner.clock.now();
        let (sweep_due, stats_due) = {
            let mut registry = self.inner.registry.lock();
            (
                registry.sweep_timer.poll(now),
                registry.stats_timer.poll(now),
            )
        };

        MaintenanceReport {
            disposed: sweep_due.then(|| self.inner.dispose_unused()),
            stats: stats_due.then(|| self.inner.update_stats()),
        }
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("entries", &self.len())
            .field("rendering", &self.is_rendering())
            .field("pending_loads", &self.pending_loads())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Geometry, Material, NativeHandle, Texture};
    use crate::time::ManualClock;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct Counted(Arc<AtomicUsize>);

    impl NativeHandle for Counted {
        fn release(self: Box<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NoLoader;

    impl ResourceLoader for NoLoader {
        fn load_model(
            &self,
            url: &str,
            _progress: Option<ProgressCallback>,
        ) -> BoxFuture<'static, Result<crate::resources::ModelNode>> {
            let url = url.to_string();
            async move { Err(ResourceError::load(url, "offline")) }.boxed()
        }

        fn load_texture(&self, url: &str) -> BoxFuture<'static, Result<Texture>> {
            let url = url.to_string();
            async move { Err(ResourceError::load(url, "offline")) }.boxed()
        }
    }

    fn manager_with_clock() -> (ResourceManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let manager = ResourceManager::builder(Arc::new(NoLoader))
            .clock(clock.clone())
            .build()
            .unwrap();
        (manager, clock)
    }

    #[test]
    fn test_register_and_lookup() {
        let (manager, _clock) = manager_with_clock();
        let released = Arc::new(AtomicUsize::new(0));
        let info = manager.register("tex-a", Texture::new(512, 512, Counted(released)), None);

        assert_eq!(info.kind, ResourceKind::Texture);
        assert_eq!(info.approximate_size_bytes, 1_048_576);
        assert!(manager.contains("tex-a"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.memory_usage(), 1_048_576);
    }

    #[test]
    fn test_register_replaces_payload() {
        let (manager, _clock) = manager_with_clock();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        manager.register("geo", Geometry::new(10, Counted(first.clone())), None);
        manager.register("geo", Geometry::new(20, Counted(second.clone())), None);

        assert_eq!(manager.len(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(manager.entry("geo").unwrap().approximate_size_bytes, 240);
    }

    #[test]
    fn test_touch_refreshes_recency() {
        let (manager, clock) = manager_with_clock();
        let released = Arc::new(AtomicUsize::new(0));
        let registered = manager.register("mat", Material::new(Counted(released)), None);

        clock.advance(Duration::from_secs(30));
        assert_eq!(manager.entry("mat").unwrap().last_accessed_at, registered.last_accessed_at);

        let touched = manager.touch("mat").unwrap();
        let idle = touched.last_accessed_at - registered.last_accessed_at;
        assert_eq!(idle, Duration::from_secs(30));
        assert!(manager.touch("missing").is_none());
    }

    #[test]
    fn test_pause_and_resume() {
        let (manager, _clock) = manager_with_clock();
        assert!(manager.is_rendering());
        manager.pause_rendering();
        assert!(!manager.is_rendering());
        manager.resume_rendering();
        assert!(manager.is_rendering());
    }

    #[test]
    fn test_start_paused_from_config() {
        let config = ManagerConfig {
            start_rendering: false,
            ..ManagerConfig::default()
        };
        let manager = ResourceManager::builder(Arc::new(NoLoader))
            .config(config)
            .build()
            .unwrap();
        assert!(!manager.is_rendering());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ManagerConfig {
            sweep_interval_secs: 0,
            ..ManagerConfig::default()
        };
        let result = ResourceManager::builder(Arc::new(NoLoader)).config(config).build();
        assert!(matches!(result, Err(ResourceError::Config(_))));
    }

    #[test]
    fn test_fps_from_recorded_frames() {
        let (manager, clock) = manager_with_clock();
        for _ in 0..300 {
            manager.record_frame();
        }
        clock.advance(Duration::from_secs(5));
        assert_eq!(manager.update_stats().fps, 60);

        // Counter restarts after each sample
        clock.advance(Duration::from_secs(5));
        assert_eq!(manager.update_stats().fps, 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let (manager, _clock) = manager_with_clock();
            let handle = manager.clone();
            manager.register("a", Texture::new(4, 4, Counted(released.clone())), None);
            handle.register("b", Geometry::new(3, Counted(released.clone())), None);
            drop(manager);
            // Still one live handle
            assert_eq!(released.load(Ordering::SeqCst), 0);
        }
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }
}
