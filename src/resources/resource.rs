use serde::{Deserialize, Serialize};
use std::fmt;

/// Native GPU object owned by a registry entry.
///
/// `release` consumes the handle, so each native object is released at most
/// once. The registry guarantees it is released at least once.
pub trait NativeHandle: Send + 'static {
    fn release(self: Box<Self>);
}

/// Resource kind tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Texture,
    Geometry,
    Material,
    Model,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Texture => "Texture",
            ResourceKind::Geometry => "Geometry",
            ResourceKind::Material => "Material",
            ResourceKind::Model => "Model",
        };
        f.write_str(name)
    }
}

/// Texture sampling filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Texture resource
pub struct Texture {
    width: u32,
    height: u32,
    generate_mipmaps: bool,
    min_filter: TextureFilter,
    mag_filter: TextureFilter,
    native: Box<dyn NativeHandle>,
}

impl Texture {
    /// New texture with mipmapped, trilinear sampling
    pub fn new(width: u32, height: u32, native: impl NativeHandle) -> Self {
        Self {
            width,
            height,
            generate_mipmaps: true,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            native: Box::new(native),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }
    pub fn min_filter(&self) -> TextureFilter {
        self.min_filter
    }
    pub fn mag_filter(&self) -> TextureFilter {
        self.mag_filter
    }

    pub fn set_generate_mipmaps(&mut self, enabled: bool) {
        self.generate_mipmaps = enabled;
    }

    pub fn set_filters(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.min_filter = min;
        self.mag_filter = mag;
    }

    /// RGBA8 footprint, mip chain not included
    pub fn size_estimate(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    fn release(self) -> usize {
        self.native.release();
        1
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("generate_mipmaps", &self.generate_mipmaps)
            .field("min_filter", &self.min_filter)
            .field("mag_filter", &self.mag_filter)
            .finish_non_exhaustive()
    }
}

/// Geometry resource (vertex buffers)
pub struct Geometry {
    vertex_count: usize,
    native: Box<dyn NativeHandle>,
}

impl Geometry {
    pub fn new(vertex_count: usize, native: impl NativeHandle) -> Self {
        Self {
            vertex_count,
            native: Box::new(native),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Positions only: three f32 per vertex
    pub fn size_estimate(&self) -> usize {
        self.vertex_count * 12
    }

    fn release(self) -> usize {
        self.native.release();
        1
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("vertex_count", &self.vertex_count)
            .finish_non_exhaustive()
    }
}

/// Material resource
pub struct Material {
    native: Box<dyn NativeHandle>,
}

impl Material {
    pub fn new(native: impl NativeHandle) -> Self {
        Self {
            native: Box::new(native),
        }
    }

    fn release(self) -> usize {
        self.native.release();
        1
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material").finish_non_exhaustive()
    }
}

/// Material binding of a mesh: one material or one per geometry group
#[derive(Debug)]
pub enum MaterialSlot {
    Single(Material),
    Multi(Vec<Material>),
}

impl MaterialSlot {
    pub fn len(&self) -> usize {
        match self {
            MaterialSlot::Single(_) => 1,
            MaterialSlot::Multi(materials) => materials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(self) -> usize {
        match self {
            MaterialSlot::Single(material) => material.release(),
            MaterialSlot::Multi(materials) => materials.into_iter().map(Material::release).sum(),
        }
    }
}

impl From<Material> for MaterialSlot {
    fn from(material: Material) -> Self {
        MaterialSlot::Single(material)
    }
}

impl From<Vec<Material>> for MaterialSlot {
    fn from(materials: Vec<Material>) -> Self {
        MaterialSlot::Multi(materials)
    }
}

/// Drawable leaf of a model: geometry plus its materials
#[derive(Debug)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: MaterialSlot,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: impl Into<MaterialSlot>) -> Self {
        Self {
            geometry,
            material: material.into(),
        }
    }

    fn release(self) -> usize {
        self.geometry.release() + self.material.release()
    }
}

/// Composite model node (scene subtree)
#[derive(Debug, Default)]
pub struct ModelNode {
    name: String,
    mesh: Option<Mesh>,
    children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: ModelNode) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn children(&self) -> &[ModelNode] {
        &self.children
    }

    /// Meshes in this subtree, depth-first
    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(mesh) = &node.mesh {
                out.push(mesh);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes().len()
    }

    pub fn material_count(&self) -> usize {
        self.meshes().iter().map(|mesh| mesh.material.len()).sum()
    }

    /// Sum of child geometry estimates
    pub fn size_estimate(&self) -> usize {
        self.meshes()
            .iter()
            .map(|mesh| mesh.geometry.size_estimate())
            .sum()
    }

    /// Release every geometry and material in the subtree
    fn release(self) -> usize {
        let mut released = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(mesh) = node.mesh {
                released += mesh.release();
            }
            stack.extend(node.children);
        }
        released
    }
}

/// GPU resource payload, one variant per kind
#[derive(Debug)]
pub enum GpuResource {
    Texture(Texture),
    Geometry(Geometry),
    Material(Material),
    Model(ModelNode),
}

impl GpuResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            GpuResource::Texture(_) => ResourceKind::Texture,
            GpuResource::Geometry(_) => ResourceKind::Geometry,
            GpuResource::Material(_) => ResourceKind::Material,
            GpuResource::Model(_) => ResourceKind::Model,
        }
    }

    /// Best-effort footprint in bytes
    pub fn size_estimate(&self) -> usize {
        match self {
            GpuResource::Texture(texture) => texture.size_estimate(),
            GpuResource::Geometry(geometry) => geometry.size_estimate(),
            GpuResource::Material(_) => 0,
            GpuResource::Model(model) => model.size_estimate(),
        }
    }

    /// Geometry buffers held by this resource
    pub fn geometry_count(&self) -> usize {
        match self {
            GpuResource::Geometry(_) => 1,
            GpuResource::Model(model) => model.mesh_count(),
            GpuResource::Texture(_) | GpuResource::Material(_) => 0,
        }
    }

    /// Release every native object, returning how many were released
    pub fn release(self) -> usize {
        match self {
            GpuResource::Texture(texture) => texture.release(),
            GpuResource::Geometry(geometry) => geometry.release(),
            GpuResource::Material(material) => material.release(),
            GpuResource::Model(model) => model.release(),
        }
    }
}

impl From<Texture> for GpuResource {
    fn from(texture: Texture) -> Self {
        GpuResource::Texture(texture)
    }
}

impl From<Geometry> for GpuResource {
    fn from(geometry: Geometry) -> Self {
        GpuResource::Geometry(geometry)
    }
}

impl From<Material> for GpuResource {
    fn from(material: Material) -> Self {
        GpuResource::Material(material)
    }
}

impl From<ModelNode> for GpuResource {
    fn from(model: ModelNode) -> Self {
        GpuResource::Model(model)
    }
}
