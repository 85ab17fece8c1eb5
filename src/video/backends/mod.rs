//! The backend of the injector, which should be responsible for only one thing:
//! talking to the graphics context that the host application owns.
//!
//! Everything above this layer (the state snapshot and the SMAA pipeline) is written
//! against `Device`, so it can run on the real OpenGL context as well as on the
//! in-memory `HeadlessDevice`.

pub mod gl;
pub mod headless;

use std::fmt;

use crate::errors::*;

pub type TextureId = u32;
pub type ShaderId = u32;
pub type ProgramId = u32;
pub type FramebufferId = u32;
pub type VertexArrayId = u32;
pub type BufferId = u32;

/// Server-side toggles the pipeline disturbs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    Blend,
    CullFace,
    FramebufferSrgb,
}

/// Object bindings and selectors that could be queried with `glGetIntegerv`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    VertexArray,
    Program,
    /// The active texture unit, as `GL_TEXTURE0 + i`.
    ActiveTexture,
    /// The 2D texture bound to the active texture unit.
    Texture2D,
    ArrayBuffer,
    DrawFramebuffer,
    ReadFramebuffer,
}

/// Descriptive strings of the context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Info {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramebufferTarget {
    Draw,
    Read,
    /// Binds both draw and read targets.
    Both,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Wrap {
    ClampToEdge,
    Repeat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// How a texture is sampled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sampling {
    pub wrap: Wrap,
    pub filter: Filter,
}

impl Sampling {
    /// Clamp-to-edge wrapping with linear filtering, used by every texture of the pipeline.
    pub const CLAMP_LINEAR: Sampling = Sampling {
        wrap: Wrap::ClampToEdge,
        filter: Filter::Linear,
    };
}

/// Internal formats of the textures the pipeline allocates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    RG8,
    RGBA8,
    /// 8-bit RGBA with sRGB encoded color channels.
    SRGBA8,
}

impl TextureFormat {
    pub fn components(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGBA8 | TextureFormat::SRGBA8 => 4,
        }
    }

    /// Returns the size in bytes of a tightly packed image with `size` dimensions.
    pub fn size(self, size: Size) -> usize {
        self.components() * size.width.max(0) as usize * size.height.max(0) as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// The graphics context operations used by the injector.
///
/// Every method works on whatever context is current on the calling thread. The
/// texture operations (`tex_image`, `copy_tex_image`) target the 2D texture bound to
/// the active unit, exactly as their OpenGL counterparts do.
pub trait Device {
    unsafe fn info(&self, info: Info) -> Result<String>;

    unsafe fn binding(&self, binding: Binding) -> u32;

    unsafe fn is_enabled(&self, cap: Capability) -> bool;

    unsafe fn clear_color(&self) -> [f32; 4];

    unsafe fn viewport(&self) -> Viewport;

    unsafe fn set_viewport(&mut self, viewport: Viewport);

    /// Pops one diagnostic code, `None` once the error queue is drained.
    unsafe fn error(&mut self) -> Option<GlError>;

    unsafe fn active_texture(&mut self, unit: u32);

    unsafe fn bind_texture(&mut self, texture: TextureId);

    unsafe fn bind_vertex_array(&mut self, vao: VertexArrayId);

    unsafe fn bind_buffer(&mut self, buffer: BufferId);

    unsafe fn bind_framebuffer(&mut self, target: FramebufferTarget, fbo: FramebufferId);

    unsafe fn use_program(&mut self, program: ProgramId);

    unsafe fn enable(&mut self, cap: Capability);

    unsafe fn disable(&mut self, cap: Capability);

    unsafe fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clears the color buffer of the bound draw framebuffer.
    unsafe fn clear(&mut self);

    /// Generates a texture and binds it to the active unit.
    unsafe fn create_texture(&mut self) -> Result<TextureId>;

    /// Sets the wrapping and filtering of the bound texture.
    unsafe fn set_sampling(&mut self, sampling: Sampling);

    /// (Re)allocates the storage of the bound texture, optionally uploading `data`.
    unsafe fn tex_image(&mut self, format: TextureFormat, size: Size, data: Option<&[u8]>);

    /// Copies the `region` rectangle of the read framebuffer into the bound texture, which
    /// is (re)allocated at the size of the region.
    unsafe fn copy_tex_image(&mut self, format: TextureFormat, region: Viewport);

    unsafe fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId>;

    /// Links a program, binding every `(location, name)` vertex input before linking.
    /// The shaders are detached and deleted afterwards, whatever the outcome.
    unsafe fn create_program(
        &mut self,
        shaders: &[ShaderId],
        attributes: &[(u32, &str)],
    ) -> Result<ProgramId>;

    unsafe fn uniform_location(&self, program: ProgramId, name: &str) -> i32;

    /// Sets an integer uniform of the program in use.
    unsafe fn uniform_i32(&mut self, location: i32, value: i32);

    /// Sets a vec4 uniform of the program in use.
    unsafe fn uniform_vec4(&mut self, location: i32, value: [f32; 4]);

    /// Creates a framebuffer with `texture` as its only color attachment. The default
    /// framebuffer is bound afterwards.
    unsafe fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId>;

    /// Uploads 2D positions into a static buffer and describes it as vertex attribute 0
    /// of a fresh vertex array. Both are unbound afterwards.
    unsafe fn create_quad(&mut self, vertices: &[f32]) -> Result<(VertexArrayId, BufferId)>;

    unsafe fn draw_triangles(&mut self, count: i32);
}
