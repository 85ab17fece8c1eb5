//! An in-memory graphics context.
//!
//! `HeadlessDevice` keeps every piece of state the injector reads or writes, and counts
//! the objects and operations it performs, so the snapshot and the pipeline could be
//! exercised without a GPU.

use std::collections::{HashMap, HashSet};

use crate::errors::*;

use super::{
    Binding, BufferId, Capability, Device, FramebufferId, FramebufferTarget, Info, ProgramId,
    Sampling, ShaderId, ShaderStage, Size, TextureFormat, TextureId, VertexArrayId, Viewport,
};

pub const MAX_TEXTURE_UNITS: usize = 16;

/// How many times each kind of operation has been issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub textures: usize,
    pub shaders: usize,
    pub programs: usize,
    pub framebuffers: usize,
    pub vertex_arrays: usize,
    pub buffers: usize,
    /// `tex_image` calls, i.e. texture storage (re)allocations.
    pub allocations: usize,
    pub draws: usize,
    pub clears: usize,
    /// Every state-changing call, resource creation included.
    pub writes: usize,
}

impl Counters {
    /// The number of GPU objects created so far.
    pub fn objects(&self) -> usize {
        self.textures
            + self.shaders
            + self.programs
            + self.framebuffers
            + self.vertex_arrays
            + self.buffers
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language: String,

    pub viewport: Viewport,
    pub vertex_array: VertexArrayId,
    pub program: ProgramId,
    pub array_buffer: BufferId,
    pub draw_framebuffer: FramebufferId,
    pub read_framebuffer: FramebufferId,
    /// Draw buffers of each framebuffer, as the host set them up. No `Device` call
    /// changes them.
    pub draw_buffers: HashMap<FramebufferId, Vec<u32>>,
    pub active_texture: u32,
    pub textures: [TextureId; MAX_TEXTURE_UNITS],
    pub enabled: HashSet<Capability>,
    pub clear_color: [f32; 4],

    /// Storage of every texture, as allocated by `tex_image` or `copy_tex_image`.
    pub storage: HashMap<TextureId, (TextureFormat, Size)>,
    /// Sampling of every texture it has been set on.
    pub sampling: HashMap<TextureId, Sampling>,
    /// Format and source region of every `copy_tex_image`, in order.
    pub copies: Vec<(TextureFormat, Viewport)>,
    /// Sources of every `create_shader`, in order.
    pub sources: Vec<(ShaderStage, String)>,
    /// Attribute locations bound before linking, in order.
    pub attributes: Vec<(u32, String)>,
    /// Uniform values set on the program in use, keyed by `(program, location)`.
    pub uniforms: HashMap<(ProgramId, i32), [f32; 4]>,
    pub clears: Vec<Clear>,
    pub draws: Vec<Draw>,
    pub counters: Counters,

    /// Makes `create_shader` fail for the given stage.
    pub fail_compile: Option<ShaderStage>,
    /// Makes `create_program` fail.
    pub fail_link: bool,
    /// Status reported for new framebuffers.
    pub framebuffer_status: u32,
    /// Pending diagnostic codes, popped by `error`.
    pub errors: Vec<u32>,

    names: u32,
}

/// A draw call, with the state it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub program: ProgramId,
    pub framebuffer: FramebufferId,
    pub viewport: Viewport,
    pub textures: [TextureId; 3],
    pub srgb: bool,
    pub count: i32,
}

/// A clear of the color buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Clear {
    pub framebuffer: FramebufferId,
    pub color: [f32; 4],
    /// Number of draws issued before this clear.
    pub draws: usize,
}

impl HeadlessDevice {
    /// Creates a context that reports `version` as its `GL_VERSION` string.
    pub fn new(version: &str) -> Self {
        HeadlessDevice {
            vendor: "Headless".to_owned(),
            renderer: "Headless".to_owned(),
            version: version.to_owned(),
            shading_language: String::new(),

            viewport: Viewport {
                x: 0,
                y: 0,
                width: 640,
                height: 480,
            },
            vertex_array: 0,
            program: 0,
            array_buffer: 0,
            draw_framebuffer: 0,
            read_framebuffer: 0,
            draw_buffers: HashMap::new(),
            active_texture: gl::TEXTURE0,
            textures: [0; MAX_TEXTURE_UNITS],
            enabled: HashSet::new(),
            clear_color: [0.0; 4],

            storage: HashMap::new(),
            sampling: HashMap::new(),
            copies: Vec::new(),
            sources: Vec::new(),
            attributes: Vec::new(),
            uniforms: HashMap::new(),
            clears: Vec::new(),
            draws: Vec::new(),
            counters: Counters::default(),

            fail_compile: None,
            fail_link: false,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            errors: Vec::new(),

            names: 0,
        }
    }

    /// Index of the active texture unit.
    #[inline]
    pub fn unit(&self) -> usize {
        (self.active_texture - gl::TEXTURE0) as usize
    }

    fn name(&mut self) -> u32 {
        self.names += 1;
        self.names
    }

    fn write(&mut self) {
        self.counters.writes += 1;
    }
}

impl Device for HeadlessDevice {
    unsafe fn info(&self, info: Info) -> Result<String> {
        Ok(match info {
            Info::Vendor => self.vendor.clone(),
            Info::Renderer => self.renderer.clone(),
            Info::Version => self.version.clone(),
            Info::ShadingLanguageVersion => self.shading_language.clone(),
        })
    }

    unsafe fn binding(&self, binding: Binding) -> u32 {
        match binding {
            Binding::VertexArray => self.vertex_array,
            Binding::Program => self.program,
            Binding::ActiveTexture => self.active_texture,
            Binding::Texture2D => self.textures[self.unit()],
            Binding::ArrayBuffer => self.array_buffer,
            Binding::DrawFramebuffer => self.draw_framebuffer,
            Binding::ReadFramebuffer => self.read_framebuffer,
        }
    }

    unsafe fn is_enabled(&self, cap: Capability) -> bool {
        self.enabled.contains(&cap)
    }

    unsafe fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    unsafe fn viewport(&self) -> Viewport {
        self.viewport
    }

    unsafe fn set_viewport(&mut self, viewport: Viewport) {
        self.write();
        self.viewport = viewport;
    }

    unsafe fn error(&mut self) -> Option<GlError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(GlError(self.errors.remove(0)))
        }
    }

    unsafe fn active_texture(&mut self, unit: u32) {
        self.write();
        if unit < gl::TEXTURE0 || unit >= gl::TEXTURE0 + MAX_TEXTURE_UNITS as u32 {
            self.errors.push(gl::INVALID_ENUM);
            return;
        }

        self.active_texture = unit;
    }

    unsafe fn bind_texture(&mut self, texture: TextureId) {
        self.write();
        let unit = self.unit();
        self.textures[unit] = texture;
    }

    unsafe fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        self.write();
        self.vertex_array = vao;
    }

    unsafe fn bind_buffer(&mut self, buffer: BufferId) {
        self.write();
        self.array_buffer = buffer;
    }

    unsafe fn bind_framebuffer(&mut self, target: FramebufferTarget, fbo: FramebufferId) {
        self.write();
        match target {
            FramebufferTarget::Draw => self.draw_framebuffer = fbo,
            FramebufferTarget::Read => self.read_framebuffer = fbo,
            FramebufferTarget::Both => {
                self.draw_framebuffer = fbo;
                self.read_framebuffer = fbo;
            }
        }
    }

    unsafe fn use_program(&mut self, program: ProgramId) {
        self.write();
        self.program = program;
    }

    unsafe fn enable(&mut self, cap: Capability) {
        self.write();
        self.enabled.insert(cap);
    }

    unsafe fn disable(&mut self, cap: Capability) {
        self.write();
        self.enabled.remove(&cap);
    }

    unsafe fn set_clear_color(&mut self, color: [f32; 4]) {
        self.write();
        self.clear_color = color;
    }

    unsafe fn clear(&mut self) {
        self.write();
        self.counters.clears += 1;
        let clear = Clear {
            framebuffer: self.draw_framebuffer,
            color: self.clear_color,
            draws: self.draws.len(),
        };

        self.clears.push(clear);
    }

    unsafe fn create_texture(&mut self) -> Result<TextureId> {
        self.write();
        self.counters.textures += 1;
        let id = self.name();
        let unit = self.unit();
        self.textures[unit] = id;
        Ok(id)
    }

    unsafe fn set_sampling(&mut self, sampling: Sampling) {
        self.write();
        let texture = self.textures[self.unit()];
        self.sampling.insert(texture, sampling);
    }

    unsafe fn tex_image(&mut self, format: TextureFormat, size: Size, data: Option<&[u8]>) {
        self.write();
        self.counters.allocations += 1;

        if let Some(bytes) = data {
            if bytes.len() < format.size(size) {
                self.errors.push(gl::INVALID_OPERATION);
                return;
            }
        }

        let texture = self.textures[self.unit()];
        self.storage.insert(texture, (format, size));
    }

    unsafe fn copy_tex_image(&mut self, format: TextureFormat, region: Viewport) {
        self.write();
        self.copies.push((format, region));
        let texture = self.textures[self.unit()];
        self.storage.insert(texture, (format, region.size()));
    }

    unsafe fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId> {
        self.write();
        self.sources.push((stage, source.to_owned()));

        if self.fail_compile == Some(stage) {
            return Err(Error::ShaderCompile {
                stage,
                log: "0:1(1): error: syntax error".to_owned(),
            });
        }

        self.counters.shaders += 1;
        Ok(self.name())
    }

    unsafe fn create_program(
        &mut self,
        shaders: &[ShaderId],
        attributes: &[(u32, &str)],
    ) -> Result<ProgramId> {
        self.write();
        for &(location, name) in attributes {
            self.attributes.push((location, name.to_owned()));
        }

        if self.fail_link || shaders.len() != 2 {
            return Err(Error::ProgramLink("error: linking failed".to_owned()));
        }

        self.counters.programs += 1;
        Ok(self.name())
    }

    unsafe fn uniform_location(&self, _: ProgramId, name: &str) -> i32 {
        uniform_location(name)
    }

    unsafe fn uniform_i32(&mut self, location: i32, value: i32) {
        self.write();
        let program = self.program;
        self.uniforms.insert((program, location), [value as f32, 0.0, 0.0, 0.0]);
    }

    unsafe fn uniform_vec4(&mut self, location: i32, value: [f32; 4]) {
        self.write();
        let program = self.program;
        self.uniforms.insert((program, location), value);
    }

    unsafe fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId> {
        self.write();
        if self.framebuffer_status != gl::FRAMEBUFFER_COMPLETE || texture == 0 {
            return Err(Error::FramebufferIncomplete(self.framebuffer_status));
        }

        self.counters.framebuffers += 1;
        self.draw_framebuffer = 0;
        self.read_framebuffer = 0;
        Ok(self.name())
    }

    unsafe fn create_quad(&mut self, vertices: &[f32]) -> Result<(VertexArrayId, BufferId)> {
        self.write();
        if vertices.len() % 2 != 0 {
            return Err(Error::Requirement("2D vertex positions".into()));
        }

        self.counters.vertex_arrays += 1;
        self.counters.buffers += 1;
        self.vertex_array = 0;
        self.array_buffer = 0;
        Ok((self.name(), self.name()))
    }

    unsafe fn draw_triangles(&mut self, count: i32) {
        self.write();
        self.counters.draws += 1;
        let draw = Draw {
            program: self.program,
            framebuffer: self.draw_framebuffer,
            viewport: self.viewport,
            textures: [self.textures[0], self.textures[1], self.textures[2]],
            srgb: self.enabled.contains(&Capability::FramebufferSrgb),
            count,
        };

        self.draws.push(draw);
    }
}

/// Deterministic locations, distinct for the handful of names a program declares.
pub fn uniform_location(name: &str) -> i32 {
    name.bytes()
        .fold(17i32, |acc, b| acc.wrapping_mul(31).wrapping_add(i32::from(b)))
        & 0x7fff
}
