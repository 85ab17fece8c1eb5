//! The three-pass SMAA post-process, run on the frame the host is about to present.
//!
//! `Smaa` is created without touching the graphics context. The GPU side is built by
//! `init`, on the first frame, and every following `update` renders:
//!
//! 1. edge detection from a copy of the color buffer into the edge target,
//! 2. blending weights from the edges and the lookup tables into the blend target,
//! 3. neighborhood blending of the color buffer into the host's own framebuffer.
//!
//! The pipeline leaves the context in a dirty state. Callers are expected to wrap it in
//! a `GraphicsStateSnapshot` save/restore pair.

pub mod assets;
pub mod shader;

use crate::errors::*;
use crate::video::backends::gl::Capabilities;
use crate::video::backends::{
    Capability, Device, FramebufferId, FramebufferTarget, ProgramId, Sampling, ShaderStage, Size,
    TextureFormat, TextureId, VertexArrayId, Viewport,
};

use self::assets::{Assets, AREATEX_FORMAT, AREATEX_SIZE, SEARCHTEX_FORMAT, SEARCHTEX_SIZE};
use self::shader::{Dialect, EdgeDetection, Pass, Preset, ShaderSource, RT_METRICS_UNIFORM};

pub use self::shader::{CORE_VERSION, MIN_VERSION};

/// Two triangles covering the unit square.
const QUAD: [f32; 12] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
const QUAD_VERTICES: i32 = 6;

const RENDER_TARGET_FORMAT: TextureFormat = TextureFormat::RGBA8;

/// Compile-time choices of the algorithm.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SmaaParams {
    pub preset: Preset,
    pub edge_detection: EdgeDetection,
}

#[derive(Debug, Copy, Clone)]
struct Program {
    id: ProgramId,
    rt_metrics: i32,
    /// Sampler locations, indexed by the texture unit they read from.
    samplers: [i32; 3],
    units: usize,
}

impl Program {
    unsafe fn bind<D: Device + ?Sized>(&self, device: &mut D, metrics: [f32; 4]) {
        device.use_program(self.id);
        device.uniform_vec4(self.rt_metrics, metrics);
        for (unit, &location) in self.samplers[..self.units].iter().enumerate() {
            device.uniform_i32(location, unit as i32);
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct RenderTarget {
    texture: TextureId,
    framebuffer: FramebufferId,
}

#[derive(Debug)]
struct Resources {
    area_tex: TextureId,
    search_tex: TextureId,
    color_tex: TextureId,
    edge: RenderTarget,
    blend: RenderTarget,
    edge_program: Program,
    blend_program: Program,
    neighborhood_program: Program,
    /// The quad buffer is only referenced through the vertex array.
    vao: VertexArrayId,
    old_size: Size,
}

#[derive(Debug)]
enum Status {
    Uninitialized,
    /// The context is too old, or not a desktop one.
    Incompatible,
    /// Setup went wrong half-way. Whatever was created is leaked for the lifetime of
    /// the process.
    Failed,
    Ready(Resources),
}

pub struct Smaa {
    params: SmaaParams,
    assets: Assets,
    status: Status,
    legacy: bool,
}

impl Smaa {
    /// Creates the pipeline. No graphics call is made until `init`.
    pub fn new(params: SmaaParams, assets: Assets) -> Self {
        Smaa {
            params,
            assets,
            status: Status::Uninitialized,
            legacy: false,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        match self.status {
            Status::Ready(_) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_incompatible(&self) -> bool {
        match self.status {
            Status::Incompatible => true,
            _ => false,
        }
    }

    /// Whether `update` has become a no-op for good.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        match self.status {
            Status::Incompatible | Status::Failed => true,
            _ => false,
        }
    }

    /// Whether the legacy shader dialect has been selected.
    #[inline]
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Builds the GPU side of the pipeline on the current context.
    ///
    /// Only the first call does anything. Every outcome is final: an incompatible
    /// context or a failed setup leaves the pipeline as a permanent no-op.
    pub unsafe fn init<D: Device + ?Sized>(&mut self, device: &mut D) {
        match self.status {
            Status::Uninitialized => (),
            _ => return,
        }

        let version = match Capabilities::parse(device) {
            Ok(caps) => {
                info!(
                    "{} ({}), {}, GLSL {}.",
                    caps.renderer, caps.vendor, caps.version, caps.shading_language
                );
                caps.version
            }
            Err(err) => {
                warn!("{} Post-processing is disabled.", err);
                self.status = Status::Incompatible;
                return;
            }
        };

        let dialect = match Dialect::select(version) {
            Some(v) => v,
            None => {
                warn!(
                    "{} is not supported, at least {} is required. Post-processing is disabled.",
                    version, MIN_VERSION
                );
                self.status = Status::Incompatible;
                return;
            }
        };

        self.legacy = dialect == Dialect::Legacy;
        info!("Using the {:?} shader dialect on {}.", dialect, version);

        match self.setup(device, dialect) {
            Ok(resources) => {
                info!(
                    "SMAA ready ({:?}, {:?} edges) at {}x{}.",
                    self.params.preset,
                    self.params.edge_detection,
                    resources.old_size.width,
                    resources.old_size.height
                );
                self.status = Status::Ready(resources);
            }
            Err(err) => {
                error!("{} Post-processing is disabled.", err);
                self.status = Status::Failed;
            }
        }
    }

    unsafe fn setup<D: Device + ?Sized>(
        &self,
        device: &mut D,
        dialect: Dialect,
    ) -> Result<Resources> {
        self.assets.validate()?;

        device.active_texture(gl::TEXTURE0);

        let area_tex = texture(device)?;
        device.tex_image(AREATEX_FORMAT, AREATEX_SIZE, Some(&self.assets.area[..]));
        check_gl(device, "area texture");

        let search_tex = texture(device)?;
        device.tex_image(SEARCHTEX_FORMAT, SEARCHTEX_SIZE, Some(&self.assets.search[..]));
        check_gl(device, "search texture");

        let color_tex = texture(device)?;
        check_gl(device, "color texture");

        let source = ShaderSource {
            dialect,
            preset: self.params.preset,
            edge_detection: self.params.edge_detection,
            body: &self.assets.shader_body,
        };

        let edge_program = program(device, &source, Pass::EdgeDetection, &["in_tex"])?;
        let blend_program = program(
            device,
            &source,
            Pass::BlendingWeight,
            &["in_tex", "in_area_tex", "in_search_tex"],
        )?;
        let neighborhood_program = program(
            device,
            &source,
            Pass::NeighborhoodBlending,
            &["in_tex", "in_blend_tex"],
        )?;

        let size = device.viewport().size();
        // Zero sized attachments are never complete, the first real size triggers a resize.
        let storage = Size::new(size.width.max(1), size.height.max(1));

        let edge = render_target(device, storage)?;
        check_gl(device, "edge target");
        let blend = render_target(device, storage)?;
        check_gl(device, "blend target");

        let (vao, _) = device.create_quad(&QUAD)?;
        check_gl(device, "quad");

        Ok(Resources {
            area_tex,
            search_tex,
            color_tex,
            edge,
            blend,
            edge_program,
            blend_program,
            neighborhood_program,
            vao,
            old_size: size,
        })
    }

    /// Anti-aliases the viewport rectangle of the default framebuffer in place.
    pub unsafe fn update<D: Device + ?Sized>(&mut self, device: &mut D) {
        let res = match self.status {
            Status::Ready(ref mut v) => v,
            _ => return,
        };

        let viewport = device.viewport();
        let size = viewport.size();
        if size.width <= 0 || size.height <= 0 {
            return;
        }

        device.disable(Capability::DepthTest);
        device.disable(Capability::Blend);
        device.disable(Capability::CullFace);
        device.disable(Capability::FramebufferSrgb);

        if size != res.old_size {
            info!(
                "Resizing render targets from {}x{} to {}x{}.",
                res.old_size.width, res.old_size.height, size.width, size.height
            );

            device.active_texture(gl::TEXTURE0);
            device.bind_texture(res.edge.texture);
            device.tex_image(RENDER_TARGET_FORMAT, size, None);
            device.bind_texture(res.blend.texture);
            device.tex_image(RENDER_TARGET_FORMAT, size, None);
            res.old_size = size;
        }

        let metrics = [
            1.0 / size.width as f32,
            1.0 / size.height as f32,
            size.width as f32,
            size.height as f32,
        ];

        trace!("SMAA frame at {}x{}.", size.width, size.height);

        // The color buffer the host is about to present.
        device.bind_framebuffer(FramebufferTarget::Both, 0);
        device.active_texture(gl::TEXTURE0);
        device.bind_texture(res.color_tex);
        device.copy_tex_image(TextureFormat::RGBA8, viewport);

        device.bind_vertex_array(res.vao);

        // The render targets are exactly the size of the host's viewport.
        device.set_viewport(Viewport {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        });

        // Edge detection.
        res.edge_program.bind(device, metrics);
        device.bind_framebuffer(FramebufferTarget::Draw, res.edge.framebuffer);
        device.set_clear_color([0.0; 4]);
        device.clear();
        device.draw_triangles(QUAD_VERTICES);

        // Blending weight calculation.
        device.bind_framebuffer(FramebufferTarget::Draw, res.blend.framebuffer);
        device.clear();
        res.blend_program.bind(device, metrics);
        device.active_texture(gl::TEXTURE0);
        device.bind_texture(res.edge.texture);
        device.active_texture(gl::TEXTURE0 + 1);
        device.bind_texture(res.area_tex);
        device.active_texture(gl::TEXTURE0 + 2);
        device.bind_texture(res.search_tex);
        device.draw_triangles(QUAD_VERTICES);

        // Neighborhood blending, straight into the host's framebuffer. The color buffer
        // is copied again, sRGB encoded this time.
        device.bind_framebuffer(FramebufferTarget::Draw, 0);
        device.set_viewport(viewport);
        device.active_texture(gl::TEXTURE0);
        device.bind_texture(res.color_tex);
        device.copy_tex_image(TextureFormat::SRGBA8, viewport);
        device.active_texture(gl::TEXTURE0 + 1);
        device.bind_texture(res.blend.texture);
        res.neighborhood_program.bind(device, metrics);
        device.enable(Capability::FramebufferSrgb);
        device.draw_triangles(QUAD_VERTICES);
        device.disable(Capability::FramebufferSrgb);
    }
}

/// Logs every pending diagnostic code of the context.
unsafe fn check_gl<D: Device + ?Sized>(device: &mut D, label: &str) {
    while let Some(err) = device.error() {
        warn!("{}: {}", label, Error::Gl(err));
    }
}

unsafe fn program<D: Device + ?Sized>(
    device: &mut D,
    source: &ShaderSource,
    pass: Pass,
    samplers: &[&str],
) -> Result<Program> {
    let failed = |err: Error| {
        error!("Failed to build the {} program.", pass);
        err
    };

    let vs = device
        .create_shader(ShaderStage::Vertex, &source.assemble(pass, ShaderStage::Vertex))
        .map_err(failed)?;
    let fs = device
        .create_shader(ShaderStage::Fragment, &source.assemble(pass, ShaderStage::Fragment))
        .map_err(failed)?;
    let id = device
        .create_program(&[vs, fs], source.dialect.attributes())
        .map_err(failed)?;
    check_gl(device, "program");

    let mut locations = [-1; 3];
    for (location, &name) in locations.iter_mut().zip(samplers) {
        *location = device.uniform_location(id, name);
    }

    Ok(Program {
        id,
        rt_metrics: device.uniform_location(id, RT_METRICS_UNIFORM),
        samplers: locations,
        units: samplers.len().min(3),
    })
}

/// Creates a texture, bound to the active unit, sampled the way the algorithm expects.
unsafe fn texture<D: Device + ?Sized>(device: &mut D) -> Result<TextureId> {
    let texture = device.create_texture()?;
    device.set_sampling(Sampling::CLAMP_LINEAR);
    Ok(texture)
}

unsafe fn render_target<D: Device + ?Sized>(device: &mut D, size: Size) -> Result<RenderTarget> {
    let texture = texture(device)?;
    device.tex_image(RENDER_TARGET_FORMAT, size, None);
    let framebuffer = device.create_framebuffer(texture)?;
    Ok(RenderTarget {
        texture,
        framebuffer,
    })
}
