use gl::types::*;

use super::super::{
    Binding, Capability, Filter, FramebufferTarget, Info, ShaderStage, TextureFormat, Wrap,
};

impl From<Capability> for GLenum {
    fn from(cap: Capability) -> Self {
        match cap {
            Capability::DepthTest => gl::DEPTH_TEST,
            Capability::Blend => gl::BLEND,
            Capability::CullFace => gl::CULL_FACE,
            Capability::FramebufferSrgb => gl::FRAMEBUFFER_SRGB,
        }
    }
}

impl From<Binding> for GLenum {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::VertexArray => gl::VERTEX_ARRAY_BINDING,
            Binding::Program => gl::CURRENT_PROGRAM,
            Binding::ActiveTexture => gl::ACTIVE_TEXTURE,
            Binding::Texture2D => gl::TEXTURE_BINDING_2D,
            Binding::ArrayBuffer => gl::ARRAY_BUFFER_BINDING,
            Binding::DrawFramebuffer => gl::DRAW_FRAMEBUFFER_BINDING,
            Binding::ReadFramebuffer => gl::READ_FRAMEBUFFER_BINDING,
        }
    }
}

impl From<Info> for GLenum {
    fn from(info: Info) -> Self {
        match info {
            Info::Vendor => gl::VENDOR,
            Info::Renderer => gl::RENDERER,
            Info::Version => gl::VERSION,
            Info::ShadingLanguageVersion => gl::SHADING_LANGUAGE_VERSION,
        }
    }
}

impl From<FramebufferTarget> for GLenum {
    fn from(target: FramebufferTarget) -> Self {
        match target {
            FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
            FramebufferTarget::Read => gl::READ_FRAMEBUFFER,
            FramebufferTarget::Both => gl::FRAMEBUFFER,
        }
    }
}

impl From<ShaderStage> for GLenum {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl From<Wrap> for GLenum {
    fn from(wrap: Wrap) -> Self {
        match wrap {
            Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            Wrap::Repeat => gl::REPEAT,
        }
    }
}

impl From<Filter> for GLenum {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => gl::NEAREST,
            Filter::Linear => gl::LINEAR,
        }
    }
}

/// Returns `(internal_format, format, pixel_type)` of a texture format.
pub fn texture_format(format: TextureFormat) -> (GLenum, GLenum, GLenum) {
    match format {
        TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        TextureFormat::RG8 => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
        TextureFormat::RGBA8 => (gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
        TextureFormat::SRGBA8 => (gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_BYTE),
    }
}
