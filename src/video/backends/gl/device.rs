use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

use gl::types::*;

use crate::errors::*;
use crate::video::backends::{
    Binding, BufferId, Capability, Device, FramebufferId, FramebufferTarget, Info, ProgramId,
    Sampling, ShaderId, ShaderStage, Size, TextureFormat, TextureId, VertexArrayId, Viewport,
};

use super::types;

/// `Device` implemented on top of the OpenGL context current on the calling thread.
///
/// The function pointers of the `gl` crate are process-wide, they must be loaded with
/// `GLDevice::load_with` before any method is called.
#[derive(Debug, Default)]
pub struct GLDevice {}

impl GLDevice {
    /// Loads every OpenGL function through `loader`, which maps a symbol name to the
    /// address of the real entry point.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        GLDevice {}
    }

    unsafe fn integer(pname: GLenum) -> GLint {
        let mut value = 0;
        gl::GetIntegerv(pname, &mut value);
        value
    }
}

impl Device for GLDevice {
    unsafe fn info(&self, info: Info) -> Result<String> {
        let name: GLenum = info.into();
        let s = gl::GetString(name);
        if s.is_null() {
            return Err(Error::Requirement(format!("string {:#x} of the context", name)));
        }

        Ok(CStr::from_ptr(s as *const _).to_string_lossy().into_owned())
    }

    unsafe fn binding(&self, binding: Binding) -> u32 {
        Self::integer(binding.into()) as u32
    }

    unsafe fn is_enabled(&self, cap: Capability) -> bool {
        gl::IsEnabled(cap.into()) == gl::TRUE
    }

    unsafe fn clear_color(&self) -> [f32; 4] {
        let mut color = [0.0; 4];
        gl::GetFloatv(gl::COLOR_CLEAR_VALUE, color.as_mut_ptr());
        color
    }

    unsafe fn viewport(&self) -> Viewport {
        let mut v: [GLint; 4] = [0; 4];
        gl::GetIntegerv(gl::VIEWPORT, v.as_mut_ptr());
        Viewport {
            x: v[0],
            y: v[1],
            width: v[2],
            height: v[3],
        }
    }

    unsafe fn set_viewport(&mut self, v: Viewport) {
        gl::Viewport(v.x, v.y, v.width, v.height);
    }

    unsafe fn error(&mut self) -> Option<GlError> {
        match gl::GetError() {
            gl::NO_ERROR => None,
            code => Some(GlError(code)),
        }
    }

    unsafe fn active_texture(&mut self, unit: u32) {
        gl::ActiveTexture(unit);
    }

    unsafe fn bind_texture(&mut self, texture: TextureId) {
        gl::BindTexture(gl::TEXTURE_2D, texture);
    }

    unsafe fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        gl::BindVertexArray(vao);
    }

    unsafe fn bind_buffer(&mut self, buffer: BufferId) {
        gl::BindBuffer(gl::ARRAY_BUFFER, buffer);
    }

    unsafe fn bind_framebuffer(&mut self, target: FramebufferTarget, fbo: FramebufferId) {
        gl::BindFramebuffer(target.into(), fbo);
    }

    unsafe fn use_program(&mut self, program: ProgramId) {
        gl::UseProgram(program);
    }

    unsafe fn enable(&mut self, cap: Capability) {
        gl::Enable(cap.into());
    }

    unsafe fn disable(&mut self, cap: Capability) {
        gl::Disable(cap.into());
    }

    unsafe fn set_clear_color(&mut self, color: [f32; 4]) {
        gl::ClearColor(color[0], color[1], color[2], color[3]);
    }

    unsafe fn clear(&mut self) {
        gl::Clear(gl::COLOR_BUFFER_BIT);
    }

    unsafe fn create_texture(&mut self) -> Result<TextureId> {
        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            return Err(Error::Requirement("texture objects".into()));
        }

        gl::BindTexture(gl::TEXTURE_2D, id);
        Ok(id)
    }

    unsafe fn set_sampling(&mut self, sampling: Sampling) {
        let wrap = GLenum::from(sampling.wrap) as GLint;
        let filter = GLenum::from(sampling.filter) as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
    }

    unsafe fn tex_image(&mut self, format: TextureFormat, size: Size, data: Option<&[u8]>) {
        let (internal_format, format, pixel_type) = types::texture_format(format);
        let value = match data {
            Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
            _ => ptr::null(),
        };

        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format as GLint,
            size.width,
            size.height,
            0,
            format,
            pixel_type,
            value,
        );
    }

    unsafe fn copy_tex_image(&mut self, format: TextureFormat, region: Viewport) {
        let (internal_format, _, _) = types::texture_format(format);
        gl::CopyTexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format,
            region.x,
            region.y,
            region.width,
            region.height,
            0,
        );
    }

    unsafe fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId> {
        let shader = gl::CreateShader(stage.into());
        if shader == 0 {
            return Err(Error::Requirement("shader objects".into()));
        }

        // The whole source goes in as one string with an explicit length, so interior
        // terminators in the embedded body can not truncate it.
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        gl::ShaderSource(shader, 1, &ptr, &len);
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteShader(shader);

            Err(Error::ShaderCompile {
                stage,
                log: info_log(buf),
            })
        } else {
            Ok(shader)
        }
    }

    unsafe fn create_program(
        &mut self,
        shaders: &[ShaderId],
        attributes: &[(u32, &str)],
    ) -> Result<ProgramId> {
        let program = gl::CreateProgram();
        if program == 0 {
            return Err(Error::Requirement("program objects".into()));
        }

        for &shader in shaders {
            gl::AttachShader(program, shader);
        }

        for &(location, name) in attributes {
            let name = CString::new(name).map_err(|_| Error::ProgramLink(name.to_owned()))?;
            gl::BindAttribLocation(program, location, name.as_ptr());
        }

        gl::LinkProgram(program);

        for &shader in shaders {
            gl::DetachShader(program, shader);
            gl::DeleteShader(shader);
        }

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteProgram(program);

            Err(Error::ProgramLink(info_log(buf)))
        } else {
            Ok(program)
        }
    }

    unsafe fn uniform_location(&self, program: ProgramId, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => gl::GetUniformLocation(program, name.as_ptr()),
            Err(_) => -1,
        }
    }

    unsafe fn uniform_i32(&mut self, location: i32, value: i32) {
        gl::Uniform1i(location, value);
    }

    unsafe fn uniform_vec4(&mut self, location: i32, value: [f32; 4]) {
        gl::Uniform4fv(location, 1, value.as_ptr());
    }

    unsafe fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId> {
        let mut fbo = 0;
        gl::GenFramebuffers(1, &mut fbo);
        if fbo == 0 {
            return Err(Error::Requirement("framebuffer objects".into()));
        }

        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture,
            0,
        );

        let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        if status != gl::FRAMEBUFFER_COMPLETE {
            gl::DeleteFramebuffers(1, &fbo);
            return Err(Error::FramebufferIncomplete(status));
        }

        Ok(fbo)
    }

    unsafe fn create_quad(&mut self, vertices: &[f32]) -> Result<(VertexArrayId, BufferId)> {
        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        let mut vbo = 0;
        gl::GenBuffers(1, &mut vbo);
        if vao == 0 || vbo == 0 {
            return Err(Error::Requirement("vertex array objects".into()));
        }

        gl::BindVertexArray(vao);
        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            (vertices.len() * ::std::mem::size_of::<f32>()) as GLsizeiptr,
            vertices.as_ptr() as *const c_void,
            gl::STATIC_DRAW,
        );

        gl::EnableVertexAttribArray(0);
        gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, 0, ptr::null());

        gl::BindVertexArray(0);
        gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        Ok((vao, vbo))
    }

    unsafe fn draw_triangles(&mut self, count: i32) {
        gl::DrawArrays(gl::TRIANGLES, 0, count);
    }
}

fn info_log(mut buf: Vec<u8>) -> String {
    // Drops the trailing null character.
    while buf.last() == Some(&0) {
        buf.pop();
    }

    String::from_utf8_lossy(&buf).into_owned()
}
