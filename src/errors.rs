use std::fmt;

use crate::video::backends::ShaderStage;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "OpenGL implementation doesn't support {}.", _0)]
    Requirement(String),
    #[fail(display = "Can not parse version from str '{}'.", _0)]
    Version(String),
    #[fail(display = "Failed to compile {} shader, errors: \n{}", stage, log)]
    ShaderCompile { stage: ShaderStage, log: String },
    #[fail(display = "Failed to link program, errors: \n{}", _0)]
    ProgramLink(String),
    #[fail(display = "Framebuffer is incomplete, status: {:#x}.", _0)]
    FramebufferIncomplete(u32),
    #[fail(display = "[GL] {}", _0)]
    Gl(GlError),
    #[fail(display = "Embedded asset {}", _0)]
    Asset(String),
    #[fail(display = "Failed to open library: {}", _0)]
    Library(String),
    #[fail(display = "Failed to resolve symbol: {}", _0)]
    Symbol(String),
    #[fail(display = "Invalid setting: {}", _0)]
    Settings(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

/// A diagnostic code reported by `glGetError`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlError(pub u32);

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let desc = match self.0 {
            gl::INVALID_ENUM => "An unacceptable value is specified for an enumerated argument.",
            gl::INVALID_VALUE => "A numeric argument is out of range.",
            gl::INVALID_OPERATION => "The specified operation is not allowed in the current state.",
            gl::INVALID_FRAMEBUFFER_OPERATION => {
                "The command is trying to render to or read from the framebuffer while the \
                 currently bound framebuffer is not framebuffer complete."
            }
            gl::OUT_OF_MEMORY => "There is not enough memory left to execute the command.",
            gl::STACK_UNDERFLOW => "An operation would cause an internal stack to underflow.",
            gl::STACK_OVERFLOW => "An operation would cause an internal stack to overflow.",
            _ => "Oops, Unknown OpenGL error.",
        };

        write!(f, "{} ({:#x})", desc, self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gl_error_display() {
        let desc = format!("{}", Error::Gl(GlError(gl::INVALID_ENUM)));
        assert!(desc.starts_with("[GL] An unacceptable value"));
        assert!(desc.ends_with("(0x500)"));
    }
}
