//! Subpixel morphological anti-aliasing for any OpenGL application, injected with
//! `LD_PRELOAD`.
//!
//! Once preloaded, the library replaces the frame presentation functions of GLX and EGL.
//! Every frame the host presents is run through the three SMAA passes first, with the
//! graphics state the passes touch saved before and restored after, so the host never
//! notices.
//!
//! The pieces are usable on their own as well:
//!
//! * `video` talks to the graphics context through the `Device` trait, and captures and
//! restores its state.
//! * `smaa` is the post-processing pipeline.
//! * `shim` holds the exported replacements and the real entry points they forward to.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub mod errors;
pub mod logger;
pub mod settings;
pub mod shim;
pub mod smaa;
pub mod video;

pub use self::errors::{Error, Result};
pub use self::settings::Settings;
pub use self::smaa::{Smaa, SmaaParams};
