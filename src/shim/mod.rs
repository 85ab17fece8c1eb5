//! The preloaded entry points.
//!
//! The host resolves `glXSwapBuffers`, `eglSwapBuffers`, `glXGetProcAddress[ARB]` and
//! `dlsym` to the functions below instead of the real ones. Each of them reaches the
//! single `Shim` of the process, built on the first call and alive until the process
//! exits, and hands it to the replacement body.
//!
//! Everything runs on the thread that presents frames, which owns the graphics context
//! for its whole lifetime. Presenting from several threads at once is not supported.
//!
//! Lookups that are not redirected are forwarded to the real `dlsym`, which sees this
//! library as its caller. A host calling `dlsym(RTLD_NEXT, ..)` therefore gets the next
//! definition after `libwith_smaa` in load order, not after the object that made the
//! call. Since the shim is preloaded first this is usually the same symbol, but hosts
//! relying on `RTLD_NEXT` from their own interposers may observe the difference.

pub mod library;
pub mod redirect;

use std::ffi::CStr;
use std::os::raw::{c_char, c_uint, c_ulong, c_void};
use std::process;

use log::LevelFilter;

use crate::errors::*;
use crate::logger;
use crate::settings::Settings;
use crate::smaa::assets::Assets;
use crate::smaa::Smaa;
use crate::video::backends::gl::GLDevice;
use crate::video::backends::Device;
use crate::video::GraphicsStateSnapshot;

use self::library::{Egl, Glx, RealResolver};
use self::redirect::Replacement;

const LIBGL: &str = "libGL.so";
const LIBEGL: &str = "libEGL.so";

/// The pipeline and the context it renders with, built on the first presented frame.
struct Frame {
    device: GLDevice,
    smaa: Smaa,
}

/// State shared by every replacement.
pub struct Shim {
    settings: Settings,
    resolver: RealResolver,
    glx: Option<Glx>,
    egl: Option<Egl>,
    frame: Option<Frame>,
}

impl Shim {
    fn new() -> Self {
        let (settings, errors) = Settings::load();
        logger::init(settings.log_level);

        for err in errors {
            warn!("{} The default is used instead.", err);
        }

        info!("with_smaa {} loaded.", env!("CARGO_PKG_VERSION"));
        if !settings.enabled {
            info!("Post-processing is disabled, frames are forwarded untouched.");
        }

        Shim {
            settings,
            resolver: ins::resolver(),
            glx: None,
            egl: None,
            frame: None,
        }
    }

    /// The real GLX functions, bound on first use.
    fn glx(&mut self) -> Glx {
        if let Some(glx) = self.glx {
            return glx;
        }

        let glx = Glx::bind(&self.resolver, &self.settings.library(LIBGL))
            .unwrap_or_else(|err| fatal(err));
        self.glx = Some(glx);
        glx
    }

    /// The real EGL functions, bound on first use.
    fn egl(&mut self) -> Egl {
        if let Some(egl) = self.egl {
            return egl;
        }

        let egl = Egl::bind(&self.resolver, &self.settings.library(LIBEGL))
            .unwrap_or_else(|err| fatal(err));
        self.egl = Some(egl);
        egl
    }

    /// Post-processes the frame about to be presented, leaving the context as it was.
    unsafe fn present<F>(&mut self, loader: F)
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        if !self.settings.enabled {
            return;
        }

        let params = self.settings.params();
        let frame = self.frame.get_or_insert_with(|| Frame {
            device: GLDevice::load_with(loader),
            smaa: Smaa::new(params, Assets::embedded()),
        });

        post_process(&mut frame.smaa, &mut frame.device);
    }
}

/// Runs `smaa` on the frame in `device`, restoring the state the host left behind.
///
/// The pipeline is set up on the first call. Once it gave up, the context is not even
/// read anymore.
pub unsafe fn post_process<D: Device + ?Sized>(smaa: &mut Smaa, device: &mut D) {
    if smaa.is_disabled() {
        return;
    }

    let snapshot = GraphicsStateSnapshot::save(device);
    smaa.init(device);
    smaa.update(device);
    snapshot.restore(device);
}

/// Logs an unrecoverable error and terminates the host.
fn fatal(err: Error) -> ! {
    // The logger might not be there yet when resolving the real `dlsym`.
    logger::init(LevelFilter::Error);
    error!("{}", err);
    process::exit(1)
}

/// The address of a replacement, as handed out by the resolvers.
pub fn address(replacement: Replacement) -> *mut c_void {
    match replacement {
        Replacement::Dlsym => dlsym as *mut c_void,
        Replacement::GlxGetProcAddress => glXGetProcAddress as *mut c_void,
        Replacement::GlxSwapBuffers => glXSwapBuffers as *mut c_void,
        Replacement::EglSwapBuffers => eglSwapBuffers as *mut c_void,
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn glXSwapBuffers(display: *mut c_void, drawable: c_ulong) {
    let shim = ins::ctx();
    let glx = shim.glx();
    shim.present(|name| glx.proc_address(name));
    glx.swap_buffers(display, drawable);
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn eglSwapBuffers(display: *mut c_void, surface: *mut c_void) -> c_uint {
    let shim = ins::ctx();
    let egl = shim.egl();
    shim.present(|name| egl.proc_address(name));
    egl.swap_buffers(display, surface)
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn glXGetProcAddress(name: *const u8) -> *mut c_void {
    let glx = ins::ctx().glx();
    if name.is_null() {
        return glx.get_proc_address(name);
    }

    let symbol = CStr::from_ptr(name as *const c_char).to_bytes();
    match redirect::get_proc_address(symbol) {
        Some(replacement) => {
            debug!(
                "glXGetProcAddress: redirecting {}.",
                String::from_utf8_lossy(symbol)
            );
            address(replacement)
        }
        None => glx.get_proc_address(name),
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn glXGetProcAddressARB(name: *const u8) -> *mut c_void {
    glXGetProcAddress(name)
}

#[no_mangle]
pub unsafe extern "C" fn dlsym(handle: *mut c_void, name: *const c_char) -> *mut c_void {
    let resolver = ins::resolver();
    if name.is_null() {
        return resolver.resolve(handle, name);
    }

    let symbol = CStr::from_ptr(name).to_bytes();
    match redirect::dlsym(symbol) {
        Some(replacement) => {
            debug!("dlsym: redirecting {}.", String::from_utf8_lossy(symbol));
            address(replacement)
        }
        None => resolver.resolve(handle, name),
    }
}

mod ins {
    use std::ptr;
    use std::sync::Once;

    use super::library::RealResolver;
    use super::{fatal, Shim};

    static SHIM_INIT: Once = Once::new();
    static mut SHIM: *mut Shim = ptr::null_mut();

    static RESOLVER_INIT: Once = Once::new();
    static mut RESOLVER: Option<RealResolver> = None;

    /// The shim of the process. It is never dropped.
    pub unsafe fn ctx() -> &'static mut Shim {
        SHIM_INIT.call_once(|| SHIM = Box::into_raw(Box::new(Shim::new())));
        &mut *SHIM
    }

    /// The real `dlsym`, looked up once without going through the replacement.
    pub fn resolver() -> RealResolver {
        unsafe {
            RESOLVER_INIT.call_once(|| {
                RESOLVER = Some(RealResolver::bind().unwrap_or_else(|err| fatal(err)));
            });

            match RESOLVER {
                Some(v) => v,
                None => fatal(crate::errors::Error::Symbol("dlsym".into())),
            }
        }
    }
}
