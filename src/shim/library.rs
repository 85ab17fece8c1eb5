//! The real entry points the shim forwards to.
//!
//! Nothing in here goes through the exported `dlsym`: the real resolver is looked up
//! by symbol version with `dlvsym`, and every other symbol is resolved with it.

use std::ffi::{CStr, CString};
use std::mem;
use std::os::raw::{c_char, c_uint, c_ulong, c_void};
use std::path::Path;

use crate::errors::*;

pub type DlsymFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> *mut c_void;
pub type GlxSwapBuffersFn = unsafe extern "C" fn(*mut c_void, c_ulong);
pub type GlxGetProcAddressFn = unsafe extern "C" fn(*const u8) -> *mut c_void;
pub type EglSwapBuffersFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> c_uint;
pub type EglGetProcAddressFn = unsafe extern "C" fn(*const c_char) -> *mut c_void;

extern "C" {
    fn dlvsym(handle: *mut c_void, symbol: *const c_char, version: *const c_char) -> *mut c_void;
}

/// Versions of the `dlsym` symbol, newest first. glibc 2.34 merged libdl into libc
/// and bumped the version, older releases only have the architecture baseline.
#[cfg(target_arch = "x86_64")]
const DLSYM_VERSIONS: [&[u8]; 2] = [b"GLIBC_2.34\0", b"GLIBC_2.2.5\0"];
#[cfg(target_arch = "x86")]
const DLSYM_VERSIONS: [&[u8]; 2] = [b"GLIBC_2.34\0", b"GLIBC_2.0\0"];
#[cfg(target_arch = "aarch64")]
const DLSYM_VERSIONS: [&[u8]; 2] = [b"GLIBC_2.34\0", b"GLIBC_2.17\0"];
#[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
const DLSYM_VERSIONS: [&[u8]; 1] = [b"GLIBC_2.34\0"];

/// The dynamic linker's own `dlsym`.
#[derive(Copy, Clone)]
pub struct RealResolver {
    dlsym: DlsymFn,
}

impl RealResolver {
    pub fn bind() -> Result<RealResolver> {
        for version in DLSYM_VERSIONS.iter() {
            let ptr = unsafe {
                dlvsym(
                    libc::RTLD_NEXT,
                    b"dlsym\0".as_ptr() as *const c_char,
                    version.as_ptr() as *const c_char,
                )
            };

            if !ptr.is_null() {
                let dlsym = unsafe { mem::transmute::<*mut c_void, DlsymFn>(ptr) };
                return Ok(RealResolver { dlsym });
            }
        }

        Err(Error::Symbol("dlsym".into()))
    }

    #[inline]
    pub unsafe fn resolve(&self, handle: *mut c_void, name: *const c_char) -> *mut c_void {
        (self.dlsym)(handle, name)
    }

    /// Resolves `name` in `library`, failing on a missing symbol.
    pub unsafe fn require(&self, library: &Library, name: &str) -> Result<*mut c_void> {
        let symbol = CString::new(name).map_err(|_| Error::Symbol(name.to_owned()))?;
        let ptr = self.resolve(library.handle, symbol.as_ptr());
        if ptr.is_null() {
            Err(Error::Symbol(format!("{} in {}", name, library.path)))
        } else {
            Ok(ptr)
        }
    }
}

/// A shared library, kept open until the process exits.
#[derive(Copy, Clone)]
pub struct Library {
    handle: *mut c_void,
    path: &'static str,
}

impl Library {
    pub fn open(path: &Path) -> Result<Library> {
        let desc = path.to_string_lossy().into_owned();
        let cpath = CString::new(desc.clone()).map_err(|_| Error::Library(desc.clone()))?;

        let handle = unsafe { libc::dlopen(cpath.as_ptr(), libc::RTLD_LAZY) };
        if handle.is_null() {
            let reason = unsafe {
                let err = libc::dlerror();
                if err.is_null() {
                    desc.clone()
                } else {
                    CStr::from_ptr(err).to_string_lossy().into_owned()
                }
            };

            return Err(Error::Library(reason));
        }

        info!("Loaded {}.", desc);
        Ok(Library {
            handle,
            // Libraries are opened at most twice per process.
            path: Box::leak(desc.into_boxed_str()),
        })
    }
}

/// The real GLX entry points.
#[derive(Copy, Clone)]
pub struct Glx {
    swap_buffers: GlxSwapBuffersFn,
    get_proc_address: GlxGetProcAddressFn,
}

impl Glx {
    pub fn bind(resolver: &RealResolver, path: &Path) -> Result<Glx> {
        let library = Library::open(path)?;
        unsafe {
            let swap_buffers = resolver.require(&library, "glXSwapBuffers")?;
            let get_proc_address = resolver.require(&library, "glXGetProcAddressARB")?;

            Ok(Glx {
                swap_buffers: mem::transmute(swap_buffers),
                get_proc_address: mem::transmute(get_proc_address),
            })
        }
    }

    #[inline]
    pub unsafe fn swap_buffers(&self, display: *mut c_void, drawable: c_ulong) {
        (self.swap_buffers)(display, drawable)
    }

    #[inline]
    pub unsafe fn get_proc_address(&self, name: *const u8) -> *mut c_void {
        (self.get_proc_address)(name)
    }

    /// Looks up an OpenGL function for `gl::load_with`.
    pub fn proc_address(&self, name: &str) -> *const c_void {
        match CString::new(name) {
            Ok(name) => unsafe { self.get_proc_address(name.as_ptr() as *const u8) },
            Err(_) => ::std::ptr::null(),
        }
    }
}

/// The real EGL entry points.
#[derive(Copy, Clone)]
pub struct Egl {
    resolver: RealResolver,
    swap_buffers: EglSwapBuffersFn,
    get_proc_address: EglGetProcAddressFn,
}

impl Egl {
    pub fn bind(resolver: &RealResolver, path: &Path) -> Result<Egl> {
        let library = Library::open(path)?;
        unsafe {
            let swap_buffers = resolver.require(&library, "eglSwapBuffers")?;
            let get_proc_address = resolver.require(&library, "eglGetProcAddress")?;

            Ok(Egl {
                resolver: *resolver,
                swap_buffers: mem::transmute(swap_buffers),
                get_proc_address: mem::transmute(get_proc_address),
            })
        }
    }

    #[inline]
    pub unsafe fn swap_buffers(&self, display: *mut c_void, surface: *mut c_void) -> c_uint {
        (self.swap_buffers)(display, surface)
    }

    /// Looks up an OpenGL function for `gl::load_with`.
    ///
    /// Before EGL 1.5 `eglGetProcAddress` only knows about extensions, core functions
    /// are then taken from whatever client library the host has loaded.
    pub fn proc_address(&self, name: &str) -> *const c_void {
        let name = match CString::new(name) {
            Ok(v) => v,
            Err(_) => return ::std::ptr::null(),
        };

        unsafe {
            let ptr = (self.get_proc_address)(name.as_ptr());
            if ptr.is_null() {
                self.resolver.resolve(libc::RTLD_DEFAULT, name.as_ptr())
            } else {
                ptr
            }
        }
    }
}
