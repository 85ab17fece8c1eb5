use std::os::raw::{c_char, c_void};

use with_smaa::shim::library::RealResolver;
use with_smaa::shim::redirect::Replacement;
use with_smaa::shim::{self, address};

fn name(s: &'static [u8]) -> *const c_char {
    s.as_ptr() as *const c_char
}

#[test]
fn resolver_answers_for_itself() {
    let ptr = unsafe { shim::dlsym(libc::RTLD_DEFAULT, name(b"dlsym\0")) };
    assert_eq!(ptr, shim::dlsym as *mut c_void);
    assert_eq!(ptr, address(Replacement::Dlsym));
}

#[test]
fn replacements() {
    let cases: [(&[u8], Replacement); 4] = [
        (b"glXGetProcAddress\0", Replacement::GlxGetProcAddress),
        (b"glXGetProcAddressARB\0", Replacement::GlxGetProcAddress),
        (b"glXSwapBuffers\0", Replacement::GlxSwapBuffers),
        (b"eglSwapBuffers\0", Replacement::EglSwapBuffers),
    ];

    for &(symbol, replacement) in cases.iter() {
        let ptr = unsafe { shim::dlsym(libc::RTLD_DEFAULT, symbol.as_ptr() as *const c_char) };
        assert_eq!(ptr, address(replacement));
    }

    assert_eq!(
        address(Replacement::GlxSwapBuffers),
        shim::glXSwapBuffers as *mut c_void
    );
    assert_eq!(
        address(Replacement::GlxGetProcAddress),
        shim::glXGetProcAddress as *mut c_void
    );
}

#[test]
fn other_names_fall_through() {
    let resolver = RealResolver::bind().unwrap();
    let symbols: [&'static [u8]; 4] = [
        b"malloc\0",
        b"strlen\0",
        b"glXCreateContext\0",
        b"with_smaa_no_such_symbol\0",
    ];

    for &symbol in symbols.iter() {
        unsafe {
            assert_eq!(
                shim::dlsym(libc::RTLD_DEFAULT, name(symbol)),
                resolver.resolve(libc::RTLD_DEFAULT, name(symbol))
            );
        }
    }
}
