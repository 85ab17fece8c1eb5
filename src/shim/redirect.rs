//! Which symbol lookups are answered with one of the replacements.

/// The replacement entry points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Replacement {
    Dlsym,
    /// Shared by `glXGetProcAddress` and `glXGetProcAddressARB`.
    GlxGetProcAddress,
    GlxSwapBuffers,
    EglSwapBuffers,
}

const DLSYM_TABLE: [(&[u8], Replacement); 5] = [
    (b"dlsym", Replacement::Dlsym),
    (b"glXGetProcAddress", Replacement::GlxGetProcAddress),
    (b"glXGetProcAddressARB", Replacement::GlxGetProcAddress),
    (b"glXSwapBuffers", Replacement::GlxSwapBuffers),
    (b"eglSwapBuffers", Replacement::EglSwapBuffers),
];

const GET_PROC_ADDRESS_TABLE: [(&[u8], Replacement); 1] =
    [(b"glXSwapBuffers", Replacement::GlxSwapBuffers)];

fn lookup(table: &[(&[u8], Replacement)], name: &[u8]) -> Option<Replacement> {
    table
        .iter()
        .find(|&&(symbol, _)| symbol == name)
        .map(|&(_, replacement)| replacement)
}

/// The replacement answering `dlsym(_, name)`, `None` if the real resolver should.
#[inline]
pub fn dlsym(name: &[u8]) -> Option<Replacement> {
    lookup(&DLSYM_TABLE, name)
}

/// The replacement answering `glXGetProcAddress[ARB](name)`, `None` if the real
/// `glXGetProcAddressARB` should.
#[inline]
pub fn get_proc_address(name: &[u8]) -> Option<Replacement> {
    lookup(&GET_PROC_ADDRESS_TABLE, name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dlsym_table() {
        assert_eq!(dlsym(b"dlsym"), Some(Replacement::Dlsym));
        assert_eq!(dlsym(b"glXGetProcAddress"), Some(Replacement::GlxGetProcAddress));
        assert_eq!(dlsym(b"glXGetProcAddressARB"), Some(Replacement::GlxGetProcAddress));
        assert_eq!(dlsym(b"glXSwapBuffers"), Some(Replacement::GlxSwapBuffers));
        assert_eq!(dlsym(b"eglSwapBuffers"), Some(Replacement::EglSwapBuffers));

        assert_eq!(dlsym(b"glClear"), None);
        assert_eq!(dlsym(b"dlsym_"), None);
        assert_eq!(dlsym(b"glxswapbuffers"), None);
        assert_eq!(dlsym(b""), None);
    }

    #[test]
    fn get_proc_address_table() {
        assert_eq!(get_proc_address(b"glXSwapBuffers"), Some(Replacement::GlxSwapBuffers));
        assert_eq!(get_proc_address(b"glXSwapIntervalEXT"), None);
        assert_eq!(get_proc_address(b"dlsym"), None);
    }
}
