use std::cmp;
use std::fmt;

use crate::errors::*;
use crate::video::backends::{Device, Info};

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Version::GL(major, minor) => write!(f, "GL {}.{}", major, minor),
            Version::ES(major, minor) => write!(f, "GLES {}.{}", major, minor),
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`, e.g. `4.6.0 NVIDIA 535.54`,
    /// `3.0 Mesa 23.1.4` or `OpenGL ES 3.2 Mesa 23.1.4`.
    pub fn parse(desc: &str) -> Result<Version> {
        let (es, rest) = if desc.starts_with("OpenGL ES-") {
            // "OpenGL ES-CM 1.1" and friends.
            (true, desc.splitn(3, ' ').nth(2).unwrap_or(""))
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let number = rest
            .split(' ')
            .next()
            .ok_or_else(|| Error::Version(desc.to_owned()))?;

        let mut iter = number.split('.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Version(desc.to_owned()))?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Version(desc.to_owned()))?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the version of the current context.
    pub unsafe fn query<D: Device + ?Sized>(device: &D) -> Result<Version> {
        Version::parse(&device.info(Info::Version)?)
    }
}

/// Represents the descriptive strings of the context, used for diagnostics only.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,
    /// The version or release number of the shading language.
    pub shading_language: String,
}

impl Capabilities {
    pub unsafe fn parse<D: Device + ?Sized>(device: &D) -> Result<Capabilities> {
        Ok(Capabilities {
            version: Version::query(device)?,
            vendor: device.info(Info::Vendor).unwrap_or_default(),
            renderer: device.info(Info::Renderer).unwrap_or_default(),
            shading_language: device.info(Info::ShadingLanguageVersion).unwrap_or_default(),
        })
    }
}
