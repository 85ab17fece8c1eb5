//! The constant inputs of the algorithm, baked in at build time.

use std::borrow::Cow;

use crate::errors::*;
use crate::video::backends::{Size, TextureFormat};

pub const AREATEX_SIZE: Size = Size {
    width: 160,
    height: 560,
};
pub const AREATEX_FORMAT: TextureFormat = TextureFormat::RG8;

pub const SEARCHTEX_SIZE: Size = Size {
    width: 64,
    height: 16,
};
pub const SEARCHTEX_FORMAT: TextureFormat = TextureFormat::R8;

static AREATEX_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/area_tex.bin"));
static SEARCHTEX_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/search_tex.bin"));
static SMAA_BODY: &str = include_str!(concat!(env!("OUT_DIR"), "/SMAA.hlsl"));

/// The two lookup textures and the shared algorithm body.
#[derive(Debug, Clone)]
pub struct Assets {
    pub area: Cow<'static, [u8]>,
    pub search: Cow<'static, [u8]>,
    pub shader_body: Cow<'static, str>,
}

impl Assets {
    /// The tables embedded into the library.
    pub fn embedded() -> Self {
        Assets {
            area: Cow::Borrowed(AREATEX_BYTES),
            search: Cow::Borrowed(SEARCHTEX_BYTES),
            shader_body: Cow::Borrowed(SMAA_BODY),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = AREATEX_FORMAT.size(AREATEX_SIZE);
        if self.area.len() != expected {
            return Err(Error::Asset(format!(
                "area texture has {} bytes, expected {}.",
                self.area.len(),
                expected
            )));
        }

        let expected = SEARCHTEX_FORMAT.size(SEARCHTEX_SIZE);
        if self.search.len() != expected {
            return Err(Error::Asset(format!(
                "search texture has {} bytes, expected {}.",
                self.search.len(),
                expected
            )));
        }

        if self.shader_body.trim().is_empty() {
            return Err(Error::Asset("shader body is empty.".into()));
        }

        Ok(())
    }
}
