//! Source assembly of the three SMAA programs.
//!
//! Each stage is handed to the compiler as one contiguous string, built in this order:
//! settings preamble, stage macro, shared algorithm body, pass entry point. Some drivers
//! (Mesa at least) do not let a `#define` made in one string of a multi-string
//! `glShaderSource` take effect in a later string, so the order and the single unit
//! must be kept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::video::backends::gl::Version;
use crate::video::backends::ShaderStage;

/// Name of the vertex input carrying the quad corners.
pub const TEXCOORD_ATTRIBUTE: &str = "in_texcoord";
/// Name of the runtime metrics uniform, `{1/width, 1/height, width, height}`.
pub const RT_METRICS_UNIFORM: &str = "in_rt_metrics";

/// The oldest context the pipeline runs on.
pub const MIN_VERSION: Version = Version::GL(3, 0);
/// Contexts from this version on use the core dialect.
pub const CORE_VERSION: Version = Version::GL(3, 2);

/// Shader source dialect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// GLSL 1.30, vertex inputs bound by name before linking.
    Legacy,
    /// GLSL 3.30 with explicit location qualifiers.
    Core,
}

impl Dialect {
    /// Selects the dialect for a context, `None` if the context is not supported at all.
    pub fn select(version: Version) -> Option<Dialect> {
        if version >= CORE_VERSION {
            Some(Dialect::Core)
        } else if version >= MIN_VERSION {
            Some(Dialect::Legacy)
        } else {
            None
        }
    }

    fn version_directive(self) -> &'static str {
        match self {
            Dialect::Legacy => "#version 130\n",
            Dialect::Core => "#version 330\n",
        }
    }

    fn input(self) -> &'static str {
        match self {
            Dialect::Legacy => "in",
            Dialect::Core => "layout(location = 0) in",
        }
    }

    fn output(self) -> &'static str {
        match self {
            Dialect::Legacy => "out",
            Dialect::Core => "layout(location = 0) out",
        }
    }

    /// Vertex inputs that must be bound explicitly before linking.
    pub fn attributes(self) -> &'static [(u32, &'static str)] {
        match self {
            Dialect::Legacy => &[(0, TEXCOORD_ATTRIBUTE)],
            Dialect::Core => &[],
        }
    }
}

/// Quality presets of the reference implementation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Low,
    Medium,
    High,
    Ultra,
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Ultra
    }
}

impl Preset {
    fn define(self) -> &'static str {
        match self {
            Preset::Low => "#define SMAA_PRESET_LOW 1\n",
            Preset::Medium => "#define SMAA_PRESET_MEDIUM 1\n",
            Preset::High => "#define SMAA_PRESET_HIGH 1\n",
            Preset::Ultra => "#define SMAA_PRESET_ULTRA 1\n",
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Preset::Low),
            "medium" => Ok(Preset::Medium),
            "high" => Ok(Preset::High),
            "ultra" => Ok(Preset::Ultra),
            _ => Err(Error::Settings(format!("unknown preset '{}'", s))),
        }
    }
}

/// Which signal the edge detection pass looks at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDetection {
    Luma,
    Color,
}

impl Default for EdgeDetection {
    fn default() -> Self {
        EdgeDetection::Luma
    }
}

impl FromStr for EdgeDetection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "luma" => Ok(EdgeDetection::Luma),
            "color" | "colour" => Ok(EdgeDetection::Color),
            _ => Err(Error::Settings(format!("unknown edge detection '{}'", s))),
        }
    }
}

/// The three passes of the algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pass {
    EdgeDetection,
    BlendingWeight,
    NeighborhoodBlending,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Pass::EdgeDetection => write!(f, "edge detection"),
            Pass::BlendingWeight => write!(f, "blending weight"),
            Pass::NeighborhoodBlending => write!(f, "neighborhood blending"),
        }
    }
}

/// Everything that decides the text of a shader, apart from the pass and stage.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSource<'a> {
    pub dialect: Dialect,
    pub preset: Preset,
    pub edge_detection: EdgeDetection,
    /// The shared algorithm definitions (`SMAA.hlsl`).
    pub body: &'a str,
}

impl<'a> ShaderSource<'a> {
    /// Declares the dialect, the preset and the runtime metrics uniform.
    pub fn preamble(&self) -> String {
        let mut s = String::new();
        s.push_str(self.dialect.version_directive());
        s.push_str(self.preset.define());
        s.push_str("#define SMAA_RT_METRICS ");
        s.push_str(RT_METRICS_UNIFORM);
        s.push('\n');
        s.push_str("#define SMAA_GLSL_3 1\n");
        s.push_str("uniform vec4 ");
        s.push_str(RT_METRICS_UNIFORM);
        s.push_str(";\n");
        s
    }

    /// Builds the complete source of one stage of one pass.
    pub fn assemble(&self, pass: Pass, stage: ShaderStage) -> String {
        let preamble = self.preamble();
        let entry = self.entry(pass, stage);

        let mut s = String::with_capacity(preamble.len() + self.body.len() + entry.len() + 64);
        s.push_str(&preamble);
        s.push_str(match stage {
            ShaderStage::Vertex => "#define SMAA_INCLUDE_PS 0\n",
            ShaderStage::Fragment => "#define SMAA_INCLUDE_VS 0\n",
        });
        s.push_str(self.body);
        s.push('\n');
        s.push_str(&entry);
        s
    }

    fn entry(&self, pass: Pass, stage: ShaderStage) -> String {
        let input = self.dialect.input();
        let output = self.dialect.output();

        match (pass, stage) {
            (Pass::EdgeDetection, ShaderStage::Vertex) => format!(
                "{} vec2 {};\n\
                 out vec2 texcoord;\n\
                 out vec4 offset[3];\n\
                 void main() {{\n\
                 \x20   SMAAEdgeDetectionVS({1}, offset);\n\
                 \x20   texcoord = {1};\n\
                 \x20   gl_Position = vec4({1} * 2.0 - 1.0, 0.0, 1.0);\n\
                 }}\n",
                input, TEXCOORD_ATTRIBUTE
            ),
            (Pass::EdgeDetection, ShaderStage::Fragment) => format!(
                "uniform sampler2D in_tex;\n\
                 in vec2 texcoord;\n\
                 in vec4 offset[3];\n\
                 {} vec4 out_color;\n\
                 void main() {{\n\
                 \x20   out_color = vec4({}(texcoord, offset, in_tex), 0.0, 1.0);\n\
                 }}\n",
                output,
                match self.edge_detection {
                    EdgeDetection::Luma => "SMAALumaEdgeDetectionPS",
                    EdgeDetection::Color => "SMAAColorEdgeDetectionPS",
                }
            ),
            (Pass::BlendingWeight, ShaderStage::Vertex) => format!(
                "{} vec2 {};\n\
                 out vec2 texcoord;\n\
                 out vec2 pixcoord;\n\
                 out vec4 offset[3];\n\
                 void main() {{\n\
                 \x20   SMAABlendingWeightCalculationVS({1}, pixcoord, offset);\n\
                 \x20   texcoord = {1};\n\
                 \x20   gl_Position = vec4({1} * 2.0 - 1.0, 0.0, 1.0);\n\
                 }}\n",
                input, TEXCOORD_ATTRIBUTE
            ),
            (Pass::BlendingWeight, ShaderStage::Fragment) => format!(
                "uniform sampler2D in_tex;\n\
                 uniform sampler2D in_area_tex;\n\
                 uniform sampler2D in_search_tex;\n\
                 in vec2 texcoord;\n\
                 in vec2 pixcoord;\n\
                 in vec4 offset[3];\n\
                 {} vec4 out_color;\n\
                 void main() {{\n\
                 \x20   out_color = SMAABlendingWeightCalculationPS(texcoord, pixcoord, offset,\n\
                 \x20       in_tex, in_area_tex, in_search_tex, vec4(0.0));\n\
                 }}\n",
                output
            ),
            (Pass::NeighborhoodBlending, ShaderStage::Vertex) => format!(
                "{} vec2 {};\n\
                 out vec2 texcoord;\n\
                 out vec4 offset;\n\
                 void main() {{\n\
                 \x20   SMAANeighborhoodBlendingVS({1}, offset);\n\
                 \x20   texcoord = {1};\n\
                 \x20   gl_Position = vec4({1} * 2.0 - 1.0, 0.0, 1.0);\n\
                 }}\n",
                input, TEXCOORD_ATTRIBUTE
            ),
            (Pass::NeighborhoodBlending, ShaderStage::Fragment) => format!(
                "uniform sampler2D in_tex;\n\
                 uniform sampler2D in_blend_tex;\n\
                 in vec2 texcoord;\n\
                 in vec4 offset;\n\
                 {} vec4 out_color;\n\
                 void main() {{\n\
                 \x20   out_color = SMAANeighborhoodBlendingPS(texcoord, offset, in_tex, in_blend_tex);\n\
                 }}\n",
                output
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const BODY: &str = "/* SMAA */\n";

    fn source(dialect: Dialect) -> ShaderSource<'static> {
        ShaderSource {
            dialect,
            preset: Preset::Ultra,
            edge_detection: EdgeDetection::Luma,
            body: BODY,
        }
    }

    #[test]
    fn select() {
        assert_eq!(Dialect::select(Version::GL(4, 6)), Some(Dialect::Core));
        assert_eq!(Dialect::select(Version::GL(3, 2)), Some(Dialect::Core));
        assert_eq!(Dialect::select(Version::GL(3, 1)), Some(Dialect::Legacy));
        assert_eq!(Dialect::select(Version::GL(3, 0)), Some(Dialect::Legacy));
        assert_eq!(Dialect::select(Version::GL(2, 1)), None);
        assert_eq!(Dialect::select(Version::ES(3, 2)), None);
    }

    #[test]
    fn order() {
        let s = source(Dialect::Core).assemble(Pass::EdgeDetection, ShaderStage::Vertex);
        assert!(s.starts_with("#version 330\n#define SMAA_PRESET_ULTRA 1\n"));

        let metrics = s.find("uniform vec4 in_rt_metrics;").unwrap();
        let stage = s.find("#define SMAA_INCLUDE_PS 0").unwrap();
        let body = s.find(BODY).unwrap();
        let entry = s.find("void main()").unwrap();
        assert!(metrics < stage && stage < body && body < entry);
    }

    #[test]
    fn stages() {
        let src = source(Dialect::Core);
        let fs = src.assemble(Pass::NeighborhoodBlending, ShaderStage::Fragment);
        assert!(fs.contains("#define SMAA_INCLUDE_VS 0\n"));
        assert!(!fs.contains("SMAA_INCLUDE_PS"));
        assert!(fs.contains("SMAANeighborhoodBlendingPS"));
        assert!(fs.contains("in vec4 offset;"));
    }

    #[test]
    fn dialects() {
        let core = source(Dialect::Core).assemble(Pass::BlendingWeight, ShaderStage::Vertex);
        assert!(core.contains("layout(location = 0) in vec2 in_texcoord;"));

        let legacy = source(Dialect::Legacy).assemble(Pass::BlendingWeight, ShaderStage::Vertex);
        assert!(legacy.starts_with("#version 130\n"));
        assert!(!legacy.contains("layout("));
        assert!(legacy.contains("\nin vec2 in_texcoord;"));

        assert_eq!(Dialect::Legacy.attributes(), &[(0, TEXCOORD_ATTRIBUTE)]);
        assert!(Dialect::Core.attributes().is_empty());
    }

    #[test]
    fn edge_detection() {
        let mut src = source(Dialect::Core);
        let fs = src.assemble(Pass::EdgeDetection, ShaderStage::Fragment);
        assert!(fs.contains("SMAALumaEdgeDetectionPS(texcoord, offset, in_tex)"));

        src.edge_detection = EdgeDetection::Color;
        src.preset = Preset::Low;
        let fs = src.assemble(Pass::EdgeDetection, ShaderStage::Fragment);
        assert!(fs.contains("SMAAColorEdgeDetectionPS(texcoord, offset, in_tex)"));
        assert!(fs.contains("#define SMAA_PRESET_LOW 1\n"));
    }

    #[test]
    fn parse() {
        assert_eq!("HIGH".parse::<Preset>().unwrap(), Preset::High);
        assert_eq!("color".parse::<EdgeDetection>().unwrap(), EdgeDetection::Color);
        assert!("extreme".parse::<Preset>().is_err());
        assert!("depth".parse::<EdgeDetection>().is_err());
    }
}
