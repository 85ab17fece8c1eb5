//! Runtime configuration, read once from the environment of the host.
//!
//! Values are taken from, in increasing order of precedence: the defaults, the JSON
//! file named by `WITH_SMAA_CONFIG`, and the individual `WITH_SMAA*` variables. A bad
//! value never stops the host. It is reported and the default is used instead.
//!
//! `log_level` is only the baseline, `WITH_SMAA_LOG` is applied on top of it by the
//! logger.

use std::env;
use std::fs;
use std::path::PathBuf;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::smaa::shader::{EdgeDetection, Preset};
use crate::smaa::SmaaParams;

pub const CONFIG_VAR: &str = "WITH_SMAA_CONFIG";
pub const ENABLED_VAR: &str = "WITH_SMAA";
pub const PRESET_VAR: &str = "WITH_SMAA_PRESET";
pub const EDGE_VAR: &str = "WITH_SMAA_EDGE";
pub const LIBDIR_VAR: &str = "WITH_SMAA_LIBDIR";

#[cfg(target_pointer_width = "64")]
const DEFAULT_LIBRARY_DIR: &str = "/usr/lib";
#[cfg(not(target_pointer_width = "64"))]
const DEFAULT_LIBRARY_DIR: &str = "/usr/lib32";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Runs the post-process. When off, the shim only forwards calls.
    pub enabled: bool,
    pub preset: Preset,
    pub edge_detection: EdgeDetection,
    pub log_level: LevelFilter,
    /// Directory holding the real `libGL.so` and `libEGL.so`.
    pub library_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled: true,
            preset: Preset::default(),
            edge_detection: EdgeDetection::default(),
            log_level: LevelFilter::Info,
            library_dir: PathBuf::from(DEFAULT_LIBRARY_DIR),
        }
    }
}

impl Settings {
    /// Reads the settings of this process. The returned errors describe the values
    /// that have been ignored.
    pub fn load() -> (Settings, Vec<Error>) {
        Settings::from_vars(|name| env::var(name).ok())
    }

    /// Builds settings out of a variable lookup.
    pub fn from_vars<F>(var: F) -> (Settings, Vec<Error>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        let mut settings = match var(CONFIG_VAR) {
            Some(path) => match Settings::from_file(&path) {
                Ok(v) => v,
                Err(err) => {
                    errors.push(err);
                    Settings::default()
                }
            },
            None => Settings::default(),
        };

        if let Some(v) = var(ENABLED_VAR) {
            match parse_bool(&v) {
                Some(enabled) => settings.enabled = enabled,
                None => errors.push(invalid(ENABLED_VAR, &v)),
            }
        }

        if let Some(v) = var(PRESET_VAR) {
            match v.parse() {
                Ok(preset) => settings.preset = preset,
                Err(err) => errors.push(err),
            }
        }

        if let Some(v) = var(EDGE_VAR) {
            match v.parse() {
                Ok(edge) => settings.edge_detection = edge,
                Err(err) => errors.push(err),
            }
        }

        if let Some(v) = var(LIBDIR_VAR) {
            if v.is_empty() {
                errors.push(invalid(LIBDIR_VAR, &v));
            } else {
                settings.library_dir = PathBuf::from(v);
            }
        }

        (settings, errors)
    }

    fn from_file(path: &str) -> Result<Settings> {
        let bytes = fs::read(path).map_err(|err| Error::Settings(format!("{}: {}", path, err)))?;
        serde_json::from_slice(&bytes).map_err(|err| Error::Settings(format!("{}: {}", path, err)))
    }

    pub fn params(&self) -> SmaaParams {
        SmaaParams {
            preset: self.preset,
            edge_detection: self.edge_detection,
        }
    }

    /// Full path of a library living in `library_dir`.
    pub fn library(&self, name: &str) -> PathBuf {
        self.library_dir.join(name)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn invalid(name: &str, value: &str) -> Error {
    Error::Settings(format!("{}='{}'", name, value))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> (Settings, Vec<Error>) {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Settings::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let (settings, errors) = vars(&[]);
        assert!(errors.is_empty());
        assert_eq!(settings, Settings::default());
        assert!(settings.enabled);
        assert_eq!(settings.preset, Preset::Ultra);
        assert_eq!(settings.edge_detection, EdgeDetection::Luma);
        assert_eq!(settings.log_level, LevelFilter::Info);
    }

    #[test]
    fn overrides() {
        let (settings, errors) = vars(&[
            (ENABLED_VAR, "off"),
            (PRESET_VAR, "medium"),
            (EDGE_VAR, "color"),
            (LIBDIR_VAR, "/usr/lib/x86_64-linux-gnu"),
        ]);

        assert!(errors.is_empty());
        assert!(!settings.enabled);
        assert_eq!(settings.preset, Preset::Medium);
        assert_eq!(settings.edge_detection, EdgeDetection::Color);
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(
            settings.library("libGL.so"),
            PathBuf::from("/usr/lib/x86_64-linux-gnu/libGL.so")
        );
    }

    #[test]
    fn invalid_values() {
        let (settings, errors) = vars(&[
            (ENABLED_VAR, "maybe"),
            (PRESET_VAR, "extreme"),
            (LIBDIR_VAR, ""),
        ]);

        assert_eq!(errors.len(), 3);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file() {
        let path = env::temp_dir().join(format!("with_smaa_settings_{}.json", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, r#"{{ "preset": "low", "log_level": "WARN" }}"#).unwrap();
        }

        let path_str = path.to_str().unwrap().to_owned();
        let (settings, errors) = vars(&[(CONFIG_VAR, &path_str), (EDGE_VAR, "color")]);
        fs::remove_file(&path).unwrap();

        assert!(errors.is_empty());
        assert_eq!(settings.preset, Preset::Low);
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert_eq!(settings.edge_detection, EdgeDetection::Color);
        assert!(settings.enabled);
    }

    #[test]
    fn missing_file() {
        let (settings, errors) = vars(&[(CONFIG_VAR, "/nonexistent/with_smaa.json")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(settings, Settings::default());
    }
}
