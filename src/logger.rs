//! Diagnostic lines on the standard error stream of the host.

use std::fmt;
use std::io::Write;

use log::{Level, LevelFilter};

/// Filter directives in `env_logger` syntax, applied over the configured level.
pub const LOG_VAR: &str = "WITH_SMAA_LOG";

fn line(level: Level, args: &fmt::Arguments) -> String {
    format!("with_smaa: {} {}", level, args)
}

/// Installs the process-wide logger. Only the first call has any effect, since the
/// host may already have a logger of its own we must not replace.
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_env(LOG_VAR)
        .format(|buf, record| writeln!(buf, "{}", line(record.level(), record.args())))
        .try_init();
}
