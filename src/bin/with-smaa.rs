//! Runs a program with the SMAA shim preloaded.

use std::env;
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::process::{self, Command};

const DEFAULT_LIBRARY: &str = "libwith_smaa.so";

/// Puts `library` in front of the libraries already listed in `LD_PRELOAD`.
fn preload(library: &str, current: Option<OsString>) -> OsString {
    let mut value = OsString::from(library);
    if let Some(current) = current {
        if !current.is_empty() {
            value.push(" ");
            value.push(current);
        }
    }

    value
}

fn main() {
    let matches = clap::App::new("with-smaa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run an OpenGL program with SMAA applied to every frame it presents")
        .setting(clap::AppSettings::TrailingVarArg)
        .arg(
            clap::Arg::with_name("library")
                .short("l")
                .long("library")
                .takes_value(true)
                .value_name("PATH")
                .help("Set the shim library to preload"),
        )
        .arg(
            clap::Arg::with_name("program")
                .index(1)
                .multiple(true)
                .help("The program to run, followed by its arguments"),
        )
        .get_matches_safe()
        .unwrap_or_else(|err| match err.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => err.exit(),
            _ => {
                eprintln!("{}", err.message);
                process::exit(1);
            }
        });

    let mut program = match matches.values_of_os("program") {
        Some(v) => v,
        None => {
            eprintln!("with_smaa: no program specified\n\n{}", matches.usage());
            process::exit(1);
        }
    };

    let name = match program.next() {
        Some(v) => v.to_owned(),
        None => {
            eprintln!("with_smaa: no program specified\n\n{}", matches.usage());
            process::exit(1);
        }
    };

    let library = matches.value_of("library").unwrap_or(DEFAULT_LIBRARY);

    let err = Command::new(&name)
        .args(program)
        .env("LD_PRELOAD", preload(library, env::var_os("LD_PRELOAD")))
        .exec();

    eprintln!("with_smaa: {}: {}", name.to_string_lossy(), err);
    process::exit(err.raw_os_error().unwrap_or(1));
}
