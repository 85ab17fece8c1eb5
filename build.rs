use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Extracts the bytes of a C header of the form
/// `static const unsigned char bytes[] = { 0x00, 0x01, ... };`.
fn header_bytes(src: &str) -> Vec<u8> {
    let start = match src.find('{') {
        Some(v) => v + 1,
        None => return Vec::new(),
    };

    let end = src[start..].find('}').map(|v| start + v).unwrap_or(src.len());
    src[start..end]
        .split(',')
        .filter_map(|token| {
            let token = token.trim();
            if token.starts_with("0x") || token.starts_with("0X") {
                u8::from_str_radix(&token[2..], 16).ok()
            } else {
                token.parse().ok()
            }
        })
        .collect()
}

fn embed_table(dir: &Path, out_dir: &Path, header: &str, dst: &str) {
    let path = dir.join(header);
    println!("cargo:rerun-if-changed={}", path.display());

    let bytes = match fs::read_to_string(&path) {
        Ok(src) => header_bytes(&src),
        Err(_) => {
            println!(
                "cargo:warning={} not found, the pipeline will stay disabled at runtime.",
                path.display()
            );
            Vec::new()
        }
    };

    fs::write(out_dir.join(dst), bytes).unwrap();
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dir = env::var("SMAA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap()).join("third_party/smaa"));

    println!("cargo:rerun-if-env-changed=SMAA_DIR");

    embed_table(&dir, &out_dir, "AreaTex.h", "area_tex.bin");
    embed_table(&dir, &out_dir, "SearchTex.h", "search_tex.bin");

    let shader = dir.join("SMAA.hlsl");
    println!("cargo:rerun-if-changed={}", shader.display());
    let body = fs::read_to_string(&shader).unwrap_or_else(|_| {
        println!(
            "cargo:warning={} not found, the pipeline will stay disabled at runtime.",
            shader.display()
        );
        String::new()
    });

    fs::write(out_dir.join("SMAA.hlsl"), body).unwrap();
}
