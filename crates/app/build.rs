//! Compiles the GLSL shaders in the workspace `shaders/` directory to SPIR-V.
//!
//! Each `<name>.vert` / `<name>.frag` becomes `<name>.vert.spv` /
//! `<name>.frag.spv` next to its source, which is where the render systems
//! load them from. Set `SKIP_SHADERS` to skip this step; without `glslc`
//! the step is skipped with a warning and `shaders/compile.sh` can be run
//! by hand later.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const STAGE_EXTENSIONS: [&str; 2] = ["vert", "frag"];

fn warn(message: impl std::fmt::Display) {
    println!("cargo:warning={message}");
}

/// `$VULKAN_SDK/bin/glslc` if the SDK is set, otherwise `glslc` from `PATH`.
fn find_glslc() -> Option<PathBuf> {
    if let Ok(sdk) = env::var("VULKAN_SDK") {
        let exe = if cfg!(target_os = "windows") { "Bin/glslc.exe" } else { "bin/glslc" };
        let path = Path::new(&sdk).join(exe);
        if path.exists() {
            return Some(path);
        }
    }

    let on_path = PathBuf::from("glslc");
    Command::new(&on_path)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|_| on_path)
}

fn is_stale(src: &Path, out: &Path) -> bool {
    match (src.metadata().and_then(|m| m.modified()), out.metadata().and_then(|m| m.modified())) {
        (Ok(src_time), Ok(out_time)) => src_time > out_time,
        _ => true,
    }
}

fn compile(glslc: &Path, src: &Path) {
    let mut out = src.as_os_str().to_owned();
    out.push(".spv");
    let out = PathBuf::from(out);

    if !is_stale(src, &out) {
        return;
    }

    match Command::new(glslc).arg(src).arg("-o").arg(&out).status() {
        Ok(status) if status.success() => {}
        Ok(status) => warn(format!(
            "glslc failed for {} (exit code {})",
            src.display(),
            status.code().unwrap_or(-1)
        )),
        Err(e) => warn(format!("failed to run glslc for {}: {}", src.display(), e)),
    }
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let shader_dir = manifest_dir.join("../../shaders");

    println!("cargo:rerun-if-changed={}", shader_dir.display());
    println!("cargo:rerun-if-env-changed=SKIP_SHADERS");
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");

    if env::var_os("SKIP_SHADERS").is_some() {
        return;
    }

    let Some(glslc) = find_glslc() else {
        warn("glslc not found (set VULKAN_SDK or add it to PATH); shaders not compiled");
        return;
    };

    let entries = match std::fs::read_dir(&shader_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn(format!("cannot read {}: {}", shader_dir.display(), e));
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_stage = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| STAGE_EXTENSIONS.contains(&ext));
        if is_stage {
            println!("cargo:rerun-if-changed={}", path.display());
            compile(&glslc, &path);
        }
    }
}
