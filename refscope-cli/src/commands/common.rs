use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context;
use refscope::Error;

/// Collect dump and module files recursively from a directory, or return a single file as is.
pub fn collect_inputs(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    collect_inputs_recursive(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_inputs_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_inputs_recursive(&path, files)?;
        } else if is_dump_file(&path) || is_module_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns true if the path has an `.il` or `.txt` extension.
pub fn is_dump_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("il" | "txt")
    )
}

/// Returns true if the path has an `.exe` or `.dll` extension.
pub fn is_module_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("exe" | "dll")
    )
}

/// Returns true if the directory directly contains a `.csproj` or `.sln` file.
pub fn has_project_descriptor(dir: &Path) -> anyhow::Result<bool> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_file()
            && matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("csproj" | "sln")
            )
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Disassemble a module with `<ildasm> /text <path>` and return the dump.
pub fn disassemble(ildasm: &str, path: &Path) -> anyhow::Result<String> {
    let output = Command::new(ildasm)
        .arg("/text")
        .arg(path)
        .output()
        .map_err(|e| Error::Tool(format!("failed to run {ildasm}: {e}")))?;

    if !output.status.success() {
        return Err(Error::Tool(format!(
            "{ildasm} failed on {} ({})",
            path.display(),
            output.status
        ))
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Build a project directory with `<msbuild> /v:d <dir>` and return the build output.
///
/// A failing build still produces a usable log, so only a tool that cannot be started is an
/// error.
pub fn run_build(msbuild: &str, dir: &Path) -> anyhow::Result<String> {
    let output = Command::new(msbuild)
        .arg("/v:d")
        .arg(dir)
        .output()
        .map_err(|e| Error::Tool(format!("failed to run {msbuild}: {e}")))?;

    if !output.status.success() {
        log::warn!("{msbuild} exited with {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

/// File stem of a path, used as module name when a dump lacks a `.module` line.
pub fn file_stem(path: &Path) -> String {
    path.file_stem().map_or_else(
        || file_display_name(path),
        |stem| stem.to_string_lossy().to_string(),
    )
}
