use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create output file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .map_err(|err| format!("Failed to serialize JSON '{}': {err}", path.display()))?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize output file '{}': {err}", path.display()))?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)
        .map_err(|err| format!("Failed to serialize JSON to stdout: {err}"))?;
    handle
        .write_all(b"\n")
        .map_err(|err| format!("Failed to write stdout: {err}"))
}
