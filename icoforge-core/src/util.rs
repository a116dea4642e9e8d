use std::{fs, io, path::Path};

/// Default size set of the size editor, largest first.
pub const DEFAULT_SIZES: &[u32] = &[512, 256, 128, 64, 48, 32, 24, 16];

/// Largest image side an ICO directory entry can describe.
pub const ICO_MAX_SIZE: u32 = 256;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub fn mkdir_if_not_exists(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        other => other,
    }
}

/// Checks the file extension against the accepted input formats, case
/// insensitively. Decode failures are handled later, per item.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
