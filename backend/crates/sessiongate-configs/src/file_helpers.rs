use std::path::{Path, PathBuf};

/// Make a directory path absolute relative to the current working directory.
///
/// Trailing separators are dropped. Paths that are already absolute, and
/// paths when the working directory cannot be read, are returned unchanged.
pub fn normalize_dir_path(raw: &str) -> String {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let trimmed = if trimmed.is_empty() { raw } else { trimmed };

    let path = Path::new(trimmed);
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path.strip_prefix("./").unwrap_or(path)),
            Err(_) => return trimmed.to_string(),
        }
    };
    absolute.to_string_lossy().into_owned()
}
