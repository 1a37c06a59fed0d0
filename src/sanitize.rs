use std::path::{Path, PathBuf};

/// Fallback filename for titles that sanitize to nothing.
const UNTITLED_NOTE: &str = "untitled-note";

/// Fallback name for folder names that sanitize to nothing.
const UNTITLED_FOLDER: &str = "Untitled Folder";

/// Turns a user-supplied note title into a filesystem-safe base name
/// (without the `.md` extension).
///
/// Lowercases, strips everything outside word characters, whitespace and
/// hyphens, collapses whitespace runs into single hyphens, collapses
/// repeated hyphens, and trims leading/trailing hyphens. Empty results fall
/// back to `untitled-note`.
pub fn sanitize_file_name(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if c.is_whitespace() || c == '-' {
            // Whitespace and hyphens both collapse into a single hyphen.
            if !out.ends_with('-') {
                out.push('-');
            }
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turns a user-supplied folder name into a filesystem-safe directory name.
///
/// Unlike note filenames, case and most punctuation are preserved: only
/// path separators and reserved characters (`\ / : * ? " < > |`) become
/// hyphens. Whitespace runs collapse to single spaces and hyphen runs to a
/// single hyphen. Empty results fall back to `Untitled Folder`.
pub fn sanitize_folder_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let c = match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        };
        if c.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else if c == '-' {
            if !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.push(c);
        }
    }
    if out.is_empty() {
        UNTITLED_FOLDER.to_string()
    } else {
        out
    }
}

/// Resolves a collision-free variant of `path` by appending `-1`, `-2`, …
/// before the extension until the result does not exist on disk.
///
/// Checked against the live directory at call time; there is no separate
/// uniqueness store.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1usize;
    loop {
        let candidate = dir.join(format!("{}-{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
