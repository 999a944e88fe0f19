//! Path manipulation helpers
//!
//! Pure string slicing over `/`-separated paths. Nothing here touches the
//! filesystem, so an item does not have to exist to be split.

/// Get the file name (last component) of a path, extension kept
pub fn filename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Get the basename of a path: no directory, no extension
///
/// `"a/b.tar.gz"` gives `"b.tar"`; only the last extension is removed.
pub fn basename(path: &str) -> &str {
    let name = filename(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Get the directory of a path without the trailing `/`
///
/// Empty when the path has no directory part.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Get the extension of a path without the `.`
///
/// Empty when the file name has no `.`.
pub fn extname(path: &str) -> &str {
    let name = filename(path);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// Whether `name` is one of the synthetic `.` / `..` entries
pub fn is_dots(name: &str) -> bool {
    name == "." || name == ".."
}

/// Whether a pattern contains glob metacharacters (`*?[`, plus `~` and `{`
/// which the glob collaborator expands itself)
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '~', '{'])
}
