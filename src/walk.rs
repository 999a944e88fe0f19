//! Recursive walker for `-r`.
//!
//! Directories are visited depth-first in readdir order, the root first.
//! The visitor runs with the visited directory as the working directory, so
//! selection sees paths relative to it. Each level enters through a
//! `CwdGuard`; the caller's working directory is back in place when `walk`
//! returns, whatever the visitor did.

use std::path::Path;

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::cwd::CwdGuard;
use crate::error::DofError;
use crate::output;

/// Walk `root`, calling `visit` once per directory that is not excluded.
///
/// A directory whose path relative to `root`, or whose own name, matches
/// one of `excludes` is skipped together with everything below it. A
/// non-zero status from `visit` stops the walk unless `force` is set; the
/// last non-zero status is returned either way.
pub fn walk<F>(root: &Path, excludes: &[Pattern], force: bool, mut visit: F) -> Result<i32, DofError>
where
    F: FnMut(&Path) -> Result<i32, DofError>,
{
    let mut top = CwdGuard::save_current()?;
    let root = top.original().join(root);

    let result = walk_tree(&root, excludes, force, &mut visit);
    top.restore_now()?;
    result
}

fn walk_tree<F>(root: &Path, excludes: &[Pattern], force: bool, visit: &mut F) -> Result<i32, DofError>
where
    F: FnMut(&Path) -> Result<i32, DofError>,
{
    let mut status = 0;
    let mut entries = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, root, excludes));

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                output::warning(&format!("cannot read directory: {}", err));
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let rel = relative(entry.path(), root);
        let _guard = match CwdGuard::new(entry.path()) {
            Ok(guard) => guard,
            Err(err) => {
                output::warning(&format!("cannot enter {}: {}", entry.path().display(), err));
                entries.skip_current_dir();
                continue;
            }
        };
        output::debug(&format!("entering {}", rel.display()));

        let code = visit(rel)?;
        if code != 0 {
            status = code;
            if !force {
                break;
            }
        }
    }

    Ok(status)
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => Path::new("."),
        Ok(rel) => rel,
        Err(_) => path,
    }
}

fn is_excluded(entry: &DirEntry, root: &Path, excludes: &[Pattern]) -> bool {
    if excludes.is_empty() || !entry.file_type().is_dir() {
        return false;
    }
    let rel = relative(entry.path(), root);
    let name = entry.file_name().to_string_lossy();
    let hit = excludes
        .iter()
        .any(|p| p.matches_path(rel) || p.matches(&name));
    if hit {
        output::debug(&format!("excluding {}", rel.display()));
    }
    hit
}
