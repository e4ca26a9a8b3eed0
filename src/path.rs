//! Lexical path resolution for the output directory.

use std::path::{Component, Path, PathBuf};

/// Returns an absolute version of `path`.
///
/// Absolute paths are returned unaltered. Relative paths are joined onto `cwd`
/// and normalized lexically: `.` segments and repeated separators are dropped
/// and `..` removes the previous segment (but never climbs above the root).
/// No filesystem access happens here, symlinks are not resolved.
pub fn abspath(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }

    normalize(&cwd.as_ref().join(path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::CurDir | Component::ParentDir) | None => out.push(".."),
            },
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
