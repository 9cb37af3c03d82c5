use std::path::{MAIN_SEPARATOR, Path};

/// Replace every backslash with a forward slash.
pub fn forward_slashes(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Render a host path for the left side of a `-v host:container` mount.
///
/// Mount syntax is POSIX-style on every host, so backslash-separated hosts
/// get their separators rewritten. Elsewhere a backslash is an ordinary
/// file name character and is left alone.
pub fn mount_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if MAIN_SEPARATOR == '\\' {
        forward_slashes(&raw)
    } else {
        raw.into_owned()
    }
}
