//! Menu icon discovery.
//!
//! The icon ships next to the binary in a few possible layouts (plain
//! checkout, `Resources/` folder, macOS bundle). Candidates are probed in
//! order, first relative to the working directory, then relative to the
//! executable; the first readable file wins.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::FileSystem;
use crate::fmt::format_bytes;

const ICON_FILES: [&str; 2] = ["gouge.png", "gouge.icns"];

/// Icon lookup failure. Never fatal: the menu runs without an icon.
#[derive(Debug)]
pub enum IconError {
    /// No candidate could be read.
    NotFound { tried: usize },
    /// The first readable candidate was empty.
    Empty(PathBuf),
}

impl std::fmt::Display for IconError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IconError::NotFound { tried } => write!(
                f,
                "icon file not found in any of the {} expected locations",
                tried
            ),
            IconError::Empty(path) => write!(f, "icon file {} is empty", path.display()),
        }
    }
}

impl std::error::Error for IconError {}

/// A loaded icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Paths probed for the icon, in order.
pub fn candidate_paths(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let layouts = |base: &Path| -> Vec<PathBuf> {
        ICON_FILES
            .iter()
            .flat_map(|name| {
                [
                    base.join(name),
                    base.join("Resources").join(name),
                    base.join("..").join("Resources").join(name),
                ]
            })
            .collect()
    };

    let mut paths = layouts(Path::new(""));
    if let Some(dir) = exe_dir {
        paths.extend(layouts(dir));
    }
    paths
}

/// Probes [`candidate_paths`] through `fs`.
pub fn find_icon<F: FileSystem + ?Sized>(
    fs: &F,
    exe_dir: Option<&Path>,
) -> Result<Icon, IconError> {
    let candidates = candidate_paths(exe_dir);
    let tried = candidates.len();

    for path in candidates {
        debug!("Trying to load icon from: {}", path.display());
        match fs.read(&path) {
            Ok(bytes) if bytes.is_empty() => return Err(IconError::Empty(path)),
            Ok(bytes) => {
                debug!(
                    "Icon found at: {}, size: {}",
                    path.display(),
                    format_bytes(bytes.len() as u64)
                );
                return Ok(Icon { path, bytes });
            }
            Err(e) => debug!("Failed to load icon from {}: {}", path.display(), e),
        }
    }

    Err(IconError::NotFound { tried })
}

/// Directory of the running executable, if it can be determined.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, RealFs};

    #[test]
    fn test_candidate_paths_order() {
        let paths = candidate_paths(Some(Path::new("/opt/gouge/bin")));
        assert_eq!(paths.len(), 12);
        assert_eq!(paths[0], PathBuf::from("gouge.png"));
        assert_eq!(paths[1], PathBuf::from("Resources/gouge.png"));
        assert_eq!(paths[2], PathBuf::from("../Resources/gouge.png"));
        assert_eq!(paths[3], PathBuf::from("gouge.icns"));
        assert_eq!(paths[6], PathBuf::from("/opt/gouge/bin/gouge.png"));
        assert_eq!(
            paths[11],
            PathBuf::from("/opt/gouge/bin/../Resources/gouge.icns")
        );
    }

    #[test]
    fn test_candidate_paths_without_exe_dir() {
        assert_eq!(candidate_paths(None).len(), 6);
    }

    #[test]
    fn test_find_icon_prefers_working_directory() {
        let mut fs = MockFs::new();
        fs.add_file("Resources/gouge.icns", [1u8, 2]);
        fs.add_file("/app/gouge.png", [9u8]);

        let icon = find_icon(&fs, Some(Path::new("/app"))).unwrap();
        assert_eq!(icon.path, PathBuf::from("Resources/gouge.icns"));
        assert_eq!(icon.bytes, vec![1, 2]);
    }

    #[test]
    fn test_find_icon_falls_back_to_exe_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/app/../Resources/gouge.png", [7u8, 7, 7]);

        let icon = find_icon(&fs, Some(Path::new("/app"))).unwrap();
        assert_eq!(icon.bytes.len(), 3);
    }

    #[test]
    fn test_find_icon_not_found() {
        let fs = MockFs::new();
        let err = find_icon(&fs, Some(Path::new("/app"))).unwrap_err();
        assert!(matches!(err, IconError::NotFound { tried: 12 }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_find_icon_empty_file() {
        let mut fs = MockFs::new();
        fs.add_file("gouge.png", "");
        let err = find_icon(&fs, None).unwrap_err();
        assert!(matches!(err, IconError::Empty(_)));
    }

    #[test]
    fn test_find_icon_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Resources")).unwrap();
        std::fs::write(dir.path().join("Resources").join("gouge.png"), b"\x89PNG").unwrap();

        let icon = find_icon(&RealFs::new(), Some(dir.path())).unwrap();
        assert_eq!(icon.bytes, b"\x89PNG".to_vec());
    }
}
