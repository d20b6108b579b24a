//! Delivery format rules.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extension every delivered file must carry.
pub const DELIVERY_EXTENSION: &str = "mp4";

/// Whether `path` can be delivered as-is.
///
/// The check is on the extension only and is case-sensitive: `clip.MP4` is
/// converted like any other foreign format.
pub fn is_delivery_format(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(DELIVERY_EXTENSION))
}

/// Where the converted copy of `path` is written: same directory, same stem, `.mp4`.
pub fn delivery_sibling(path: &Path) -> PathBuf {
    path.with_extension(DELIVERY_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp4_is_delivery_format() {
        assert!(is_delivery_format(Path::new("/w/abc/output00001.mp4")));
        assert!(!is_delivery_format(Path::new("/w/abc/output00001.webm")));
        assert!(!is_delivery_format(Path::new("/w/abc/output00001.MP4")));
        assert!(!is_delivery_format(Path::new("/w/abc/output00001")));
        assert!(!is_delivery_format(Path::new("/w/abc/clip.mp4.part")));
    }

    #[test]
    fn test_sibling_replaces_extension() {
        assert_eq!(
            delivery_sibling(Path::new("/w/abc/output00002.webm")),
            PathBuf::from("/w/abc/output00002.mp4")
        );
        assert_eq!(
            delivery_sibling(Path::new("/w/abc/output00003")),
            PathBuf::from("/w/abc/output00003.mp4")
        );
    }
}
