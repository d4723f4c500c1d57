// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Logo images as `data:` URLs.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub const MAX_LOGO_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug)]
pub enum LogoError {
    UnsupportedType { path: PathBuf },
    TooLarge { path: PathBuf, size: u64 },
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { path } => write!(
                f,
                "{} is not an image file (expected png, jpg, gif, svg or webp)",
                path.display()
            ),
            Self::TooLarge { path, size } => write!(
                f,
                "{} is {size} bytes; the maximum logo size is 2MB",
                path.display()
            ),
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for LogoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Reads an image file into a `data:` URL suitable for `Diagram::set_logo_url`.
///
/// The type check and size check both happen before the file body is read.
pub fn load_logo(path: &Path) -> Result<String, LogoError> {
    let mime_type = image_mime_type(path).ok_or_else(|| LogoError::UnsupportedType {
        path: path.to_path_buf(),
    })?;
    let io_err = |source| LogoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_LOGO_BYTES {
        return Err(LogoError::TooLarge {
            path: path.to_path_buf(),
            size,
        });
    }
    let bytes = fs::read(path).map_err(io_err)?;
    tracing::debug!(path = %path.display(), size, "loaded logo");
    Ok(encode_data_url(mime_type, &bytes))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{encode_data_url, image_mime_type, load_logo, LogoError, MAX_LOGO_BYTES};

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tocb-logo-{}-{}",
            std::process::id(),
            name.replace('.', "-")
        ));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir.join(name)
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(image_mime_type(Path::new("a/logo.PNG")), Some("image/png"));
        assert_eq!(image_mime_type(Path::new("logo.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("logo.svg")), Some("image/svg+xml"));
        assert_eq!(image_mime_type(Path::new("notes.txt")), None);
        assert_eq!(image_mime_type(Path::new("logo")), None);
    }

    #[test]
    fn encodes_base64_payload() {
        assert_eq!(encode_data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn loads_small_image() {
        let path = scratch("logo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write");
        let url = load_logo(&path).expect("load");
        assert!(url.starts_with("data:image/png;base64,"));
        let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn rejects_non_images_and_oversized_files() {
        let err = load_logo(Path::new("readme.md")).unwrap_err();
        assert!(matches!(err, LogoError::UnsupportedType { .. }));

        let path = scratch("huge.png");
        let file = std::fs::File::create(&path).expect("create");
        file.set_len(MAX_LOGO_BYTES + 1).expect("set_len");
        let err = load_logo(&path).unwrap_err();
        assert!(matches!(err, LogoError::TooLarge { size, .. } if size == MAX_LOGO_BYTES + 1));
        let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_logo(Path::new("/nonexistent/tocb/logo.png")).unwrap_err();
        assert!(matches!(err, LogoError::Io { .. }));
    }
}
