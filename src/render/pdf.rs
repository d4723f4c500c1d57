// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::path::Path;

use super::svg::RenderedView;
use crate::store::{write_file_atomic, StoreError, WriteDurability};

#[derive(Debug)]
pub enum PdfError {
    SvgParse(String),
    Convert,
    Write(StoreError),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SvgParse(reason) => write!(f, "failed to parse rendered view: {reason}"),
            Self::Convert => f.write_str("failed to convert rendered view to PDF"),
            Self::Write(source) => write!(f, "failed to write PDF: {source}"),
        }
    }
}

impl std::error::Error for PdfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write(source) => Some(source),
            Self::SvgParse(_) | Self::Convert => None,
        }
    }
}

/// Converts a rendered view into a one-page PDF sized to the view.
pub fn render_pdf_bytes(view: &RenderedView) -> Result<Vec<u8>, PdfError> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(&view.svg, &opt)
        .map_err(|err| PdfError::SvgParse(err.to_string()))?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| PdfError::Convert)
}

/// Writes the view as a PDF at `path`. Failures are logged and reported as `false`.
pub fn render_to_pdf(view: &RenderedView, path: &Path) -> bool {
    let result = render_pdf_bytes(view).and_then(|bytes| {
        write_file_atomic(path, &bytes, WriteDurability::BestEffort).map_err(PdfError::Write)
    });
    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "wrote PDF");
            true
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "PDF export failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{render_pdf_bytes, render_to_pdf};
    use crate::model::fixtures::literacy_program;
    use crate::render::{render_svg, RenderedView, SvgOptions};

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tocb-pdf-{}-{name}", std::process::id()))
    }

    #[test]
    fn pdf_bytes_start_with_header() {
        let view = render_svg(&literacy_program(), &SvgOptions::default());
        let bytes = render_pdf_bytes(&view).expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn render_to_pdf_writes_file() {
        let path = scratch_path("ok.pdf");
        let view = render_svg(&literacy_program(), &SvgOptions::default());

        assert!(render_to_pdf(&view, &path));
        let bytes = std::fs::read(&path).expect("read");
        assert!(bytes.starts_with(b"%PDF"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn render_to_pdf_reports_false_instead_of_failing() {
        let view = render_svg(&literacy_program(), &SvgOptions::default());
        let unwritable = scratch_path("missing-dir").join("nested").join("out.pdf");
        assert!(!render_to_pdf(&view, &unwritable));

        let broken = RenderedView {
            svg: "<not-svg".to_owned(),
            width: 1.0,
            height: 1.0,
        };
        assert!(!render_to_pdf(&broken, &scratch_path("broken.pdf")));
    }
}
