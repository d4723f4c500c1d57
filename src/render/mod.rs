// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Visual export.
//!
//! The diagram is first rendered to an SVG [`RenderedView`]; PDF conversion only ever sees that
//! view, never the editor.

pub mod pdf;
pub mod svg;
mod text;

pub use pdf::{render_pdf_bytes, render_to_pdf, PdfError};
pub use svg::{render_svg, PageOrientation, RenderedView, SvgOptions};
