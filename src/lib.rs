// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tocb: a Theory of Change diagram builder.
//!
//! The editable [`model::Diagram`] lives in an [`editor::DiagramEditor`] that mirrors every change
//! to an autosave slot. Named snapshots go to a key/value [`store::DiagramCatalog`] or to files
//! through [`store::LocalFileStore`]; [`format`] and [`render`] produce JSON, CSV, text, SVG and PDF
//! exports, and [`suggest`] talks to an LLM through a small HTTP service.

pub mod config;
pub mod editor;
pub mod format;
pub mod logging;
pub mod logo;
pub mod model;
pub mod ops;
pub mod render;
pub mod store;
pub mod suggest;
