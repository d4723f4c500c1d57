// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Static SVG view of a diagram, used as the source for PDF export.

use std::fmt::Write as _;

use super::text::{escape_xml, truncate_with_ellipsis, wrap_text};
use crate::model::{Diagram, FlowColumn, ThemeColors, FLOW_COLUMN_COUNT};

const MARGIN: f32 = 16.0;
const GAP: f32 = 8.0;
const PADDING: f32 = 8.0;
const COLUMN_WIDTH: f32 = 180.0;
const GROUPING_WIDTH: f32 = 140.0;
const HEADER_HEIGHT: f32 = 64.0;
const LOGO_SIZE: f32 = 48.0;
const FONT_SIZE: f32 = 12.0;
const TITLE_FONT_SIZE: f32 = 22.0;
const LINE_HEIGHT: f32 = 16.0;
// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_RATIO: f32 = 0.55;
const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Device pixels per layout unit.
    pub scale: f32,
    pub background: String,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: "#ffffff".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// A rendered SVG document and its scaled pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub svg: String,
    pub width: f32,
    pub height: f32,
}

impl RenderedView {
    pub fn orientation(&self) -> PageOrientation {
        if self.height > self.width {
            PageOrientation::Portrait
        } else {
            PageOrientation::Landscape
        }
    }
}

struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

struct Canvas {
    body: String,
}

impl Canvas {
    fn rect(&mut self, b: &Rect, fill: &str) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="4" fill="{}"/>"#,
            b.x,
            b.y,
            b.w,
            b.h,
            escape_xml(fill)
        );
    }

    fn text_lines(&mut self, x: f32, y: f32, lines: &[String], color: &str, bold_first: bool) {
        for (i, line) in lines.iter().enumerate() {
            let weight = if bold_first && i == 0 { "bold" } else { "normal" };
            let _ = writeln!(
                self.body,
                r#"<text x="{x}" y="{}" font-family="{FONT_FAMILY}" font-size="{FONT_SIZE}" font-weight="{weight}" fill="{color}">{}</text>"#,
                y + LINE_HEIGHT * (i as f32 + 1.0) - 4.0,
                escape_xml(line)
            );
        }
    }
}

fn max_chars(width: f32) -> usize {
    ((width - 2.0 * PADDING) / (FONT_SIZE * CHAR_WIDTH_RATIO)).floor().max(1.0) as usize
}

fn block_height(lines: usize) -> f32 {
    (lines.max(1) as f32) * LINE_HEIGHT + 2.0 * PADDING
}

/// Renders the grid view: header band, need/vision/purpose, flow stages, one row per group.
///
/// Text colour follows the luminance of each background. Only `data:image/…` logos are
/// embedded.
pub fn render_svg(diagram: &Diagram, options: &SvgOptions) -> RenderedView {
    let theme = diagram.theme_colors();
    let show_grouping = diagram.show_grouping_column();
    let grid_left = MARGIN + if show_grouping { GROUPING_WIDTH + GAP } else { 0.0 };
    let grid_width = COLUMN_WIDTH * FLOW_COLUMN_COUNT as f32 + GAP * (FLOW_COLUMN_COUNT - 1) as f32;
    let content_width = grid_left - MARGIN + grid_width;
    let width = MARGIN * 2.0 + content_width;

    let mut canvas = Canvas { body: String::new() };
    let mut y = MARGIN;

    header_band(&mut canvas, diagram, theme, y, content_width);
    y += HEADER_HEIGHT + GAP;

    y = purpose_row(&mut canvas, diagram, theme, y, content_width) + GAP;

    let column_x = |column: FlowColumn| grid_left + column.index() as f32 * (COLUMN_WIDTH + GAP);

    // Flow stage row.
    let stage_lines: Vec<Vec<String>> = FlowColumn::ALL
        .iter()
        .map(|column| wrap_text(diagram.flow_data().label(*column), max_chars(COLUMN_WIDTH)))
        .collect();
    let stage_height = block_height(stage_lines.iter().map(Vec::len).max().unwrap_or(1));
    if show_grouping {
        let b = Rect { x: MARGIN, y, w: GROUPING_WIDTH, h: stage_height };
        canvas.rect(&b, &theme.grouping);
        canvas.text_lines(
            b.x + PADDING,
            b.y + PADDING,
            &["Grouping".to_owned()],
            ThemeColors::text_color_for(&theme.grouping),
            true,
        );
    }
    let flow_text = ThemeColors::text_color_for(&theme.flow);
    for (column, lines) in FlowColumn::ALL.iter().zip(&stage_lines) {
        let b = Rect { x: column_x(*column), y, w: COLUMN_WIDTH, h: stage_height };
        canvas.rect(&b, &theme.flow);
        canvas.text_lines(b.x + PADDING, b.y + PADDING, lines, flow_text, true);
        if *column != FlowColumn::Impact {
            arrow(&mut canvas, b.x + b.w, b.y + b.h / 2.0);
        }
    }
    y += stage_height + GAP;

    // Group rows.
    let columns = diagram.columns();
    for (index, group) in diagram.groups().iter().enumerate() {
        let cell_lines: Vec<Vec<String>> = FlowColumn::ALL
            .iter()
            .map(|column| {
                wrap_text(
                    columns.cell(*column, index).unwrap_or_default(),
                    max_chars(COLUMN_WIDTH),
                )
            })
            .collect();
        let name_lines = wrap_text(&group.name, max_chars(GROUPING_WIDTH));
        let mut row_lines = cell_lines.iter().map(Vec::len).max().unwrap_or(1);
        if show_grouping {
            row_lines = row_lines.max(name_lines.len());
        }
        let row_height = block_height(row_lines).max(LINE_HEIGHT * 3.0);

        if show_grouping {
            let b = Rect { x: MARGIN, y, w: GROUPING_WIDTH, h: row_height };
            canvas.rect(&b, &theme.grouping);
            canvas.text_lines(
                b.x + PADDING,
                b.y + PADDING,
                &name_lines,
                ThemeColors::text_color_for(&theme.grouping),
                true,
            );
        }
        for (column, lines) in FlowColumn::ALL.iter().zip(&cell_lines) {
            let fill = theme.column(*column);
            let b = Rect { x: column_x(*column), y, w: COLUMN_WIDTH, h: row_height };
            canvas.rect(&b, fill);
            canvas.text_lines(
                b.x + PADDING,
                b.y + PADDING,
                lines,
                ThemeColors::text_color_for(fill),
                false,
            );
        }
        y += row_height + GAP;
    }

    let height = y - GAP + MARGIN;
    let scale = options.scale.max(0.1);
    let (scaled_w, scaled_h) = (width * scale, height * scale);

    let mut svg = String::with_capacity(canvas.body.len() + 512);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{scaled_w}" height="{scaled_h}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}"/>"#,
        escape_xml(&options.background)
    );
    svg.push_str(&canvas.body);
    svg.push_str("</svg>\n");

    RenderedView {
        svg,
        width: scaled_w,
        height: scaled_h,
    }
}

fn header_band(canvas: &mut Canvas, diagram: &Diagram, theme: &ThemeColors, y: f32, width: f32) {
    let b = Rect { x: MARGIN, y, w: width, h: HEADER_HEIGHT };
    canvas.rect(&b, &theme.header);

    let mut title_x = b.x + PADDING * 2.0;
    if let Some(logo) = diagram.logo_url().filter(|url| url.starts_with("data:image/")) {
        let _ = writeln!(
            canvas.body,
            r#"<image x="{}" y="{}" width="{LOGO_SIZE}" height="{LOGO_SIZE}" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
            title_x,
            y + (HEADER_HEIGHT - LOGO_SIZE) / 2.0,
            escape_xml(logo)
        );
        title_x += LOGO_SIZE + PADDING * 2.0;
    }

    let max_title = ((b.x + b.w - title_x - PADDING) / (TITLE_FONT_SIZE * CHAR_WIDTH_RATIO)).max(1.0)
        as usize;
    let _ = writeln!(
        canvas.body,
        r#"<text x="{title_x}" y="{}" font-family="{FONT_FAMILY}" font-size="{TITLE_FONT_SIZE}" font-weight="bold" fill="{}">{}</text>"#,
        y + HEADER_HEIGHT / 2.0 + TITLE_FONT_SIZE / 3.0,
        ThemeColors::text_color_for(&theme.header),
        escape_xml(&truncate_with_ellipsis(&diagram.header_data().title, max_title))
    );
}

/// Need, vision and purpose side by side; returns the bottom edge.
fn purpose_row(canvas: &mut Canvas, diagram: &Diagram, theme: &ThemeColors, y: f32, width: f32) -> f32 {
    let header = diagram.header_data();
    let box_width = (width - 2.0 * GAP) / 3.0;
    let blocks = [
        (&header.need, &header.need_content),
        (&header.vision, &header.vision_content),
        (&header.purpose, &header.purpose_content),
    ];

    let wrapped: Vec<Vec<String>> = blocks
        .iter()
        .map(|(label, detail)| {
            let mut lines = wrap_text(label, max_chars(box_width));
            if let Some(detail) = detail.as_deref() {
                lines.extend(wrap_text(detail, max_chars(box_width)));
            }
            lines
        })
        .collect();
    let height = block_height(wrapped.iter().map(Vec::len).max().unwrap_or(1));

    let text_color = ThemeColors::text_color_for(&theme.need);
    for (i, lines) in wrapped.iter().enumerate() {
        let b = Rect { x: MARGIN + i as f32 * (box_width + GAP), y, w: box_width, h: height };
        canvas.rect(&b, &theme.need);
        canvas.text_lines(b.x + PADDING, b.y + PADDING, lines, text_color, true);
    }
    y + height
}

fn arrow(canvas: &mut Canvas, x: f32, mid_y: f32) {
    let _ = writeln!(
        canvas.body,
        r##"<path d="M {} {} L {} {} L {} {} Z" fill="#64748b"/>"##,
        x + 1.0,
        mid_y - 4.0,
        x + GAP - 1.0,
        mid_y,
        x + 1.0,
        mid_y + 4.0
    );
}
