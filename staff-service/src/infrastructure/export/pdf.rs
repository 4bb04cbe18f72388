//! PDF export of a staff page: landscape A4, one table, running header and
//! footer on every page.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};
use shared::{time::format_report_date, types::StaffResponse};

use super::HEADERS;
use crate::domain::export::{ExportError, ExportFormat, ReportMeta, ReportRenderer};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN_X: f32 = 15.0;
const CONTENT_TOP: f32 = PAGE_HEIGHT - 22.0;
const CONTENT_BOTTOM: f32 = 18.0;
const TABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const HEADER_ROW_HEIGHT: f32 = 9.0;
const ROW_HEIGHT: f32 = 7.5;
const CELL_PADDING: f32 = 2.5;
/// Relative widths of Staff ID, Full Name, Gender, Birthday.
const COLUMN_WEIGHTS: [f32; 4] = [20.0, 35.0, 20.0, 25.0];

const HEADER_FILL: (u8, u8, u8) = (41, 128, 185);
const STRIPE_FILL: (u8, u8, u8) = (245, 245, 245);
const BLACK: (u8, u8, u8) = (0, 0, 0);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const GRAY: (u8, u8, u8) = (128, 128, 128);

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.52;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReport;

impl ReportRenderer for PdfReport {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, rows: &[StaffResponse], meta: &ReportMeta) -> Result<Vec<u8>, ExportError> {
        render_document(rows, meta).map(|(bytes, _pages)| bytes)
    }
}

/// Returns the document bytes and its page count.
fn render_document(
    rows: &[StaffResponse],
    meta: &ReportMeta,
) -> Result<(Vec<u8>, usize), ExportError> {
    let mut canvas = Canvas::new(meta)?;

    canvas.centered_line(&meta.title, 18.0, FontKind::Bold, 10.0);
    canvas.right_line(
        &format!(
            "Generated: {} | Total Records: {}",
            meta.generated_at,
            rows.len()
        ),
        9.0,
        FontKind::Italic,
        6.0,
    );
    if !meta.filters.is_empty() {
        canvas.left_line(
            &format!("Filters: {}", meta.filters.join(" | ")),
            9.0,
            FontKind::Regular,
            6.0,
        );
    }

    canvas.table_header();
    for (idx, staff) in rows.iter().enumerate() {
        if canvas.remaining() < ROW_HEIGHT {
            canvas.new_page();
            canvas.table_header();
        }
        let cells = [
            staff.staff_id.clone(),
            staff.full_name.clone(),
            staff.gender.label().to_string(),
            format_report_date(staff.birthday),
        ];
        let fill = if idx % 2 == 0 { WHITE } else { STRIPE_FILL };
        canvas.table_row(&cells, fill, ROW_HEIGHT, 10.0, FontKind::Regular, BLACK);
    }

    canvas.advance(8.0);
    if canvas.remaining() < 6.0 {
        canvas.new_page();
    }
    canvas.set_color(GRAY);
    canvas.centered_line(&meta.footer, 8.0, FontKind::Italic, 4.0);

    canvas.finish()
}

#[derive(Debug, Clone, Copy)]
enum FontKind {
    Regular,
    Bold,
    Italic,
}

/// Drawing state: the document, its fonts, the current page layer and a
/// vertical cursor in millimetres from the bottom edge.
struct Canvas<'a> {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    layer: PdfLayerReference,
    page_number: usize,
    cursor: f32,
    meta: &'a ReportMeta,
}

impl<'a> Canvas<'a> {
    fn new(meta: &'a ReportMeta) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(&meta.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
        let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;
        let italic = builtin_font(&doc, BuiltinFont::HelveticaOblique)?;
        let layer = doc.get_page(page).get_layer(layer);

        let canvas = Self {
            doc,
            regular,
            bold,
            italic,
            layer,
            page_number: 1,
            cursor: CONTENT_TOP,
            meta,
        };
        canvas.decorate();
        Ok(canvas)
    }

    fn font(&self, kind: FontKind) -> &IndirectFontRef {
        match kind {
            FontKind::Regular => &self.regular,
            FontKind::Bold => &self.bold,
            FontKind::Italic => &self.italic,
        }
    }

    /// Running header and footer.
    fn decorate(&self) {
        self.set_color(BLACK);
        self.text(
            &self.meta.title,
            10.0,
            MARGIN_X,
            PAGE_HEIGHT - 12.0,
            FontKind::Bold,
        );
        self.text(
            &format!("Generated: {}", self.meta.generated_at),
            8.0,
            MARGIN_X,
            8.0,
            FontKind::Regular,
        );
        let page = format!("Page {}", self.page_number);
        self.text(
            &page,
            8.0,
            PAGE_WIDTH - MARGIN_X - text_width(&page, 8.0),
            8.0,
            FontKind::Regular,
        );
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.cursor = CONTENT_TOP;
        self.decorate();
    }

    fn remaining(&self) -> f32 {
        self.cursor - CONTENT_BOTTOM
    }

    fn advance(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    fn set_color(&self, (r, g, b): (u8, u8, u8)) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        )));
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, font: FontKind) {
        self.layer
            .use_text(text, size, Mm(x), Mm(y), self.font(font));
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: (u8, u8, u8)) {
        self.set_color(color);
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)));
    }

    fn left_line(&mut self, text: &str, size: f32, font: FontKind, spacing_after: f32) {
        self.advance(size * PT_TO_MM);
        self.text(text, size, MARGIN_X, self.cursor, font);
        self.advance(spacing_after);
    }

    fn right_line(&mut self, text: &str, size: f32, font: FontKind, spacing_after: f32) {
        self.advance(size * PT_TO_MM);
        let x = PAGE_WIDTH - MARGIN_X - text_width(text, size);
        self.text(text, size, x.max(MARGIN_X), self.cursor, font);
        self.advance(spacing_after);
    }

    fn centered_line(&mut self, text: &str, size: f32, font: FontKind, spacing_after: f32) {
        self.advance(size * PT_TO_MM);
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.text(text, size, x.max(MARGIN_X), self.cursor, font);
        self.advance(spacing_after);
    }

    fn table_header(&mut self) {
        let cells = HEADERS.map(str::to_string);
        self.table_row(
            &cells,
            HEADER_FILL,
            HEADER_ROW_HEIGHT,
            11.0,
            FontKind::Bold,
            WHITE,
        );
    }

    fn table_row(
        &mut self,
        cells: &[String; 4],
        fill: (u8, u8, u8),
        height: f32,
        size: f32,
        font: FontKind,
        text_color: (u8, u8, u8),
    ) {
        let bottom = self.cursor - height;
        self.fill_rect(MARGIN_X, bottom, TABLE_WIDTH, height, fill);

        self.set_color(text_color);
        let baseline = bottom + (height - size * PT_TO_MM) / 2.0 + 0.5;
        let mut x = MARGIN_X;
        for (cell, width) in cells.iter().zip(column_widths()) {
            let fitted = fit_to_width(cell, size, width - 2.0 * CELL_PADDING);
            self.text(&fitted, size, x + CELL_PADDING, baseline, font);
            x += width;
        }
        self.set_color(BLACK);

        self.cursor = bottom;
    }

    fn finish(self) -> Result<(Vec<u8>, usize), ExportError> {
        let Self {
            doc, page_number, ..
        } = self;

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        Ok((bytes, page_number))
    }
}

fn builtin_font(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn column_widths() -> [f32; 4] {
    let total: f32 = COLUMN_WEIGHTS.iter().sum();
    COLUMN_WEIGHTS.map(|w| TABLE_WIDTH * w / total)
}

/// Approximate rendered width in millimetres. Built-in fonts carry no metrics.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * PT_TO_MM * AVG_GLYPH_WIDTH
}

/// Cuts `text` with a trailing ellipsis so it fits in `max_width` millimetres.
fn fit_to_width(text: &str, size: f32, max_width: f32) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let glyph = size * PT_TO_MM * AVG_GLYPH_WIDTH;
    let keep = ((max_width / glyph) as usize).saturating_sub(3);
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str("...");
    fitted
}
