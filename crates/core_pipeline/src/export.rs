//! PDF export
//!
//! Writes the text report followed by the marks chart into a paginated A4
//! document using printpdf's builtin fonts. The cursor runs top-down and a
//! new page starts whenever the next block would cross the bottom margin.

use crate::chart::{PieChart, DEFAULT_CHART_SIZE};
use crate::error::{PipelineError, Result};
use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;

const BODY_FONT_SIZE: f32 = 9.0;
const HEADING_FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 4.2;
const HEADING_HEIGHT_MM: f32 = 7.0;
const BLOCK_GAP_MM: f32 = 4.0;

/// Courier at 9pt fits this many characters across the printable width
const MAX_LINE_CHARS: usize = 88;

/// Resolution at which embedded images have their native size
const IMAGE_DPI: f32 = 300.0;

/// 500pt bounding box for the chart, in millimetres
pub const CHART_BOX_MM: f32 = 500.0 * 25.4 / 72.0;

pub const DEFAULT_EXTENSION: &str = "pdf";

/// Append `.pdf` unless the file name already ends with it (any case)
pub fn with_pdf_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase().ends_with(&format!(".{DEFAULT_EXTENSION}")))
        .unwrap_or(false);

    if has_extension {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(DEFAULT_EXTENSION);
    PathBuf::from(name)
}

/// Paginated document under construction
pub struct PdfReport {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, measured from the page bottom
    cursor_mm: f32,
    pages: usize,
}

impl PdfReport {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| PipelineError::Export(format!("PDF font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PipelineError::Export(format!("PDF font error: {e}")))?;

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            cursor_mm: A4_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_mm = A4_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn ensure_space(&mut self, height_mm: f32) {
        if self.cursor_mm - height_mm < MARGIN_MM {
            self.new_page();
        }
    }

    /// Append a block of monospaced text, one PDF line per text line
    pub fn push_text(&mut self, text: &str) {
        for line in text.lines() {
            for chunk in wrap_line(line, MAX_LINE_CHARS) {
                self.ensure_space(LINE_HEIGHT_MM);
                self.cursor_mm -= LINE_HEIGHT_MM;
                self.layer.use_text(
                    chunk,
                    BODY_FONT_SIZE,
                    Mm(MARGIN_MM),
                    Mm(self.cursor_mm),
                    &self.font,
                );
            }
        }
        self.cursor_mm -= BLOCK_GAP_MM;
    }

    pub fn push_heading(&mut self, text: &str) {
        self.ensure_space(HEADING_HEIGHT_MM);
        self.cursor_mm -= HEADING_HEIGHT_MM;
        self.layer.use_text(
            text,
            HEADING_FONT_SIZE,
            Mm(MARGIN_MM),
            Mm(self.cursor_mm),
            &self.bold,
        );
    }

    /// Append a single line in the given colour
    pub fn push_colored_line(&mut self, text: &str, color: [u8; 3]) {
        self.ensure_space(LINE_HEIGHT_MM);
        self.cursor_mm -= LINE_HEIGHT_MM;
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(
            text,
            BODY_FONT_SIZE,
            Mm(MARGIN_MM),
            Mm(self.cursor_mm),
            &self.font,
        );
        self.layer.set_fill_color(rgb([0, 0, 0]));
    }

    /// Append a PNG scaled to fit a `box_w_mm`×`box_h_mm` region
    ///
    /// The box is clamped to the printable area; aspect ratio is kept.
    pub fn push_image(&mut self, png: &[u8], box_w_mm: f32, box_h_mm: f32) -> Result<()> {
        let decoded =
            image_crate::load_from_memory_with_format(png, image_crate::ImageFormat::Png)
                .map_err(|e| PipelineError::Export(format!("cannot decode chart image: {e}")))?;
        let (width_px, height_px) = decoded.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(PipelineError::Export("chart image is empty".to_string()));
        }

        let native_w_mm = width_px as f32 / IMAGE_DPI * 25.4;
        let native_h_mm = height_px as f32 / IMAGE_DPI * 25.4;

        let box_w = box_w_mm.min(A4_WIDTH_MM - 2.0 * MARGIN_MM);
        let box_h = box_h_mm.min(A4_HEIGHT_MM - 2.0 * MARGIN_MM);
        let scale = (box_w / native_w_mm).min(box_h / native_h_mm);
        let drawn_h_mm = native_h_mm * scale;

        self.ensure_space(drawn_h_mm);
        self.cursor_mm -= drawn_h_mm;

        debug!(width_px, height_px, scale, page = self.pages, "placing image");

        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(self.cursor_mm)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        self.cursor_mm -= BLOCK_GAP_MM;
        Ok(())
    }

    /// Finalize the document to disk
    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| {
            PipelineError::Export(format!("cannot create {}: {e}", path.display()))
        })?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| PipelineError::Export(format!("PDF save error: {e}")))
    }
}

/// Write the report text, the chart and its legend to `path`
///
/// Returns the path actually written, with the default extension applied.
pub fn export_report(report_text: &str, chart: &PieChart, path: &Path) -> Result<PathBuf> {
    let path = with_pdf_extension(path);
    let chart_png = chart.to_png(DEFAULT_CHART_SIZE)?;

    let mut pdf = PdfReport::new("Student Report Analysis")?;
    pdf.push_text(report_text);
    pdf.push_heading(&chart.title);
    pdf.push_image(&chart_png, CHART_BOX_MM, CHART_BOX_MM)?;
    for slice in &chart.slices {
        let line = format!(
            "# {}: {} ({:.1}%)",
            slice.label,
            slice.value,
            slice.share * 100.0
        );
        pdf.push_colored_line(&line, slice.color);
    }

    let pages = pdf.page_count();
    pdf.save(&path).inspect_err(|e| warn!(error = %e, "export failed"))?;
    debug!(path = %path.display(), pages, "exported report");
    Ok(path)
}

fn rgb(color: [u8; 3]) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(color[0]) / 255.0,
        f32::from(color[1]) / 255.0,
        f32::from(color[2]) / 255.0,
        None,
    ))
}

/// Split a line into chunks of at most `width` characters
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= width {
        return vec![line.to_string()];
    }
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarksMap;

    fn sample_chart() -> PieChart {
        let marks: MarksMap = [("Math", 95), ("Science", 60)].into_iter().collect();
        PieChart::from_marks(&marks)
    }

    #[test]
    fn test_with_pdf_extension_appends_when_missing() {
        assert_eq!(with_pdf_extension(Path::new("out")), PathBuf::from("out.pdf"));
        assert_eq!(
            with_pdf_extension(Path::new("dir/report.txt")),
            PathBuf::from("dir/report.txt.pdf")
        );
    }

    #[test]
    fn test_with_pdf_extension_keeps_existing() {
        assert_eq!(with_pdf_extension(Path::new("a/b.pdf")), PathBuf::from("a/b.pdf"));
        assert_eq!(with_pdf_extension(Path::new("OUT.PDF")), PathBuf::from("OUT.PDF"));
    }

    #[test]
    fn test_wrap_line() {
        assert_eq!(wrap_line("short", 10), vec!["short"]);
        assert_eq!(wrap_line("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_export_report_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let chart = sample_chart();

        let written =
            export_report("STUDENT REPORT ANALYSIS", &chart, &dir.path().join("report")).unwrap();

        assert_eq!(written, dir.path().join("report.pdf"));
        let bytes = std::fs::read(&written).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_text_spans_pages() {
        let mut pdf = PdfReport::new("long").unwrap();
        let text = (0..200)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        pdf.push_text(&text);
        assert!(pdf.page_count() >= 3);
    }

    #[test]
    fn test_image_breaks_page_when_needed() {
        let mut pdf = PdfReport::new("paged").unwrap();
        let text = (0..50)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        pdf.push_text(&text);
        assert_eq!(pdf.page_count(), 1);

        let png = sample_chart().to_png(100).unwrap();
        pdf.push_image(&png, CHART_BOX_MM, CHART_BOX_MM).unwrap();
        assert_eq!(pdf.page_count(), 2);
    }

    #[test]
    fn test_invalid_image_is_export_error() {
        let mut pdf = PdfReport::new("bad").unwrap();
        let result = pdf.push_image(b"not a png", 100.0, 100.0);
        assert!(matches!(result, Err(PipelineError::Export(_))));
    }

    #[test]
    fn test_save_to_missing_directory_is_export_error() {
        let pdf = PdfReport::new("nowhere").unwrap();
        let result = pdf.save(Path::new("/nonexistent/dir/report.pdf"));
        assert!(matches!(result, Err(PipelineError::Export(_))));
    }
}
