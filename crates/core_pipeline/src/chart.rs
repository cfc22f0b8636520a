//! Pie chart of subject marks
//!
//! Slices are rasterized with imageproc onto a white square canvas and
//! serialized to PNG for embedding in the exported document.

use crate::error::{PipelineError, Result};
use crate::types::MarksMap;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_polygon_mut};
use imageproc::point::Point;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;

pub const CHART_TITLE: &str = "Subject-wise Marks Distribution";

/// Default raster edge length in pixels
pub const DEFAULT_CHART_SIZE: u32 = 500;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE: Rgb<u8> = Rgb([96, 96, 96]);

/// Slice colours, cycled when there are more subjects than entries
const PALETTE: [[u8; 3]; 10] = [
    [255, 85, 85],
    [85, 85, 255],
    [85, 255, 85],
    [255, 255, 85],
    [255, 85, 255],
    [85, 255, 255],
    [255, 175, 175],
    [128, 128, 128],
    [192, 0, 0],
    [0, 0, 192],
];

/// Maximum arc step between polygon vertices, in radians
const ARC_STEP: f64 = TAU / 360.0;

/// One pie slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: u32,
    /// Fraction of the whole, in [0, 1]
    pub share: f64,
    pub color: [u8; 3],
}

/// Proportional chart over a label→value mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

impl PieChart {
    /// Build slices in mapping order
    pub fn from_marks(marks: &MarksMap) -> Self {
        let total: u32 = marks.iter().map(|e| e.mark).sum();

        let slices = marks
            .iter()
            .enumerate()
            .map(|(i, entry)| Slice {
                label: entry.subject.clone(),
                value: entry.mark,
                share: if total == 0 {
                    0.0
                } else {
                    f64::from(entry.mark) / f64::from(total)
                },
                color: PALETTE[i % PALETTE.len()],
            })
            .collect();

        Self {
            title: CHART_TITLE.to_string(),
            slices,
        }
    }

    /// Rasterize onto a `size`×`size` canvas, first slice starting at twelve o'clock
    pub fn render(&self, size: u32) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(size, size, BACKGROUND);
        let center = (f64::from(size) / 2.0, f64::from(size) / 2.0);
        let radius = f64::from(size) * 0.45;
        let center_px = (center.0.round() as i32, center.1.round() as i32);

        let drawn: Vec<&Slice> = self.slices.iter().filter(|s| s.share > 0.0).collect();
        if drawn.is_empty() || radius < 1.0 {
            return canvas;
        }

        if drawn.len() == 1 {
            draw_filled_circle_mut(&mut canvas, center_px, radius as i32, Rgb(drawn[0].color));
        } else {
            let mut start = -FRAC_PI_2;
            for slice in drawn {
                let sweep = slice.share * TAU;
                let polygon = slice_polygon(center, radius, start, sweep);
                draw_polygon_mut(&mut canvas, &polygon, Rgb(slice.color));
                start += sweep;
            }
        }

        draw_hollow_circle_mut(&mut canvas, center_px, radius as i32, OUTLINE);
        canvas
    }

    /// Rasterize and encode as PNG
    pub fn to_png(&self, size: u32) -> Result<Vec<u8>> {
        let image = self.render(size);
        let mut png_bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| PipelineError::Export(format!("failed to encode chart as PNG: {e}")))?;
        Ok(png_bytes)
    }
}

/// Center point followed by arc vertices from `start` through `start + sweep`
fn slice_polygon(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<Point<i32>> {
    let steps = ((sweep / ARC_STEP).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(Point::new(center.0.round() as i32, center.1.round() as i32));

    for i in 0..=steps {
        let angle = start + sweep * (i as f64 / steps as f64);
        let point = Point::new(
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        );
        if points.last() != Some(&point) {
            points.push(point);
        }
    }

    // imageproc rejects polygons whose first and last vertices coincide
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}
