//! Bar and pie charts drawn onto a [`Surface`].
//!
//! The drawing routines only issue primitive operations (rectangles, pie
//! slices, text runs); [`RasterSurface`] turns them into an RGBA image that can
//! be written out as PNG.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::aggregation::{HistoryReport, MONTH_LABELS, Series};
use crate::config::ChartConfig;

pub const PLACEHOLDER: &str = "Pas de données";

const PLACEHOLDER_SIZE: u32 = 11;
const LABEL_SIZE: u32 = 8;
const LEGEND_SIZE: u32 = 11;
const LABEL_MAX_CHARS: usize = 6;
const LABEL_KEEP_CHARS: usize = 5;
const LEGEND_SWATCH: f64 = 12.0;
const LEGEND_LINE: f64 = 22.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 0xff])
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A positioned piece of text; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextAlign,
    pub size: u32,
    pub color: Color,
}

/// Drawing target for the chart routines.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn clear(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);

    /// Filled slice centred on `(cx, cy)`, from angle `start` sweeping
    /// clockwise by `sweep` radians (0 points right, screen coordinates).
    fn fill_slice(&mut self, cx: f64, cy: f64, radius: f64, start: f64, sweep: f64, color: Color);

    fn text(&mut self, run: TextRun);
}

/// What a draw call ended up rendering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Placeholder,
    Drawn,
}

/// Labels longer than six characters keep five plus a marker.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX_CHARS {
        let head: String = label.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{head}.")
    } else {
        label.to_string()
    }
}

/// Bar value label: whole number, thousands abbreviated as `Nk`.
pub fn format_value(value: f64) -> String {
    let rounded = value.round();
    if rounded >= 1000.0 {
        format!("{}k", (value / 1000.0).round() as i64)
    } else {
        format!("{}", rounded as i64)
    }
}

fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn placeholder(surface: &mut dyn Surface, style: &ChartConfig) -> ChartOutcome {
    let (w, h) = (surface.width() as f64, surface.height() as f64);
    surface.text(TextRun {
        text: PLACEHOLDER.to_string(),
        x: w / 2.0,
        y: h / 2.0,
        align: TextAlign::Center,
        size: PLACEHOLDER_SIZE,
        color: style.placeholder,
    });
    ChartOutcome::Placeholder
}

/// Vertical bars, one per label, scaled to the largest value.
pub fn draw_bar(
    surface: &mut dyn Surface,
    labels: &[String],
    values: &[f64],
    color: Color,
    style: &ChartConfig,
) -> ChartOutcome {
    surface.clear();
    let values: Vec<f64> = (0..labels.len())
        .map(|i| finite_or_zero(values.get(i).copied().unwrap_or(0.0)))
        .collect();
    if labels.is_empty() || values.iter().all(|v| *v == 0.0) {
        return placeholder(surface, style);
    }

    let (w, h) = (surface.width() as i64, surface.height() as i64);
    let margin = style.margin as i64;
    let gutter = style.gutter as i64;
    let band = style.label_band as i64;
    let plot_height = (h - band - margin).max(1) as f64;
    let bar_width = ((w - 2 * margin) / labels.len() as i64 - gutter).max(1);

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };

    for (i, (label, value)) in labels.iter().zip(&values).enumerate() {
        let bar_height = ((value / max) * plot_height).round().max(0.0);
        let x = (margin + i as i64 * (bar_width + gutter)) as f64;
        let y = (h - band) as f64 - bar_height;
        let center = x + bar_width as f64 / 2.0;

        surface.fill_rect(x, y, bar_width as f64, bar_height, color);
        surface.text(TextRun {
            text: truncate_label(label),
            x: center,
            y: (h - 5) as f64,
            align: TextAlign::Center,
            size: LABEL_SIZE,
            color: style.label,
        });
        if *value > 0.0 {
            surface.text(TextRun {
                text: format_value(*value),
                x: center,
                y: y - 4.0,
                align: TextAlign::Center,
                size: LABEL_SIZE,
                color: style.value_label,
            });
        }
    }
    ChartOutcome::Drawn
}

/// Pie starting at the top, clockwise, with a legend to its right.
pub fn draw_pie(
    surface: &mut dyn Surface,
    labels: &[String],
    values: &[f64],
    palette: &[Color],
    style: &ChartConfig,
) -> ChartOutcome {
    surface.clear();
    let values: Vec<f64> = values.iter().copied().map(finite_or_zero).collect();
    let total: f64 = values.iter().sum();
    if !(total > 0.0) {
        return placeholder(surface, style);
    }
    let palette = if palette.is_empty() { &style.pie_palette[..] } else { palette };
    let color_at = |i: usize| palette.get(i % palette.len().max(1)).copied().unwrap_or(style.label);

    let h = surface.height() as f64;
    let radius = h / 2.0 - 10.0;
    let (cx, cy) = (h / 2.0, h / 2.0);

    let mut start = -FRAC_PI_2;
    for (i, value) in values.iter().enumerate() {
        let sweep = value / total * TAU;
        if sweep > 0.0 {
            surface.fill_slice(cx, cy, radius, start, sweep, color_at(i));
        }
        start += sweep;
    }

    for (i, label) in labels.iter().enumerate() {
        let row = i as f64 * LEGEND_LINE;
        surface.fill_rect(h + 10.0, 20.0 + row, LEGEND_SWATCH, LEGEND_SWATCH, color_at(i));
        let value = values.get(i).copied().unwrap_or(0.0);
        surface.text(TextRun {
            text: format!("{label} ({})", format_plain(value)),
            x: h + 26.0,
            y: 31.0 + row,
            align: TextAlign::Left,
            size: LEGEND_SIZE,
            color: style.value_label,
        });
    }
    ChartOutcome::Drawn
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// RGBA raster. Shapes are rasterised; text is kept as annotations since no
/// font is bundled.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    background: Color,
    texts: Vec<TextRun>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background.to_rgba()),
            background,
            texts: Vec::new(),
        }
    }

    pub fn from_config(style: &ChartConfig) -> Self {
        Self::new(style.width, style.height, style.background)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.image.width() && y < self.image.height()).then(|| {
            let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
            Color::rgb(r, g, b)
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ChartError> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), ChartError> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }

    fn clamp_span(&self, from: f64, to: f64, limit: u32) -> std::ops::Range<u32> {
        let lo = from.round().clamp(0.0, limit as f64) as u32;
        let hi = to.round().clamp(0.0, limit as f64) as u32;
        lo..hi.max(lo)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn clear(&mut self) {
        let bg = self.background.to_rgba();
        self.image.pixels_mut().for_each(|p| *p = bg);
        self.texts.clear();
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let rgba = color.to_rgba();
        let xs = self.clamp_span(x, x + w, self.image.width());
        let ys = self.clamp_span(y, y + h, self.image.height());
        for py in ys {
            for px in xs.clone() {
                self.image.put_pixel(px, py, rgba);
            }
        }
    }

    fn fill_slice(&mut self, cx: f64, cy: f64, radius: f64, start: f64, sweep: f64, color: Color) {
        let rgba = color.to_rgba();
        let full = sweep >= TAU - 1e-9;
        let xs = self.clamp_span(cx - radius, cx + radius + 1.0, self.image.width());
        let ys = self.clamp_span(cy - radius, cy + radius + 1.0, self.image.height());
        for py in ys {
            for px in xs.clone() {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let offset = (dy.atan2(dx) - start).rem_euclid(TAU);
                if full || offset <= sweep {
                    self.image.put_pixel(px, py, rgba);
                }
            }
        }
    }

    fn text(&mut self, run: TextRun) {
        self.texts.push(run);
    }
}

/// A chart ready to be written out.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub name: &'static str,
    pub outcome: ChartOutcome,
    pub surface: RasterSurface,
}

/// Renders the history report's four charts.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    style: ChartConfig,
}

impl ChartRenderer {
    pub fn new(style: ChartConfig) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ChartConfig {
        &self.style
    }

    pub fn bar(&self, series: &Series, color: Color) -> (ChartOutcome, RasterSurface) {
        let mut surface = RasterSurface::from_config(&self.style);
        let outcome = draw_bar(&mut surface, &series.labels, &series.values, color, &self.style);
        (outcome, surface)
    }

    pub fn pie(&self, series: &Series) -> (ChartOutcome, RasterSurface) {
        let mut surface = RasterSurface::from_config(&self.style);
        let outcome = draw_pie(&mut surface, &series.labels, &series.values, &self.style.pie_palette, &self.style);
        (outcome, surface)
    }

    pub fn history(&self, report: &HistoryReport) -> Vec<RenderedChart> {
        let monthly = Series {
            labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            values: report.monthly_revenue.to_vec(),
        };
        let charts = [
            ("revenue", self.bar(&monthly, self.style.revenue)),
            ("crop-statuses", self.pie(&report.statuses)),
            ("maintenance", self.bar(&report.event_types, self.style.maintenance)),
            ("products", self.bar(&report.top_products, self.style.products)),
        ];
        charts
            .into_iter()
            .map(|(name, (outcome, surface))| RenderedChart {
                name,
                outcome,
                surface,
            })
            .collect()
    }
}
