//! Text slide rendering
//!
//! Each slide is a solid background with the segment text word-wrapped and
//! centered. Output depends only on the text and the [`SlideStyle`], so
//! rendering the same script twice yields identical images.

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::VisualSegment;
use crate::config::{SlideStyle, RESOLUTION};
use crate::script::{wrap_words, PitchScript};

/// System fonts tried in order when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Error, Debug)]
pub enum SlideError {
    #[error("failed to read font {path}: {source}")]
    FontRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font {path}: {reason}")]
    FontParse { path: String, reason: String },

    #[error("failed to save slide {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Renders slide images at the fixed output resolution.
pub struct SlideRenderer {
    style: SlideStyle,
    font: Option<Font>,
}

impl SlideRenderer {
    /// Create a renderer. A configured font must load; otherwise the first
    /// usable system font is taken. With no font at all, slides are
    /// background-only.
    pub fn new(style: &SlideStyle) -> Result<Self, SlideError> {
        let font = match &style.font_path {
            Some(path) => Some(load_font(path)?),
            None => discover_font(),
        };

        if font.is_none() {
            warn!("No TrueType font found; slides will be rendered without text");
        }

        Ok(Self {
            style: style.clone(),
            font,
        })
    }

    /// Renderer that draws backgrounds only.
    pub fn without_font(style: &SlideStyle) -> Self {
        Self {
            style: style.clone(),
            font: None,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn style(&self) -> &SlideStyle {
        &self.style
    }

    /// Wrap width in characters, estimated from the font size.
    pub fn chars_per_line(&self) -> usize {
        let usable = RESOLUTION.0.saturating_sub(self.style.margin) as f32;
        let avg_char_width = self.style.font_size * 0.6;
        ((usable / avg_char_width) as usize).max(1)
    }

    /// Lines as they will be drawn: explicit `\n` breaks first, then word
    /// wrap. Blank paragraphs stay as empty lines.
    pub fn layout_lines(&self, text: &str) -> Vec<String> {
        let width = self.chars_per_line();
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            if paragraph.trim().is_empty() {
                lines.push(String::new());
            } else {
                lines.extend(wrap_words(paragraph, width));
            }
        }
        lines
    }

    /// Render `text` onto a fresh slide.
    pub fn render(&self, text: &str) -> RgbImage {
        let (width, height) = RESOLUTION;
        let mut image = RgbImage::from_pixel(width, height, Rgb(self.style.background));

        let Some(font) = &self.font else {
            return image;
        };

        let lines = self.layout_lines(text);
        let line_height = i64::from((self.style.font_size * 1.5) as u32);
        let total_height = lines.len() as i64 * line_height;
        let mut y = (i64::from(height) - total_height) / 2;

        let mut layout: Layout = Layout::new(CoordinateSystem::PositiveYDown);
        for line in &lines {
            if !line.is_empty() {
                layout.reset(&LayoutSettings::default());
                layout.append(&[font], &TextStyle::new(line, self.style.font_size, 0));

                let glyphs = layout.glyphs();
                let line_width = glyphs
                    .iter()
                    .map(|g| g.x + g.width as f32)
                    .fold(0.0_f32, f32::max);
                let x = ((width as f32 - line_width) / 2.0).round() as i64;

                for glyph in glyphs {
                    if glyph.width == 0 || glyph.height == 0 {
                        continue;
                    }
                    let (_, coverage) = font.rasterize_config(glyph.key);
                    blend_glyph(
                        &mut image,
                        &coverage,
                        glyph.width,
                        glyph.height,
                        x + glyph.x.round() as i64,
                        y + glyph.y.round() as i64,
                        self.style.text_color,
                    );
                }
            }
            y += line_height;
        }

        image
    }
}

/// Alpha-blend a coverage bitmap onto the image, clipping at the edges.
fn blend_glyph(
    image: &mut RgbImage,
    coverage: &[u8],
    glyph_width: usize,
    glyph_height: usize,
    x0: i64,
    y0: i64,
    color: [u8; 3],
) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    for row in 0..glyph_height {
        for col in 0..glyph_width {
            let alpha = coverage[row * glyph_width + col];
            if alpha == 0 {
                continue;
            }

            let px = x0 + col as i64;
            let py = y0 + row as i64;
            if px < 0 || py < 0 || px >= width || py >= height {
                continue;
            }

            let pixel = image.get_pixel_mut(px as u32, py as u32);
            let a = u16::from(alpha);
            for (channel, fg) in pixel.0.iter_mut().zip(color) {
                let blended = (u16::from(fg) * a + u16::from(*channel) * (255 - a) + 127) / 255;
                *channel = blended as u8;
            }
        }
    }
}

fn load_font(path: &Path) -> Result<Font, SlideError> {
    let bytes = std::fs::read(path).map_err(|source| SlideError::FontRead {
        path: path.display().to_string(),
        source,
    })?;

    Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| SlideError::FontParse {
        path: path.display().to_string(),
        reason: reason.to_string(),
    })
}

fn discover_font() -> Option<Font> {
    FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .filter(|path| path.exists())
        .find_map(|path| match load_font(path) {
            Ok(font) => {
                debug!("Using font {}", path.display());
                Some(font)
            }
            Err(e) => {
                debug!("Skipping font: {e}");
                None
            }
        })
}

/// Title-case each whitespace-separated word ("coffee shop" -> "Coffee Shop").
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produces one slide per script segment.
pub struct TextSlideProducer {
    renderer: SlideRenderer,
}

impl TextSlideProducer {
    pub fn new(style: &SlideStyle) -> Result<Self, SlideError> {
        Ok(Self::with_renderer(SlideRenderer::new(style)?))
    }

    pub fn with_renderer(renderer: SlideRenderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &SlideRenderer {
        &self.renderer
    }

    /// Render and save one slide.
    pub fn render_slide(
        &self,
        text: &str,
        weight: f64,
        path: PathBuf,
    ) -> Result<VisualSegment, SlideError> {
        let preview: String = text.chars().take(50).collect();
        info!("Creating text slide: {}...", preview.replace('\n', " "));

        let image = self.renderer.render(text);
        image.save(&path).map_err(|source| SlideError::Save {
            path: path.display().to_string(),
            source,
        })?;

        Ok(VisualSegment::slide(text, image, path, weight))
    }

    /// Render every script segment into `work_dir` as `slide_NNN.png`.
    pub fn produce(
        &self,
        script: &PitchScript,
        work_dir: &Path,
    ) -> Result<Vec<VisualSegment>, SlideError> {
        script
            .segments()
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                self.render_slide(
                    &segment.text,
                    segment.weight,
                    work_dir.join(format!("slide_{index:03}.png")),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_renderer() -> SlideRenderer {
        SlideRenderer::without_font(&SlideStyle::default())
    }

    #[test]
    fn chars_per_line_from_font_size() {
        // (1920 - 200) / (70 * 0.6)
        assert_eq!(bare_renderer().chars_per_line(), 40);
    }

    #[test]
    fn layout_honors_explicit_breaks() {
        let lines = bare_renderer().layout_lines("The Problem:\nBottleneck at the Register");
        assert_eq!(lines, vec!["The Problem:", "Bottleneck at the Register"]);
    }

    #[test]
    fn layout_wraps_long_lines() {
        let text = "a predictive AI engine that ingests sales history, time patterns, and even weather data";
        let renderer = bare_renderer();
        let lines = renderer.layout_lines(text);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= renderer.chars_per_line()));
    }

    #[test]
    fn layout_keeps_blank_paragraphs() {
        let lines = bare_renderer().layout_lines("Top\n\nBottom");
        assert_eq!(lines, vec!["Top", "", "Bottom"]);
    }

    #[test]
    fn render_fills_background_at_full_resolution() {
        let image = bare_renderer().render("anything");
        assert_eq!(image.dimensions(), RESOLUTION);
        assert_eq!(image.get_pixel(0, 0), &Rgb([30, 30, 30]));
        assert_eq!(image.get_pixel(1919, 1079), &Rgb([30, 30, 30]));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = SlideRenderer::new(&SlideStyle::default()).unwrap();
        let a = renderer.render("Result:\n20% Faster Service");
        let b = renderer.render("Result:\n20% Faster Service");
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn text_is_drawn_when_font_available() {
        let renderer = SlideRenderer::new(&SlideStyle::default()).unwrap();
        if !renderer.has_font() {
            return;
        }
        let image = renderer.render("BeanFlow");
        let lit = image.pixels().filter(|p| p.0 != [30, 30, 30]).count();
        assert!(lit > 0);
        // Corners stay background with centered text.
        assert_eq!(image.get_pixel(0, 0), &Rgb([30, 30, 30]));
    }

    #[test]
    fn missing_configured_font_is_an_error() {
        let style = SlideStyle {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..Default::default()
        };
        assert!(matches!(
            SlideRenderer::new(&style),
            Err(SlideError::FontRead { .. })
        ));
    }

    #[test]
    fn blend_clips_out_of_bounds() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        blend_glyph(&mut image, &[255; 9], 3, 3, 2, 2, [255, 255, 255]);
        assert_eq!(image.get_pixel(3, 3), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("coffee shop busy"), "Coffee Shop Busy");
        assert_eq!(title_case("AI engine"), "Ai Engine");
    }

    #[test]
    fn produce_one_slide_per_segment() {
        let dir = tempfile::tempdir().unwrap();
        let producer = TextSlideProducer::with_renderer(bare_renderer());
        let script =
            PitchScript::from_text("We built BeanFlow. It saves coffee shops time. Try it free.");

        let segments = producer.produce(&script, dir.path()).unwrap();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(VisualSegment::is_slide));
        assert!(dir.path().join("slide_000.png").exists());
        assert!(dir.path().join("slide_002.png").exists());
    }
}
