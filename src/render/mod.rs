//! Clock icon rendering.
//!
//! Lays the hour and minute out on a small canvas,
//! shrinking the font until the ink fits inside the canvas minus a margin.
//! Two layouts are supported: `H:MM` on a single line, or the hour stacked
//! above the minutes.

use std::sync::Arc;

use chrono::Timelike;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

pub mod builtin;
pub mod face;

pub use face::{Extent, Typeface};

/// Ratio between font pixel size and the ink height of digits is roughly
/// 0.7, so starting at this multiple of the available height overshoots a
/// little and lets the shrink loop settle on the largest fitting size.
const START_SIZE_PER_PIXEL: f32 = 1.4;

/// Hour and minute strings for a 12-hour clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeText {
    /// Hour without a leading zero, `1..=12`.
    pub hour: String,
    /// Minutes, always two digits.
    pub minute: String,
}

impl TimeText {
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        let (_, hour) = time.hour12();
        Self {
            hour: hour.to_string(),
            minute: format!("{:02}", time.minute()),
        }
    }

    /// `H:MM`, used for the single-line layout and the tooltip.
    pub fn single_line(&self) -> String {
        format!("{}:{}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidCanvas { width, height });
        }
        Ok(Self { width, height })
    }

    /// Default margin for this canvas: one twelfth of the width, at least 1px.
    pub fn default_margin(&self) -> u32 {
        (self.width / 12).max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// `H:MM` centered on one line.
    #[default]
    SingleLine,
    /// Hour in the upper third, minutes in the lower two thirds.
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub policy: LayoutPolicy,
    /// Total horizontal (and vertical) slack kept free of ink.
    pub margin: u32,
    pub shrink_step: f32,
    pub min_font_size: f32,
    pub color: Rgba<u8>,
}

impl LayoutOptions {
    pub fn for_canvas(canvas: Canvas, policy: LayoutPolicy) -> Self {
        Self {
            policy,
            margin: canvas.default_margin(),
            shrink_step: 1.0,
            min_font_size: 6.0,
            color: Rgba([255, 255, 255, 255]),
        }
    }
}

/// Where one line of text ends up on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub text: String,
    pub size: f32,
    pub left: i32,
    pub top: i32,
    pub extent: Extent,
}

impl Placement {
    pub fn right(&self) -> i32 {
        self.left + self.extent.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.extent.height as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub lines: Vec<Placement>,
    /// False when the shrink loop stopped at the minimum font size, or the
    /// face cannot be scaled, without the text fitting.
    pub fits: bool,
}

/// Renders clock faces for one canvas configuration.
#[derive(Clone)]
pub struct ClockRenderer {
    face: Arc<dyn Typeface>,
    canvas: Canvas,
    options: LayoutOptions,
}

impl ClockRenderer {
    pub fn new(face: Arc<dyn Typeface>, canvas: Canvas, options: LayoutOptions) -> Self {
        Self {
            face,
            canvas,
            options,
        }
    }

    pub fn face_name(&self) -> &str {
        self.face.name()
    }

    /// Render the clock face for `time`.
    pub fn render<T: Timelike>(&self, time: &T) -> RgbaImage {
        self.render_text(&TimeText::from_time(time))
    }

    pub fn render_text(&self, text: &TimeText) -> RgbaImage {
        let layout = self.layout(text);
        let mut image = RgbaImage::new(self.canvas.width, self.canvas.height);
        for line in &layout.lines {
            self.face.draw(
                &mut image,
                &line.text,
                line.size,
                line.left,
                line.top,
                self.options.color,
            );
        }
        image
    }

    pub fn layout(&self, text: &TimeText) -> Layout {
        match self.options.policy {
            LayoutPolicy::SingleLine => self.layout_single_line(text),
            LayoutPolicy::Stacked => self.layout_stacked(text),
        }
    }

    fn max_width(&self) -> u32 {
        self.canvas.width.saturating_sub(self.options.margin)
    }

    fn max_height(&self) -> u32 {
        self.canvas.height.saturating_sub(self.options.margin)
    }

    fn shrink(&self, size: f32) -> f32 {
        (size - self.options.shrink_step).max(self.options.min_font_size)
    }

    fn layout_single_line(&self, text: &TimeText) -> Layout {
        let line = text.single_line();
        let (max_w, max_h) = (self.max_width(), self.max_height());
        let fits = |e: Extent| e.width <= max_w && e.height <= max_h;

        let mut size = (self.canvas.height as f32 * START_SIZE_PER_PIXEL).max(self.options.min_font_size);
        let mut extent = self.face.measure(&line, size);

        if self.face.is_scalable() {
            while !fits(extent) && size > self.options.min_font_size {
                size = self.shrink(size);
                extent = self.face.measure(&line, size);
            }
        }

        let placement = Placement {
            left: centered(self.canvas.width, extent.width),
            top: centered(self.canvas.height, extent.height),
            text: line,
            size,
            extent,
        };

        Layout {
            fits: fits(extent),
            lines: vec![placement],
        }
    }

    fn layout_stacked(&self, text: &TimeText) -> Layout {
        let max_w = self.max_width();
        let inner_h = self.max_height();
        let top_margin = (self.options.margin / 2) as i32;
        let hour_band = inner_h / 3;
        let minute_band = inner_h - hour_band;
        let gap = (inner_h / 16).max(1);

        let hour_fits = |e: Extent| e.width <= max_w && e.height + gap <= hour_band;
        let minute_fits = |e: Extent| e.width <= max_w && e.height <= minute_band;

        let min = self.options.min_font_size;
        let mut hour_size = (hour_band as f32 * START_SIZE_PER_PIXEL).max(min);
        let mut minute_size = (minute_band as f32 * START_SIZE_PER_PIXEL).max(min);
        let mut hour = self.face.measure(&text.hour, hour_size);
        let mut minute = self.face.measure(&text.minute, minute_size);

        if self.face.is_scalable() {
            while !(hour_fits(hour) && minute_fits(minute)) && (hour_size > min || minute_size > min) {
                hour_size = self.shrink(hour_size);
                minute_size = self.shrink(minute_size);
                hour = self.face.measure(&text.hour, hour_size);
                minute = self.face.measure(&text.minute, minute_size);
            }
        }

        // The hour sits on the one-third line, the minutes are centered on
        // the two-thirds line.
        let boundary = top_margin + hour_band as i32;
        let hour_line = Placement {
            text: text.hour.clone(),
            size: hour_size,
            left: centered(self.canvas.width, hour.width),
            top: boundary - gap as i32 - hour.height as i32,
            extent: hour,
        };
        let minute_line = Placement {
            text: text.minute.clone(),
            size: minute_size,
            left: centered(self.canvas.width, minute.width),
            top: boundary + centered(minute_band, minute.height),
            extent: minute,
        };

        Layout {
            fits: hour_fits(hour) && minute_fits(minute),
            lines: vec![hour_line, minute_line],
        }
    }
}

fn centered(available: u32, used: u32) -> i32 {
    (available as i32 - used as i32) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::builtin::BuiltinFace;
    use chrono::NaiveTime;

    /// Deterministic scalable face: every character's ink is 0.6em wide and
    /// the line is 0.7em tall.
    struct BlockFace;

    impl Typeface for BlockFace {
        fn name(&self) -> &str {
            "block"
        }

        fn is_scalable(&self) -> bool {
            true
        }

        fn measure(&self, text: &str, size: f32) -> Extent {
            Extent {
                width: (text.chars().count() as f32 * size * 0.6).round() as u32,
                height: (size * 0.7).round() as u32,
            }
        }

        fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, left: i32, top: i32, color: Rgba<u8>) {
            let e = self.measure(text, size);
            for y in top..top + e.height as i32 {
                for x in left..left + e.width as i32 {
                    face::blend(image, x, y, color, 1.0);
                }
            }
        }
    }

    fn renderer(face: Arc<dyn Typeface>, w: u32, h: u32, policy: LayoutPolicy) -> ClockRenderer {
        let canvas = Canvas::new(w, h).unwrap();
        ClockRenderer::new(face, canvas, LayoutOptions::for_canvas(canvas, policy))
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_time_text_formatting() {
        assert_eq!(TimeText::from_time(&at(9, 5)), TimeText { hour: "9".into(), minute: "05".into() });
        assert_eq!(TimeText::from_time(&at(12, 0)), TimeText { hour: "12".into(), minute: "00".into() });
        assert_eq!(TimeText::from_time(&at(0, 30)).hour, "12");
        assert_eq!(TimeText::from_time(&at(23, 59)).single_line(), "11:59");
        assert_eq!(TimeText::from_time(&at(13, 7)).single_line(), "1:07");
    }

    #[test]
    fn test_hour_never_padded_minute_always_two_digits() {
        for h in 0..24 {
            for m in 0..60 {
                let t = TimeText::from_time(&at(h, m));
                assert!(!t.hour.starts_with('0'), "hour {:?}", t.hour);
                assert_eq!(t.minute.len(), 2);
            }
        }
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(Canvas::new(0, 16).is_err());
        assert!(Canvas::new(16, 0).is_err());
    }

    #[test]
    fn test_text_fits_for_all_times_and_canvases() {
        for policy in [LayoutPolicy::SingleLine, LayoutPolicy::Stacked] {
            for side in [24u32, 32, 48, 64, 128] {
                let r = renderer(Arc::new(BlockFace), side, side, policy);
                let margin = r.options.margin as i32;
                for h in 0..24 {
                    for m in 0..60 {
                        let layout = r.layout(&TimeText::from_time(&at(h, m)));
                        assert!(layout.fits, "{:?} {}px {}:{}", policy, side, h, m);
                        for line in &layout.lines {
                            assert!(line.extent.width as i32 <= side as i32 - margin);
                            assert!(line.left >= 0 && line.top >= 0, "{:?}", line);
                            assert!(line.right() <= side as i32 && line.bottom() <= side as i32, "{:?}", line);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_shrink_loop_stops_at_floor() {
        // Far too narrow for "12:59" at any size above the floor.
        let r = renderer(Arc::new(BlockFace), 8, 64, LayoutPolicy::SingleLine);
        let layout = r.layout(&TimeText::from_time(&at(12, 59)));
        assert!(!layout.fits);
        assert_eq!(layout.lines[0].size, r.options.min_font_size);
    }

    #[test]
    fn test_single_line_is_centered() {
        let r = renderer(Arc::new(BlockFace), 128, 128, LayoutPolicy::SingleLine);
        let layout = r.layout(&TimeText::from_time(&at(10, 10)));
        let line = &layout.lines[0];
        assert_eq!(line.text, "10:10");
        assert!((line.left - (128 - line.right())).abs() <= 1);
        assert!((line.top - (128 - line.bottom())).abs() <= 1);
    }

    #[test]
    fn test_stacked_24px_one_oh_five() {
        let r = renderer(Arc::new(BlockFace), 24, 24, LayoutPolicy::Stacked);
        let layout = r.layout(&TimeText::from_time(&at(1, 5)));
        let (hour, minute) = (&layout.lines[0], &layout.lines[1]);

        assert!(layout.fits);
        assert_eq!(hour.text, "1");
        assert_eq!(minute.text, "05");
        // hour above the midline, minutes below it, and the two do not touch
        assert!(hour.bottom() <= 12);
        assert!(minute.top + minute.extent.height as i32 / 2 > 12);
        assert!(hour.bottom() < minute.top);
        // both centered horizontally
        for line in [hour, minute] {
            assert!((line.left - (24 - line.right())).abs() <= 1, "{:?}", line);
        }
    }

    #[test]
    fn test_stacked_shrinks_both_lines_together() {
        let r = renderer(Arc::new(BlockFace), 32, 32, LayoutPolicy::Stacked);
        let layout = r.layout(&TimeText::from_time(&at(12, 44)));
        let canvas_h = 32.0;
        let inner = canvas_h - r.options.margin as f32;
        let hour_start = (inner / 3.0).floor() * START_SIZE_PER_PIXEL;
        let minute_start = (inner - (inner / 3.0).floor()) * START_SIZE_PER_PIXEL;
        let hour_shrunk = hour_start - layout.lines[0].size;
        let minute_shrunk = minute_start - layout.lines[1].size;
        // same number of steps unless one side hit the floor
        if layout.lines[0].size > r.options.min_font_size {
            assert!((hour_shrunk - minute_shrunk).abs() < 1e-3);
        }
    }

    #[test]
    fn test_render_output_matches_canvas() {
        let r = renderer(Arc::new(BlockFace), 40, 24, LayoutPolicy::SingleLine);
        let img = r.render(&at(3, 33));
        assert_eq!(img.dimensions(), (40, 24));
        // transparent background, white ink
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        let ink: Vec<_> = img.pixels().filter(|p| p[3] > 0).collect();
        assert!(!ink.is_empty());
        assert!(ink.iter().all(|p| p[0] == 255 && p[1] == 255 && p[2] == 255));
    }

    #[test]
    fn test_builtin_face_skips_shrink_loop() {
        let r = renderer(Arc::new(BuiltinFace), 128, 128, LayoutPolicy::SingleLine);
        let layout = r.layout(&TimeText::from_time(&at(12, 59)));
        let line = &layout.lines[0];
        assert_eq!(line.size, 128.0 * START_SIZE_PER_PIXEL);
        assert_eq!(line.extent, BuiltinFace.measure("12:59", 0.0));
        assert!(layout.fits);
    }

    #[test]
    fn test_builtin_face_degrades_on_tiny_canvas() {
        let r = renderer(Arc::new(BuiltinFace), 16, 16, LayoutPolicy::SingleLine);
        let layout = r.layout(&TimeText::from_time(&at(12, 59)));
        assert!(!layout.fits);
        let img = r.render(&at(12, 59));
        assert_eq!(img.dimensions(), (16, 16));
    }
}
