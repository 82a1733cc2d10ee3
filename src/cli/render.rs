//! Render command - write one clock icon to disk.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use tracing::info;

use crate::config::Config;
use crate::render::{face, Canvas, ClockRenderer, LayoutPolicy, TimeText};

/// Parse `HH:MM` (24-hour).
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{}'", w))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((width, height))
}

/// Run the render command.
pub fn run(
    config: &Config,
    out: &Path,
    time: Option<NaiveTime>,
    layout: Option<LayoutPolicy>,
    size: Option<(u32, u32)>,
) -> Result<()> {
    let mut canvas = config.canvas()?;
    let mut options = config.layout_options()?;
    if let Some((width, height)) = size {
        canvas = Canvas::new(width, height)?;
        if config.icon.margin.is_none() {
            options.margin = canvas.default_margin();
        }
    }
    if let Some(policy) = layout {
        options.policy = policy;
    }

    let typeface = face::load_first(&config.font.candidates, &config.font.search_dirs);
    let renderer = ClockRenderer::new(typeface, canvas, options);

    let time = time.unwrap_or_else(|| chrono::Local::now().time());
    let text = TimeText::from_time(&time);
    let layout = renderer.layout(&text);
    let image = renderer.render_text(&text);

    image
        .save(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!(out = %out.display(), fits = layout.fits, "Rendered clock icon");

    println!("Wrote {} ({}x{})", out.display(), canvas.width, canvas.height);
    println!("  Time:   {}", text.single_line());
    println!("  Font:   {}", renderer.face_name());
    println!("  Layout: {:?}", options.policy);
    for line in &layout.lines {
        println!(
            "    '{}' size {:.1} at ({}, {}) ink {}x{}",
            line.text, line.size, line.left, line.top, line.extent.width, line.extent.height
        );
    }
    if !layout.fits {
        println!("  Warning: text does not fit the canvas at the minimum font size");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_time("0:00").unwrap(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("24x24").unwrap(), (24, 24));
        assert_eq!(parse_size("64X32").unwrap(), (64, 32));
        assert!(parse_size("0x16").is_err());
        assert!(parse_size("16").is_err());
        assert!(parse_size("ax16").is_err());
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clock.png");
        let mut config = Config::default();
        config.font.candidates.clear();

        run(
            &config,
            &out,
            NaiveTime::from_hms_opt(1, 5, 0),
            Some(LayoutPolicy::Stacked),
            Some((24, 24)),
        )
        .unwrap();

        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (24, 24));
        assert!(img.pixels().any(|p| p[3] > 0));
    }
}
