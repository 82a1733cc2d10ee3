//! Typefaces used by the layout engine.
//!
//! A [`Typeface`] measures and draws the *ink* of a string: the tight pixel
//! box around the rendered glyphs rather than advance widths, so the layout
//! engine can guarantee nothing is clipped at the canvas edges.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, PositionedGlyph, Rect, Scale};
use tracing::{debug, info, warn};

use super::builtin::BuiltinFace;
use crate::error::RenderError;

/// Pixel size of the ink box of a rendered string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

pub trait Typeface: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `size` has any effect. Fixed-size faces skip the shrink loop.
    fn is_scalable(&self) -> bool;

    /// Ink box of `text` at a font size of `size` pixels.
    fn measure(&self, text: &str, size: f32) -> Extent;

    /// Draw `text` so that the top-left corner of its ink box lands on
    /// `(left, top)`. Pixels outside the image are dropped.
    fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, left: i32, top: i32, color: Rgba<u8>);
}

/// A TrueType/OpenType face rendered through rusttype.
pub struct ScalableFace {
    name: String,
    font: Font<'static>,
}

impl ScalableFace {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, RenderError> {
        let name = name.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| RenderError::FontParse(name.clone()))?;
        Ok(Self { name, font })
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::FontRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    fn glyphs(&self, text: &str, size: f32) -> Vec<PositionedGlyph<'static>> {
        let scale = Scale::uniform(size);
        let ascent = self.font.v_metrics(scale).ascent;
        self.font.layout(text, scale, point(0.0, ascent)).collect()
    }
}

fn ink_box(glyphs: &[PositionedGlyph<'_>]) -> Option<Rect<i32>> {
    glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .reduce(|acc, bb| Rect {
            min: point(acc.min.x.min(bb.min.x), acc.min.y.min(bb.min.y)),
            max: point(acc.max.x.max(bb.max.x), acc.max.y.max(bb.max.y)),
        })
}

impl Typeface for ScalableFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_scalable(&self) -> bool {
        true
    }

    fn measure(&self, text: &str, size: f32) -> Extent {
        match ink_box(&self.glyphs(text, size)) {
            Some(bb) => Extent {
                width: (bb.max.x - bb.min.x) as u32,
                height: (bb.max.y - bb.min.y) as u32,
            },
            None => Extent::default(),
        }
    }

    fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, left: i32, top: i32, color: Rgba<u8>) {
        let glyphs = self.glyphs(text, size);
        let Some(ink) = ink_box(&glyphs) else {
            return;
        };

        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            let origin_x = left + bb.min.x - ink.min.x;
            let origin_y = top + bb.min.y - ink.min.y;
            glyph.draw(|x, y, coverage| {
                blend(image, origin_x + x as i32, origin_y + y as i32, color, coverage);
            });
        }
    }
}

/// Paint `color` at `(x, y)` with the given coverage. Alpha only ever grows,
/// so overlapping glyph edges do not punch holes into each other.
pub(crate) fn blend(image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }
    let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    if alpha > pixel[3] {
        *pixel = Rgba([color[0], color[1], color[2], alpha]);
    }
}

/// Directories searched for font files, in order.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs_found = Vec::new();

    #[cfg(windows)]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs_found.push(PathBuf::from(windir).join("Fonts"));
        }
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            dirs_found.push(
                PathBuf::from(local)
                    .join("Microsoft")
                    .join("Windows")
                    .join("Fonts"),
            );
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs_found.push(PathBuf::from("/System/Library/Fonts"));
        dirs_found.push(PathBuf::from("/Library/Fonts"));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        dirs_found.push(PathBuf::from("/usr/share/fonts"));
        dirs_found.push(PathBuf::from("/usr/local/share/fonts"));
    }

    if let Some(user_fonts) = dirs::font_dir() {
        dirs_found.push(user_fonts);
    }

    dirs_found
}

/// Locate a font file by name or path.
///
/// Absolute paths are used as-is; bare file names are searched recursively
/// (case-insensitively) in `search_dirs`.
pub fn resolve_font(candidate: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(candidate);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let options = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    for dir in search_dirs.iter().filter(|d| d.is_dir()) {
        let pattern = format!(
            "{}/**/{}",
            glob::Pattern::escape(&dir.display().to_string()),
            glob::Pattern::escape(candidate)
        );
        let Ok(entries) = glob::glob_with(&pattern, options) else {
            continue;
        };
        if let Some(found) = entries.flatten().find(|p| p.is_file()) {
            return Some(found);
        }
    }

    None
}

/// Load the first usable face from the fallback chain, or the built-in
/// bitmap face if none of the candidates resolves.
pub fn load_first(candidates: &[String], extra_dirs: &[PathBuf]) -> Arc<dyn Typeface> {
    let mut search_dirs = extra_dirs.to_vec();
    search_dirs.extend(system_font_dirs());

    for candidate in candidates {
        let Some(path) = resolve_font(candidate, &search_dirs) else {
            debug!(font = %candidate, "Font not found");
            continue;
        };
        match ScalableFace::load(&path) {
            Ok(face) => {
                info!(font = %path.display(), "Using scalable font");
                return Arc::new(face);
            }
            Err(e) => warn!(font = %path.display(), error = %e, "Skipping unusable font"),
        }
    }

    warn!(
        candidates = candidates.len(),
        "No scalable font available, falling back to built-in bitmap font"
    );
    Arc::new(BuiltinFace)
}
