//! Font loading, glyph rasterization and atlas management
//!
//! One monospace font is rasterized on demand with fontdue into a single R8
//! atlas texture. Since every glyph has the same advance, text layout reduces
//! to a cell grid described by [`CellMetrics`].

use crate::error::{PetError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ATLAS_SIZE: u32 = 2048;

/// Monospace fonts tried in order when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    // macOS
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "/Library/Fonts/Courier New.ttf",
    // Windows
    "C:\\Windows\\Fonts\\cour.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Pick the configured font, or the first system monospace font found
pub fn find_font(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(PetError::Font(format!(
            "configured font {} not found",
            path.display()
        )));
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| {
            PetError::Font("no monospace font found, set editor.font_path in pet.toml".to_string())
        })
}

/// Size of one character cell, in physical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub advance: f32,
    pub line_height: f32,
    /// Distance from the top of a line to the baseline
    pub ascent: f32,
}

/// A glyph quad ready for the GPU, in physical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Texture coordinates in atlas [u0, v0, u1, v1]
    pub tex_coords: [f32; 4],
}

#[derive(Clone, Copy, Debug)]
struct GlyphEntry {
    tex_coords: [f32; 4],
    width: f32,
    height: f32,
    xmin: f32,
    ymin: f32,
}

/// Font, glyph cache and atlas pixels
pub struct FontSystem {
    font: fontdue::Font,
    /// Atlas texture data (R8 format)
    atlas_data: Vec<u8>,
    /// Cache of rasterized glyphs: (char, size_in_pixels) -> entry
    glyph_cache: HashMap<(char, u32), GlyphEntry>,
    /// Current atlas cursor
    next_x: u32,
    next_y: u32,
    row_height: u32,
    /// Bumped whenever new pixels land in the atlas
    atlas_version: u64,
}

impl FontSystem {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| PetError::Font(e.to_string()))?;
        Ok(Self {
            font,
            atlas_data: vec![0; (ATLAS_SIZE * ATLAS_SIZE) as usize],
            glyph_cache: HashMap::new(),
            next_x: 0,
            next_y: 0,
            row_height: 0,
            atlas_version: 0,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PetError::io(path, e))?;
        let system = Self::from_bytes(&data)?;
        log::info!("Loaded font {}", path.display());
        Ok(system)
    }

    /// Cell size for a physical font size; the advance of 'M' stands in for
    /// every character
    pub fn cell_metrics(&self, size_px: f32) -> CellMetrics {
        let advance = self.font.metrics('M', size_px).advance_width.ceil();
        match self.font.horizontal_line_metrics(size_px) {
            Some(line) => CellMetrics {
                advance,
                line_height: line.new_line_size.ceil(),
                ascent: line.ascent.ceil(),
            },
            None => CellMetrics {
                advance,
                line_height: (size_px * 1.2).ceil(),
                ascent: size_px.ceil(),
            },
        }
    }

    /// Quads for one line of text whose first cell's top-left corner is at
    /// (x, y). Whitespace takes a cell without producing a quad; control
    /// characters are skipped, so tabs must be expanded by the caller.
    pub fn layout_line(&mut self, text: &str, size_px: f32, x: f32, y: f32) -> Vec<GlyphQuad> {
        let metrics = self.cell_metrics(size_px);
        let baseline = y + metrics.ascent;
        let mut quads = Vec::with_capacity(text.len());
        let mut column = 0usize;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if !ch.is_whitespace() {
                let entry = self.get_or_rasterize(ch, size_px as u32);
                if entry.width > 0.0 && entry.height > 0.0 {
                    let left = x + column as f32 * metrics.advance + entry.xmin;
                    let top = baseline - entry.height - entry.ymin;
                    quads.push(GlyphQuad {
                        x: left.round(),
                        y: top.round(),
                        width: entry.width,
                        height: entry.height,
                        tex_coords: entry.tex_coords,
                    });
                }
            }
            column += 1;
        }

        quads
    }

    /// Get or rasterize a glyph at physical pixel size
    fn get_or_rasterize(&mut self, ch: char, size_px: u32) -> GlyphEntry {
        let key = (ch, size_px);

        if let Some(&entry) = self.glyph_cache.get(&key) {
            return entry;
        }

        let (metrics, bitmap) = self.font.rasterize(ch, size_px as f32);

        // Check if glyph fits in current row
        if self.next_x + metrics.width as u32 > ATLAS_SIZE {
            self.next_x = 0;
            self.next_y += self.row_height;
            self.row_height = 0;
        }

        // Atlas full: draw nothing for this glyph rather than corrupt others
        if self.next_y + metrics.height as u32 > ATLAS_SIZE {
            log::warn!("Glyph atlas full, dropping {:?}", ch);
            return GlyphEntry {
                tex_coords: [0.0; 4],
                width: 0.0,
                height: 0.0,
                xmin: 0.0,
                ymin: 0.0,
            };
        }

        // Copy bitmap to atlas
        for row in 0..metrics.height {
            let src = row * metrics.width;
            let dst = ((self.next_y + row as u32) * ATLAS_SIZE + self.next_x) as usize;
            self.atlas_data[dst..dst + metrics.width]
                .copy_from_slice(&bitmap[src..src + metrics.width]);
        }

        let atlas = ATLAS_SIZE as f32;
        let entry = GlyphEntry {
            tex_coords: [
                self.next_x as f32 / atlas,
                self.next_y as f32 / atlas,
                (self.next_x + metrics.width as u32) as f32 / atlas,
                (self.next_y + metrics.height as u32) as f32 / atlas,
            ],
            width: metrics.width as f32,
            height: metrics.height as f32,
            xmin: metrics.xmin as f32,
            ymin: metrics.ymin as f32,
        };

        // 1px padding between glyphs
        self.next_x += metrics.width as u32 + 1;
        self.row_height = self.row_height.max(metrics.height as u32 + 1);
        self.atlas_version += 1;

        self.glyph_cache.insert(key, entry);
        entry
    }

    /// Pre-rasterize printable ASCII
    pub fn prerasterize_ascii(&mut self, size_px: f32) {
        for ch in '!'..='~' {
            self.get_or_rasterize(ch, size_px as u32);
        }
    }

    pub fn atlas_data(&self) -> &[u8] {
        &self.atlas_data
    }

    pub fn atlas_version(&self) -> u64 {
        self.atlas_version
    }
}

/// Thread-safe wrapper for FontSystem
#[derive(Clone)]
pub struct SharedFontSystem {
    inner: Arc<Mutex<FontSystem>>,
}

impl SharedFontSystem {
    pub fn new(font_system: FontSystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(font_system)),
        }
    }

    pub fn cell_metrics(&self, size_px: f32) -> CellMetrics {
        self.inner.lock().cell_metrics(size_px)
    }

    pub fn layout_line(&self, text: &str, size_px: f32, x: f32, y: f32) -> Vec<GlyphQuad> {
        self.inner.lock().layout_line(text, size_px, x, y)
    }

    pub fn prerasterize_ascii(&self, size_px: f32) {
        self.inner.lock().prerasterize_ascii(size_px);
    }

    /// Atlas pixels, only when they changed since `seen_version`
    pub fn atlas_if_changed(&self, seen_version: u64) -> Option<(Vec<u8>, u64)> {
        let font_system = self.inner.lock();
        if font_system.atlas_version() == seen_version {
            return None;
        }
        Some((font_system.atlas_data().to_vec(), font_system.atlas_version()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests needing real glyphs run only where a system font is installed
    fn system_font() -> Option<FontSystem> {
        let path = find_font(None).ok()?;
        FontSystem::load(&path).ok()
    }

    #[test]
    fn test_missing_configured_font() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ttf");
        assert!(matches!(find_font(Some(&missing)), Err(PetError::Font(_))));
    }

    #[test]
    fn test_garbage_font_bytes() {
        assert!(FontSystem::from_bytes(b"not a font").is_err());
    }

    #[test]
    fn test_layout_uses_cell_grid() {
        let Some(mut font_system) = system_font() else {
            return;
        };
        let metrics = font_system.cell_metrics(14.0);
        assert!(metrics.advance > 0.0);
        assert!(metrics.line_height >= metrics.ascent);

        let quads = font_system.layout_line("A B", 14.0, 10.0, 0.0);
        assert_eq!(quads.len(), 2); // the space takes a cell but has no quad
        let gap = quads[1].x - quads[0].x;
        // Side bearings differ per glyph, so allow part of a cell of slack
        assert!((gap - 2.0 * metrics.advance).abs() < metrics.advance * 0.5, "gap was {gap}");
        assert!(quads[0].tex_coords[2] > quads[0].tex_coords[0]);
    }

    #[test]
    fn test_atlas_version_tracks_new_glyphs() {
        let Some(font_system) = system_font() else {
            return;
        };
        let shared = SharedFontSystem::new(font_system);
        let (_, version) = shared.atlas_if_changed(u64::MAX).unwrap();

        shared.layout_line("xyz", 16.0, 0.0, 0.0);
        let (_, after) = shared.atlas_if_changed(version).unwrap();
        assert!(after > version);

        shared.layout_line("xyz", 16.0, 0.0, 0.0);
        assert!(shared.atlas_if_changed(after).is_none());
    }
}
