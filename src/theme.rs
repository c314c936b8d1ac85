//! Colors used to paint the window
//!
//! Colors are packed RGBA in a `u32` (0xRRGGBBAA), the format the rect and
//! glyph shaders unpack.

use crate::config::EditorConfig;

pub type Color = u32;

/// Pack float RGBA components (0.0..=1.0)
pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (c(r) << 24) | (c(g) << 16) | (c(b) << 8) | c(a)
}

/// Unpack to float RGBA components
pub fn to_floats(color: Color) -> [f32; 4] {
    [
        ((color >> 24) & 0xFF) as f32 / 255.0,
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    ]
}

/// Parse "#rrggbb" or "#rrggbbaa"
pub fn parse_hex(input: &str) -> Option<Color> {
    let hex = input.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(|v| (v << 8) | 0xFF),
        8 => u32::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub text_background: Color,
    pub text: Color,
    pub caret: Color,
    pub selection: Color,
    /// Shown in the text area while no document is open
    pub empty_background: Color,
    pub bar_background: Color,
    pub bar_text: Color,
    pub bar_border: Color,
    pub menu_background: Color,
    pub menu_highlight: Color,
    pub menu_text: Color,
    pub menu_text_disabled: Color,
    pub separator: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_background: 0x000000FF,
            text: 0xC0C0C0FF,
            caret: 0xFF0000FF,
            selection: 0x264F78FF,
            empty_background: 0x808080FF,
            bar_background: 0xEEEEEEFF,
            bar_text: 0x202020FF,
            bar_border: 0xB0B0B0FF,
            menu_background: 0xF8F8F8FF,
            menu_highlight: 0xC8DDF2FF,
            menu_text: 0x202020FF,
            menu_text_disabled: 0x9A9A9AFF,
            separator: 0xCCCCCCFF,
        }
    }
}

impl Theme {
    /// Default theme with the editor colors from the configuration
    pub fn from_config(editor: &EditorConfig) -> Self {
        let mut theme = Self::default();
        let apply = |slot: &mut Color, value: &str, name: &str| match parse_hex(value) {
            Some(color) => *slot = color,
            None => log::warn!("Ignoring invalid {} color {:?}", name, value),
        };
        apply(&mut theme.text_background, &editor.background, "background");
        apply(&mut theme.text, &editor.foreground, "foreground");
        apply(&mut theme.caret, &editor.caret, "caret");
        theme
    }
}
