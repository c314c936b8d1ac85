//! Window geometry and hit testing
//!
//! All rectangles are in physical pixels. The window is split top to bottom
//! into the menu bar, the text area and the status bar; an open menu drops
//! down over the text area.

use crate::font::CellMetrics;
use crate::menu::{Item, Keymap, Menu};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Spacing in logical pixels, multiplied by the scale factor
const BAR_PADDING: f32 = 4.0;
const TEXT_PADDING: f32 = 4.0;
const ITEM_PADDING: f32 = 3.0;
/// Cells between an item label and its accelerator hint
const HINT_GAP_CELLS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct DropdownEntry {
    pub rect: Rect,
    /// None for a separator
    pub item: Option<Item>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown {
    pub menu: Menu,
    pub rect: Rect,
    pub entries: Vec<DropdownEntry>,
}

impl Dropdown {
    /// Item under the point; separators and the outside yield None
    pub fn item_at(&self, x: f32, y: f32) -> Option<Item> {
        self.entries
            .iter()
            .find(|entry| entry.rect.contains(x, y))
            .and_then(|entry| entry.item)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub cell: CellMetrics,
    pub scale: f32,
    pub window: Rect,
    pub menu_bar: Rect,
    pub menu_titles: Vec<(Menu, Rect)>,
    pub text_area: Rect,
    pub status_bar: Rect,
}

impl Layout {
    pub fn new(width: f32, height: f32, cell: CellMetrics, scale: f32) -> Self {
        let bar_padding = (BAR_PADDING * scale).round();
        let bar_height = cell.line_height + 2.0 * bar_padding;

        let menu_bar = Rect::new(0.0, 0.0, width, bar_height);
        let status_bar = Rect::new(0.0, (height - bar_height).max(bar_height), width, bar_height);
        let text_area = Rect::new(
            0.0,
            menu_bar.bottom(),
            width,
            (status_bar.y - menu_bar.bottom()).max(0.0),
        );

        let mut x = bar_padding;
        let menu_titles = Menu::ALL
            .iter()
            .map(|&menu| {
                let title_width = (menu.label().chars().count() + 2) as f32 * cell.advance;
                let rect = Rect::new(x, 0.0, title_width, bar_height);
                x += title_width;
                (menu, rect)
            })
            .collect();

        Self {
            cell,
            scale,
            window: Rect::new(0.0, 0.0, width, height),
            menu_bar,
            menu_titles,
            text_area,
            status_bar,
        }
    }

    pub fn bar_padding(&self) -> f32 {
        (BAR_PADDING * self.scale).round()
    }

    pub fn text_padding(&self) -> f32 {
        (TEXT_PADDING * self.scale).round()
    }

    pub fn menu_title_at(&self, x: f32, y: f32) -> Option<Menu> {
        self.menu_titles
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(menu, _)| *menu)
    }

    pub fn menu_title_rect(&self, menu: Menu) -> Rect {
        self.menu_titles
            .iter()
            .find(|(m, _)| *m == menu)
            .map(|(_, rect)| *rect)
            .unwrap_or_default()
    }

    /// Geometry of an open menu
    pub fn dropdown(&self, menu: Menu, keymap: &Keymap) -> Dropdown {
        let item_padding = (ITEM_PADDING * self.scale).round();
        let item_height = self.cell.line_height + 2.0 * item_padding;
        let separator_height = (self.cell.line_height / 2.0).round();

        let hints: Vec<Option<String>> = menu
            .entries()
            .iter()
            .map(|entry| entry.and_then(|item| keymap.chord(item)).map(|c| c.to_string()))
            .collect();

        let label_cells = menu
            .entries()
            .iter()
            .flatten()
            .map(|item| item.label().chars().count())
            .max()
            .unwrap_or(0);
        let hint_cells = hints
            .iter()
            .flatten()
            .map(|h| h.chars().count() + HINT_GAP_CELLS)
            .max()
            .unwrap_or(0);
        let width = (label_cells + hint_cells + 4) as f32 * self.cell.advance;

        let title = self.menu_title_rect(menu);
        let mut y = self.menu_bar.bottom();
        let mut entries = Vec::with_capacity(hints.len());
        for (entry, hint) in menu.entries().iter().zip(hints) {
            let height = if entry.is_some() { item_height } else { separator_height };
            entries.push(DropdownEntry {
                rect: Rect::new(title.x, y, width, height),
                item: *entry,
                hint,
            });
            y += height;
        }

        Dropdown {
            menu,
            rect: Rect::new(title.x, self.menu_bar.bottom(), width, y - self.menu_bar.bottom()),
            entries,
        }
    }

    /// Whole lines that fit in the text area
    pub fn visible_lines(&self) -> usize {
        let usable = self.text_area.height - 2.0 * self.text_padding();
        (usable / self.cell.line_height).floor().max(1.0) as usize
    }

    /// Whole columns that fit in the text area
    pub fn visible_columns(&self) -> usize {
        let usable = self.text_area.width - 2.0 * self.text_padding();
        (usable / self.cell.advance).floor().max(1.0) as usize
    }

    /// Top-left corner of a document cell on screen
    pub fn cell_origin(&self, line: usize, column: usize, scroll: &Scroll) -> (f32, f32) {
        let pad = self.text_padding();
        (
            self.text_area.x + pad + (column as f32 - scroll.column as f32) * self.cell.advance,
            self.text_area.y + pad + (line as f32 - scroll.line as f32) * self.cell.line_height,
        )
    }

    /// Document (line, column) under a point in the text area
    pub fn text_position(&self, x: f32, y: f32, scroll: &Scroll) -> (usize, usize) {
        let pad = self.text_padding();
        let rel_x = (x - self.text_area.x - pad).max(0.0);
        let rel_y = (y - self.text_area.y - pad).max(0.0);
        let column = (rel_x / self.cell.advance).round() as usize;
        let line = (rel_y / self.cell.line_height).floor() as usize;
        (line + scroll.line, column + scroll.column)
    }
}

/// First visible line and column of the text area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scroll {
    pub line: usize,
    pub column: usize,
}

impl Scroll {
    /// Move just enough to bring (line, column) into a view of the given size
    pub fn reveal(&mut self, line: usize, column: usize, lines: usize, columns: usize) {
        if line < self.line {
            self.line = line;
        } else if line >= self.line.saturating_add(lines) {
            self.line = line + 1 - lines;
        }
        if column < self.column {
            self.column = column;
        } else if column >= self.column.saturating_add(columns) {
            self.column = column + 1 - columns;
        }
    }

    /// Scroll by whole lines, never past the last line
    pub fn scroll_lines(&mut self, delta: isize, line_count: usize) {
        self.line = self
            .line
            .saturating_add_signed(delta)
            .min(line_count.saturating_sub(1));
    }
}
