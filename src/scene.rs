//! Frame description - what to paint, independent of the GPU
//!
//! [`build`] turns the model, the menu state and the view state into an
//! ordered list of [`DrawOp`]s. Later ops paint over earlier ones, so the open
//! menu comes last.

use crate::layout::{Layout, Rect, Scroll};
use crate::menu::{Item, ItemStates, Keymap, Menu};
use crate::model::PetModel;
use crate::status::status_text;
use crate::theme::{Color, Theme};

pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect { rect: Rect, color: Color },
    /// One line of text; (x, y) is the top-left corner of its first cell
    Text { x: f32, y: f32, text: String, color: Color },
}

/// Window state that is not part of the document model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub open_menu: Option<Menu>,
    pub hovered_item: Option<Item>,
    pub scroll: Scroll,
}

// === Tab expansion ===

/// Line with tabs replaced by spaces up to the next tab stop
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let spaces = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

/// Screen column of the char at `char_col`
pub fn visual_column(line: &str, char_col: usize) -> usize {
    line.chars().take(char_col).fold(0, |column, ch| {
        if ch == '\t' {
            column + TAB_WIDTH - column % TAB_WIDTH
        } else {
            column + 1
        }
    })
}

/// Char column closest to a screen column
pub fn char_column(line: &str, visual_col: usize) -> usize {
    let mut column = 0;
    for (index, ch) in line.chars().enumerate() {
        let width = if ch == '\t' {
            TAB_WIDTH - column % TAB_WIDTH
        } else {
            1
        };
        if visual_col < column + width.div_ceil(2) {
            return index;
        }
        if visual_col < column + width {
            return index + 1;
        }
        column += width;
    }
    line.chars().count()
}

// === Frame ===

pub struct SceneInput<'a> {
    pub model: &'a PetModel,
    pub layout: &'a Layout,
    pub theme: &'a Theme,
    pub items: &'a ItemStates,
    pub keymap: &'a Keymap,
    pub view: &'a ViewState,
}

pub fn build(input: &SceneInput) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(256);
    text_area(input, &mut ops);
    menu_bar(input, &mut ops);
    status_bar(input, &mut ops);
    if let Some(menu) = input.view.open_menu {
        dropdown(input, menu, &mut ops);
    }
    ops
}

fn text_area(input: &SceneInput, ops: &mut Vec<DrawOp>) {
    let SceneInput {
        model,
        layout,
        theme,
        view,
        ..
    } = input;

    let Some(doc) = model.document() else {
        ops.push(DrawOp::Rect {
            rect: layout.text_area,
            color: theme.empty_background,
        });
        return;
    };

    ops.push(DrawOp::Rect {
        rect: layout.text_area,
        color: theme.text_background,
    });

    let scroll = view.scroll;
    let first = scroll.line;
    let last = first + layout.visible_lines();
    let columns = layout.visible_columns();
    let selection = doc.selection();
    let (caret_line, caret_col) = doc.caret_line_col();

    let mut line_start = 0usize;
    for (index, line) in doc.lines().enumerate() {
        let line_end = line_start + line.len();
        if index >= last {
            break;
        }
        if index >= first {
            // Selection highlight, extended one cell past the line when the
            // newline itself is selected
            if let Some(sel) = &selection {
                if sel.start <= line_end && sel.end > line_start {
                    let from = sel.start.max(line_start) - line_start;
                    let to = sel.end.min(line_end) - line_start;
                    let start_col = visual_column(line, line[..from].chars().count());
                    let mut end_col = visual_column(line, line[..to].chars().count());
                    if sel.end > line_end {
                        end_col += 1;
                    }
                    let (x, y) = layout.cell_origin(index, start_col, &scroll);
                    let width = (end_col.saturating_sub(start_col)) as f32 * layout.cell.advance;
                    if let Some(rect) = clip(
                        Rect::new(x, y, width, layout.cell.line_height),
                        &layout.text_area,
                    ) {
                        ops.push(DrawOp::Rect {
                            rect,
                            color: theme.selection,
                        });
                    }
                }
            }

            let expanded = expand_tabs(line);
            let visible: String = expanded.chars().skip(scroll.column).take(columns).collect();
            if !visible.is_empty() {
                let (x, y) = layout.cell_origin(index, scroll.column, &scroll);
                ops.push(DrawOp::Text {
                    x,
                    y,
                    text: visible,
                    color: theme.text,
                });
            }

            if index == caret_line {
                let column = visual_column(line, caret_col);
                if column >= scroll.column && column <= scroll.column + columns {
                    let (x, y) = layout.cell_origin(index, column, &scroll);
                    let width = (2.0 * layout.scale).round().max(1.0);
                    ops.push(DrawOp::Rect {
                        rect: Rect::new(x, y, width, layout.cell.line_height),
                        color: theme.caret,
                    });
                }
            }
        }
        line_start = line_end + 1;
    }
}

fn clip(rect: Rect, bounds: &Rect) -> Option<Rect> {
    let x0 = rect.x.max(bounds.x);
    let y0 = rect.y.max(bounds.y);
    let x1 = rect.right().min(bounds.right());
    let y1 = rect.bottom().min(bounds.bottom());
    (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
}

fn menu_bar(input: &SceneInput, ops: &mut Vec<DrawOp>) {
    let SceneInput {
        layout, theme, view, ..
    } = input;

    ops.push(DrawOp::Rect {
        rect: layout.menu_bar,
        color: theme.bar_background,
    });
    ops.push(DrawOp::Rect {
        rect: Rect::new(0.0, layout.menu_bar.bottom() - 1.0, layout.menu_bar.width, 1.0),
        color: theme.bar_border,
    });

    for (menu, rect) in &layout.menu_titles {
        if view.open_menu == Some(*menu) {
            ops.push(DrawOp::Rect {
                rect: *rect,
                color: theme.menu_highlight,
            });
        }
        ops.push(DrawOp::Text {
            x: rect.x + layout.cell.advance,
            y: rect.y + layout.bar_padding(),
            text: menu.label().to_string(),
            color: theme.bar_text,
        });
    }
}

fn status_bar(input: &SceneInput, ops: &mut Vec<DrawOp>) {
    let SceneInput {
        model,
        layout,
        theme,
        ..
    } = input;

    ops.push(DrawOp::Rect {
        rect: layout.status_bar,
        color: theme.bar_background,
    });
    ops.push(DrawOp::Rect {
        rect: Rect::new(0.0, layout.status_bar.y, layout.status_bar.width, 1.0),
        color: theme.bar_border,
    });
    ops.push(DrawOp::Text {
        x: layout.status_bar.x + layout.bar_padding() + layout.cell.advance / 2.0,
        y: layout.status_bar.y + layout.bar_padding(),
        text: status_text(model),
        color: theme.bar_text,
    });
}

fn dropdown(input: &SceneInput, menu: Menu, ops: &mut Vec<DrawOp>) {
    let SceneInput {
        layout,
        theme,
        items,
        keymap,
        view,
        ..
    } = input;

    let dropdown = layout.dropdown(menu, keymap);
    let border = Rect::new(
        dropdown.rect.x - 1.0,
        dropdown.rect.y,
        dropdown.rect.width + 2.0,
        dropdown.rect.height + 1.0,
    );
    ops.push(DrawOp::Rect {
        rect: border,
        color: theme.bar_border,
    });
    ops.push(DrawOp::Rect {
        rect: dropdown.rect,
        color: theme.menu_background,
    });

    let text_offset = dropdown
        .entries
        .first()
        .map(|e| (e.rect.height - layout.cell.line_height) / 2.0)
        .unwrap_or(0.0);

    for entry in &dropdown.entries {
        let Some(item) = entry.item else {
            let mid = (entry.rect.y + entry.rect.height / 2.0).floor();
            ops.push(DrawOp::Rect {
                rect: Rect::new(
                    entry.rect.x + layout.cell.advance,
                    mid,
                    entry.rect.width - 2.0 * layout.cell.advance,
                    1.0,
                ),
                color: theme.separator,
            });
            continue;
        };

        let enabled = items.is_enabled(item);
        if enabled && view.hovered_item == Some(item) {
            ops.push(DrawOp::Rect {
                rect: entry.rect,
                color: theme.menu_highlight,
            });
        }

        let color = if enabled {
            theme.menu_text
        } else {
            theme.menu_text_disabled
        };
        let y = entry.rect.y + text_offset;
        ops.push(DrawOp::Text {
            x: entry.rect.x + 2.0 * layout.cell.advance,
            y,
            text: item.label().to_string(),
            color,
        });
        if let Some(hint) = &entry.hint {
            let hint_cells = hint.chars().count() + 2;
            ops.push(DrawOp::Text {
                x: entry.rect.right() - hint_cells as f32 * layout.cell.advance,
                y,
                text: hint.clone(),
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::CellMetrics;
    use std::collections::HashMap;

    struct Fixture {
        model: PetModel,
        layout: Layout,
        theme: Theme,
        keymap: Keymap,
        view: ViewState,
    }

    impl Fixture {
        fn new() -> Self {
            let cell = CellMetrics {
                advance: 8.0,
                line_height: 16.0,
                ascent: 12.0,
            };
            Self {
                model: PetModel::new(),
                layout: Layout::new(640.0, 480.0, cell, 1.0),
                theme: Theme::default(),
                keymap: Keymap::new(&HashMap::new()).unwrap(),
                view: ViewState::default(),
            }
        }

        fn build(&self) -> Vec<DrawOp> {
            let items = ItemStates::from_state(&self.model.state());
            build(&SceneInput {
                model: &self.model,
                layout: &self.layout,
                theme: &self.theme,
                items: &items,
                keymap: &self.keymap,
                view: &self.view,
            })
        }
    }

    fn texts(ops: &[DrawOp]) -> Vec<(&str, Color)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, color, .. } => Some((text.as_str(), *color)),
                _ => None,
            })
            .collect()
    }

    fn rects_of(ops: &[DrawOp], wanted: Color) -> Vec<Rect> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, color } if *color == wanted => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tab_expansion() {
        assert_eq!(expand_tabs("a\tb"), "a   b");
        assert_eq!(expand_tabs("\t"), "    ");
        assert_eq!(visual_column("a\tb", 2), 4);
        assert_eq!(visual_column("abc", 9), 3);
        assert_eq!(char_column("a\tb", 4), 2);
        assert_eq!(char_column("a\tb", 1), 1);
        assert_eq!(char_column("a\tb", 3), 2);
        assert_eq!(char_column("ab", 10), 2);
    }

    #[test]
    fn test_no_document_shows_empty_area() {
        let fixture = Fixture::new();
        let ops = fixture.build();
        assert_eq!(
            ops[0],
            DrawOp::Rect {
                rect: fixture.layout.text_area,
                color: fixture.theme.empty_background
            }
        );
        assert!(rects_of(&ops, fixture.theme.caret).is_empty());
        assert!(texts(&ops).contains(&("File: <none>", fixture.theme.bar_text)));
    }

    #[test]
    fn test_document_lines_and_caret() {
        let mut fixture = Fixture::new();
        fixture.model.set_new_doc_without_file();
        fixture.model.edit(|doc| doc.insert_str("one\ntwo"));
        let ops = fixture.build();

        let texts = texts(&ops);
        assert!(texts.contains(&("one", fixture.theme.text)));
        assert!(texts.contains(&("two", fixture.theme.text)));
        assert!(texts.contains(&("File: * <none>", fixture.theme.bar_text)));

        let carets = rects_of(&ops, fixture.theme.caret);
        assert_eq!(carets.len(), 1);
        let (x, y) = fixture.layout.cell_origin(1, 3, &Scroll::default());
        assert_eq!((carets[0].x, carets[0].y), (x, y));
    }

    #[test]
    fn test_scrolled_lines_are_hidden() {
        let mut fixture = Fixture::new();
        fixture.model.set_new_doc_without_file();
        fixture.model.edit(|doc| doc.insert_str("first\nsecond\nthird"));
        fixture.view.scroll = Scroll { line: 1, column: 2 };
        let ops = fixture.build();

        let lines: Vec<&str> = texts(&ops)
            .into_iter()
            .filter(|(_, color)| *color == fixture.theme.text)
            .map(|(text, _)| text)
            .collect();
        assert_eq!(lines, vec!["cond", "ird"]);
    }

    #[test]
    fn test_open_menu_dims_disabled_items() {
        let mut fixture = Fixture::new();
        fixture.view.open_menu = Some(Menu::File);
        fixture.view.hovered_item = Some(Item::Save);
        let ops = fixture.build();

        let texts = texts(&ops);
        assert!(texts.contains(&("New", fixture.theme.menu_text)));
        assert!(texts.contains(&("Save", fixture.theme.menu_text_disabled)));
        let hint = fixture.keymap.chord(Item::Save).unwrap().to_string();
        assert!(texts.contains(&(hint.as_str(), fixture.theme.menu_text_disabled)));

        // Hovering a disabled item draws no highlight; the only highlight is
        // the open menu title
        let highlights = rects_of(&ops, fixture.theme.menu_highlight);
        assert_eq!(highlights, vec![fixture.layout.menu_title_rect(Menu::File)]);
    }

    #[test]
    fn test_selection_is_highlighted() {
        let mut fixture = Fixture::new();
        fixture.model.set_new_doc_without_file();
        fixture.model.edit(|doc| doc.insert_str("ab\ncd"));
        fixture.model.navigate(|doc| doc.select_all());
        let ops = fixture.build();

        let selected = rects_of(&ops, fixture.theme.selection);
        assert_eq!(selected.len(), 2);
        // The first line's newline is selected too
        assert_eq!(selected[0].width, 3.0 * 8.0);
        assert_eq!(selected[1].width, 2.0 * 8.0);
    }
}
