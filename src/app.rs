//! Winit application: window, event dispatch and frame rendering
//!
//! The handler owns the model and routes every window event either to the
//! menu controller or to the document. Any model change requests a redraw.

use crate::{
    config::AppConfig,
    controller::{Controller, Flow},
    dialogs::NativeDialogs,
    document::Motion,
    error::{PetError, Result},
    font::{find_font, FontSystem, SharedFontSystem},
    gpu::GpuRenderer,
    input::{translate, Command, EditCommand, KeyInput},
    layout::Layout,
    menu::{Item, ItemStates, Keymap, Menu},
    model::{ModelState, PetModel},
    render::Renderer,
    scene::{self, char_column, visual_column, SceneInput, ViewState},
    theme::Theme,
};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::ModifiersState,
    window::{Window, WindowId},
};

/// Lines scrolled per wheel notch
const WHEEL_LINES: f32 = 3.0;

pub struct PetApp {
    config: AppConfig,
    theme: Theme,
    keymap: Keymap,
    font_system: SharedFontSystem,
    renderer: Renderer,
    model: PetModel,
    view: ViewState,

    // Created once the event loop resumes
    window: Option<Arc<Window>>,
    gpu: Option<GpuRenderer>,
    controller: Option<Controller<NativeDialogs>>,

    clipboard: Option<arboard::Clipboard>,
    modifiers: ModifiersState,
    cursor: PhysicalPosition<f64>,
    /// Left button held after a click in the text area
    selecting: bool,
    atlas_version: u64,
    /// First error hit inside the event loop, reported once it returns
    fatal: Option<PetError>,
}

impl PetApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let theme = Theme::from_config(&config.editor);
        let keymap = Keymap::new(&config.shortcut_overrides())?;
        let font_path = find_font(config.editor.font_path.as_deref())?;
        let font_system = SharedFontSystem::new(FontSystem::load(&font_path)?);
        let renderer = Renderer::new(font_system.clone(), config.editor.font_size);

        let clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::warn!("Clipboard unavailable: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            theme,
            keymap,
            font_system,
            renderer,
            model: PetModel::new(),
            view: ViewState::default(),
            window: None,
            gpu: None,
            controller: None,
            clipboard,
            modifiers: ModifiersState::empty(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            selecting: false,
            atlas_version: u64::MAX,
            fatal: None,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        match self.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        log::info!("Creating window: {}", self.config.window.title);
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(&self.config.window.title)
                        .with_inner_size(winit::dpi::LogicalSize::new(
                            self.config.window.width,
                            self.config.window.height,
                        )),
                )?,
        );

        let gpu = pollster::block_on(GpuRenderer::new(window.clone()))?;

        let font_px = self.font_px(&window);
        self.renderer.set_font_px(font_px);
        self.font_system.prerasterize_ascii(font_px);

        let redraw = window.clone();
        self.model
            .add_change_listener(Box::new(move |_: &ModelState| redraw.request_redraw()));

        self.controller = Some(Controller::new(NativeDialogs::new(Some(window.clone()))));
        self.gpu = Some(gpu);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Physical font size for the window's scale factor
    fn font_px(&self, window: &Window) -> f32 {
        (self.config.editor.font_size * window.scale_factor() as f32).round()
    }

    fn layout(&self) -> Option<Layout> {
        let window = self.window.as_ref()?;
        let size = window.inner_size();
        let font_px = self.font_px(window);
        Some(Layout::new(
            size.width as f32,
            size.height as f32,
            self.font_system.cell_metrics(font_px),
            window.scale_factor() as f32,
        ))
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    // === Menu flows ===

    fn activate(&mut self, event_loop: &ActiveEventLoop, item: Item) {
        self.close_menu();
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if controller.activate(&mut self.model, item) == Flow::Exit {
            log::info!("Goodbye");
            event_loop.exit();
            return;
        }
        self.reveal_caret();
        self.request_redraw();
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.close_menu();
        let Some(controller) = self.controller.as_mut() else {
            event_loop.exit();
            return;
        };
        if controller.quit(&mut self.model) == Flow::Exit {
            log::info!("Goodbye");
            event_loop.exit();
        }
    }

    fn open_menu(&mut self, menu: Menu) {
        self.view.open_menu = Some(menu);
        self.view.hovered_item = None;
        self.request_redraw();
    }

    fn close_menu(&mut self) {
        if self.view.open_menu.take().is_some() {
            self.view.hovered_item = None;
            self.request_redraw();
        }
    }

    // === Keyboard ===

    fn execute(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        if command != Command::CloseMenu {
            self.close_menu();
        }

        match command {
            Command::Activate(item) => {
                self.activate(event_loop, item);
                return;
            }
            Command::CloseMenu => self.close_menu(),
            Command::Edit(edit) => {
                self.model.edit(|doc| match &edit {
                    EditCommand::Insert(text) => doc.insert_str(text),
                    EditCommand::Backspace => doc.backspace(),
                    EditCommand::Delete => doc.delete_forward(),
                });
            }
            Command::Move { motion, extend } => {
                self.model.navigate(|doc| doc.move_caret(motion, extend));
            }
            Command::Page { down, extend } => {
                let lines = self.layout().map_or(1, |l| l.visible_lines()) as isize;
                let delta = if down { lines } else { -lines };
                self.model
                    .navigate(|doc| doc.move_caret(Motion::Lines(delta), extend));
            }
            Command::SelectAll => self.model.navigate(|doc| doc.select_all()),
            Command::Copy => {
                self.copy_selection();
            }
            Command::Cut => {
                let clipboard = &mut self.clipboard;
                cut_selection(&mut self.model, |text| {
                    copy_to_clipboard(clipboard.as_mut(), text)
                });
            }
            Command::Paste => {
                let text = self.clipboard.as_mut().and_then(|c| match c.get_text() {
                    Ok(text) => Some(text),
                    Err(e) => {
                        log::warn!("Paste failed: {}", e);
                        None
                    }
                });
                if let Some(text) = text {
                    self.model.edit(|doc| doc.insert_str(&text));
                }
            }
        }

        self.reveal_caret();
        self.request_redraw();
    }

    fn copy_selection(&mut self) -> bool {
        let Some(text) = self.model.document().and_then(|doc| doc.selected_text()) else {
            return false;
        };
        copy_to_clipboard(self.clipboard.as_mut(), text)
    }

    /// Scroll just enough to keep the caret on screen
    fn reveal_caret(&mut self) {
        let Some(layout) = self.layout() else {
            return;
        };
        let Some(doc) = self.model.document() else {
            self.view.scroll = Default::default();
            return;
        };
        let (line, column) = doc.caret_line_col();
        let visual = doc.line(line).map_or(column, |text| visual_column(text, column));
        self.view.scroll.reveal(
            line,
            visual,
            layout.visible_lines(),
            layout.visible_columns(),
        );
    }

    // === Mouse ===

    fn on_cursor_moved(&mut self) {
        let Some(layout) = self.layout() else {
            return;
        };
        let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);

        if let Some(menu) = self.view.open_menu {
            // Sliding across the bar switches menus
            if let Some(other) = layout.menu_title_at(x, y).filter(|m| *m != menu) {
                self.open_menu(other);
                return;
            }
            let hovered = layout.dropdown(menu, &self.keymap).item_at(x, y);
            if hovered != self.view.hovered_item {
                self.view.hovered_item = hovered;
                self.request_redraw();
            }
            return;
        }

        if self.selecting {
            if let Some((line, column)) = self.text_position(&layout, x, y) {
                self.model
                    .navigate(|doc| doc.extend_to_line_col(line, column));
                self.reveal_caret();
                self.request_redraw();
            }
        }
    }

    fn on_left_press(&mut self, event_loop: &ActiveEventLoop) {
        let Some(layout) = self.layout() else {
            return;
        };
        let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);

        if let Some(menu) = self.view.open_menu {
            if let Some(item) = layout.dropdown(menu, &self.keymap).item_at(x, y) {
                if item.is_enabled(&self.model.state()) {
                    self.activate(event_loop, item);
                }
                return;
            }
            match layout.menu_title_at(x, y) {
                Some(other) if other != menu => self.open_menu(other),
                _ => self.close_menu(),
            }
            return;
        }

        if let Some(menu) = layout.menu_title_at(x, y) {
            self.open_menu(menu);
            return;
        }

        if layout.text_area.contains(x, y) {
            if let Some((line, column)) = self.text_position(&layout, x, y) {
                let extend = self.modifiers.shift_key();
                self.model.navigate(|doc| {
                    if extend {
                        doc.extend_to_line_col(line, column)
                    } else {
                        doc.set_caret_line_col(line, column)
                    }
                });
                self.selecting = true;
                self.request_redraw();
            }
        }
    }

    /// Document (line, char column) under a window point
    fn text_position(&self, layout: &Layout, x: f32, y: f32) -> Option<(usize, usize)> {
        let doc = self.model.document()?;
        let (line, visual) = layout.text_position(x, y, &self.view.scroll);
        let line = line.min(doc.line_count() - 1);
        let column = doc.line(line).map_or(0, |text| char_column(text, visual));
        Some((line, column))
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let Some(line_count) = self.model.document().map(|doc| doc.line_count()) else {
            return;
        };
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINES,
            MouseScrollDelta::PixelDelta(pos) => {
                let line_height = self.layout().map_or(16.0, |l| l.cell.line_height);
                -(pos.y as f32) / line_height
            }
        };
        let lines = lines.round() as isize;
        if lines != 0 {
            self.view.scroll.scroll_lines(lines, line_count);
            self.request_redraw();
        }
    }

    // === Frame ===

    fn render_frame(&mut self) {
        let Some(layout) = self.layout() else {
            return;
        };
        let items = ItemStates::from_state(&self.model.state());
        let ops = scene::build(&SceneInput {
            model: &self.model,
            layout: &layout,
            theme: &self.theme,
            items: &items,
            keymap: &self.keymap,
            view: &self.view,
        });
        let batches = self.renderer.render(&ops);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        // Upload atlas only when new glyphs were rasterized
        if let Some((atlas, version)) = self.font_system.atlas_if_changed(self.atlas_version) {
            gpu.upload_font_atlas(&atlas);
            self.atlas_version = version;
        }
        gpu.render(&batches, self.theme.bar_background);
    }
}

impl ApplicationHandler for PetApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            log::error!("Startup failed: {}", e);
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = KeyInput::from_event(&event, self.modifiers) else {
                    return;
                };
                let has_document = self.model.document().is_some();
                if let Some(command) = translate(&key, &self.keymap, has_document) {
                    self.execute(event_loop, command);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                self.on_cursor_moved();
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.on_left_press(event_loop),
                ElementState::Released => self.selecting = false,
            },

            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(delta),

            WindowEvent::RedrawRequested => self.render_frame(),

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
                self.reveal_caret();
                self.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let font_px = self.font_px(window);
                    self.renderer.set_font_px(font_px);
                    self.font_system.prerasterize_ascii(font_px);
                }
                self.request_redraw();
            }

            _ => {}
        }
    }
}

/// True once `text` is on the clipboard
fn copy_to_clipboard(clipboard: Option<&mut arboard::Clipboard>, text: &str) -> bool {
    let Some(clipboard) = clipboard else {
        log::warn!("Copy failed: no clipboard available");
        return false;
    };
    match clipboard.set_text(text) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Copy failed: {}", e);
            false
        }
    }
}

/// Hand the selection to `copy` and delete it only when the copy succeeded
fn cut_selection(model: &mut PetModel, copy: impl FnOnce(&str) -> bool) -> bool {
    let copied = match model.document().and_then(|doc| doc.selected_text()) {
        Some(text) => copy(text),
        None => return false,
    };
    copied && model.edit(|doc| doc.delete_selection())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_selection() -> PetModel {
        let mut model = PetModel::new();
        model.set_new_doc_without_file();
        model.edit(|doc| doc.insert_str("keep me"));
        model.navigate(|doc| doc.select_all());
        model
    }

    #[test]
    fn test_cut_keeps_text_when_copy_fails() {
        let mut model = model_with_selection();

        assert!(!cut_selection(&mut model, |_| false));
        assert_eq!(model.document().unwrap().text(), "keep me");
    }

    #[test]
    fn test_cut_deletes_after_copy() {
        let mut model = model_with_selection();
        let mut copied = String::new();

        assert!(cut_selection(&mut model, |text| {
            copied.push_str(text);
            true
        }));
        assert_eq!(copied, "keep me");
        assert_eq!(model.document().unwrap().text(), "");
    }

    #[test]
    fn test_copy_without_clipboard_fails() {
        assert!(!copy_to_clipboard(None, "text"));
    }
}
