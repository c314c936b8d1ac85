//! Menu item flows
//!
//! Every menu item runs a short, linear sequence: ask for confirmation when
//! unsaved work is at stake, pick a file if needed, then apply one model
//! operation. Failures end in a single error dialog and leave the model as it
//! was.

use crate::dialogs::Dialogs;
use crate::error::PetError;
use crate::io::{self, SaveTarget};
use crate::menu::Item;
use crate::model::PetModel;
use std::path::{Path, PathBuf};

/// What the window should do once a flow has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

const CONFIRM_TITLE: &str = "Confirmation";

pub struct Controller<D: Dialogs> {
    dialogs: D,
}

impl<D: Dialogs> Controller<D> {
    pub fn new(dialogs: D) -> Self {
        Self { dialogs }
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    /// Run the flow behind a menu item. Disabled items do nothing.
    pub fn activate(&mut self, model: &mut PetModel, item: Item) -> Flow {
        if !item.is_enabled(&model.state()) {
            log::debug!("Ignoring disabled item {:?}", item);
            return Flow::Continue;
        }
        log::debug!("Activating {:?}", item);

        match item {
            Item::New => {
                if self.confirm_action(model) {
                    model.set_new_doc_without_file();
                }
            }
            Item::NewFromFile => {
                if self.confirm_action(model) {
                    if let Some(path) = self.select_load_file() {
                        let result = model.set_new_doc_from_file(&path);
                        self.report_read(result);
                    }
                }
            }
            Item::Open => {
                if self.confirm_action(model) {
                    if let Some(path) = self.select_load_file() {
                        let result = model.set_new_doc_and_new_file(&path);
                        self.report_read(result);
                    }
                }
            }
            Item::Reopen => {
                if self.confirm_action(model) {
                    let result = model.reset_current_doc_with_current_file();
                    self.report_read(result);
                }
            }
            Item::Save => {
                if let Some(path) = model.file().map(Path::to_path_buf) {
                    if self.confirm_replace_content(&path) {
                        let result = model.save_current_doc_into_current_file();
                        self.report_write(result);
                    }
                }
            }
            Item::SaveAs => {
                if let Some((path, target)) = self.select_save_file() {
                    let result = save_into_picked(model, &path, target);
                    self.report_write(result);
                }
            }
            Item::Close => {
                if self.confirm_action(model) {
                    model.remove_doc_and_file();
                }
            }
            Item::Clear => {
                if self.confirm_action(model) {
                    if let Err(e) = model.clear_document() {
                        log::error!("Clear failed: {}", e);
                    }
                }
            }
            Item::Quit => return self.quit(model),
        }
        Flow::Continue
    }

    /// Quit, offering to save unsaved work first. Window close requests
    /// come through here too.
    pub fn quit(&mut self, model: &mut PetModel) -> Flow {
        if !model.state().has_unsaved_changes() {
            return Flow::Exit;
        }
        if !self.dialogs.confirm(
            CONFIRM_TITLE,
            "The document has unsaved changes. Quit anyway?",
        ) {
            return Flow::Continue;
        }
        if !self
            .dialogs
            .confirm(CONFIRM_TITLE, "Save the document before quitting?")
        {
            return Flow::Exit;
        }

        let saved = if model.file().is_some() {
            model.save_current_doc_into_current_file()
        } else {
            match self.select_save_file() {
                Some((path, target)) => save_into_picked(model, &path, target),
                None => {
                    self.dialogs
                        .show_error("No file selected, the document was not saved.");
                    return Flow::Continue;
                }
            }
        };

        match saved {
            Ok(()) => Flow::Exit,
            Err(e) => {
                log::error!("Save before quit failed: {}", e);
                self.dialogs
                    .show_error(&format!("The document was not saved.\n{e}"));
                Flow::Continue
            }
        }
    }

    /// True when nothing unsaved would be lost, or the user accepts losing it
    fn confirm_action(&mut self, model: &PetModel) -> bool {
        if !model.state().has_unsaved_changes() {
            return true;
        }
        self.dialogs.confirm(
            CONFIRM_TITLE,
            "The document has unsaved changes. Discard them and continue?",
        )
    }

    /// True when `path` does not exist yet, or the user accepts replacing it
    fn confirm_replace_content(&mut self, path: &Path) -> bool {
        if !path.exists() {
            return true;
        }
        self.dialogs.confirm(
            CONFIRM_TITLE,
            &format!("Replace the contents of {}?", io::display_path(path)),
        )
    }

    /// Ask for an existing regular file to read
    fn select_load_file(&mut self) -> Option<PathBuf> {
        let path = self.dialogs.pick_load_file()?;
        match io::check_load_target(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                log::warn!("Rejected load target: {}", e);
                self.dialogs
                    .show_error(&format!("The chosen name is not an existing file.\n{e}"));
                None
            }
        }
    }

    /// Ask for a save destination, creating it when it does not exist yet
    fn select_save_file(&mut self) -> Option<(PathBuf, SaveTarget)> {
        let path = self.dialogs.pick_save_file()?;
        match io::prepare_save_target(&path) {
            Ok(target) => Some((path, target)),
            Err(e @ PetError::NotAFile(_)) => {
                log::warn!("Rejected save target: {}", e);
                self.dialogs
                    .show_error(&format!("The chosen path exists but is not a file.\n{e}"));
                None
            }
            Err(e) => {
                log::error!("Could not create save target: {}", e);
                self.dialogs
                    .show_error(&format!("The file could not be created.\n{e}"));
                None
            }
        }
    }

    fn report_read(&mut self, result: Result<(), PetError>) {
        if let Err(e) = result {
            log::error!("Read failed: {}", e);
            self.dialogs
                .show_error(&format!("Could not read the file.\n{e}"));
        }
    }

    fn report_write(&mut self, result: Result<(), PetError>) {
        if let Err(e) = result {
            log::error!("Write failed: {}", e);
            self.dialogs
                .show_error(&format!("Could not write the file.\n{e}"));
        }
    }
}

/// Save into a picked path, dropping the empty file reserved for it when the
/// write fails
fn save_into_picked(
    model: &mut PetModel,
    path: &Path,
    target: SaveTarget,
) -> Result<(), PetError> {
    let result = model.save_current_doc_into_file(path);
    if result.is_err() && target == SaveTarget::Reserved {
        io::release_save_target(path);
    }
    result
}
