//! Status bar text

use crate::io::display_path;
use crate::model::PetModel;

const NO_FILE: &str = "<none>";

/// "File: " followed by "* " when there are unsaved changes, then the
/// absolute path of the backing file or "<none>"
pub fn status_text(model: &PetModel) -> String {
    let mut text = String::from("File: ");
    if model.state().has_unsaved_changes() {
        text.push_str("* ");
    }
    match model.file() {
        Some(path) => text.push_str(&display_path(path)),
        None => text.push_str(NO_FILE),
    }
    text
}
