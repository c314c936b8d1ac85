#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod accelerator;
pub mod app;
pub mod config;
pub mod controller;
pub mod dialogs;
pub mod document;
pub mod error;
pub mod font;
pub mod gpu;
pub mod input;
pub mod io;
pub mod layout;
pub mod menu;
pub mod model;
pub mod render;
pub mod scene;
pub mod status;
pub mod theme;

// Re-export core types
pub use controller::{Controller, Flow};
pub use dialogs::{Dialogs, NativeDialogs};
pub use document::{Document, LineEnding, Motion};
pub use error::{PetError, Result};
pub use menu::{Item, ItemStates, Keymap, Menu};
pub use model::{ModelState, PetModel};
