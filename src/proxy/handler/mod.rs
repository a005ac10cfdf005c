mod chat;
mod models;

pub use chat::handle_chat;
pub use models::{handle_show, handle_tags};
