pub mod card_io;
pub mod config_io;
pub mod project_io;
pub mod watcher;
