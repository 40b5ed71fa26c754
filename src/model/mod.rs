pub mod board;
pub mod card;
pub mod config;
pub mod group;
pub mod record;

pub use board::*;
pub use card::*;
pub use config::*;
pub use group::*;
pub use record::*;
