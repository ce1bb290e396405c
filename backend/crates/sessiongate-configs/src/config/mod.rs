pub mod defaults;
mod loader;
pub mod types;

pub use loader::{ENV_CONFIG_PATH, MAX_DECODER_DEPTH};
pub use types::*;
