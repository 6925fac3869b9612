//! Provider configuration: portal host and credentials.
//!
//! Values are layered with the precedence
//! explicit override > environment > config file > built-in default.
//! The config file lives at `~/.config/burwood/portal.json` unless
//! `BURWOOD_CONFIG_PATH` points elsewhere.

mod io;
mod model;

pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path, save_config_to_path};
pub use model::{HOST_ENV, PASSWORD_ENV, ProviderConfig, USERNAME_ENV};
