mod loader;
mod schema;

pub use loader::{app_dir, config_path, load_config, save_config};
pub use schema::{Config, PlayerConfig, ShellConfig};
