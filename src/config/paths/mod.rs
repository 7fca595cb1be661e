//! Platform directories for configuration and local data.

mod xdg_root;

pub use xdg_root::{config_file, data_home, default_store_dir};
