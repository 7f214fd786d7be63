//! Configuration for the `posixfs` front end.
//! Provides configuration types, default paths and XML loading.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{
    CONFIG_ENV, config_path, default_config_path, default_log_path, path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel, parse_dir_mode};
pub use xml::{load_config, load_config_from_xml_path};
