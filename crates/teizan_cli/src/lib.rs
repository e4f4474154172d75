pub mod config_loader;
pub mod exec;
pub mod export;
pub mod logging;
pub mod preview;
pub mod rakuten;
