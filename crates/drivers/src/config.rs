use std::path::PathBuf;

use clap::Parser;

/// Local image labeling server.
#[derive(Debug, Clone, Parser)]
#[command(name = "picrate", version, about)]
pub struct ServerConfig {
    /// Root directory that image folders are browsed and resolved against.
    #[arg(long, env = "PICRATE_IMAGE_ROOT", default_value = "images")]
    pub image_root: PathBuf,

    /// Directory holding one JSON file per task.
    #[arg(long, env = "PICRATE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "PICRATE_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,
}
