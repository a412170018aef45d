use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config").join("flipfox")
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "flipfox") {
            proj_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }
}
