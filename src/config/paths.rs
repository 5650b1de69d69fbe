//! Platform-specific data directory paths.
//!
//!   Windows: %APPDATA%/voice-preview
//!   macOS:   ~/Library/Application Support/voice-preview
//!   Linux:   $XDG_CONFIG_HOME/voice-preview (default ~/.config)

use std::path::PathBuf;

/// Get the data directory (cross-platform).
pub fn get_data_dir() -> PathBuf {
    get_config_base().join("voice-preview")
}

/// Rolling log files live here.
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Get the platform-appropriate base config directory.
fn get_config_base() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Library")
            .join("Application Support")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    }
}
