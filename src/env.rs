use std::env;
use std::fs;
use std::path::PathBuf;

/// Returns the root directory shared with the Skirmish client install.
pub fn default_app_dir() -> PathBuf {
    let base = match env::consts::OS {
        "windows" => env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join("skirmish")
}

pub fn maps_dir() -> PathBuf {
    default_app_dir().join("maps")
}

pub fn mods_dir() -> PathBuf {
    default_app_dir().join("mods")
}

pub fn logs_dir() -> PathBuf {
    default_app_dir().join("logs")
}

pub fn client_path() -> PathBuf {
    let bin_dir = default_app_dir().join("client").join("bin");
    if cfg!(target_os = "windows") {
        bin_dir.join("SkirmishClient.exe")
    } else if cfg!(target_os = "macos") {
        default_app_dir()
            .join("client")
            .join("Skirmish.app")
            .join("Contents")
            .join("MacOS")
            .join("SkirmishClient")
    } else {
        bin_dir.join("SkirmishClient")
    }
}

/// Create the on-disk folder layout expected by the lobby.
pub fn ensure_base_dirs() -> std::io::Result<()> {
    let folders = [default_app_dir(), maps_dir(), mods_dir(), logs_dir()];

    for dir in folders {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
