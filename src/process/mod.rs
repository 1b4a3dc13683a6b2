use std::process::{Command, Stdio};

use log::{debug, info, warn};
use sysinfo::{ProcessesToUpdate, System};

use crate::engine::Runner;
use crate::engine::models::LaunchDescriptor;
use crate::env;

const CLIENT_PROCESS: &str = if cfg!(target_os = "windows") {
    "SkirmishClient.exe"
} else {
    "SkirmishClient"
};

/// Starts the Skirmish client in host mode. Fire-and-forget: once the
/// process is spawned, its fate is the client's own business.
#[derive(Clone, Default)]
pub struct GameRunner;

impl GameRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn host(&self, descriptor: &LaunchDescriptor) -> Result<(), String> {
        let client_path = env::client_path();
        if !client_path.exists() {
            warn!("host: client not found at {}", client_path.display());
            return Err(format!(
                "game client not found at {}",
                client_path.display()
            ));
        }
        if client_running() {
            warn!("host: client already running; refusing to double-launch");
            return Err("game client is already running".into());
        }

        info!(
            "host: starting \"{}\" on {} ({})",
            descriptor.title, descriptor.map_folder, descriptor.featured_mode
        );
        debug!(
            "host: mods=[{}] friends_only={}",
            descriptor.mod_uids.iter().cloned().collect::<Vec<_>>().join(","),
            descriptor.friends_only
        );

        let mut cmd = Command::new(&client_path);
        cmd.arg("--host")
            .arg("--title")
            .arg(&descriptor.title)
            .arg("--map")
            .arg(&descriptor.map_folder)
            .arg("--mode")
            .arg(&descriptor.featured_mode)
            .arg("--mods-dir")
            .arg(env::mods_dir());

        if !descriptor.mod_uids.is_empty() {
            let uids: Vec<&str> = descriptor.mod_uids.iter().map(String::as_str).collect();
            cmd.arg("--sim-mods").arg(uids.join(","));
        }
        if descriptor.friends_only {
            cmd.arg("--friends-only");
        }
        if let Some(min) = descriptor.rating_min {
            cmd.arg("--rating-min").arg(min.to_string());
        }
        if let Some(max) = descriptor.rating_max {
            cmd.arg("--rating-max").arg(max.to_string());
        }
        if descriptor.enforce_rating {
            cmd.arg("--enforce-rating");
        }
        if let Some(password) = &descriptor.password {
            // Keep the password out of the process argument list.
            cmd.env("SKIRMISH_LOBBY_PASSWORD", password);
        }

        cmd.current_dir(env::default_app_dir());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        cmd.spawn()
            .map_err(|e| format!("failed to start game process: {e}"))?;
        info!("host: process started");
        Ok(())
    }
}

impl Runner for GameRunner {
    fn host(&self, descriptor: &LaunchDescriptor) -> Result<(), String> {
        GameRunner::host(self, descriptor)
    }
}

fn client_running() -> bool {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
        .processes()
        .values()
        .any(|process| process.name().eq_ignore_ascii_case(CLIENT_PROCESS))
}
