// ─── Game Process ───
// Spawns a build's shipping executable and tears down game processes.

use std::path::Path;
use std::process::{Child, Command, Stdio};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::shipping_executable;

/// Executables that belong to a running game session.
pub const GAME_PROCESSES: [&str; 5] = [
    "FortniteClient-Win64-Shipping.exe",
    "FortniteClient-Win64-Shipping_EAC.exe",
    "FortniteClient-Win64-Shipping_BE.exe",
    "FortniteLauncher.exe",
    "FortniteCrashHandler.exe",
];

/// Command line for an exchange-code login.
pub fn launch_args(exchange_code: &str) -> Vec<String> {
    vec![
        "-epicapp=Fortnite".into(),
        "-epicenv=Prod".into(),
        "-epiclocale=en-us".into(),
        "-epicportal".into(),
        "-skippatchcheck".into(),
        "-nobe".into(),
        "-fromfl=eac".into(),
        "-fltoken=none".into(),
        "-AUTH_LOGIN=unused".into(),
        format!("-AUTH_PASSWORD={exchange_code}"),
        "-AUTH_TYPE=exchangecode".into(),
    ]
}

/// Start the game for `install_root`.
///
/// Returns immediately after spawning; the caller watches the child.
pub fn spawn_build(install_root: &Path, exchange_code: &str) -> LauncherResult<Child> {
    if exchange_code.trim().is_empty() {
        return Err(LauncherError::Launch("missing exchange code".into()));
    }

    let exe = shipping_executable(install_root);
    let mut cmd = Command::new(&exe);
    cmd.args(launch_args(exchange_code));
    if let Some(binaries_dir) = exe.parent() {
        cmd.current_dir(binaries_dir);
    }
    configure_platform_spawn(&mut cmd);
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    debug!("Spawning {:?}", exe);
    let child = cmd
        .spawn()
        .map_err(|e| LauncherError::Launch(format!("{}: {}", exe.display(), e)))?;

    info!("Started {:?} (pid {})", exe, child.id());
    Ok(child)
}

fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

pub fn is_game_process(name: &str) -> bool {
    GAME_PROCESSES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}

/// Kill every running game process. Returns how many were terminated.
pub fn kill_game_processes() -> usize {
    let mut system = sysinfo::System::new_all();
    system.refresh_all();

    let mut killed = 0;
    for process in system.processes().values() {
        let name = process.name().to_string_lossy();
        if !is_game_process(&name) {
            continue;
        }
        if process.kill() {
            info!("Killed {} (pid {})", name, process.pid());
            killed += 1;
        } else {
            warn!("Could not kill {} (pid {})", name, process.pid());
        }
    }
    killed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_code_goes_into_auth_password() {
        let args = launch_args("abc123");
        assert!(args.contains(&"-AUTH_PASSWORD=abc123".to_string()));
        assert!(args.contains(&"-AUTH_TYPE=exchangecode".to_string()));
    }

    #[test]
    fn game_process_names_are_case_insensitive() {
        assert!(is_game_process("fortniteclient-win64-shipping.exe"));
        assert!(is_game_process("FortniteLauncher.exe"));
        assert!(!is_game_process("explorer.exe"));
    }

    #[test]
    fn blank_exchange_code_is_rejected() {
        let err = spawn_build(Path::new("/nowhere"), " ").unwrap_err();
        assert!(matches!(err, LauncherError::Launch(_)));
    }

    #[test]
    fn missing_executable_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let err = spawn_build(dir.path(), "code").unwrap_err();
        assert!(matches!(err, LauncherError::Launch(_)));
    }
}
