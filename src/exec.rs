//! Host launcher collaborators: running command lines and opening URIs.
use std::collections::BTreeMap;
use std::process::{Command, Stdio};

use crate::error::{ConnectablesError, Result};
use crate::logging::Log;

/// Dispatch target for activated actions.
///
/// Both operations are fire-and-forget: implementations start the work and
/// return without waiting for it to finish or reporting its exit status.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher {
    /// Run `cmdline` through the platform shell with `env` added to the
    /// child's environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::Launch`] if the process cannot be started.
    fn launch_command(&self, cmdline: &str, env: &BTreeMap<String, String>) -> Result<()>;

    /// Open `uri` with the desktop's default handler.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::Launch`] if the opener cannot be started.
    fn open_uri(&self, uri: &str) -> Result<()>;
}

/// Launcher that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch_command(&self, cmdline: &str, env: &BTreeMap<String, String>) -> Result<()> {
        let mut cmd = shell_command(cmdline);
        cmd.envs(env);
        spawn_detached(cmd, cmdline)
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        let mut cmd = open_command();
        cmd.arg(uri);
        spawn_detached(cmd, uri)
    }
}

#[cfg(not(windows))]
fn shell_command(cmdline: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", cmdline]);
    cmd
}

#[cfg(windows)]
fn shell_command(cmdline: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", cmdline]);
    cmd
}

#[cfg(target_os = "macos")]
fn open_command() -> Command {
    Command::new("open")
}

#[cfg(windows)]
fn open_command() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn open_command() -> Command {
    Command::new("xdg-open")
}

/// Start `cmd` with null stdio and return without waiting on it.
fn spawn_detached(mut cmd: Command, target: &str) -> Result<()> {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ConnectablesError::Launch {
            target: target.to_string(),
            source,
        })?;
    tracing::debug!("spawned pid {} for: {target}", child.id());
    Ok(())
}

/// Launcher that only reports what it would do.
#[derive(Debug)]
pub struct DryRunLauncher<'a> {
    log: &'a dyn Log,
}

impl<'a> DryRunLauncher<'a> {
    /// Report dispatches through `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }
}

impl Launcher for DryRunLauncher<'_> {
    fn launch_command(&self, cmdline: &str, env: &BTreeMap<String, String>) -> Result<()> {
        if env.is_empty() {
            self.log.dry_run(&format!("would run: {cmdline}"));
        } else {
            let vars: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.log
                .dry_run(&format!("would run: {cmdline} (env: {})", vars.join(" ")));
        }
        Ok(())
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        self.log.dry_run(&format!("would open: {uri}"));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::time::{Duration, Instant};

    fn wait_for(path: &std::path::Path) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(s) = std::fs::read_to_string(path)
                && !s.is_empty()
            {
                return Some(s);
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        None
    }

    #[cfg(not(windows))]
    #[test]
    fn launch_command_runs_through_shell_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let cmdline = format!("printf '%s' \"$GREETING\" > '{}'", out.display());
        let env = BTreeMap::from([("GREETING".to_string(), "hello".to_string())]);

        SystemLauncher.launch_command(&cmdline, &env).unwrap();
        assert_eq!(wait_for(&out).as_deref(), Some("hello"));
    }

    #[test]
    fn spawn_failure_is_launch_error() {
        let cmd = Command::new("this-program-does-not-exist-12345");
        let err = spawn_detached(cmd, "missing").unwrap_err();
        assert!(matches!(err, ConnectablesError::Launch { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn dry_run_launcher_writes_to_log() {
        let (log, _tmp, _guard) = isolated_logger();
        let launcher = DryRunLauncher::new(&log);
        let env = BTreeMap::from([("LANG".to_string(), "C".to_string())]);
        launcher.launch_command("mount /mnt/nas", &env).unwrap();
        launcher.open_uri("smb://nas/media").unwrap();

        let contents = std::fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[dry run] would run: mount /mnt/nas (env: LANG=C)"));
        assert!(contents.contains("[dry run] would open: smb://nas/media"));
    }
}
