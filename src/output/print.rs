use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{info, warn};

/// Hands saved collages to something that prints them
pub trait Printer {
    /// Fire-and-forget: failures are logged, never returned
    fn print(&self, path: &Path);
}

/// Sends files to the host's default print handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrinter;

impl SystemPrinter {
    pub fn new() -> Self {
        Self
    }

    /// Command that prints `path` on this platform
    pub fn command_for(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("powershell");
            cmd.args([
                "-NoProfile",
                "-Command",
                &format!(
                    "Start-Process -FilePath '{}' -Verb Print",
                    path.display().to_string().replace('\'', "''")
                ),
            ]);
            cmd
        } else {
            let mut cmd = Command::new("lp");
            cmd.arg(path);
            cmd
        }
    }
}

impl Printer for SystemPrinter {
    fn print(&self, path: &Path) {
        let mut cmd = Self::command_for(path);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        // The child is not waited on; print completion is never confirmed
        match cmd.spawn() {
            Ok(child) => info!("Sent {:?} to the printer (pid {})", path, child.id()),
            Err(e) => warn!("Print dispatch for {:?} failed: {}", path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_targets_file() {
        let cmd = SystemPrinter::command_for(Path::new("images/collage_20240101_000000.png"));
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert!(args.iter().any(|a| a.contains("collage_20240101_000000.png")));
    }
}
