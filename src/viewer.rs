//! Opening outputs in the platform's default image viewer

use std::path::Path;
use std::process::Command;

use crate::error::ViewerError;

/// Build the command that opens `path` with the default application
fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        // The empty string is the window title `start` expects first
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Open `path` in the default viewer and wait for the launcher to return
pub fn open_in_viewer(path: &Path) -> Result<(), ViewerError> {
    let status = viewer_command(path).status()?;
    if !status.success() {
        return Err(ViewerError::Status(status));
    }
    log::info!("Opened {} in default viewer", path.display());
    Ok(())
}
