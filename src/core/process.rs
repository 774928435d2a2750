//! Cross-platform process spawning helpers.
//!
//! On Windows, spawning console binaries (ffmpeg, where, etc.) from a
//! service can cause a console window to appear for each invocation. This
//! module centralizes the Windows creation flags needed to suppress that.

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Apply platform-specific flags to a std process command.
pub fn configure_std_command(cmd: &mut std::process::Command) {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

/// Apply platform-specific flags to a tokio process command.
pub fn configure_tokio_command(cmd: &mut tokio::process::Command) {
    #[cfg(target_os = "windows")]
    {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_command_can_be_configured() {
        #[cfg(target_os = "windows")]
        let mut cmd = std::process::Command::new("cmd");
        #[cfg(not(target_os = "windows"))]
        let mut cmd = std::process::Command::new("echo");
        configure_std_command(&mut cmd);
    }

    #[tokio::test]
    async fn tokio_command_can_execute_successfully() {
        #[cfg(target_os = "windows")]
        let mut cmd = tokio::process::Command::new("cmd");
        #[cfg(not(target_os = "windows"))]
        let mut cmd = tokio::process::Command::new("echo");

        configure_tokio_command(&mut cmd);

        #[cfg(target_os = "windows")]
        let output = cmd.args(["/C", "echo", "test"]).output().await;
        #[cfg(not(target_os = "windows"))]
        let output = cmd.arg("test").output().await;

        assert!(output.is_ok(), "Command should execute successfully");
        assert!(output.unwrap().status.success());
    }
}
