//! Runs the binary without any display server reachable and checks the
//! window-creation failure path.

#![cfg(all(unix, not(target_os = "macos")))]

use std::process::Command;

#[test]
fn exits_with_minus_one_when_no_window_can_be_created() {
    let output = Command::new(env!("CARGO_BIN_EXE_hello_triangle"))
        .env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("WAYLAND_SOCKET")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to spawn hello_triangle");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(255), "stdout: {stdout}");
    assert!(stdout.contains("Failed to create GLFW window"), "stdout: {stdout}");
}
