use std::process::Command;

#[test]
fn help_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_backdrop"));
    cmd.arg("--help");

    // Act
    let output = cmd.output().expect("failed to execute backdrop");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overlay"));
    assert!(stdout.contains("[COMMAND]..."));
}

#[test]
fn version_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_backdrop"));
    cmd.arg("--version");

    // Act
    let output = cmd.output().expect("failed to execute backdrop");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("backdrop"));
}
