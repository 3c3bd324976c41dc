use std::{fs, process::Command};

fn sprite_chase() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sprite-chase"))
}

#[test]
fn scripted_grid_session_collects_the_configured_target() {
    let path = std::env::temp_dir().join(format!(
        "sprite-chase-headless-{}.toml",
        std::process::id()
    ));
    fs::write(&path, "mode = \"grid\"\ntarget_start = { x = 7, y = 2 }\n").expect("write config");

    let output = sprite_chase()
        .arg("--config")
        .arg(&path)
        .args(["--seed", "5", "--headless", "--script", "right*90,up*60"])
        .output()
        .expect("run sprite-chase");
    let _ = fs::remove_file(&path);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Sprite Chase."), "{stdout}");
    assert!(stdout.contains("frames=150 score=1"), "{stdout}");
}

#[test]
fn invalid_configuration_fails_with_a_message() {
    let output = sprite_chase()
        .args(["--speed", "0", "--headless", "--frames", "1"])
        .output()
        .expect("run sprite-chase");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid game configuration"), "{stderr}");
}

#[test]
fn headless_run_without_length_is_rejected() {
    let output = sprite_chase()
        .arg("--headless")
        .output()
        .expect("run sprite-chase");

    assert!(!output.status.success());
}
