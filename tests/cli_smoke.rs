use std::{io::Cursor, path::PathBuf};

fn vitrine_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_vitrine")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "vitrine.exe"
            } else {
                "vitrine"
            });
            p
        })
}

fn write_png(path: &std::path::Path, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, &buf).unwrap();
}

#[test]
fn cli_render_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke_render");
    std::fs::create_dir_all(&dir).unwrap();

    write_png(
        &dir.join("assets/screwdriver/red-wood.png"),
        [200, 40, 40, 255],
    );
    write_png(&dir.join("assets/cushion/plaid.png"), [40, 40, 200, 255]);

    let config_path = dir.join("config.json");
    std::fs::write(&config_path, r#"{"style":"Instant"}"#).unwrap();

    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(vitrine_exe())
        .args(["render", "--color", "red", "--material", "wood"])
        .args(["--cushion", "plaid"])
        .arg("--assets-root")
        .arg(&dir)
        .arg("--config")
        .arg(&config_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
    assert_eq!(image::image_dimensions(&out_path).unwrap(), (600, 600));
}

#[test]
fn cli_render_fails_when_the_texture_is_missing() {
    let dir = PathBuf::from("target").join("cli_smoke_missing");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(vitrine_exe())
        .args(["render", "--color", "teal", "--material", "glass"])
        .arg("--assets-root")
        .arg(&dir)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!out_path.exists());
}

#[test]
fn cli_sequence_writes_numbered_frames() {
    let dir = PathBuf::from("target").join("cli_smoke_sequence");
    std::fs::create_dir_all(&dir).unwrap();

    write_png(
        &dir.join("assets/screwdriver/blue-metal.png"),
        [40, 40, 200, 255],
    );

    let frames_dir = dir.join("frames");
    let _ = std::fs::remove_dir_all(&frames_dir);

    let status = std::process::Command::new(vitrine_exe())
        .args(["sequence", "--color", "blue", "--material", "metal"])
        .arg("--assets-root")
        .arg(&dir)
        .arg("--out-dir")
        .arg(&frames_dir)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(frames_dir.join("frame_000.png").exists());
    // Default fade: ten frames at 60 Hz, plus the load tick.
    assert!(frames_dir.join("frame_010.png").exists());
    assert!(!frames_dir.join("frame_011.png").exists());
}
