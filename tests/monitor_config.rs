use std::io::Write;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use proximity_guard::config::MonitorConfig;
use proximity_guard::PixelFormat;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PROXIMITY_CONFIG",
        "PROXIMITY_SOURCE",
        "PROXIMITY_ZONE",
        "PROXIMITY_THRESHOLD_DANGER",
        "PROXIMITY_THRESHOLD_WARNING",
        "PROXIMITY_MIN_AREA",
        "PROXIMITY_MIRROR",
    ] {
        std::env::remove_var(key);
    }
}

fn temp_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_without_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = MonitorConfig::load().expect("load defaults");
    assert_eq!((cfg.frame.width, cfg.frame.height), (1280, 720));
    assert!(cfg.frame.mirror);
    assert_eq!(cfg.source.url, "stub://demo");
    assert_eq!(cfg.zone.as_rect(), [900, 150, 1200, 600]);
    assert_eq!(cfg.thresholds.danger(), 25.0);
    assert_eq!(cfg.thresholds.warning(), 75.0);
    assert_eq!(cfg.detector.min_area, 1500);
    assert_eq!(cfg.detector.morph_iterations, 2);
}

#[test]
fn loads_toml_config_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = temp_config(
        ".toml",
        r#"
            [frame]
            width = 640
            height = 480
            mirror = false

            [source]
            url = "raw:-"
            pixel_format = "nv12"
            target_fps = 15

            [color]
            lower = [100, 120, 80]
            upper = [130, 255, 255]

            [zone]
            rect = [400, 100, 600, 400]

            [thresholds]
            danger = 10.0
            warning = 40.0

            [detector]
            min_area = 800
            morph_iterations = 1
        "#,
    );

    std::env::set_var("PROXIMITY_CONFIG", file.path());
    std::env::set_var("PROXIMITY_ZONE", "300, 50, 500, 300");
    std::env::set_var("PROXIMITY_THRESHOLD_WARNING", "60");
    std::env::set_var("PROXIMITY_MIRROR", "true");
    std::env::set_var("PROXIMITY_SOURCE", "  ");

    let cfg = MonitorConfig::load().expect("load config");

    assert_eq!((cfg.frame.width, cfg.frame.height), (640, 480));
    assert!(cfg.frame.mirror);
    assert_eq!(cfg.source.url, "raw:-");
    assert_eq!(cfg.source.pixel_format, PixelFormat::Nv12);
    assert_eq!(cfg.source.target_fps, 15);
    assert_eq!(cfg.detector.range.lower(), [100, 120, 80]);
    assert_eq!(cfg.detector.range.upper(), [130, 255, 255]);
    assert_eq!(cfg.zone.as_rect(), [300, 50, 500, 300]);
    assert_eq!(cfg.thresholds.danger(), 10.0);
    assert_eq!(cfg.thresholds.warning(), 60.0);
    assert_eq!(cfg.detector.min_area, 800);
    assert_eq!(cfg.detector.morph_iterations, 1);

    clear_env();
}

#[test]
fn loads_json_config() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = temp_config(
        ".json",
        r#"{
            "source": { "url": "images:/var/lib/frames" },
            "thresholds": { "danger": 5.0 }
        }"#,
    );
    std::env::set_var("PROXIMITY_CONFIG", file.path());
    std::env::set_var("PROXIMITY_MIN_AREA", "2000");

    let cfg = MonitorConfig::load().expect("load config");
    assert_eq!(cfg.source.url, "images:/var/lib/frames");
    assert_eq!(cfg.thresholds.danger(), 5.0);
    assert_eq!(cfg.thresholds.warning(), 75.0);
    assert_eq!(cfg.detector.min_area, 2000);

    clear_env();
}

#[test]
fn rejects_invalid_zone_and_thresholds() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let inverted = temp_config(".toml", "[zone]\nrect = [1200, 150, 900, 600]\n");
    std::env::set_var("PROXIMITY_CONFIG", inverted.path());
    assert!(MonitorConfig::load().is_err());

    let outside = temp_config(".toml", "[zone]\nrect = [900, 150, 1400, 600]\n");
    std::env::set_var("PROXIMITY_CONFIG", outside.path());
    assert!(MonitorConfig::load().is_err());

    let swapped = temp_config(".toml", "[thresholds]\ndanger = 80.0\nwarning = 20.0\n");
    std::env::set_var("PROXIMITY_CONFIG", swapped.path());
    assert!(MonitorConfig::load().is_err());

    clear_env();
    std::env::set_var("PROXIMITY_THRESHOLD_DANGER", "100");
    assert!(MonitorConfig::load().is_err());

    clear_env();
    std::env::set_var("PROXIMITY_ZONE", "1,2,3");
    assert!(MonitorConfig::load().is_err());

    clear_env();
    std::env::set_var("PROXIMITY_MIN_AREA", "-5");
    assert!(MonitorConfig::load().is_err());

    clear_env();
    std::env::set_var("PROXIMITY_MIRROR", "sometimes");
    assert!(MonitorConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_unreadable_or_malformed_files() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PROXIMITY_CONFIG", "/nonexistent/proximity.toml");
    assert!(MonitorConfig::load().is_err());

    let bad = temp_config(".json", "{ not json");
    std::env::set_var("PROXIMITY_CONFIG", bad.path());
    assert!(MonitorConfig::load().is_err());

    let bad_format = temp_config(".toml", "[source]\npixel_format = \"yuyv\"\n");
    std::env::set_var("PROXIMITY_CONFIG", bad_format.path());
    assert!(MonitorConfig::load().is_err());

    clear_env();
}
