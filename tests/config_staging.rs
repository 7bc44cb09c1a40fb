//! Config synthesis and persistence properties

use rayhunter_installer::Config;

#[test]
fn synthesized_default_persists_and_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let (first, created) = Config::load_or_create(&path).unwrap();
    assert!(created, "first run must synthesize the file");
    assert_eq!(first.port, 8080);
    assert!(!first.debug_mode);
    assert_eq!(first.ui_level, 1);

    let on_disk = std::fs::read_to_string(&path).unwrap();

    let (second, created) = Config::load_or_create(&path).unwrap();
    assert!(!created, "second run must reuse the persisted file");
    assert_eq!(second, first);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        on_disk,
        "reuse must not rewrite the file"
    );
}

#[test]
fn existing_file_wins_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 8443\ncolorblind_mode = true\n").unwrap();

    let (config, created) = Config::load_or_create(&path).unwrap();
    assert!(!created);
    assert_eq!(config.port, 8443);
    assert!(config.colorblind_mode);
    // untouched keys still carry their documented defaults
    assert_eq!(config.qmdl_store_path, "/data/rayhunter/qmdl");
    assert!(config.show_screen_overlay);
    assert!(config.enable_animation);
}

#[test]
fn optional_display_keys_default_on() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.show_screen_overlay);
    assert!(config.enable_animation);
    assert!(!config.full_background_color);
}
