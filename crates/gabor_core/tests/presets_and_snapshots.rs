use std::fs;

use gabor_core::{
    config::PresetError,
    render::{save_png, snapshot},
    Colormap, GaborParameters, GridSpec, HeatmapSettings,
};

#[test]
fn preset_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("preset.json");

    let params = GaborParameters {
        x0: -3.5,
        theta: 0.25,
        beta_x: 0.5,
        draw_sigma: true,
        ..GaborParameters::default()
    };
    fs::write(&path, params.to_json_string().unwrap()).unwrap();

    let loaded = GaborParameters::load_preset(&path).expect("load preset");
    assert_eq!(loaded, params);
}

#[test]
fn preset_values_outside_sliders_are_clamped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wide.json");
    fs::write(&path, r#"{"alpha": 50.0, "phi": -1.0}"#).unwrap();

    let loaded = GaborParameters::load_preset(&path).unwrap();
    assert_eq!(loaded.alpha, 10.0);
    assert_eq!(loaded.phi, 0.0);
}

#[test]
fn missing_and_malformed_presets_report_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = GaborParameters::load_preset(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, PresetError::Io { .. }));

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let broken = GaborParameters::load_preset(&path).unwrap_err();
    assert!(matches!(broken, PresetError::Json(_)));
}

#[test]
fn png_snapshot_has_grid_dimensions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gabor.png");
    let grid = GridSpec::with_resolution(64);
    let params = GaborParameters {
        draw_sigma: true,
        ..GaborParameters::default()
    };
    let settings = HeatmapSettings {
        colormap: Colormap::Coolwarm,
        symmetric_range: true,
        ..HeatmapSettings::default()
    };

    save_png(&path, &params, &grid, &settings).expect("write png");
    let decoded = image::open(&path).expect("decode png").to_rgba8();
    assert_eq!(decoded.dimensions(), (64, 64));
    assert_eq!(decoded, snapshot(&params, &grid, &settings).unwrap());
}
