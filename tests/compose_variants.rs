//! End-to-end composition scenarios at real print-template scale.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use monoprint::{
    Composer, LayerOutcome, LayoutConfig, ProductAssets, Templates, Variant,
};

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) -> PathBuf {
    let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
    monoprint::raster::save_png(&img, path).unwrap();
    path.to_path_buf()
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    artwork: PathBuf,
    assets: ProductAssets,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    let artwork = write_png(&root.join("artwork.png"), 2000, 2000, [180, 40, 40, 255]);
    let assets = ProductAssets {
        title_dark: Some(write_png(&root.join("t_dark.png"), 2400, 800, [17, 17, 17, 255])),
        title_light: Some(write_png(
            &root.join("t_light.png"),
            2400,
            800,
            [255, 255, 255, 255],
        )),
        wordmark_dark: Some(write_png(&root.join("w_dark.png"), 800, 300, [17, 17, 17, 255])),
        wordmark_light: Some(write_png(
            &root.join("w_light.png"),
            800,
            300,
            [255, 255, 255, 255],
        )),
        logo_dark: Some(write_png(&root.join("l_dark.png"), 600, 600, [17, 17, 17, 255])),
        logo_light: Some(write_png(
            &root.join("l_light.png"),
            600,
            600,
            [255, 255, 255, 255],
        )),
    };

    Fixture {
        _dir: dir,
        root,
        artwork,
        assets,
    }
}

#[test]
fn front_light_is_template_sized_with_three_layers_in_safe_area() {
    let fx = fixture();
    let templates = Templates::default();
    let layout = LayoutConfig::default();
    let composer = Composer::new(&templates, &layout);

    let out = fx.root.join("front_light.png");
    let report = composer
        .compose_front(
            &fx.artwork,
            fx.assets.title_dark.as_ref().unwrap(),
            fx.assets.wordmark_dark.as_ref().unwrap(),
            &out,
        )
        .unwrap();

    assert_eq!(report.placed_count(), 3);
    for layer in &report.layers {
        let LayerOutcome::Placed { bounds } = &layer.outcome else {
            panic!("layer {:?} not placed", layer.element);
        };
        assert!(bounds.x0 >= 75.0, "{:?} x0 {}", layer.element, bounds.x0);
        assert!(bounds.y0 >= 75.0, "{:?} y0 {}", layer.element, bounds.y0);
        assert!(
            bounds.x1 <= (3600 - 75) as f64,
            "{:?} x1 {}",
            layer.element,
            bounds.x1
        );
        assert!(
            bounds.y1 <= (4800 - 75) as f64,
            "{:?} y1 {}",
            layer.element,
            bounds.y1
        );
    }

    let saved = image::open(&out).unwrap();
    assert_eq!((saved.width(), saved.height()), (3600, 4800));
    assert!(saved.color().has_alpha());
}

#[test]
fn missing_logo_light_leaves_only_that_variant_unpopulated() {
    let fx = fixture();
    let mut assets = fx.assets.clone();
    assets.logo_light = None;

    let templates = Templates::default();
    let layout = LayoutConfig::default();
    let composer = Composer::new(&templates, &layout);

    let result = composer.create_all_variants("lupo-bianco", &fx.artwork, &assets, &fx.root);

    assert_eq!(result.outputs.len(), 5);
    assert!(result.path(Variant::SleeveLight).is_none());
    assert_eq!(result.succeeded(), 4);

    for variant in [
        Variant::FrontLight,
        Variant::FrontDark,
        Variant::Back,
        Variant::SleeveDark,
    ] {
        assert!(result.path(variant).is_some(), "{variant} missing");
    }
}

#[test]
fn every_output_matches_its_template_dimensions() {
    let fx = fixture();
    let templates = Templates::default();
    let layout = LayoutConfig::default();
    let composer = Composer::new(&templates, &layout);

    let result = composer.create_all_variants("lupo-bianco", &fx.artwork, &fx.assets, &fx.root);
    assert_eq!(result.succeeded(), 5);

    for variant in Variant::ALL {
        let path = result.path(variant).unwrap();
        let saved = image::open(path).unwrap();
        let expected = match variant {
            Variant::SleeveDark | Variant::SleeveLight => templates.sleeve,
            _ => templates.main,
        };
        assert_eq!(
            (saved.width(), saved.height()),
            (expected.width, expected.height),
            "{variant}"
        );
    }
}

#[test]
fn rerunning_a_product_overwrites_with_identical_output() {
    let fx = fixture();
    let templates = Templates::default();
    let layout = LayoutConfig::default();
    let composer = Composer::new(&templates, &layout);

    let first = composer.create_all_variants("eco-notturna", &fx.artwork, &fx.assets, &fx.root);
    let first_bytes = std::fs::read(first.path(Variant::FrontLight).unwrap()).unwrap();

    let second = composer.create_all_variants("eco-notturna", &fx.artwork, &fx.assets, &fx.root);
    let second_bytes = std::fs::read(second.path(Variant::FrontLight).unwrap()).unwrap();

    assert_eq!(first.succeeded(), second.succeeded());
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn oversized_artwork_collapses_to_margin_and_still_saves() {
    let fx = fixture();
    // Sleeve canvas is 900 wide; a square logo at 25% height (1050px) cannot fit.
    let templates = Templates::default();
    let layout = LayoutConfig::default();
    let composer = Composer::new(&templates, &layout);

    let big_logo = write_png(&fx.root.join("big_logo.png"), 2000, 2000, [5, 5, 5, 255]);
    let out = fx.root.join("sleeve_big.png");
    let report = composer.compose_sleeve(&big_logo, &out).unwrap();

    let LayerOutcome::Placed { bounds } = &report.layers[0].outcome else {
        panic!("logo not placed");
    };
    assert_eq!(bounds.x0, 75.0);
    // Overflow past the far edge is permitted, never on the near edge.
    assert!(bounds.x1 > 900.0);

    let saved = image::open(&out).unwrap();
    assert_eq!((saved.width(), saved.height()), (900, 4200));
}
