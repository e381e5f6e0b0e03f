//! Whole-upload scans producing JSON reports

mod common;

use common::{Bars, CANVAS, ean13_gray, encode_png, side_by_side};
use rust_barcode::{
    CompositeDecoder, ErrorReport, RegionRect, RotationConfig, ScanConfig, decode_image_bytes,
    scan_bytes,
};

#[test]
fn test_scan_png_upload() {
    let png = encode_png(ean13_gray("4006381333931", Bars::Horizontal), CANVAS, CANVAS);
    let report = scan_bytes(
        "sideways.png",
        &png,
        &ScanConfig::default(),
        CompositeDecoder::default(),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "filename": "sideways.png",
            "results": {"barcodes": [
                {"type": "EAN-13", "content": "4006381333931", "angle": 90}
            ]}
        })
    );
}

#[test]
fn test_decode_image_bytes() {
    let png = encode_png(ean13_gray("5901234123457", Bars::Vertical), CANVAS, CANVAS);
    let result = decode_image_bytes(&png).unwrap().unwrap();
    assert_eq!(result.content_lossy(), "5901234123457");
    assert_eq!(result.angle, 0);
}

#[test]
fn test_scan_regions_independently() {
    let left = ean13_gray("4006381333931", Bars::Vertical);
    let right = ean13_gray("5901234123457", Bars::Horizontal);
    let (gray, width, height) = side_by_side(&left, &right, 40);
    let png = encode_png(gray, width, height);

    let config = ScanConfig {
        regions: vec![
            RegionRect::new(CANVAS + 40, 0, CANVAS, CANVAS),
            RegionRect::new(0, 0, CANVAS, CANVAS),
        ],
        ..ScanConfig::default()
    };
    let report = scan_bytes("shelf.png", &png, &config, CompositeDecoder::default()).unwrap();
    let found: Vec<(&str, u32)> = report
        .results
        .barcodes
        .iter()
        .map(|b| (b.content.as_str(), b.angle))
        .collect();
    assert_eq!(found, vec![("5901234123457", 90), ("4006381333931", 0)]);
    assert_eq!(
        report.results.barcodes[0].region,
        Some(RegionRect::new(CANVAS + 40, 0, CANVAS, CANVAS))
    );
}

#[test]
fn test_every_barcode_in_one_upload_reported() {
    let (gray, width, height) = side_by_side(
        &ean13_gray("4006381333931", Bars::Vertical),
        &ean13_gray("5901234123457", Bars::Vertical),
        40,
    );
    let png = encode_png(gray, width, height);
    let report = scan_bytes("pair.png", &png, &ScanConfig::default(), CompositeDecoder::default())
        .unwrap();
    let found: Vec<(&str, u32)> = report
        .results
        .barcodes
        .iter()
        .map(|b| (b.content.as_str(), b.angle))
        .collect();
    assert_eq!(found, vec![("4006381333931", 0), ("5901234123457", 0)]);
}

#[test]
fn test_blank_upload_reports_no_barcodes() {
    let png = encode_png(vec![240; 200 * 120], 200, 120);
    let report = scan_bytes("blank.png", &png, &ScanConfig::default(), CompositeDecoder::default())
        .unwrap();
    assert!(report.results.barcodes.is_empty());
}

#[test]
fn test_restricted_sweep_from_json_config() {
    let config = ScanConfig::from_json(r#"{"rotation": {"angle_step": 45, "angle_count": 2}}"#)
        .unwrap();
    assert_eq!(config.rotation, RotationConfig::new(45, 2).unwrap());

    let png = encode_png(ean13_gray("4006381333931", Bars::Horizontal), CANVAS, CANVAS);
    let report = scan_bytes("sideways.png", &png, &config, CompositeDecoder::default()).unwrap();
    assert!(report.results.barcodes.is_empty());
}

#[test]
fn test_corrupt_upload_error_report() {
    let err = scan_bytes(
        "broken.jpg",
        b"\xff\xd8\xff\xe0 truncated",
        &ScanConfig::default(),
        CompositeDecoder::default(),
    )
    .unwrap_err();
    assert!(err.is_invalid_input());

    let json = serde_json::to_value(ErrorReport::from_error(&err)).unwrap();
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("Processing error: "));
}
