//! QR symbols through the rotation search and the default decoder chain

mod common;

use common::{Bars, CANVAS, ean13_gray, encode_png, gray_region, qr_gray, side_by_side};
use rust_barcode::{
    CompositeDecoder, QrDecoder, RotationSearch, ScanConfig, Symbology, decode_with_rotation,
    scan_bytes,
};

#[test]
fn test_text_qr_found_without_rotation() {
    let region = gray_region(qr_gray(b"hello world"), CANVAS, CANVAS);
    let result = decode_with_rotation(&region).expect("QR decodes");
    assert_eq!(result.content, b"hello world");
    assert_eq!(result.symbology, Symbology::Qr);
    assert_eq!(result.angle, 0);
}

#[test]
fn test_binary_qr_payload_kept_as_bytes() {
    let payload = [0xff, 0xfe, 0x00, 0x80, 0x41];
    let region = gray_region(qr_gray(&payload), CANVAS, CANVAS);
    let result = decode_with_rotation(&region).expect("binary QR decodes");
    assert_eq!(result.content, payload.to_vec());
    assert_eq!(result.symbology, Symbology::Qr);
}

#[test]
fn test_qr_only_decoder() {
    let region = gray_region(qr_gray(b"https://example.com/item/42"), CANVAS, CANVAS);
    let search = RotationSearch::new(QrDecoder::new());
    let outcome = search.search_traced(&region);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.result.unwrap().content_lossy(), "https://example.com/item/42");

    let ean = gray_region(ean13_gray("4006381333931", Bars::Vertical), CANVAS, CANVAS);
    assert!(search.search(&ean).is_none());
}

#[test]
fn test_composite_prefers_qr_over_ean() {
    let (gray, width, height) = side_by_side(
        &ean13_gray("4006381333931", Bars::Vertical),
        &qr_gray(b"qr wins"),
        40,
    );
    let region = gray_region(gray, width, height);
    let result = decode_with_rotation(&region).unwrap();
    assert_eq!(result.symbology, Symbology::Qr);
    assert_eq!(result.content, b"qr wins");
    assert_eq!(result.angle, 0);

    let hit = RotationSearch::new(CompositeDecoder::default())
        .search_symbols(&region)
        .unwrap();
    let found: Vec<Symbology> = hit.symbols.iter().map(|s| s.symbology).collect();
    assert_eq!(found, vec![Symbology::Qr, Symbology::Ean13]);
}

#[test]
fn test_scan_reports_qr_and_ean_from_one_upload() {
    let (gray, width, height) = side_by_side(
        &qr_gray(b"hello world"),
        &ean13_gray("5901234123457", Bars::Vertical),
        40,
    );
    let png = encode_png(gray, width, height);
    let report = scan_bytes("mixed.png", &png, &ScanConfig::default(), CompositeDecoder::default())
        .unwrap();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({
            "filename": "mixed.png",
            "results": {"barcodes": [
                {"type": "QR", "content": "hello world", "angle": 0},
                {"type": "EAN-13", "content": "5901234123457", "angle": 0}
            ]}
        })
    );
}
