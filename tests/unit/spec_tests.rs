// Resize spec builder unit tests

use catalog_resizer::image_optimizer::{build_spec, FitMode};
use catalog_resizer::router::route;
use rstest::rstest;

// Test: sized routes map to contain with enlargement allowed
#[rstest]
#[case("12/products/100/140/shoe.png", 100, 140)]
#[case("12/2/products/300/0/shoe.png", 300, 0)]
#[case("12/2/products/0/0/shoe.png", 2560, 0)]
fn test_sized_dimensions(#[case] key: &str, #[case] width: u32, #[case] height: u32) {
    let spec = build_spec(&route(key).unwrap(), false).unwrap();
    assert_eq!((spec.target_width, spec.target_height), (width, height));
    assert_eq!(spec.fit, FitMode::Contain);
    assert!(spec.allow_enlargement);
}

// Test: legacy routes shrink to 2000 wide without enlarging
#[test]
fn test_legacy_spec() {
    let spec = build_spec(&route("12/2/images/lookbook/a.jpg.png").unwrap(), false).unwrap();
    assert_eq!((spec.target_width, spec.target_height), (2000, 0));
    assert_eq!(spec.fit, FitMode::Inside);
    assert!(!spec.allow_enlargement);
    assert_eq!(spec.output_format, "png");
}

// Test: keepAlpha flows into the spec
#[test]
fn test_keep_alpha_is_carried() {
    let spec = build_spec(&route("12/products/10/10/a.png").unwrap(), true).unwrap();
    assert!(spec.keep_alpha);
}

// Test: fractional dimensions are truncated
#[test]
fn test_fractional_dimension_truncates() {
    let spec = build_spec(&route("12/products/100.5/40/a.png").unwrap(), false).unwrap();
    assert_eq!(spec.target_width, 100);
}
