// Key router unit tests

use catalog_resizer::router::{route, ResourceLocator, RouteError, Tenant};
use rstest::rstest;

// Test: origin keys follow the catalog and files layouts
#[rstest]
#[case("12/products/100/140/shoe.png", "catalog/products/images/shoe.png")]
#[case("12/2/blocks/0/0/hero.jpg.webp", "catalog/blocks/images/hero.jpg")]
#[case("12-eu/3/images/products/50/50/a-b_c.png", "catalog/products/images/a-b_c.png")]
#[case("12/images/lookbook/summer.jpg", "catalog/lookbook/images/summer.jpg")]
#[case("7/files/3/report.pdf", "files/3/report.pdf")]
fn test_origin_key_derivation(#[case] key: &str, #[case] origin: &str) {
    assert_eq!(route(key).unwrap().origin_key(), origin);
}

// Test: tenant group suffix is captured
#[test]
fn test_tenant_group_is_captured() {
    let locator = route("7-b2b/files/3/report.pdf").unwrap();
    assert_eq!(
        locator.tenant(),
        &Tenant {
            id: "7".to_string(),
            group: Some("b2b".to_string())
        }
    );
}

// Test: double extension splits output format from stored path
#[test]
fn test_double_extension_split() {
    match route("12/2/products/200/200/shoe.png.webp").unwrap() {
        ResourceLocator::SizedImage { path, format, .. } => {
            assert_eq!(path, "shoe.png");
            assert_eq!(format, "webp");
        }
        other => panic!("unexpected locator {:?}", other),
    }
}

// Test: raw file key carries no version
#[test]
fn test_raw_file_has_no_version() {
    let locator = route("7/files/12/manual.v2.pdf").unwrap();
    assert_eq!(locator.version(), None);
    assert_eq!(locator.kind(), "raw-file");
}

// Test: a sized-looking key under an unknown folder is not a sized image
#[test]
fn test_unknown_folder_is_not_sized() {
    // Matches neither sized (folder) nor legacy (no "images" segment)
    assert!(matches!(
        route("12/2/videos/100/100/clip.png"),
        Err(RouteError::Unrecognized { .. })
    ));
}

// Test: explicit version on a sized key
#[test]
fn test_sized_version_is_parsed() {
    let locator = route("12/3/products/100/100/a.gif").unwrap();
    assert_eq!(locator.version(), Some(3));
}
