// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address for the HTTP front
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";

/// Default listen port for the HTTP front
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// Resize defaults
// =============================================================================

/// Width used by sized routes when both width and height are 0
pub const FULL_SIZE_WIDTH: u32 = 2560;

/// Fixed width of the legacy unsized-image route
pub const LEGACY_UNSIZED_WIDTH: u32 = 2000;

/// Pipeline version when a sized route does not name one
pub const DEFAULT_SIZED_VERSION: u8 = 1;

/// Pipeline version when a legacy unsized route does not name one
pub const DEFAULT_LEGACY_VERSION: u8 = 0;

/// Default encoder quality for lossy formats
pub const DEFAULT_QUALITY: u8 = 80;

/// Largest width or height accepted for a source, target or intermediate image
pub const MAX_DIMENSION: u32 = 10_000;

/// Largest pixel count accepted for a source, target or intermediate image
pub const MAX_PIXELS: u64 = 100_000_000; // 100 megapixels

// =============================================================================
// Store defaults
// =============================================================================

const DAY_SECS: u64 = 24 * 60 * 60;

/// Cache lifetime written with single-request variants (365 days)
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 365 * DAY_SECS;

/// Cache lifetime written with bulk-generated variants (365 days)
pub const DEFAULT_BULK_MAX_AGE_SECS: u64 = 365 * DAY_SECS;

/// Content type stored for raw-file passthrough
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content type assumed when a transform does not report one
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Cache-Control sent with the redirect itself
pub const REDIRECT_CACHE_CONTROL: &str = "max-age=0";

// =============================================================================
// Bulk generation defaults
// =============================================================================

/// Output format for bulk-generated variants
pub const DEFAULT_BULK_FORMAT: &str = "avif";

/// Pipeline version used by bulk generation
pub const DEFAULT_BULK_VERSION: u8 = 3;

/// Tenant literal written into bulk output keys
pub const DEFAULT_BULK_TENANT: &str = "1";

/// Folder used when the uploaded key does not carry one
pub const DEFAULT_BULK_FOLDER: &str = "products";

/// Maximum number of sizes transformed at once for a single source
pub const DEFAULT_BULK_CONCURRENCY: usize = 8;

/// Output key template for bulk-generated variants
pub const DEFAULT_BULK_KEY_TEMPLATE: &str =
    "{tenant}/{version}/images/{folder}/{width}/{height}/{filename}.{format}";

/// Size catalog generated for every uploaded source, as (width, height).
/// A height of 0 scales proportionally.
pub const DEFAULT_BULK_SIZES: &[(u32, u32)] = &[
    (0, 0),
    (50, 50),
    (64, 64),
    (75, 75),
    (100, 100),
    (100, 140),
    (120, 120),
    (150, 150),
    (150, 210),
    (160, 0),
    (200, 200),
    (200, 280),
    (240, 0),
    (250, 250),
    (300, 300),
    (300, 420),
    (320, 0),
    (360, 0),
    (400, 400),
    (400, 560),
    (480, 0),
    (500, 500),
    (600, 600),
    (600, 840),
    (640, 0),
    (750, 0),
    (800, 800),
    (960, 0),
    (1024, 0),
    (1200, 1200),
    (1280, 0),
    (1600, 0),
    (1920, 0),
    (2048, 0),
];
