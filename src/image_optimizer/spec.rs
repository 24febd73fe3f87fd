//! Resize spec builder
//!
//! Turns a routed image request into the concrete transformation to run.

use crate::constants::{FULL_SIZE_WIDTH, LEGACY_UNSIZED_WIDTH};
use crate::pipeline::PipelineVersion;
use crate::router::ResourceLocator;

use super::params::{FitMode, OutputFormat};

/// Concrete transformation derived from a request key.
///
/// A dimension of 0 means unconstrained: that axis scales proportionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSpec {
    pub target_width: u32,
    pub target_height: u32,
    pub fit: FitMode,
    /// Output format verbatim from the key; validated by the pipeline
    pub output_format: String,
    pub keep_alpha: bool,
    pub allow_enlargement: bool,
    pub animated: bool,
}

impl ResizeSpec {
    /// Spec for an explicit size, as used by sized routes and bulk generation
    pub fn sized(
        version: PipelineVersion,
        width: u32,
        height: u32,
        format: &str,
        keep_alpha: bool,
    ) -> Self {
        let width = if width == 0 && height == 0 {
            FULL_SIZE_WIDTH
        } else {
            width
        };

        ResizeSpec {
            target_width: width,
            target_height: height,
            fit: FitMode::Contain,
            output_format: format.to_string(),
            keep_alpha,
            allow_enlargement: true,
            animated: treat_as_animated(version, format),
        }
    }

    /// Spec for the legacy unsized route: always shrink to fit a fixed width
    pub fn legacy(version: PipelineVersion, format: &str, keep_alpha: bool) -> Self {
        ResizeSpec {
            target_width: LEGACY_UNSIZED_WIDTH,
            target_height: 0,
            fit: FitMode::Inside,
            output_format: format.to_string(),
            keep_alpha,
            allow_enlargement: false,
            animated: treat_as_animated(version, format),
        }
    }

    /// Width as an optional constraint
    pub fn width(&self) -> Option<u32> {
        (self.target_width > 0).then_some(self.target_width)
    }

    /// Height as an optional constraint
    pub fn height(&self) -> Option<u32> {
        (self.target_height > 0).then_some(self.target_height)
    }
}

/// Pipeline version for a routed key. Raw files are never transformed.
pub fn pipeline_version(locator: &ResourceLocator) -> Option<PipelineVersion> {
    match locator {
        ResourceLocator::SizedImage { version, .. } => {
            Some(PipelineVersion::from_number(*version))
        }
        ResourceLocator::LegacyUnsizedImage { version, .. } => {
            Some(PipelineVersion::for_legacy(*version))
        }
        ResourceLocator::RawFile { .. } => None,
    }
}

/// Build the spec for a routed key. Raw files have no spec.
pub fn build_spec(locator: &ResourceLocator, keep_alpha: bool) -> Option<ResizeSpec> {
    let version = pipeline_version(locator)?;
    match locator {
        ResourceLocator::SizedImage {
            width,
            height,
            format,
            ..
        } => Some(ResizeSpec::sized(version, *width, *height, format, keep_alpha)),
        ResourceLocator::LegacyUnsizedImage { format, .. } => {
            Some(ResizeSpec::legacy(version, format, keep_alpha))
        }
        ResourceLocator::RawFile { .. } => None,
    }
}

fn treat_as_animated(version: PipelineVersion, format: &str) -> bool {
    version.supports_animation()
        && format
            .parse::<OutputFormat>()
            .map(|f| f.supports_animation())
            .unwrap_or(false)
}
