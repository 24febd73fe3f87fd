//! Path grammars for request keys
//!
//! Each grammar is a small structural matcher over the slash-separated
//! segments of a key. A grammar either produces a typed [`ResourceLocator`]
//! or declines; it never fails.
//!
//! Shapes (leading `/` optional):
//!
//! ```text
//! sized:   <tenant>[-<group>]/[<version>/][images/]<products|blocks>/<width>/<height>/<file>
//! raw:     <tenant>[-<group>]/files/<fileId>/<file>
//! legacy:  <tenant>[-<group>]/[<version>/]images/<folder>/<file>
//! ```

use super::{ResourceLocator, Tenant};

/// A single request-key shape.
pub trait Grammar: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Try to match `key`, returning the classified resource on success
    fn parse(&self, key: &str) -> Option<ResourceLocator>;
}

/// `<tenant>[-<group>]/[<version>/][images/]<products|blocks>/<width>/<height>/<file>`
///
/// Literal segments match case-insensitively.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizedImageGrammar;

impl Grammar for SizedImageGrammar {
    fn name(&self) -> &'static str {
        "sized-image"
    }

    fn parse(&self, key: &str) -> Option<ResourceLocator> {
        let segments = split_key(key);
        let tenant = parse_tenant(segments.first()?)?;

        let mut rest = &segments[1..];
        let mut version = None;
        if let Some(first) = rest.first() {
            if is_version(first) && rest.len() > 4 {
                version = first.parse::<u8>().ok();
                rest = &rest[1..];
            }
        }
        if let Some(first) = rest.first() {
            if first.eq_ignore_ascii_case("images") && rest.len() > 4 {
                rest = &rest[1..];
            }
        }

        let [folder, width, height, file] = rest else {
            return None;
        };
        if !is_sized_folder(folder) || !is_file_segment(file) {
            return None;
        }
        let width = parse_dimension(width)?;
        let height = parse_dimension(height)?;
        let (path, format) = split_format(file);

        Some(ResourceLocator::SizedImage {
            tenant,
            version: version.unwrap_or(crate::constants::DEFAULT_SIZED_VERSION),
            folder: folder.to_string(),
            width,
            height,
            path,
            format,
        })
    }
}

/// `<tenant>[-<group>]/files/<fileId>/<file>`
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFileGrammar;

impl Grammar for RawFileGrammar {
    fn name(&self) -> &'static str {
        "raw-file"
    }

    fn parse(&self, key: &str) -> Option<ResourceLocator> {
        let segments = split_key(key);
        let [tenant, files, file_id, file] = segments.as_slice() else {
            return None;
        };
        if *files != "files" || !is_digits(file_id, 1, 3) || !is_file_segment(file) {
            return None;
        }

        Some(ResourceLocator::RawFile {
            tenant: parse_tenant(tenant)?,
            file_id: file_id.to_string(),
            path: file.to_string(),
        })
    }
}

/// `<tenant>[-<group>]/[<version>/]images/<folder>/<file>`
///
/// The folder is any non-empty segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyImageGrammar;

impl Grammar for LegacyImageGrammar {
    fn name(&self) -> &'static str {
        "legacy-image"
    }

    fn parse(&self, key: &str) -> Option<ResourceLocator> {
        let segments = split_key(key);
        let tenant = parse_tenant(segments.first()?)?;

        let (version, rest) = match &segments[1..] {
            [v, rest @ ..] if is_version(v) && rest.len() == 3 => (v.parse::<u8>().ok(), rest),
            rest => (None, rest),
        };
        let [images, folder, file] = rest else {
            return None;
        };
        if *images != "images" || folder.is_empty() || !is_file_segment(file) {
            return None;
        }
        let (path, format) = split_format(file);

        Some(ResourceLocator::LegacyUnsizedImage {
            tenant,
            version: version.unwrap_or(crate::constants::DEFAULT_LEGACY_VERSION),
            folder: folder.to_string(),
            path,
            format,
        })
    }
}

/// Split a key into segments after dropping one optional leading `/`.
fn split_key(key: &str) -> Vec<&str> {
    key.strip_prefix('/').unwrap_or(key).split('/').collect()
}

/// `\d{1,3}` optionally followed by `-<word>+`
fn parse_tenant(segment: &str) -> Option<Tenant> {
    let (id, group) = match segment.split_once('-') {
        Some((id, group)) => (id, Some(group)),
        None => (segment, None),
    };
    if !is_digits(id, 1, 3) {
        return None;
    }
    if let Some(group) = group {
        if group.is_empty() || !group.bytes().all(is_word_byte) {
            return None;
        }
    }

    Some(Tenant {
        id: id.to_string(),
        group: group.map(str::to_string),
    })
}

fn is_version(segment: &str) -> bool {
    is_digits(segment, 1, 1)
}

fn is_sized_folder(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("products") || segment.eq_ignore_ascii_case("blocks")
}

fn is_digits(segment: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_digit())
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `[\w.-]+`
fn is_file_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| is_word_byte(b) || b == b'.' || b == b'-')
}

/// `\d{1,4}[.\d]{0,2}`, truncated to its integer part.
fn parse_dimension(segment: &str) -> Option<u32> {
    let digits = segment.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let head = digits.min(4);
    let tail = &segment[head..];
    if tail.len() > 2 || !tail.bytes().all(|b| b == b'.' || b.is_ascii_digit()) {
        return None;
    }
    segment[..digits].parse().ok()
}

/// Split a filename into the stored path and the requested output format.
///
/// `item.jpg.webp` → (`item.jpg`, `webp`); `shoe.png` → (`shoe.png`, `png`).
pub fn split_format(file: &str) -> (String, String) {
    let parts: Vec<&str> = file.split('.').collect();
    let format = parts.last().copied().unwrap_or_default().to_string();
    if parts.len() > 2 {
        (parts[..parts.len() - 1].join("."), format)
    } else {
        (file.to_string(), format)
    }
}
