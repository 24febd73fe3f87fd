//! Output key template for bulk-generated variants

use crate::config::BulkSize;

/// Values substituted into a key template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts<'a> {
    pub tenant: &'a str,
    pub version: u8,
    pub folder: &'a str,
    pub size: BulkSize,
    pub filename: &'a str,
    pub format: &'a str,
}

/// Key template with `{tenant}`, `{version}`, `{folder}`, `{width}`,
/// `{height}`, `{filename}` and `{format}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    template: String,
}

impl KeyTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, parts: &KeyParts<'_>) -> String {
        self.template
            .replace("{tenant}", parts.tenant)
            .replace("{version}", &parts.version.to_string())
            .replace("{folder}", parts.folder)
            .replace("{width}", &parts.size.width.to_string())
            .replace("{height}", &parts.size.height.to_string())
            .replace("{filename}", parts.filename)
            .replace("{format}", parts.format)
    }
}

/// Folder named by a `catalog/<folder>/images/<file>` key
pub fn folder_of(source_key: &str) -> Option<&str> {
    let mut segments = source_key.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some("catalog"), Some(folder), Some("images"), Some(file))
            if !folder.is_empty() && !file.is_empty() =>
        {
            Some(folder)
        }
        _ => None,
    }
}

/// Last path segment of a key
pub fn filename_of(source_key: &str) -> &str {
    source_key.rsplit('/').next().unwrap_or(source_key)
}
