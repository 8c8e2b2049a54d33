//! Front-matter parsing

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde_yaml::Value;

/// Front-matter header of a post
///
/// Nothing here is required. Callers substitute defaults for missing fields.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    /// `publishDate`
    pub publish_date: Option<String>,
    /// A single string or a list
    pub tags: Vec<String>,
    pub author: Option<String>,
    /// `readTime`
    pub read_time: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with(";;;") || content.starts_with('{') {
            return Self::parse_json(content);
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        if let Some(after) = rest.strip_prefix("---") {
            // `---\n---`: an empty header
            return Ok((FrontMatter::default(), after.trim_start_matches(['\n', '\r'])));
        }

        let Some(end_pos) = rest.find("\n---") else {
            // No closing fence
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A `---` thematic break followed by prose is not front-matter:
        // require at least one `key: value` line.
        let has_yaml_structure = yaml_content.lines().any(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return false;
            }
            let Some(colon_pos) = trimmed.find(':') else {
                return false;
            };
            let key = &trimmed[..colon_pos];
            let is_valid_key = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && !matches!(key, "http" | "https" | "ftp");
            let after_colon = &trimmed[colon_pos + 1..];
            is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
        });

        if !has_yaml_structure {
            return Ok((FrontMatter::default(), content));
        }

        match serde_yaml::from_str::<Value>(yaml_content) {
            Ok(value) => Ok((Self::from_value(value).unwrap_or_default(), remaining)),
            Err(e) => {
                // Keep the body; every field falls back to its default.
                tracing::warn!("Failed to parse YAML front-matter, using defaults: {}", e);
                Ok((FrontMatter::default(), remaining))
            }
        }
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        if let Some(rest) = content.strip_prefix(";;;") {
            if let Some(end_pos) = rest.find(";;;") {
                let json_content = &rest[..end_pos];
                let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

                return match Self::from_json(json_content) {
                    Some(fm) => Ok((fm, remaining)),
                    None => {
                        tracing::warn!("Failed to parse JSON front-matter, using defaults");
                        Ok((FrontMatter::default(), remaining))
                    }
                };
            }
        }

        if content.starts_with('{') {
            let mut depth = 0;
            let mut end_pos = 0;
            for (i, c) in content.char_indices() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            end_pos = i + 1;
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if end_pos > 0 {
                let json_content = &content[..end_pos];
                let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);

                // A body that merely starts with `{` (JSX expression) is not front-matter
                return match Self::from_json(json_content) {
                    Some(fm) => Ok((fm, remaining)),
                    None => Ok((FrontMatter::default(), content)),
                };
            }
        }

        Ok((FrontMatter::default(), content))
    }

    /// Pick each known field out of a parsed header
    ///
    /// A field of the wrong type is dropped on its own and the rest of the
    /// header survives. `None` when the header is not a mapping.
    fn from_value(value: Value) -> Option<Self> {
        let Value::Mapping(map) = value else {
            return None;
        };
        let field = |key: &str| map.get(key).and_then(scalar_string);

        Some(Self {
            title: field("title"),
            description: field("description"),
            date: field("date"),
            publish_date: field("publishDate"),
            tags: map.get("tags").map(string_list).unwrap_or_default(),
            author: field("author"),
            read_time: field("readTime"),
        })
    }

    fn from_json(json: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        Self::from_value(serde_yaml::to_value(value).ok()?)
    }

    /// First parsable date among `publishDate` and `date`, in that order
    pub fn resolve_date(&self, tz: Option<Tz>) -> Option<DateTime<FixedOffset>> {
        [self.publish_date.as_deref(), self.date.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|s| parse_date_string(s, tz))
    }
}

/// Scalars as text; mappings and sequences are not a string field
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

/// Accepts both `tags: rust` and `tags: [rust, web]`
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        other => scalar_string(other).into_iter().collect(),
    }
}

/// Parse a date string in various formats
///
/// Strings carrying an offset keep it; naive strings are placed in `tz`,
/// or the local zone when no zone is given.
pub fn parse_date_string(s: &str, tz: Option<Tz>) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let naive_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    let naive = naive_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    localize(naive, tz)
}

fn localize(naive: NaiveDateTime, tz: Option<Tz>) -> Option<DateTime<FixedOffset>> {
    match tz {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
    }
}
