//! Scraped-record data model.
//!
//! The upstream scraper hands over loosely shaped `(source, data)` pairs:
//! `data` is either a positional array (the current shape) or an object with
//! named keys (a legacy shape some scraper versions still emit). Everything
//! is decoded once at this boundary into [`ListingRecord`]; downstream
//! formatting never branches on raw JSON again.

use serde::Deserialize;
use serde_json::Value;

/// Source tag for review-aggregator listings.
pub const SOURCE_TRUSTPILOT: &str = "TrustPilot";
/// Source tag for map-search listings.
pub const SOURCE_GOOGLE_MAPS: &str = "Google Maps";

/// Placeholder for absent fields, as written to the spreadsheet.
pub const MISSING: &str = "N/A";

/// A record does not match any known shape for its source.
///
/// Callers log these and skip the record; shape mismatches never abort an
/// export.
#[derive(Debug)]
pub struct ShapeError {
    pub source: String,
    pub reason: String,
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized record shape from \"{}\": {}",
            self.source, self.reason
        )
    }
}

impl std::error::Error for ShapeError {}

/// One raw `(source, data)` pair as produced by the scraper.
///
/// Deserializes from a two-element JSON array, e.g.
/// `["TrustPilot", ["Acme", "acme.com", ...]]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "(String, Value)")]
pub struct ScrapedRecord {
    pub source: String,
    pub data: Value,
}

impl ScrapedRecord {
    pub fn new(source: impl Into<String>, data: Value) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }
}

impl From<(String, Value)> for ScrapedRecord {
    fn from((source, data): (String, Value)) -> Self {
        Self { source, data }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Metadata of the search query an export belongs to.
///
/// Each field falls back to `"Unknown"` when the caller omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDetails {
    #[serde(default = "unknown")]
    pub category: String,
    #[serde(default = "unknown")]
    pub country: String,
    #[serde(default = "unknown")]
    pub city: String,
}

impl Default for QueryDetails {
    fn default() -> Self {
        Self {
            category: unknown(),
            country: unknown(),
            city: unknown(),
        }
    }
}

/// Email field of a listing: either a list of addresses (joined with `", "`
/// for output) or an opaque stringified value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailField {
    List(Vec<String>),
    Raw(String),
}

impl EmailField {
    /// Renders the field as a single spreadsheet cell value.
    pub fn joined(&self) -> String {
        match self {
            EmailField::List(addrs) => addrs.join(", "),
            EmailField::Raw(value) => value.clone(),
        }
    }
}

/// A listing scraped from the review aggregator.
///
/// Trailing fields absent from the raw record default to `"N/A"`.
#[derive(Debug, Clone)]
pub struct TrustPilotListing {
    pub name: String,
    pub website: String,
    pub emails: EmailField,
    pub phone: String,
    pub location: String,
    pub rating: String,
    pub reviews: String,
    pub verification: String,
}

/// A listing scraped from the map-search provider.
///
/// Carries no rating or verification; those columns are always `"N/A"` in
/// output. Trailing fields absent from the raw record default to `"N/A"`.
#[derive(Debug, Clone)]
pub struct MapListing {
    pub name: String,
    pub website: String,
    pub emails: EmailField,
    pub phone: String,
    pub location: String,
    pub reviews: String,
}

/// A scraped listing decoded into its source-specific shape.
#[derive(Debug, Clone)]
pub enum ListingRecord {
    TrustPilot(TrustPilotListing),
    MapSearch(MapListing),
}

impl ListingRecord {
    /// Decodes one raw `(source, data)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] for unknown sources, non-array/non-object
    /// data, or positional arrays longer than the source's field count.
    pub fn decode(source: &str, data: &Value) -> Result<Self, ShapeError> {
        let shape_err = |reason: String| ShapeError {
            source: source.to_string(),
            reason,
        };

        match source {
            SOURCE_TRUSTPILOT => match data {
                Value::Array(fields) => {
                    if fields.len() > 8 {
                        return Err(shape_err(format!(
                            "expected at most 8 positional fields, got {}",
                            fields.len()
                        )));
                    }
                    Ok(ListingRecord::TrustPilot(TrustPilotListing {
                        name: scalar_field(fields, 0),
                        website: scalar_field(fields, 1),
                        emails: email_field(fields.get(2)),
                        phone: scalar_field(fields, 3),
                        location: scalar_field(fields, 4),
                        rating: scalar_field(fields, 5),
                        reviews: scalar_field(fields, 6),
                        verification: scalar_field(fields, 7),
                    }))
                }
                Value::Object(map) => Ok(ListingRecord::TrustPilot(TrustPilotListing {
                    name: mapping_field(map, "name"),
                    website: mapping_field(map, "site"),
                    emails: email_field(map.get("email")),
                    phone: mapping_field(map, "phone"),
                    location: mapping_field(map, "location"),
                    rating: mapping_field(map, "rating"),
                    reviews: mapping_field(map, "reviews"),
                    verification: mapping_field(map, "verification"),
                })),
                other => Err(shape_err(format!(
                    "expected array or object data, got {}",
                    json_kind(other)
                ))),
            },
            SOURCE_GOOGLE_MAPS => match data {
                Value::Array(fields) => {
                    if fields.len() > 6 {
                        return Err(shape_err(format!(
                            "expected at most 6 positional fields, got {}",
                            fields.len()
                        )));
                    }
                    Ok(ListingRecord::MapSearch(MapListing {
                        name: scalar_field(fields, 0),
                        website: scalar_field(fields, 1),
                        emails: email_field(fields.get(2)),
                        phone: scalar_field(fields, 3),
                        location: scalar_field(fields, 4),
                        reviews: scalar_field(fields, 5),
                    }))
                }
                Value::Object(map) => Ok(ListingRecord::MapSearch(MapListing {
                    name: mapping_field(map, "name"),
                    website: mapping_field(map, "site"),
                    emails: email_field(map.get("email")),
                    phone: mapping_field(map, "phone"),
                    location: mapping_field(map, "location"),
                    reviews: mapping_field(map, "reviews"),
                })),
                other => Err(shape_err(format!(
                    "expected array or object data, got {}",
                    json_kind(other)
                ))),
            },
            other => Err(ShapeError {
                source: other.to_string(),
                reason: "unknown source".to_string(),
            }),
        }
    }
}

/// Positional field lookup with the `"N/A"` default for short arrays.
fn scalar_field(fields: &[Value], idx: usize) -> String {
    fields
        .get(idx)
        .and_then(stringify)
        .unwrap_or_else(|| MISSING.to_string())
}

/// Named field lookup with the `"N/A"` default for missing keys.
fn mapping_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(stringify)
        .unwrap_or_else(|| MISSING.to_string())
}

/// Email field: a JSON array becomes [`EmailField::List`]; anything else is
/// stringified. Absent or `null` values default to `"N/A"`.
fn email_field(value: Option<&Value>) -> EmailField {
    match value {
        Some(Value::Array(items)) => EmailField::List(
            items
                .iter()
                .filter_map(stringify)
                .collect(),
        ),
        Some(other) => match stringify(other) {
            Some(s) => EmailField::Raw(s),
            None => EmailField::Raw(MISSING.to_string()),
        },
        None => EmailField::Raw(MISSING.to_string()),
    }
}

/// Renders a JSON scalar as cell text. Strings pass through unquoted;
/// numbers and booleans use their JSON form; `null` counts as absent.
/// Nested arrays/objects in a scalar position keep their JSON text.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

const STANDARD_HEADER: [&str; 10] = [
    "Source",
    "Company Name",
    "Website",
    "Email",
    "Phone",
    "WhatsApp Link",
    "Location",
    "Rating",
    "Reviews",
    "Verification",
];

const COMPACT_HEADER: [&str; 9] = [
    "Source",
    "Company Name",
    "Website",
    "Email",
    "Phone",
    "Location",
    "Rating",
    "Reviews",
    "Verification",
];

/// Output row layout. Row width is defined per worksheet at creation time,
/// so both observed layouts are supported; `Standard` (with the WhatsApp
/// column) is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLayout {
    #[default]
    Standard,
    Compact,
}

impl RowLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            RowLayout::Standard => &STANDARD_HEADER,
            RowLayout::Compact => &COMPACT_HEADER,
        }
    }

    pub fn column_count(self) -> u32 {
        match self {
            RowLayout::Standard => 10,
            RowLayout::Compact => 9,
        }
    }

    /// Letter of the last column, for A1-notation ranges.
    pub fn last_column(self) -> char {
        match self {
            RowLayout::Standard => 'J',
            RowLayout::Compact => 'I',
        }
    }
}

impl std::fmt::Display for RowLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowLayout::Standard => write!(f, "standard"),
            RowLayout::Compact => write!(f, "compact"),
        }
    }
}
