//! Row and worksheet-name formatting.
//!
//! Pure functions from decoded listings to the fixed column layout written
//! to the backend. Formatting never fails; absent data has already been
//! defaulted to `"N/A"` during decoding.

use chrono::{DateTime, Utc};
use leadsheet_core::records::{
    EmailField, ListingRecord, QueryDetails, RowLayout, MISSING, SOURCE_GOOGLE_MAPS,
    SOURCE_TRUSTPILOT,
};

/// Grid height requested for every new worksheet.
pub const WORKSHEET_ROW_COUNT: u32 = 1000;

/// Worksheet names are capped by the backend; 50 keeps them readable in tabs.
const MAX_WORKSHEET_NAME_CHARS: usize = 50;

/// Minimum digit count for a phone number to get a WhatsApp deep link.
const MIN_PHONE_DIGITS: usize = 8;

/// Derives the worksheet name for a query at the given instant:
/// `"{category}-{country}-{city}-{YYYY-MM-DD_HH-MM-SS}"`, truncated to 50
/// characters.
pub fn worksheet_name(details: &QueryDetails, at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%d_%H-%M-%S");
    let full = format!(
        "{}-{}-{}-{stamp}",
        details.category, details.country, details.city
    );
    full.chars().take(MAX_WORKSHEET_NAME_CHARS).collect()
}

/// Derives a WhatsApp deep link from a phone field.
///
/// Keeps only ASCII decimal digits; at least 8 of them make a link,
/// otherwise the cell stays `"N/A"`. An absent phone (`"N/A"` or empty)
/// short-circuits without digit extraction.
pub fn whatsapp_link(phone: &str) -> String {
    if phone.is_empty() || phone == MISSING {
        return MISSING.to_string();
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= MIN_PHONE_DIGITS {
        format!("https://wa.me/{digits}")
    } else {
        MISSING.to_string()
    }
}

/// The header row for the given layout.
pub fn header_row(layout: RowLayout) -> Vec<String> {
    layout.header().iter().map(ToString::to_string).collect()
}

/// A1-notation range covering `row_count` rows from the top-left cell of
/// the named worksheet, e.g. `"Spa-UK-London-...!A1:J12"`.
pub fn bulk_range(worksheet: &str, layout: RowLayout, row_count: usize) -> String {
    format!("{worksheet}!A1:{}{row_count}", layout.last_column())
}

struct RowFields<'a> {
    source: &'a str,
    name: &'a str,
    website: &'a str,
    emails: &'a EmailField,
    phone: &'a str,
    location: &'a str,
    rating: &'a str,
    reviews: &'a str,
    verification: &'a str,
}

/// Formats one decoded listing as an output row in the given layout.
///
/// Every field is whitespace-trimmed. Map-search listings carry no rating
/// or verification, so those columns are forced to `"N/A"`.
pub fn format_row(record: &ListingRecord, layout: RowLayout) -> Vec<String> {
    let fields = match record {
        ListingRecord::TrustPilot(listing) => RowFields {
            source: SOURCE_TRUSTPILOT,
            name: &listing.name,
            website: &listing.website,
            emails: &listing.emails,
            phone: &listing.phone,
            location: &listing.location,
            rating: &listing.rating,
            reviews: &listing.reviews,
            verification: &listing.verification,
        },
        ListingRecord::MapSearch(listing) => RowFields {
            source: SOURCE_GOOGLE_MAPS,
            name: &listing.name,
            website: &listing.website,
            emails: &listing.emails,
            phone: &listing.phone,
            location: &listing.location,
            rating: MISSING,
            reviews: &listing.reviews,
            verification: MISSING,
        },
    };
    assemble(&fields, layout)
}

fn assemble(fields: &RowFields<'_>, layout: RowLayout) -> Vec<String> {
    let trim = |s: &str| s.trim().to_string();
    let phone = trim(fields.phone);

    let mut row = Vec::with_capacity(layout.header().len());
    row.push(fields.source.to_string());
    row.push(trim(fields.name));
    row.push(trim(fields.website));
    row.push(trim(&fields.emails.joined()));
    row.push(phone.clone());
    if layout == RowLayout::Standard {
        row.push(whatsapp_link(&phone));
    }
    row.push(trim(fields.location));
    row.push(trim(fields.rating));
    row.push(trim(fields.reviews));
    row.push(trim(fields.verification));
    row
}
