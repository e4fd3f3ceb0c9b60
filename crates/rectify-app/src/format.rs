// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Normalizes a booking date for a date input: ISO dates pass through,
/// `DD/MM/YYYY` is reordered, anything else goes through a lenient parse.
/// Returns an empty string when nothing matches.
pub fn format_date(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    if is_iso_date_shape(input) {
        return input.to_owned();
    }

    if let Some((day, month, year)) = split_slash_date(input) {
        return format!("{year}-{month}-{day}");
    }

    parse_loose_date(input)
        .map(iso_date)
        .unwrap_or_default()
}

/// Strips thousands separators from a numeric cell.
pub fn clean_number(input: &str) -> String {
    input.replace(',', "")
}

fn is_iso_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && all_digits(&bytes[0..4])
        && all_digits(&bytes[5..7])
        && all_digits(&bytes[8..10])
}

fn split_slash_date(input: &str) -> Option<(&str, &str, &str)> {
    let bytes = input.as_bytes();
    if bytes.len() != 10
        || bytes[2] != b'/'
        || bytes[5] != b'/'
        || !all_digits(&bytes[0..2])
        || !all_digits(&bytes[3..5])
        || !all_digits(&bytes[6..10])
    {
        return None;
    }
    Some((&input[0..2], &input[3..5], &input[6..10]))
}

fn all_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

fn parse_loose_date(input: &str) -> Option<Date> {
    if let Ok(value) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(value.to_offset(UtcOffset::UTC).date());
    }
    if let Ok(value) = OffsetDateTime::parse(input, &Rfc2822) {
        return Some(value.to_offset(UtcOffset::UTC).date());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        input,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        input,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }
    if let Ok(value) = Date::parse(input, &format_description!("[year]/[month]/[day]")) {
        return Some(value);
    }
    // Anything not in the exact DD/MM/YYYY shape reads month first.
    if let Ok(value) = Date::parse(
        input,
        &format_description!("[month padding:none]/[day padding:none]/[year]"),
    ) {
        return Some(value);
    }
    if let Ok(value) = Date::parse(
        input,
        &format_description!(
            "[month repr:long case_sensitive:false] [day padding:none], [year]"
        ),
    ) {
        return Some(value);
    }
    if let Ok(value) = Date::parse(
        input,
        &format_description!(
            "[month repr:short case_sensitive:false] [day padding:none], [year]"
        ),
    ) {
        return Some(value);
    }
    if let Ok(value) = Date::parse(
        input,
        &format_description!(
            "[day padding:none] [month repr:short case_sensitive:false] [year]"
        ),
    ) {
        return Some(value);
    }
    Date::parse(
        input,
        &format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    )
    .ok()
}

fn iso_date(value: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}
