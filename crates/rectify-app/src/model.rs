// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer};

pub const APPLICANT_NAME: &str = "applicantName";
pub const TOWER: &str = "tower";
pub const WING: &str = "wing";
pub const UNIT: &str = "unit";
pub const UNIT_TYPE: &str = "type";
pub const BOOKING_DATE: &str = "bookingDate";
pub const CONTACT: &str = "contact";
pub const EMAIL: &str = "email";
pub const TOTAL: &str = "total";
pub const AV: &str = "av";
pub const IC: &str = "ic";
pub const PAYMENT_PLAN: &str = "paymentPlan";
pub const REMARKS: &str = "remarks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormSide {
    Primary,
    Secondary,
}

impl FormSide {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Secondary];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Primary => "Salesforce",
            Self::Secondary => "Client",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Tower,
    Wing,
    Date,
    Email,
    Tel,
    Number,
    TextArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
    }
}

pub const PRIMARY_FIELDS: [FieldSpec; 12] = [
    field(APPLICANT_NAME, "Applicant name", FieldKind::Text, true),
    field(TOWER, "Tower", FieldKind::Tower, true),
    field(WING, "Wing", FieldKind::Wing, true),
    field(UNIT, "Unit", FieldKind::Text, true),
    field(UNIT_TYPE, "Type", FieldKind::Text, false),
    field(BOOKING_DATE, "Booking date", FieldKind::Date, true),
    field(CONTACT, "Contact", FieldKind::Tel, false),
    field(EMAIL, "Email", FieldKind::Email, false),
    field(TOTAL, "Total", FieldKind::Number, false),
    field(AV, "AV", FieldKind::Number, false),
    field(IC, "IC", FieldKind::Number, false),
    field(PAYMENT_PLAN, "Payment plan", FieldKind::Text, false),
];

pub const SECONDARY_FIELDS: [FieldSpec; 13] = [
    field(APPLICANT_NAME, "Applicant name", FieldKind::Text, true),
    field(TOWER, "Tower", FieldKind::Tower, true),
    field(WING, "Wing", FieldKind::Wing, true),
    field(UNIT, "Unit", FieldKind::Text, true),
    field(UNIT_TYPE, "Type", FieldKind::Text, false),
    field(BOOKING_DATE, "Booking date", FieldKind::Date, true),
    field(CONTACT, "Contact", FieldKind::Tel, false),
    field(EMAIL, "Email", FieldKind::Email, false),
    field(TOTAL, "Total", FieldKind::Number, false),
    field(AV, "AV", FieldKind::Number, false),
    field(IC, "IC", FieldKind::Number, false),
    field(PAYMENT_PLAN, "Payment plan", FieldKind::Text, false),
    field(REMARKS, "Remarks", FieldKind::TextArea, false),
];

impl FormSide {
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Primary => &PRIMARY_FIELDS,
            Self::Secondary => &SECONDARY_FIELDS,
        }
    }
}

/// Booking row as served by the lookup endpoint. Every attribute is optional
/// on the wire and numeric cells may come back as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub client_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tower: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub wing: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub unit_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub booking_date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub total: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub av: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ic: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_plan: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextCell {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<TextCell>::deserialize(deserializer)?;
    Ok(match cell {
        None => String::new(),
        Some(TextCell::Text(value)) => value,
        Some(TextCell::Integer(value)) => value.to_string(),
        Some(TextCell::Float(value)) => value.to_string(),
        Some(TextCell::Flag(value)) => value.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(BookingRecord),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Found,
    NotFound,
    ServerError,
}

impl SearchStatus {
    pub const fn text(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Searching => "Searching...",
            Self::Found => "✅ Booking Found",
            Self::NotFound => "❌ Booking ID not found",
            Self::ServerError => "⚠ Server error",
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Idle | Self::Searching => StatusTone::Neutral,
            Self::Found => StatusTone::Success,
            Self::NotFound | Self::ServerError => StatusTone::Danger,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Found | Self::NotFound | Self::ServerError)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BookingRecord, FormSide, PRIMARY_FIELDS, SECONDARY_FIELDS, SearchStatus, StatusTone,
    };
    use anyhow::Result;

    #[test]
    fn secondary_form_mirrors_primary_field_order() {
        for (primary, secondary) in PRIMARY_FIELDS.iter().zip(SECONDARY_FIELDS.iter()) {
            assert_eq!(primary.name, secondary.name);
            assert_eq!(primary.kind, secondary.kind);
        }
        assert_eq!(SECONDARY_FIELDS.len(), PRIMARY_FIELDS.len() + 1);
    }

    #[test]
    fn found_and_not_found_use_distinct_tones() {
        assert_eq!(SearchStatus::Found.tone(), StatusTone::Success);
        assert_eq!(SearchStatus::NotFound.tone(), StatusTone::Danger);
        assert_eq!(SearchStatus::Searching.text(), "Searching...");
        assert!(SearchStatus::Idle.text().is_empty());
        assert!(!SearchStatus::Searching.is_terminal());
    }

    #[test]
    fn form_side_round_trips_through_str() {
        for side in FormSide::ALL {
            assert_eq!(FormSide::parse(side.as_str()), Some(side));
        }
        assert_eq!(FormSide::parse("both"), None);
    }

    #[test]
    fn booking_record_accepts_loose_sheet_cells() -> Result<()> {
        let record: BookingRecord = serde_json::from_str(
            r#"{
                "clientName": "Asha Rao",
                "tower": "amazon",
                "type": "2 BHK",
                "bookingDate": null,
                "contact": 9820012345,
                "total": 1850000,
                "av": 12.5,
                "ic": true,
                "unknownColumn": "ignored"
            }"#,
        )?;

        assert_eq!(record.client_name, "Asha Rao");
        assert_eq!(record.tower, "amazon");
        assert_eq!(record.unit_type, "2 BHK");
        assert!(record.booking_date.is_empty());
        assert_eq!(record.contact, "9820012345");
        assert_eq!(record.total, "1850000");
        assert_eq!(record.av, "12.5");
        assert_eq!(record.ic, "true");
        assert!(record.wing.is_empty());
        assert!(record.payment_plan.is_empty());
        Ok(())
    }

    #[test]
    fn booking_record_rejects_nested_cells() {
        let error = serde_json::from_str::<BookingRecord>(r#"{"tower":["TAPI"]}"#);
        assert!(error.is_err());
    }
}
