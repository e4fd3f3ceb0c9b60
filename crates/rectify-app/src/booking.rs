// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::format::{clean_number, format_date};
use crate::forms::FormState;
use crate::towers::TowerWingTable;
use crate::{
    APPLICANT_NAME, AV, BOOKING_DATE, BookingRecord, CONTACT, EMAIL, IC, PAYMENT_PLAN, TOTAL,
    UNIT, UNIT_TYPE,
};

/// Populates `form` from a fetched booking. The tower goes in before the
/// wing so the wing options exist when the fetched wing is selected.
pub fn apply_booking(table: &TowerWingTable, form: &mut FormState, record: &BookingRecord) {
    form.set_value(APPLICANT_NAME, &record.client_name);

    let tower = record.tower.to_uppercase();
    form.change_tower(table, &tower, Some(&record.wing));

    form.set_value(UNIT, &record.unit);
    form.set_value(UNIT_TYPE, &record.unit_type);
    form.set_value(BOOKING_DATE, &format_date(&record.booking_date));
    form.set_value(CONTACT, &record.contact);
    form.set_value(EMAIL, &record.email);
    form.set_value(TOTAL, &clean_number(&record.total));
    form.set_value(AV, &clean_number(&record.av));
    form.set_value(IC, &clean_number(&record.ic));
    form.set_value(PAYMENT_PLAN, &record.payment_plan);
}
