// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use time::Date;
use time::macros::format_description;

use crate::towers::{TowerWingTable, WingSelector, resolve_wings};
use crate::{FieldKind, FieldSpec, FormSide, TOWER, WING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub label: &'static str,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// One side of the rectification screen. Values are kept as entered; the
/// wing value lives in its selector so it can never point at a stale option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    side: FormSide,
    values: Vec<String>,
    wing: WingSelector,
}

impl FormState {
    pub fn new(side: FormSide) -> Self {
        Self {
            side,
            values: vec![String::new(); side.fields().len()],
            wing: WingSelector::default(),
        }
    }

    pub const fn side(&self) -> FormSide {
        self.side
    }

    pub fn specs(&self) -> &'static [FieldSpec] {
        self.side.fields()
    }

    pub fn spec(&self, name: &str) -> Option<&'static FieldSpec> {
        self.specs().iter().find(|spec| spec.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        let index = self.index_of(name)?;
        if name == WING {
            return Some(self.wing.selected());
        }
        Some(self.values[index].as_str())
    }

    pub fn wing_selector(&self) -> &WingSelector {
        &self.wing
    }

    /// Plain assignment, no dependent logic runs. Returns false when the form
    /// has no such field.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        if name == WING {
            self.wing.select(value);
        } else {
            self.values[index] = value.to_owned();
        }
        true
    }

    /// Tower change handler: stores the tower (unknown codes clear the
    /// select) and rebuilds the wing options before returning.
    pub fn change_tower(
        &mut self,
        table: &TowerWingTable,
        tower: &str,
        desired_wing: Option<&str>,
    ) {
        let stored = if table.contains(tower) { tower } else { "" };
        self.set_value(TOWER, stored);
        resolve_wings(table, &mut self.wing, tower, desired_wing);
    }

    pub fn reset(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.wing.reset();
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.is_empty()) && self.wing.is_placeholder_selected()
    }

    /// Name/value pairs in form order. A disabled wing select is left out,
    /// matching what a browser would post.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.specs()
            .iter()
            .filter(|spec| spec.kind != FieldKind::Wing || self.wing.is_enabled())
            .filter_map(|spec| {
                self.value(spec.name)
                    .map(|value| (spec.name, value.to_owned()))
            })
            .collect()
    }

    pub fn violations(&self) -> Vec<FieldViolation> {
        self.specs()
            .iter()
            .filter_map(|spec| self.check_field(spec))
            .collect()
    }

    pub fn first_violation(&self) -> Option<FieldViolation> {
        self.specs().iter().find_map(|spec| self.check_field(spec))
    }

    pub fn is_valid(&self) -> bool {
        self.first_violation().is_none()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.specs().iter().position(|spec| spec.name == name)
    }

    fn check_field(&self, spec: &FieldSpec) -> Option<FieldViolation> {
        if spec.kind == FieldKind::Wing && !self.wing.is_enabled() {
            return None;
        }

        let value = self.value(spec.name).unwrap_or_default();
        let violation = |message: &str| {
            Some(FieldViolation {
                field: spec.name,
                label: spec.label,
                message: message.to_owned(),
            })
        };

        if value.trim().is_empty() {
            if spec.required {
                return violation("please fill out this field");
            }
            return None;
        }

        match spec.kind {
            FieldKind::Email if !is_email(value) => {
                violation("please enter an email address")
            }
            FieldKind::Date if !is_iso_date(value) => {
                violation("please enter a valid date (YYYY-MM-DD)")
            }
            FieldKind::Number if !is_non_negative_number(value) => {
                violation("please enter a non-negative number")
            }
            _ => None,
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
}

fn is_iso_date(value: &str) -> bool {
    Date::parse(value, &format_description!("[year]-[month]-[day]")).is_ok()
}

fn is_non_negative_number(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .is_ok_and(|number| number.is_finite() && number >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::FormState;
    use crate::towers::TowerWingTable;
    use crate::{
        APPLICANT_NAME, BOOKING_DATE, EMAIL, FormSide, REMARKS, TOTAL, TOWER, UNIT, WING,
    };

    fn filled(side: FormSide) -> FormState {
        let table = TowerWingTable::standard();
        let mut form = FormState::new(side);
        form.set_value(APPLICANT_NAME, "Asha Rao");
        form.change_tower(&table, "AMAZON", Some("B Wing"));
        form.set_value(UNIT, "1203");
        form.set_value(BOOKING_DATE, "2024-03-05");
        form
    }

    #[test]
    fn new_form_is_blank_with_disabled_wing() {
        let form = FormState::new(FormSide::Primary);
        assert!(form.is_blank());
        assert!(!form.wing_selector().is_enabled());
        assert_eq!(form.value(TOWER), Some(""));
        assert_eq!(form.value(REMARKS), None);
    }

    #[test]
    fn required_fields_are_reported_in_form_order() {
        let form = FormState::new(FormSide::Secondary);
        let violations = form.violations();
        let fields = violations.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, vec![APPLICANT_NAME, TOWER, UNIT, BOOKING_DATE]);
        assert_eq!(
            form.first_violation().map(|v| v.field),
            Some(APPLICANT_NAME)
        );
    }

    #[test]
    fn enabled_wing_becomes_required() {
        let table = TowerWingTable::standard();
        let mut form = filled(FormSide::Primary);
        assert!(form.is_valid());

        form.change_tower(&table, "DANUBE", None);
        let violation = form.first_violation().expect("wing should be required");
        assert_eq!(violation.field, WING);
    }

    #[test]
    fn typed_fields_are_checked_when_present() {
        let mut form = filled(FormSide::Primary);
        form.set_value(EMAIL, "not-an-email");
        assert_eq!(form.first_violation().map(|v| v.field), Some(EMAIL));

        form.set_value(EMAIL, "asha@example.com");
        form.set_value(TOTAL, "1,000");
        assert_eq!(form.first_violation().map(|v| v.field), Some(TOTAL));

        form.set_value(TOTAL, "1000");
        form.set_value(BOOKING_DATE, "2024-02-31");
        assert_eq!(form.first_violation().map(|v| v.field), Some(BOOKING_DATE));
    }

    #[test]
    fn unknown_tower_clears_the_tower_value() {
        let table = TowerWingTable::standard();
        let mut form = filled(FormSide::Primary);
        form.change_tower(&table, "NILE", Some("A Wing"));
        assert_eq!(form.value(TOWER), Some(""));
        assert_eq!(form.value(WING), Some(""));
        assert!(!form.wing_selector().is_enabled());
    }

    #[test]
    fn entries_skip_disabled_wing_and_reset_clears_everything() {
        let mut form = filled(FormSide::Primary);
        let names = form.entries().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert!(names.contains(&WING));

        form.reset();
        assert!(form.is_blank());
        let names = form.entries().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert!(!names.contains(&WING));
        assert_eq!(names.len(), 11);
    }
}
