// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{info, warn};

use crate::booking::apply_booking;
use crate::copy;
use crate::forms::{FieldViolation, FormState};
use crate::submit::{Endpoint, SavePlan, SubmissionTags, submit_in_order};
use crate::towers::TowerWingTable;
use crate::{FormSide, LookupOutcome, SearchStatus, TOWER};

pub const SAVE_LABEL: &str = "Save Rectification";
pub const SAVING_LABEL: &str = "Saving...";
pub const SAVED_MESSAGE: &str = "Rectification saved successfully ✅";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Saved,
    SaveFailed(String),
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Self::Saved => SAVED_MESSAGE.to_owned(),
            Self::SaveFailed(message) => format!("Error: {message}"),
        }
    }
}

/// A constraint violation surfaced for one form, the equivalent of the
/// browser's validity bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedViolation {
    pub side: FormSide,
    pub violation: FieldViolation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStart {
    /// Save control is disabled; a save is already running.
    Blocked,
    Invalid(ReportedViolation),
    Ready(SavePlan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    table: TowerWingTable,
    tags: SubmissionTags,
    booking_id: String,
    primary: FormState,
    secondary: FormState,
    status: SearchStatus,
    search_enabled: bool,
    save_enabled: bool,
    save_label: &'static str,
    alert: Option<Alert>,
    reported: Option<ReportedViolation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TowerWingTable::standard(), SubmissionTags::default())
    }
}

impl Session {
    pub fn new(table: TowerWingTable, tags: SubmissionTags) -> Self {
        Self {
            table,
            tags,
            booking_id: String::new(),
            primary: FormState::new(FormSide::Primary),
            secondary: FormState::new(FormSide::Secondary),
            status: SearchStatus::Idle,
            search_enabled: true,
            save_enabled: true,
            save_label: SAVE_LABEL,
            alert: None,
            reported: None,
        }
    }

    pub fn table(&self) -> &TowerWingTable {
        &self.table
    }

    pub fn tags(&self) -> &SubmissionTags {
        &self.tags
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub fn primary(&self) -> &FormState {
        &self.primary
    }

    pub fn secondary(&self) -> &FormState {
        &self.secondary
    }

    pub fn form(&self, side: FormSide) -> &FormState {
        match side {
            FormSide::Primary => &self.primary,
            FormSide::Secondary => &self.secondary,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    pub fn save_enabled(&self) -> bool {
        self.save_enabled
    }

    pub fn save_label(&self) -> &'static str {
        self.save_label
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    pub fn reported_violation(&self) -> Option<&ReportedViolation> {
        self.reported.as_ref()
    }

    pub fn set_booking_id(&mut self, value: &str) {
        self.booking_id = value.to_owned();
    }

    /// User edit of one field. Tower edits run the wing resolver for that
    /// form. Returns false when the form has no such field.
    pub fn set_field(&mut self, side: FormSide, name: &str, value: &str) -> bool {
        self.reported = None;
        let table = &self.table;
        let form = match side {
            FormSide::Primary => &mut self.primary,
            FormSide::Secondary => &mut self.secondary,
        };
        if name == TOWER {
            form.change_tower(table, value, None);
            return true;
        }
        form.set_value(name, value)
    }

    /// Starts a lookup: returns the trimmed identifier to fetch, or `None`
    /// when the identifier is blank or a lookup is already running.
    pub fn begin_search(&mut self) -> Option<String> {
        if !self.search_enabled {
            return None;
        }
        let booking_id = self.booking_id.trim();
        if booking_id.is_empty() {
            return None;
        }
        let booking_id = booking_id.to_owned();
        self.status = SearchStatus::Searching;
        self.search_enabled = false;
        Some(booking_id)
    }

    pub fn finish_search(
        &mut self,
        booking_id: &str,
        outcome: Result<LookupOutcome>,
    ) -> SearchStatus {
        self.status = match outcome {
            Ok(LookupOutcome::Found(record)) => {
                apply_booking(&self.table, &mut self.primary, &record);
                info!(booking_id, "booking found");
                SearchStatus::Found
            }
            Ok(LookupOutcome::NotFound) => {
                info!(booking_id, "booking not found");
                SearchStatus::NotFound
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(booking_id, error = message.as_str(), "booking lookup failed");
                SearchStatus::ServerError
            }
        };
        self.search_enabled = true;
        self.status
    }

    pub fn search<E: Endpoint + ?Sized>(&mut self, endpoint: &mut E) -> Option<SearchStatus> {
        let booking_id = self.begin_search()?;
        let outcome = endpoint.lookup_booking(&booking_id);
        Some(self.finish_search(&booking_id, outcome))
    }

    pub fn copy_field(&mut self, name: &str) -> bool {
        self.reported = None;
        copy::copy_field(&self.table, &self.primary, &mut self.secondary, name)
    }

    pub fn copy_all(&mut self) -> usize {
        self.reported = None;
        copy::copy_all(&self.table, &self.primary, &mut self.secondary)
    }

    /// Validates the primary form, then the secondary form, and on success
    /// locks both controls and snapshots the two submissions.
    pub fn begin_save(&mut self) -> SaveStart {
        if !self.save_enabled {
            return SaveStart::Blocked;
        }

        for form in [&self.primary, &self.secondary] {
            if let Some(violation) = form.first_violation() {
                let reported = ReportedViolation {
                    side: form.side(),
                    violation,
                };
                self.reported = Some(reported.clone());
                return SaveStart::Invalid(reported);
            }
        }

        self.reported = None;
        self.search_enabled = false;
        self.save_enabled = false;
        self.save_label = SAVING_LABEL;
        SaveStart::Ready(SavePlan::new(&self.primary, &self.secondary, &self.tags))
    }

    pub fn finish_save(&mut self, result: Result<()>) -> Alert {
        let alert = match result {
            Ok(()) => {
                self.primary.reset();
                self.secondary.reset();
                self.status = SearchStatus::Idle;
                info!("rectification saved");
                Alert::Saved
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(error = message.as_str(), "rectification save failed");
                Alert::SaveFailed(message)
            }
        };
        self.search_enabled = true;
        self.save_enabled = true;
        self.save_label = SAVE_LABEL;
        self.alert = Some(alert.clone());
        alert
    }

    /// Runs a whole save synchronously. Returns `None` when the save never
    /// started (blocked or invalid).
    pub fn save<E: Endpoint + ?Sized>(&mut self, endpoint: &mut E) -> Option<Alert> {
        let SaveStart::Ready(plan) = self.begin_save() else {
            return None;
        };
        let result = submit_in_order(endpoint, &plan);
        Some(self.finish_save(result))
    }
}
