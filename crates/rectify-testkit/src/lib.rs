// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rectify_app::{
    APPLICANT_NAME, BOOKING_DATE, BookingRecord, Endpoint, FormSide, LookupOutcome, Session,
    Submission, TOWER, UNIT, WING,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub const DANUBE_BOOKING_ID: &str = "BK-1042";
pub const MISSING_BOOKING_ID: &str = "BK-0000";

/// Lookup body for [`DANUBE_BOOKING_ID`] as the sheet script serves it:
/// lowercase tower, slash date, comma-grouped amounts, one numeric cell.
pub const DANUBE_BOOKING_JSON: &str = r#"{
  "clientName": "Meera Kulkarni",
  "tower": "danube",
  "wing": "C Wing",
  "unit": "C-1204",
  "type": "3 BHK",
  "bookingDate": "14/08/2023",
  "contact": "9820012345",
  "email": "meera.k@example.com",
  "total": "1,85,40,000",
  "av": "1,62,00,000",
  "ic": 2340000,
  "paymentPlan": "Construction linked"
}"#;

pub const NOT_FOUND_JSON: &str = r#"{"error":true}"#;

/// The record [`DANUBE_BOOKING_JSON`] decodes to.
pub fn danube_booking() -> BookingRecord {
    BookingRecord {
        client_name: "Meera Kulkarni".to_owned(),
        tower: "danube".to_owned(),
        wing: "C Wing".to_owned(),
        unit: "C-1204".to_owned(),
        unit_type: "3 BHK".to_owned(),
        booking_date: "14/08/2023".to_owned(),
        contact: "9820012345".to_owned(),
        email: "meera.k@example.com".to_owned(),
        total: "1,85,40,000".to_owned(),
        av: "1,62,00,000".to_owned(),
        ic: "2340000".to_owned(),
        payment_plan: "Construction linked".to_owned(),
    }
}

/// Fills the required fields of one form with valid values.
pub fn fill_required(session: &mut Session, side: FormSide) {
    session.set_field(side, APPLICANT_NAME, "Meera Kulkarni");
    session.set_field(side, TOWER, "AMAZON");
    session.set_field(side, WING, "B Wing");
    session.set_field(side, UNIT, "B-702");
    session.set_field(side, BOOKING_DATE, "2023-08-14");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointCall {
    Lookup(String),
    Post(Submission),
}

#[derive(Debug, Default)]
struct Script {
    bookings: BTreeMap<String, BookingRecord>,
    lookup_failure: Option<String>,
    post_replies: VecDeque<std::result::Result<String, String>>,
    calls: Vec<EndpointCall>,
}

/// In-memory endpoint. Clones share one script so a copy handed to a worker
/// thread still records into the same call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEndpoint {
    script: Arc<Mutex<Script>>,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booking(self, booking_id: &str, record: BookingRecord) -> Self {
        self.lock().bookings.insert(booking_id.to_owned(), record);
        self
    }

    pub fn failing_lookups(self, message: &str) -> Self {
        self.lock().lookup_failure = Some(message.to_owned());
        self
    }

    pub fn reply(self, body: &str) -> Self {
        self.lock().post_replies.push_back(Ok(body.to_owned()));
        self
    }

    pub fn fail_post(self, message: &str) -> Self {
        self.lock().post_replies.push_back(Err(message.to_owned()));
        self
    }

    pub fn calls(&self) -> Vec<EndpointCall> {
        self.lock().calls.clone()
    }

    pub fn posted_sides(&self) -> Vec<FormSide> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                EndpointCall::Post(submission) => Some(submission.side),
                EndpointCall::Lookup(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Endpoint for ScriptedEndpoint {
    fn lookup_booking(&mut self, booking_id: &str) -> Result<LookupOutcome> {
        let mut script = self.lock();
        script.calls.push(EndpointCall::Lookup(booking_id.to_owned()));
        if let Some(message) = &script.lookup_failure {
            return Err(anyhow!("{message}"));
        }
        Ok(script
            .bookings
            .get(booking_id)
            .cloned()
            .map_or(LookupOutcome::NotFound, LookupOutcome::Found))
    }

    fn post_form(&mut self, submission: &Submission) -> Result<String> {
        let mut script = self.lock();
        script.calls.push(EndpointCall::Post(submission.clone()));
        match script.post_replies.pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(anyhow!("{message}")),
            None => Err(anyhow!("no scripted reply for {} post", submission.side.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DANUBE_BOOKING_ID, EndpointCall, ScriptedEndpoint, danube_booking};
    use rectify_app::{Endpoint, LookupOutcome};

    #[test]
    fn clones_share_the_call_log() -> anyhow::Result<()> {
        let endpoint = ScriptedEndpoint::new().with_booking(DANUBE_BOOKING_ID, danube_booking());
        let mut worker_copy = endpoint.clone();

        let outcome = worker_copy.lookup_booking(DANUBE_BOOKING_ID)?;
        assert_eq!(outcome, LookupOutcome::Found(danube_booking()));
        assert_eq!(
            endpoint.calls(),
            vec![EndpointCall::Lookup(DANUBE_BOOKING_ID.to_owned())]
        );
        Ok(())
    }

    #[test]
    fn unscripted_post_is_an_error() {
        let mut endpoint = ScriptedEndpoint::new();
        let submission = rectify_app::Submission {
            side: rectify_app::FormSide::Primary,
            fields: Vec::new(),
        };
        assert!(endpoint.post_form(&submission).is_err());
    }
}
