// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::forms::FormState;
use crate::{FormSide, LookupOutcome};

/// Body the endpoint returns when a row was written.
pub const SUCCESS_MARKER: &str = "SUCCESS";
pub const DEFAULT_SHEET: &str = "Rectification";
pub const DEFAULT_PRIMARY_SOURCE: &str = "Salesforce";
pub const DEFAULT_SECONDARY_SOURCE: &str = "Client";

/// Remote booking sheet. Lookups and form posts go to the same endpoint.
pub trait Endpoint {
    fn lookup_booking(&mut self, booking_id: &str) -> Result<LookupOutcome>;
    /// Posts one form and returns the raw response body.
    fn post_form(&mut self, submission: &Submission) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTags {
    pub sheet: String,
    pub primary_source: String,
    pub secondary_source: String,
}

impl Default for SubmissionTags {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_owned(),
            primary_source: DEFAULT_PRIMARY_SOURCE.to_owned(),
            secondary_source: DEFAULT_SECONDARY_SOURCE.to_owned(),
        }
    }
}

impl SubmissionTags {
    pub fn source_for(&self, side: FormSide) -> &str {
        match side {
            FormSide::Primary => &self.primary_source,
            FormSide::Secondary => &self.secondary_source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub side: FormSide,
    pub fields: Vec<(String, String)>,
}

impl Submission {
    /// Snapshots the form's entries and appends the `sheet` and `source`
    /// tags after them.
    pub fn from_form(form: &FormState, tags: &SubmissionTags) -> Self {
        let mut fields = form
            .entries()
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect::<Vec<_>>();
        fields.push(("sheet".to_owned(), tags.sheet.clone()));
        fields.push((
            "source".to_owned(),
            tags.source_for(form.side()).to_owned(),
        ));
        Self {
            side: form.side(),
            fields,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub primary: Submission,
    pub secondary: Submission,
}

impl SavePlan {
    pub fn new(primary: &FormState, secondary: &FormState, tags: &SubmissionTags) -> Self {
        Self {
            primary: Submission::from_form(primary, tags),
            secondary: Submission::from_form(secondary, tags),
        }
    }
}

/// Posts the primary form, then the secondary form only after the primary
/// came back with [`SUCCESS_MARKER`]. Any other body becomes the error
/// message. Nothing is retried or rolled back.
pub fn submit_in_order<E: Endpoint + ?Sized>(endpoint: &mut E, plan: &SavePlan) -> Result<()> {
    for submission in [&plan.primary, &plan.secondary] {
        let side = submission.side;
        debug!(side = side.as_str(), fields = submission.fields.len(), "posting form");
        let body = endpoint
            .post_form(submission)
            .with_context(|| format!("submit {} form", side.title()))?;
        if body != SUCCESS_MARKER {
            return Err(anyhow!(body));
        }
        info!(side = side.as_str(), "form saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, SavePlan, Submission, SubmissionTags, submit_in_order};
    use crate::forms::FormState;
    use crate::{FormSide, LookupOutcome, UNIT};
    use anyhow::{Result, bail};

    struct Scripted {
        replies: Vec<Result<String>>,
        posted: Vec<FormSide>,
    }

    impl Endpoint for Scripted {
        fn lookup_booking(&mut self, _booking_id: &str) -> Result<LookupOutcome> {
            bail!("lookup not scripted")
        }

        fn post_form(&mut self, submission: &Submission) -> Result<String> {
            self.posted.push(submission.side);
            self.replies.remove(0)
        }
    }

    fn plan() -> SavePlan {
        let mut primary = FormState::new(FormSide::Primary);
        primary.set_value(UNIT, "1203");
        let secondary = FormState::new(FormSide::Secondary);
        SavePlan::new(&primary, &secondary, &SubmissionTags::default())
    }

    #[test]
    fn submissions_carry_sheet_and_source_tags_last() {
        let plan = plan();
        assert_eq!(plan.primary.get("sheet"), Some("Rectification"));
        assert_eq!(plan.primary.get("source"), Some("Salesforce"));
        assert_eq!(plan.secondary.get("source"), Some("Client"));
        assert_eq!(plan.primary.get(UNIT), Some("1203"));
        let last = plan.secondary.fields.last().map(|(name, _)| name.as_str());
        assert_eq!(last, Some("source"));
    }

    #[test]
    fn secondary_is_posted_after_primary_success() -> Result<()> {
        let mut endpoint = Scripted {
            replies: vec![Ok("SUCCESS".to_owned()), Ok("SUCCESS".to_owned())],
            posted: Vec::new(),
        };
        submit_in_order(&mut endpoint, &plan())?;
        assert_eq!(endpoint.posted, vec![FormSide::Primary, FormSide::Secondary]);
        Ok(())
    }

    #[test]
    fn primary_rejection_stops_the_sequence() {
        let mut endpoint = Scripted {
            replies: vec![Ok("Sheet locked".to_owned())],
            posted: Vec::new(),
        };
        let error = submit_in_order(&mut endpoint, &plan()).expect_err("should fail");
        assert_eq!(error.to_string(), "Sheet locked");
        assert_eq!(endpoint.posted, vec![FormSide::Primary]);
    }

    #[test]
    fn secondary_transport_failure_is_reported_with_side() {
        let mut endpoint = Scripted {
            replies: vec![Ok("SUCCESS".to_owned()), Err(anyhow::anyhow!("connection reset"))],
            posted: Vec::new(),
        };
        let error = submit_in_order(&mut endpoint, &plan()).expect_err("should fail");
        let message = format!("{error:#}");
        assert!(message.contains("submit Client form"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn success_marker_is_matched_exactly() {
        let mut endpoint = Scripted {
            replies: vec![Ok("success".to_owned())],
            posted: Vec::new(),
        };
        assert!(submit_in_order(&mut endpoint, &plan()).is_err());
    }
}
