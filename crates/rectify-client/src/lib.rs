// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rectify_app::{BookingRecord, Endpoint, LookupOutcome, Submission};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Apps Script deployment the rectification sheet is published at.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbxtlqg1g6RIlnzEtuBQa3fnnQVb-1ne2Ofu9ymnDr2r5OWbBaL4tXZ_-RsNh4Mnyaji/exec";

#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = parse_endpoint_url(url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { url, timeout, http })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn lookup_url(&self, booking_id: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("bookingId", booking_id);
        url
    }

    pub fn lookup(&self, booking_id: &str) -> Result<LookupOutcome> {
        let url = self.lookup_url(booking_id);
        debug!(booking_id, "looking up booking");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read booking response")?;
        decode_lookup(&body)
    }

    /// Posts one form, url-encoded, and returns the body verbatim whatever
    /// the status. Deciding whether the body means success is left to the
    /// caller; only an empty error response is turned into an error here.
    pub fn submit(&self, submission: &Submission) -> Result<String> {
        debug!(
            side = submission.side.as_str(),
            fields = submission.fields.len(),
            "posting form"
        );
        let response = self
            .http
            .post(self.url.clone())
            .form(&submission.fields)
            .send()
            .map_err(|error| connection_error(self.url(), error))?;

        let status = response.status();
        let body = response.text().context("read submit response")?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "form post returned an error status");
            if body.trim().is_empty() {
                return Err(clean_error_response(status, &body));
            }
        }
        Ok(body)
    }
}

impl Endpoint for Client {
    fn lookup_booking(&mut self, booking_id: &str) -> Result<LookupOutcome> {
        self.lookup(booking_id)
    }

    fn post_form(&mut self, submission: &Submission) -> Result<String> {
        self.submit(submission)
    }
}

pub fn parse_endpoint_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("endpoint url must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("invalid endpoint url {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "endpoint url {trimmed:?} must use http or https, got {:?}",
            url.scheme()
        );
    }
    Ok(url)
}

/// Lookup bodies are either a booking object or an object with a truthy
/// `error` member.
pub fn decode_lookup(body: &str) -> Result<LookupOutcome> {
    let value: Value = serde_json::from_str(body.trim()).context("decode booking response")?;
    if !value.is_object() {
        bail!("booking response is not a JSON object");
    }
    if value.get("error").is_some_and(is_truthy) {
        return Ok(LookupOutcome::NotFound);
    }
    let record: BookingRecord =
        serde_json::from_value(value).context("decode booking fields")?;
    Ok(LookupOutcome::Found(record))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn connection_error(url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {url} timed out -- raise [endpoint].timeout ({error})");
    }
    anyhow!("cannot reach {url} -- check [endpoint].url and your network ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }
    anyhow!("server returned {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::{clean_error_response, decode_lookup, is_truthy, parse_endpoint_url};
    use anyhow::Result;
    use rectify_app::LookupOutcome;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn error_member_means_not_found() -> Result<()> {
        assert_eq!(decode_lookup(r#"{"error":true}"#)?, LookupOutcome::NotFound);
        assert_eq!(
            decode_lookup(r#"{"error":"Booking not found"}"#)?,
            LookupOutcome::NotFound
        );
        Ok(())
    }

    #[test]
    fn falsy_error_member_is_ignored() -> Result<()> {
        let outcome = decode_lookup(r#"{"error":false,"clientName":"Asha","total":1500}"#)?;
        let LookupOutcome::Found(record) = outcome else {
            panic!("expected a record");
        };
        assert_eq!(record.client_name, "Asha");
        assert_eq!(record.total, "1500");
        assert!(record.wing.is_empty());
        Ok(())
    }

    #[test]
    fn null_cells_decode_as_empty_text() -> Result<()> {
        let LookupOutcome::Found(record) =
            decode_lookup(r#"{"clientName":null,"tower":"TAPI","av":12.5}"#)?
        else {
            panic!("expected a record");
        };
        assert!(record.client_name.is_empty());
        assert_eq!(record.tower, "TAPI");
        assert_eq!(record.av, "12.5");
        Ok(())
    }

    #[test]
    fn non_object_bodies_are_errors() {
        assert!(decode_lookup("[]").is_err());
        assert!(decode_lookup("<html>oops</html>").is_err());
    }

    #[test]
    fn truthiness_follows_script_rules() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn endpoint_url_must_be_http() {
        assert!(parse_endpoint_url("").is_err());
        assert!(parse_endpoint_url("ftp://example.com/exec").is_err());
        assert!(parse_endpoint_url("not a url").is_err());
        assert!(parse_endpoint_url("https://example.com/exec").is_ok());
    }

    #[test]
    fn short_plain_bodies_are_kept_in_errors() {
        let error = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(error.to_string(), "server error (502): upstream down");

        let error = clean_error_response(StatusCode::NOT_FOUND, "<html>...</html>");
        assert_eq!(error.to_string(), "server returned 404");
    }
}
