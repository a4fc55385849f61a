//! Book instance (borrowable copy) model and loan rules

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validation::{clean, FormErrors, REQUIRED};
use crate::error::FieldError;

/// Weeks ahead of today offered as the default renewal date
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;
/// Furthest a renewal may push the due-back date
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Availability of a copy. Stored and serialized as a one-letter code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    #[sqlx(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    #[sqlx(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    #[sqlx(rename = "a")]
    Available,
    #[serde(rename = "r")]
    #[sqlx(rename = "r")]
    Reserved,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        };
        write!(f, "{}", label)
    }
}

/// A copy is overdue once its due-back date has passed
pub fn is_overdue(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_back.map(|d| d < today).unwrap_or(false)
}

/// A borrowable copy, joined with its book, publisher and borrower for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: i64,
    pub book_title: String,
    pub imprint: String,
    pub publisher_id: Option<i64>,
    pub publisher_name: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
    pub borrower_username: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl std::fmt::Display for BookInstanceDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.book_title)
    }
}

/// Optional filters for the instance list
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstanceFilter {
    pub status: Option<LoanStatus>,
}

/// Administrative create / update form for a copy
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookInstanceForm {
    pub book_id: Option<i64>,
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub imprint: String,
    pub publisher_id: Option<i64>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
}

impl BookInstanceForm {
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean(&mut self.imprint);
        let mut errors = FormErrors::from_rules(self);
        errors.require("imprint", &self.imprint);
        if self.book_id.is_none() {
            errors.push("book_id", REQUIRED);
        }
        errors.into_vec()
    }
}

impl From<&BookInstanceDetails> for BookInstanceForm {
    fn from(instance: &BookInstanceDetails) -> Self {
        Self {
            book_id: Some(instance.book_id),
            imprint: instance.imprint.clone(),
            publisher_id: instance.publisher_id,
            due_back: instance.due_back,
            status: instance.status,
            borrower_id: instance.borrower_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Renewal
// ---------------------------------------------------------------------------

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Renewal date proposed to a librarian when the form is first shown
pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}

/// Accept a renewal date within `[today, today + 4 weeks]`
pub fn check_renewal_date(proposed: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if proposed < today {
        return Err(RenewalError::InPast);
    }
    if proposed > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(proposed)
}

/// Renewal form submitted by a librarian
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenewBookForm {
    /// Enter a date between now and 4 weeks (default 3)
    pub renewal_date: Option<NaiveDate>,
}

impl RenewBookForm {
    /// Validate against `today`, yielding the accepted date or the field error
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, FieldError> {
        let proposed = self
            .renewal_date
            .ok_or_else(|| FieldError::new("renewal_date", REQUIRED))?;
        check_renewal_date(proposed, today).map_err(|e| FieldError::new("renewal_date", e.to_string()))
    }
}

/// Initial data for the renewal form
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewBookPage {
    pub instance: BookInstanceDetails,
    pub renewal_date: NaiveDate,
}
