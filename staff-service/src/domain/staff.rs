use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    pagination::{Page, PageRequest},
    responses::message,
    time::format_report_date,
    types::{Gender, Staff},
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::StaffServiceError;

pub const STAFF_ID_MAX_LEN: usize = 8;
pub const FULL_NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaff {
    pub staff_id: String,
    pub full_name: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
}

/// Full overwrite of a staff record's mutable fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaff {
    pub id: Uuid,
    pub staff_id: String,
    pub full_name: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
}

/// Mutable fields after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffFields {
    pub staff_id: String,
    pub full_name: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
}

impl StaffFields {
    pub fn validate(
        staff_id: &str,
        full_name: &str,
        birthday: NaiveDate,
        gender: Gender,
        today: NaiveDate,
    ) -> Result<Self, StaffServiceError> {
        let staff_id = staff_id.trim();
        if staff_id.is_empty() {
            return Err(StaffServiceError::Validation(
                "staffId must not be empty".into(),
            ));
        }
        if staff_id.chars().count() > STAFF_ID_MAX_LEN {
            return Err(StaffServiceError::Validation(format!(
                "staffId must be at most {STAFF_ID_MAX_LEN} characters"
            )));
        }

        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(StaffServiceError::Validation(
                "fullName must not be empty".into(),
            ));
        }
        if full_name.chars().count() > FULL_NAME_MAX_LEN {
            return Err(StaffServiceError::Validation(format!(
                "fullName must be at most {FULL_NAME_MAX_LEN} characters"
            )));
        }

        if birthday >= today {
            return Err(StaffServiceError::Validation(
                message::BIRTHDAY_NOT_IN_PAST.into(),
            ));
        }

        Ok(Self {
            staff_id: staff_id.to_owned(),
            full_name: full_name.to_owned(),
            birthday,
            gender,
        })
    }
}

/// Query string of the list and export endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StaffSearchQuery {
    /// Substring of the business staff id.
    pub staff_id: Option<String>,
    pub gender: Option<Gender>,
    /// Earliest birthday, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest birthday, inclusive.
    pub to: Option<NaiveDate>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl StaffSearchQuery {
    pub fn filter(&self) -> Result<StaffFilter, StaffServiceError> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(StaffServiceError::Validation(format!(
                "from ({from}) must not be after to ({to})"
            )));
        }

        Ok(StaffFilter {
            staff_id: self
                .staff_id
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            gender: self.gender,
            birthday_from: self.from,
            birthday_to: self.to,
        })
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page_number, self.page_size)
    }
}

/// Optional predicates applied on top of `status = ACTIVE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffFilter {
    pub staff_id: Option<String>,
    pub gender: Option<Gender>,
    pub birthday_from: Option<NaiveDate>,
    pub birthday_to: Option<NaiveDate>,
}

impl StaffFilter {
    pub fn matches(&self, staff: &Staff) -> bool {
        self.staff_id
            .as_deref()
            .is_none_or(|needle| staff.staff_id.contains(needle))
            && self.gender.is_none_or(|g| staff.gender == g)
            && self.birthday_from.is_none_or(|from| staff.birthday >= from)
            && self.birthday_to.is_none_or(|to| staff.birthday <= to)
    }

    /// Human readable description of the applied predicates, for report headers.
    pub fn describe(&self) -> Vec<String> {
        let mut criteria = Vec::new();
        if let Some(staff_id) = &self.staff_id {
            criteria.push(format!("Staff ID: {staff_id}"));
        }
        if let Some(gender) = self.gender {
            criteria.push(format!("Gender: {}", gender.label()));
        }
        if let Some(from) = self.birthday_from {
            criteria.push(format!("From: {}", format_report_date(from)));
        }
        if let Some(to) = self.birthday_to {
            criteria.push(format!("To: {}", format_report_date(to)));
        }
        criteria
    }
}

#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Looks a record up regardless of its status.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, StaffServiceError>;

    /// Whether an active record other than `exclude` holds `staff_id`.
    async fn staff_id_taken(
        &self,
        staff_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StaffServiceError>;

    /// Returns the number of rows written.
    async fn insert(&self, staff: &Staff) -> Result<u64, StaffServiceError>;

    /// Writes the editable fields and `updated_at` of `staff`. Status is left
    /// alone so a concurrent delete is never undone.
    /// Returns the number of rows written.
    async fn update_details(&self, staff: &Staff) -> Result<u64, StaffServiceError>;

    /// Flips the record to DELETED and stamps `updated_at`, touching nothing
    /// else. Returns the number of rows written.
    async fn mark_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<u64, StaffServiceError>;

    /// Active records matching `filter`, newest first.
    async fn find_page(
        &self,
        filter: &StaffFilter,
        page: PageRequest,
    ) -> Result<Page<Staff>, StaffServiceError>;

    async fn ping(&self) -> Result<(), StaffServiceError>;
}
