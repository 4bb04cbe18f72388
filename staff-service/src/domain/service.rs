use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    pagination::Page,
    time::{format_report_timestamp, now_in, today_in},
    types::{Staff, StaffResponse, StaffStatus},
};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::domain::export::{ExportFile, ExportFormat, ReportMeta, ReportRenderer};
use crate::domain::staff::{
    CreateStaff, StaffFields, StaffRepository, StaffSearchQuery, UpdateStaff,
};
use crate::error::StaffServiceError;

/// Staff record use cases: validation, uniqueness, soft delete, listing and
/// report export.
pub struct StaffService {
    repo: Arc<dyn StaffRepository>,
    pdf: Arc<dyn ReportRenderer>,
    excel: Arc<dyn ReportRenderer>,
    config: ServiceConfig,
}

impl StaffService {
    pub fn new(
        repo: Arc<dyn StaffRepository>,
        pdf: Arc<dyn ReportRenderer>,
        excel: Arc<dyn ReportRenderer>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            pdf,
            excel,
            config,
        }
    }

    /// Creates an active record and returns its new id.
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, request: CreateStaff) -> Result<Uuid, StaffServiceError> {
        let fields = self.validate(
            &request.staff_id,
            &request.full_name,
            request.birthday,
            request.gender,
        )?;

        if self.repo.staff_id_taken(&fields.staff_id, None).await? {
            return Err(StaffServiceError::Conflict);
        }

        let staff = Staff {
            id: Uuid::new_v4(),
            staff_id: fields.staff_id,
            full_name: fields.full_name,
            birthday: fields.birthday,
            gender: fields.gender,
            status: StaffStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };

        if self.repo.insert(&staff).await? == 0 {
            return Err(StaffServiceError::Persistence);
        }

        tracing::info!(id = %staff.id, staff_id = %staff.staff_id, "Staff created");
        Ok(staff.id)
    }

    /// Overwrites every mutable field of an existing record.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, request: UpdateStaff) -> Result<Uuid, StaffServiceError> {
        let fields = self.validate(
            &request.staff_id,
            &request.full_name,
            request.birthday,
            request.gender,
        )?;

        let mut staff = self.find(request.id).await?;

        if staff.status == StaffStatus::Active
            && fields.staff_id != staff.staff_id
            && self
                .repo
                .staff_id_taken(&fields.staff_id, Some(staff.id))
                .await?
        {
            return Err(StaffServiceError::Conflict);
        }

        staff.staff_id = fields.staff_id;
        staff.full_name = fields.full_name;
        staff.birthday = fields.birthday;
        staff.gender = fields.gender;
        touch(&mut staff);

        if self.repo.update_details(&staff).await? == 0 {
            return Err(StaffServiceError::Persistence);
        }

        Ok(staff.id)
    }

    /// Soft delete: flips the status, the row stays.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, StaffServiceError> {
        let staff = self.find(id).await?;
        let deleted_at = refreshed(staff.updated_at);

        if self.repo.mark_deleted(staff.id, deleted_at).await? == 0 {
            return Err(StaffServiceError::Persistence);
        }

        tracing::info!(%id, "Staff soft-deleted");
        Ok(staff.id)
    }

    /// Returns the record whatever its status.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<StaffResponse, StaffServiceError> {
        self.find(id).await.map(StaffResponse::from)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all(
        &self,
        query: &StaffSearchQuery,
    ) -> Result<Page<StaffResponse>, StaffServiceError> {
        let filter = query.filter()?;
        let page = self.repo.find_page(&filter, query.page_request()).await?;

        Ok(page.map(StaffResponse::from))
    }

    pub async fn export_pdf(
        &self,
        query: &StaffSearchQuery,
    ) -> Result<ExportFile, StaffServiceError> {
        self.export(&self.pdf, query).await
    }

    pub async fn export_excel(
        &self,
        query: &StaffSearchQuery,
    ) -> Result<ExportFile, StaffServiceError> {
        self.export(&self.excel, query).await
    }

    /// Renders the requested page (not the whole filtered set).
    #[tracing::instrument(skip(self, renderer), fields(format = renderer.format().label()))]
    async fn export(
        &self,
        renderer: &Arc<dyn ReportRenderer>,
        query: &StaffSearchQuery,
    ) -> Result<ExportFile, StaffServiceError> {
        let format = renderer.format();
        let filter = query.filter()?;
        let page = self.get_all(query).await?;

        if page.is_empty() {
            return Err(StaffServiceError::NoContent);
        }

        let generated_at = now_in(self.config.timezone());
        let meta = ReportMeta {
            title: self.config.report_title.clone(),
            footer: self.config.report_footer.clone(),
            generated_at: format_report_timestamp(&generated_at),
            filters: filter.describe(),
        };

        let renderer = Arc::clone(renderer);
        let rows = page.items;
        let row_count = rows.len();

        let bytes = tokio::task::spawn_blocking(move || renderer.render(&rows, &meta))
            .await
            .map_err(|e| rendering_failed(format, e))?
            .map_err(|e| rendering_failed(format, e))?;

        tracing::info!(
            rows = row_count,
            size = bytes.len(),
            format = format.label(),
            "Report generated"
        );

        Ok(ExportFile {
            format,
            file_name: format!(
                "staff_export_{}.{}",
                generated_at.format("%Y%m%d_%H%M%S"),
                format.extension()
            ),
            bytes,
        })
    }

    /// Database liveness, used by the health check.
    pub async fn ping(&self) -> Result<(), StaffServiceError> {
        self.repo.ping().await
    }

    async fn find(&self, id: Uuid) -> Result<Staff, StaffServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| StaffServiceError::NotFound(id.to_string()))
    }

    fn validate(
        &self,
        staff_id: &str,
        full_name: &str,
        birthday: chrono::NaiveDate,
        gender: shared::types::Gender,
    ) -> Result<StaffFields, StaffServiceError> {
        let today = today_in(self.config.timezone());
        StaffFields::validate(staff_id, full_name, birthday, gender, today)
    }
}

/// Refreshes `updated_at`, never moving it backwards.
fn touch(staff: &mut Staff) {
    staff.updated_at = Some(refreshed(staff.updated_at));
}

fn refreshed(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    previous.map_or(now, |previous| previous.max(now))
}

fn rendering_failed(format: ExportFormat, cause: impl std::fmt::Display) -> StaffServiceError {
    StaffServiceError::Rendering(format!("Error generating {}: {cause}", format.label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::export::{ExportError, MockReportRenderer};
    use crate::domain::staff::MockStaffRepository;
    use chrono::NaiveDate;
    use shared::pagination::PageRequest;
    use shared::types::Gender;
    use std::sync::Mutex;

    fn make_service(
        repo: MockStaffRepository,
        mut pdf: MockReportRenderer,
        mut excel: MockReportRenderer,
    ) -> StaffService {
        pdf.expect_format().return_const(ExportFormat::Pdf);
        excel.expect_format().return_const(ExportFormat::Excel);

        StaffService::new(
            Arc::new(repo),
            Arc::new(pdf),
            Arc::new(excel),
            ServiceConfig::default(),
        )
    }

    fn repo_only(repo: MockStaffRepository) -> StaffService {
        make_service(repo, MockReportRenderer::new(), MockReportRenderer::new())
    }

    fn make_staff(staff_id: &str) -> Staff {
        Staff {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            full_name: "Jane Doe".to_string(),
            birthday: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: Gender::Female,
            status: StaffStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn create_request(staff_id: &str) -> CreateStaff {
        CreateStaff {
            staff_id: staff_id.to_string(),
            full_name: "Jane Doe".to_string(),
            birthday: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: Gender::Female,
        }
    }

    fn update_request(id: Uuid, staff_id: &str) -> UpdateStaff {
        UpdateStaff {
            id,
            staff_id: staff_id.to_string(),
            full_name: "Jane Smith".to_string(),
            birthday: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
            gender: Gender::Other,
        }
    }

    #[tokio::test]
    async fn add_rejects_duplicate_staff_id() {
        let mut repo = MockStaffRepository::new();
        repo.expect_staff_id_taken().returning(|_, _| Ok(true));
        repo.expect_insert().never();

        let output = repo_only(repo).add(create_request("S001")).await;

        assert!(matches!(output, Err(StaffServiceError::Conflict)));
    }

    #[tokio::test]
    async fn add_persists_active_record_and_returns_id() {
        let mut repo = MockStaffRepository::new();
        repo.expect_staff_id_taken()
            .withf(|staff_id, exclude| staff_id == "S001" && exclude.is_none())
            .returning(|_, _| Ok(false));

        let inserted = Arc::new(Mutex::new(None));
        let inserted_clone = inserted.clone();
        repo.expect_insert().returning(move |staff| {
            *inserted_clone.lock().unwrap() = Some(staff.clone());
            Ok(1)
        });

        let id = repo_only(repo).add(create_request(" S001 ")).await.unwrap();

        let staff = inserted.lock().unwrap().clone().unwrap();
        assert_eq!(staff.id, id);
        assert_eq!(staff.staff_id, "S001");
        assert_eq!(staff.status, StaffStatus::Active);
        assert!(staff.updated_at.is_none());
    }

    #[tokio::test]
    async fn add_reports_persistence_failure_on_zero_rows() {
        let mut repo = MockStaffRepository::new();
        repo.expect_staff_id_taken().returning(|_, _| Ok(false));
        repo.expect_insert().returning(|_| Ok(0));

        let output = repo_only(repo).add(create_request("S001")).await;

        assert!(matches!(output, Err(StaffServiceError::Persistence)));
    }

    #[tokio::test]
    async fn add_validates_before_touching_the_store() {
        let mut repo = MockStaffRepository::new();
        repo.expect_staff_id_taken().never();

        let mut request = create_request("S001");
        request.birthday = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        let output = repo_only(repo).add(request).await;

        assert!(matches!(output, Err(StaffServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let output = repo_only(repo)
            .update(update_request(Uuid::new_v4(), "S002"))
            .await;

        assert!(matches!(output, Err(StaffServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_refreshes_timestamp() {
        let existing = make_staff("S001");
        let id = existing.id;
        let created_at = existing.created_at;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_staff_id_taken().returning(|_, _| Ok(false));

        let saved = Arc::new(Mutex::new(None));
        let saved_clone = saved.clone();
        repo.expect_update_details().returning(move |staff| {
            *saved_clone.lock().unwrap() = Some(staff.clone());
            Ok(1)
        });

        let output = repo_only(repo).update(update_request(id, "S002")).await;
        assert_eq!(output.unwrap(), id);

        let staff = saved.lock().unwrap().clone().unwrap();
        assert_eq!(staff.staff_id, "S002");
        assert_eq!(staff.full_name, "Jane Smith");
        assert_eq!(staff.gender, Gender::Other);
        assert_eq!(staff.created_at, created_at);
        assert!(staff.updated_at.unwrap() >= created_at);
    }

    #[tokio::test]
    async fn update_to_taken_staff_id_conflicts() {
        let existing = make_staff("S001");
        let id = existing.id;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_staff_id_taken()
            .withf(move |staff_id, exclude| staff_id == "S002" && *exclude == Some(id))
            .returning(|_, _| Ok(true));
        repo.expect_update_details().never();

        let output = repo_only(repo).update(update_request(id, "S002")).await;

        assert!(matches!(output, Err(StaffServiceError::Conflict)));
    }

    #[tokio::test]
    async fn update_never_moves_updated_at_backwards() {
        let mut existing = make_staff("S001");
        let future = Utc::now() + chrono::Duration::hours(1);
        existing.updated_at = Some(future);
        let id = existing.id;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        let saved = Arc::new(Mutex::new(None));
        let saved_clone = saved.clone();
        repo.expect_update_details().returning(move |staff| {
            *saved_clone.lock().unwrap() = Some(staff.clone());
            Ok(1)
        });

        repo_only(repo)
            .update(update_request(id, "S001"))
            .await
            .unwrap();

        let staff = saved.lock().unwrap().clone().unwrap();
        assert_eq!(staff.updated_at, Some(future));
    }

    #[tokio::test]
    async fn update_leaves_status_to_the_store() {
        // Snapshot still says ACTIVE while a delete may already have landed.
        let existing = make_staff("S001");
        let id = existing.id;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_mark_deleted().never();
        repo.expect_update_details()
            .withf(move |staff| staff.id == id && staff.full_name == "Jane Smith")
            .times(1)
            .returning(|_| Ok(1));

        repo_only(repo)
            .update(update_request(id, "S001"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_flips_status_only() {
        let existing = make_staff("S001");
        let id = existing.id;
        let created_at = existing.created_at;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update_details().never();
        repo.expect_mark_deleted()
            .withf(move |target, at| *target == id && *at >= created_at)
            .times(1)
            .returning(|_, _| Ok(1));

        assert_eq!(repo_only(repo).delete(id).await.unwrap(), id);
    }

    #[tokio::test]
    async fn delete_never_moves_updated_at_backwards() {
        let mut existing = make_staff("S001");
        let future = Utc::now() + chrono::Duration::hours(1);
        existing.updated_at = Some(future);
        let id = existing.id;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_mark_deleted()
            .withf(move |_, at| *at == future)
            .returning(|_, _| Ok(1));

        repo_only(repo).delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_record_is_not_found() {
        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_mark_deleted().never();

        let output = repo_only(repo).delete(Uuid::new_v4()).await;

        assert!(matches!(output, Err(StaffServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_by_id_returns_deleted_records() {
        let mut deleted = make_staff("S001");
        deleted.status = StaffStatus::Deleted;
        let id = deleted.id;

        let mut repo = MockStaffRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(deleted.clone())));

        let output = repo_only(repo).get_by_id(id).await.unwrap();

        assert_eq!(output.id, id);
        assert_eq!(output.status, StaffStatus::Deleted);
    }

    #[tokio::test]
    async fn get_all_normalizes_paging() {
        let mut repo = MockStaffRepository::new();
        repo.expect_find_page()
            .withf(|_, page| page.page_number() == 1 && page.page_size() == 10)
            .returning(|_, page| Ok(Page::new(vec![], 0, page)));

        let query = StaffSearchQuery {
            page_number: Some(0),
            page_size: Some(0),
            ..Default::default()
        };
        let page = repo_only(repo).get_all(&query).await.unwrap();

        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 10);
    }

    #[tokio::test]
    async fn export_of_empty_page_is_no_content() {
        let mut repo = MockStaffRepository::new();
        repo.expect_find_page()
            .returning(|_, page| Ok(Page::new(vec![], 0, page)));

        let mut pdf = MockReportRenderer::new();
        pdf.expect_render().never();

        let output = make_service(repo, pdf, MockReportRenderer::new())
            .export_pdf(&StaffSearchQuery::default())
            .await;

        assert!(matches!(output, Err(StaffServiceError::NoContent)));
    }

    #[tokio::test]
    async fn export_renders_only_the_requested_page() {
        let rows = vec![make_staff("S001"), make_staff("S002")];
        let mut repo = MockStaffRepository::new();
        repo.expect_find_page()
            .returning(move |_, page| Ok(Page::new(rows.clone(), 40, page)));

        let mut excel = MockReportRenderer::new();
        excel
            .expect_render()
            .withf(|rows, meta| rows.len() == 2 && meta.filters == vec!["Gender: Female"])
            .returning(|_, _| Ok(b"PK-fake".to_vec()));

        let query = StaffSearchQuery {
            gender: Some(Gender::Female),
            page_size: Some(2),
            ..Default::default()
        };
        let file = make_service(repo, MockReportRenderer::new(), excel)
            .export_excel(&query)
            .await
            .unwrap();

        assert_eq!(file.format, ExportFormat::Excel);
        assert_eq!(file.bytes, b"PK-fake");
        assert!(file.file_name.ends_with(".xlsx"));
    }

    #[tokio::test]
    async fn export_surfaces_renderer_errors_as_rendering_failure() {
        let rows = vec![make_staff("S001")];
        let mut repo = MockStaffRepository::new();
        repo.expect_find_page()
            .returning(move |_, _| Ok(Page::new(rows.clone(), 1, PageRequest::default())));

        let mut pdf = MockReportRenderer::new();
        pdf.expect_render()
            .returning(|_, _| Err(ExportError::Pdf("font missing".into())));

        let output = make_service(repo, pdf, MockReportRenderer::new())
            .export_pdf(&StaffSearchQuery::default())
            .await;

        match output {
            Err(StaffServiceError::Rendering(message)) => {
                assert_eq!(message, "Error generating PDF: font missing");
            }
            other => panic!("expected rendering failure, got {other:?}"),
        }
    }
}
