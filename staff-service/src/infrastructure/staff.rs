use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    pagination::{Page, PageRequest},
    types::{Staff, StaffStatus},
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    domain::staff::{StaffFilter, StaffRepository},
    error::StaffServiceError,
};

const STAFF_COLUMNS: &str =
    "id, staff_id, full_name, birthday, gender, status, created_at, updated_at";

pub struct PgStaffRepository {
    pool: PgPool,
}

impl PgStaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends `status = ACTIVE` and the optional predicates of `filter`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &StaffFilter) {
    builder.push(" WHERE status = ").push_bind(StaffStatus::Active);

    if let Some(staff_id) = &filter.staff_id {
        builder
            .push(" AND strpos(staff_id, ")
            .push_bind(staff_id.clone())
            .push(") > 0");
    }
    if let Some(gender) = filter.gender {
        builder.push(" AND gender = ").push_bind(gender);
    }
    if let Some(from) = filter.birthday_from {
        builder.push(" AND birthday >= ").push_bind(from);
    }
    if let Some(to) = filter.birthday_to {
        builder.push(" AND birthday <= ").push_bind(to);
    }
}

/// The partial unique index on active `staff_id`s rejected the write.
fn map_write_error(err: sqlx::Error) -> StaffServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            tracing::warn!("Unique index rejected staff write: {db_err}");
            StaffServiceError::Conflict
        }
        _ => StaffServiceError::Database(err),
    }
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, StaffServiceError> {
        let output = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(output)
    }

    #[tracing::instrument(skip(self))]
    async fn staff_id_taken(
        &self,
        staff_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StaffServiceError> {
        let output = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM staff
                WHERE staff_id = $1
                  AND status = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(staff_id)
        .bind(StaffStatus::Active)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(output)
    }

    #[tracing::instrument(skip(self, staff), fields(id = %staff.id))]
    async fn insert(&self, staff: &Staff) -> Result<u64, StaffServiceError> {
        let output = sqlx::query(
            r#"
            INSERT INTO staff (id, staff_id, full_name, birthday, gender, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(staff.id)
        .bind(&staff.staff_id)
        .bind(&staff.full_name)
        .bind(staff.birthday)
        .bind(staff.gender)
        .bind(staff.status)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(output.rows_affected())
    }

    #[tracing::instrument(skip(self, staff), fields(id = %staff.id))]
    async fn update_details(&self, staff: &Staff) -> Result<u64, StaffServiceError> {
        let output = sqlx::query(
            r#"
            UPDATE staff
            SET staff_id = $2,
                full_name = $3,
                birthday = $4,
                gender = $5,
                updated_at = GREATEST(updated_at, $6)
            WHERE id = $1
            "#,
        )
        .bind(staff.id)
        .bind(&staff.staff_id)
        .bind(&staff.full_name)
        .bind(staff.birthday)
        .bind(staff.gender)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(output.rows_affected())
    }

    #[tracing::instrument(skip(self))]
    async fn mark_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<u64, StaffServiceError> {
        let output = sqlx::query(
            r#"
            UPDATE staff
            SET status = $2,
                updated_at = GREATEST(updated_at, $3)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(StaffStatus::Deleted)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(output.rows_affected())
    }

    #[tracing::instrument(skip(self))]
    async fn find_page(
        &self,
        filter: &StaffFilter,
        page: PageRequest,
    ) -> Result<Page<Staff>, StaffServiceError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM staff");
        push_filters(&mut count, filter);
        let total_count = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {STAFF_COLUMNS} FROM staff"));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.page_size())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = select
            .build_query_as::<Staff>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total_count, page))
    }

    async fn ping(&self) -> Result<(), StaffServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, error::Error as StdError, fmt};

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct PgRejection {
        unique: bool,
    }

    impl fmt::Display for PgRejection {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl StdError for PgRejection {}

    impl DatabaseError for PgRejection {
        fn message(&self) -> &str {
            if self.unique {
                "duplicate key value violates unique constraint \"ux_staff_active_staff_id\""
            } else {
                "value too long for type character varying(8)"
            }
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(if self.unique { "23505" } else { "22001" }))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    #[test]
    fn unique_violation_is_a_conflict() {
        let err = sqlx::Error::Database(Box::new(PgRejection { unique: true }));

        assert!(matches!(map_write_error(err), StaffServiceError::Conflict));
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let err = sqlx::Error::Database(Box::new(PgRejection { unique: false }));

        assert!(matches!(
            map_write_error(err),
            StaffServiceError::Database(sqlx::Error::Database(_))
        ));
    }

    #[test]
    fn non_database_errors_pass_through() {
        assert!(matches!(
            map_write_error(sqlx::Error::PoolTimedOut),
            StaffServiceError::Database(sqlx::Error::PoolTimedOut)
        ));
    }
}
