//! Book instances repository for database operations

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use super::is_foreign_key_violation;
use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        is_overdue, BookInstanceDetails, BookInstanceForm, InstanceFilter, LoanStatus,
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
           bi.publisher_id, p.name AS publisher_name,
           bi.due_back, bi.status, bi.borrower_id, u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN publishers p ON p.id = bi.publisher_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Sqlite>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get an instance with its book, publisher and borrower
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let sql = format!("{} WHERE bi.id = $1", DETAILS_SELECT);
        let mut instance = sqlx::query_as::<_, BookInstanceDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        instance.is_overdue = is_overdue(instance.due_back, Utc::now().date_naive());
        Ok(instance)
    }

    pub async fn count(&self, filter: &InstanceFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE ($1 IS NULL OR status = $1)",
        )
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// One page of instances, ordered by due-back date with undated copies last
    pub async fn list(&self, filter: &InstanceFilter, limit: i64, offset: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let sql = format!(
            "{} WHERE ($1 IS NULL OR bi.status = $1) ORDER BY bi.due_back IS NULL, bi.due_back, b.title LIMIT $2 OFFSET $3",
            DETAILS_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&sql)
            .bind(filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(mark_overdue(instances))
    }

    pub async fn list_for_book(&self, book_id: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let sql = format!("{} WHERE bi.book_id = $1 ORDER BY bi.due_back IS NULL, bi.due_back", DETAILS_SELECT);
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&sql)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(mark_overdue(instances))
    }

    pub async fn list_for_publisher(&self, publisher_id: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let sql = format!("{} WHERE bi.publisher_id = $1 ORDER BY bi.due_back IS NULL, bi.due_back", DETAILS_SELECT);
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&sql)
            .bind(publisher_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(mark_overdue(instances))
    }

    // =========================================================================
    // LOANS
    // =========================================================================

    /// Count on-loan copies, optionally for a single borrower
    pub async fn count_on_loan(&self, borrower_id: Option<i64>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2 IS NULL OR borrower_id = $2)",
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// On-loan copies ordered by due-back date ascending, optionally for a single borrower
    pub async fn list_on_loan(
        &self,
        borrower_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstanceDetails>> {
        let sql = format!(
            "{} WHERE bi.status = $1 AND ($2 IS NULL OR bi.borrower_id = $2) ORDER BY bi.due_back IS NULL, bi.due_back, bi.id LIMIT $3 OFFSET $4",
            DETAILS_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&sql)
            .bind(LoanStatus::OnLoan)
            .bind(borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(mark_overdue(instances))
    }

    /// Move the due-back date; the status is left untouched
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a copy under a freshly generated identifier
    pub async fn create(&self, form: &BookInstanceForm) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, publisher_id, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(form.book_id)
        .bind(&form.imprint)
        .bind(form.publisher_id)
        .bind(form.due_back)
        .bind(form.status)
        .bind(form.borrower_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(id)
    }

    pub async fn update(&self, id: Uuid, form: &BookInstanceForm) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $1, imprint = $2, publisher_id = $3, due_back = $4, status = $5, borrower_id = $6
            WHERE id = $7
            "#,
        )
        .bind(form.book_id)
        .bind(&form.imprint)
        .bind(form.publisher_id)
        .bind(form.due_back)
        .bind(form.status)
        .bind(form.borrower_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // COUNTS
    // =========================================================================

    pub async fn count_all(&self) -> AppResult<i64> {
        self.count(&InstanceFilter::default()).await
    }

    pub async fn count_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        self.count(&InstanceFilter { status: Some(status) }).await
    }
}

fn mark_overdue(mut instances: Vec<BookInstanceDetails>) -> Vec<BookInstanceDetails> {
    let today = Utc::now().date_naive();
    for instance in instances.iter_mut() {
        instance.is_overdue = is_overdue(instance.due_back, today);
    }
    instances
}

fn map_write_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::BadRequest("Referenced book, publisher or borrower does not exist".to_string())
    } else {
        AppError::Database(err)
    }
}
