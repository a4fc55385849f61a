//! Book instances and loans service

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{
            default_renewal_date, BookInstanceDetails, BookInstanceForm, InstanceFilter, RenewBookForm,
            RenewBookPage,
        },
        pagination::{Page, PageQuery, PageWindow},
        validation::{invalid_choice, FormErrors},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    page_size: i64,
}

impl LoansService {
    pub fn new(repository: Repository, page_size: i64) -> Self {
        Self { repository, page_size }
    }

    // =========================================================================
    // INSTANCES
    // =========================================================================

    pub async fn list_instances(&self, filter: &InstanceFilter, page: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.instances.count(filter).await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let instances = self
            .repository
            .instances
            .list(filter, window.limit(), window.offset())
            .await?;
        Ok(window.wrap(instances, total))
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.instances.get_by_id(id).await
    }

    pub async fn instance_form(&self, id: Uuid) -> AppResult<BookInstanceForm> {
        let instance = self.repository.instances.get_by_id(id).await?;
        Ok(BookInstanceForm::from(&instance))
    }

    pub async fn create_instance(&self, mut form: BookInstanceForm) -> AppResult<BookInstanceDetails> {
        self.validate_instance(&mut form).await?;
        let id = self.repository.instances.create(&form).await?;
        tracing::info!("Created book instance {} ({:?})", id, form.status);
        self.repository.instances.get_by_id(id).await
    }

    pub async fn update_instance(&self, id: Uuid, mut form: BookInstanceForm) -> AppResult<BookInstanceDetails> {
        self.repository.instances.get_by_id(id).await?;
        self.validate_instance(&mut form).await?;
        self.repository.instances.update(id, &form).await?;
        tracing::info!("Updated book instance {} ({:?})", id, form.status);
        self.repository.instances.get_by_id(id).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await?;
        tracing::info!("Deleted book instance {}", id);
        Ok(())
    }

    async fn validate_instance(&self, form: &mut BookInstanceForm) -> AppResult<()> {
        let mut errors = FormErrors::from(form.clean());

        if let Some(book_id) = form.book_id {
            if !self.repository.books.exists(book_id).await? {
                errors.push("book_id", invalid_choice(book_id));
            }
        }
        if let Some(publisher_id) = form.publisher_id {
            if !self.repository.publishers.exists(publisher_id).await? {
                errors.push("publisher_id", invalid_choice(publisher_id));
            }
        }
        if let Some(borrower_id) = form.borrower_id {
            if !self.repository.users.exists(borrower_id).await? {
                errors.push("borrower_id", invalid_choice(borrower_id));
            }
        }

        errors.into_result()
    }

    // =========================================================================
    // RENEWAL
    // =========================================================================

    /// The copy to renew and the date proposed by default
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewBookPage> {
        let instance = self.repository.instances.get_by_id(id).await?;
        Ok(RenewBookPage {
            instance,
            renewal_date: default_renewal_date(today),
        })
    }

    /// Move the due-back date of a copy. The status is not changed.
    pub async fn renew(&self, id: Uuid, form: &RenewBookForm, today: NaiveDate) -> AppResult<BookInstanceDetails> {
        let instance = self.repository.instances.get_by_id(id).await?;

        let due_back = form.clean(today).map_err(|e| {
            tracing::debug!("Renewal of {} rejected: {}", id, e.message);
            AppError::Form(vec![e])
        })?;

        self.repository.instances.set_due_back(id, due_back).await?;
        tracing::info!(
            "Renewed book instance {}: due back {:?} -> {}",
            id,
            instance.due_back,
            due_back
        );
        self.repository.instances.get_by_id(id).await
    }

    // =========================================================================
    // BORROWED LISTS
    // =========================================================================

    /// Copies on loan to `user_id`, soonest due first
    pub async fn my_borrowed(&self, user_id: i64, page: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        self.on_loan(Some(user_id), page).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_borrowed(&self, page: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        self.on_loan(None, page).await
    }

    async fn on_loan(&self, borrower_id: Option<i64>, page: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.instances.count_on_loan(borrower_id).await?;
        let window = PageWindow::resolve(page, total, self.page_size)?;
        let instances = self
            .repository
            .instances
            .list_on_loan(borrower_id, window.limit(), window.offset())
            .await?;
        Ok(window.wrap(instances, total))
    }
}
