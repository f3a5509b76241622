//! Admin repository.

use std::sync::Arc;

use crate::entities::{Admin, admin};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use shoutly_common::{AppError, AppResult};

/// Admin repository for database operations.
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminRepository {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an admin by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<admin::Model>> {
        Admin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an admin by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<admin::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
    }

    /// Find an admin by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new admin.
    pub async fn create(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all admins.
    pub async fn count_all(&self) -> AppResult<u64> {
        Admin::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
