//! Shoutout repository.
//!
//! Also hosts the public catalog search, which runs against active
//! listings joined with their creators so listing-level filters and
//! creator-level sort options share one query.

use std::sync::Arc;

use crate::entities::{Shoutout, creator, shoutout};
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, Order as SortOrder,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, sea_query::Expr,
};
use shoutly_common::{AppError, AppResult};

/// Catalog sort options for the public creator search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSort {
    /// Cheapest listing rows first.
    PriceAsc,
    /// Most expensive listing rows first.
    PriceDesc,
    /// Fastest promised delivery first.
    DeliveryTime,
    /// Most recently registered creators first.
    Newest,
    /// Sponsored creators first (default).
    #[default]
    SponsoredFirst,
}

impl CatalogSort {
    /// Parse a wire value, falling back to the default ordering.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("delivery_time") => Self::DeliveryTime,
            Some("newest") => Self::Newest,
            _ => Self::SponsoredFirst,
        }
    }
}

/// Filters for the public catalog search.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Text match over creator display/first/last name.
    pub query: Option<String>,
    /// Restrict to listings of this shoutout type.
    pub shoutout_type_id: Option<String>,
    /// Minimum listing price.
    pub min_price: Option<Decimal>,
    /// Maximum listing price.
    pub max_price: Option<Decimal>,
    /// Maximum promised delivery time in hours.
    pub max_delivery_time: Option<i32>,
    /// Row ordering.
    pub sort: CatalogSort,
}

impl CatalogFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all().add(shoutout::Column::IsActive.eq(true));

        if let Some(query) = &self.query {
            let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::col((creator::Entity, creator::Column::DisplayName))
                            .ilike(pattern.as_str()),
                    )
                    .add(
                        Expr::col((creator::Entity, creator::Column::FirstName))
                            .ilike(pattern.as_str()),
                    )
                    .add(
                        Expr::col((creator::Entity, creator::Column::LastName))
                            .ilike(pattern.as_str()),
                    ),
            );
        }
        if let Some(type_id) = &self.shoutout_type_id {
            condition = condition.add(shoutout::Column::ShoutoutTypeId.eq(type_id.clone()));
        }
        if let Some(min) = self.min_price {
            condition = condition.add(shoutout::Column::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            condition = condition.add(shoutout::Column::Price.lte(max));
        }
        if let Some(hours) = self.max_delivery_time {
            condition = condition.add(shoutout::Column::DeliveryTime.lte(hours));
        }

        condition
    }
}

/// Shoutout repository for database operations.
#[derive(Clone)]
pub struct ShoutoutRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoutoutRepository {
    /// Create a new shoutout repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a shoutout by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<shoutout::Model>> {
        Shoutout::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a shoutout by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<shoutout::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shoutout not found".to_string()))
    }

    /// Find an active shoutout by ID (orderable listings only).
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<shoutout::Model>> {
        Shoutout::find_by_id(id)
            .filter(shoutout::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a creator's own shoutout by ID, active or not.
    pub async fn find_owned(
        &self,
        id: &str,
        creator_id: &str,
    ) -> AppResult<Option<shoutout::Model>> {
        Shoutout::find_by_id(id)
            .filter(shoutout::Column::CreatorId.eq(creator_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find shoutouts by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<shoutout::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Shoutout::find()
            .filter(shoutout::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new shoutout.
    pub async fn create(&self, model: shoutout::ActiveModel) -> AppResult<shoutout::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a shoutout.
    pub async fn update(&self, model: shoutout::ActiveModel) -> AppResult<shoutout::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a creator's shoutouts, newest first (active and inactive).
    pub async fn list_by_creator(
        &self,
        creator_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<shoutout::Model>> {
        Shoutout::find()
            .filter(shoutout::Column::CreatorId.eq(creator_id))
            .order_by_desc(shoutout::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's shoutouts (active and inactive).
    pub async fn count_by_creator(&self, creator_id: &str) -> AppResult<u64> {
        Shoutout::find()
            .filter(shoutout::Column::CreatorId.eq(creator_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a creator's active shoutouts, cheapest first (public profile).
    pub async fn list_active_by_creator(&self, creator_id: &str) -> AppResult<Vec<shoutout::Model>> {
        Shoutout::find()
            .filter(shoutout::Column::CreatorId.eq(creator_id))
            .filter(shoutout::Column::IsActive.eq(true))
            .order_by_asc(shoutout::Column::Price)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's active shoutouts.
    pub async fn count_active_by_creator(&self, creator_id: &str) -> AppResult<u64> {
        Shoutout::find()
            .filter(shoutout::Column::CreatorId.eq(creator_id))
            .filter(shoutout::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search active listings joined with their creators for the public
    /// catalog. Rows are (listing, creator) pairs; callers group rows
    /// into creator cards preserving row order.
    pub async fn search_catalog(
        &self,
        filter: &CatalogFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<(shoutout::Model, Option<creator::Model>)>> {
        let mut query = Shoutout::find()
            .find_also_related(creator::Entity)
            .filter(filter.condition());

        query = match filter.sort {
            CatalogSort::PriceAsc => query.order_by(shoutout::Column::Price, SortOrder::Asc),
            CatalogSort::PriceDesc => query.order_by(shoutout::Column::Price, SortOrder::Desc),
            CatalogSort::DeliveryTime => {
                query.order_by(shoutout::Column::DeliveryTime, SortOrder::Asc)
            }
            CatalogSort::Newest => query.order_by(creator::Column::CreatedAt, SortOrder::Desc),
            CatalogSort::SponsoredFirst => {
                query.order_by(creator::Column::IsSponsored, SortOrder::Desc)
            }
        };

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count catalog rows matching the filter.
    pub async fn count_catalog(&self, filter: &CatalogFilter) -> AppResult<u64> {
        Shoutout::find()
            .join(JoinType::InnerJoin, shoutout::Relation::Creator.def())
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
