//! Public catalog and listing management: the shoutout type taxonomy,
//! creators' own listings, the browse/search endpoint, and public
//! creator profiles.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shoutly_common::{AppError, AppResult, IdGenerator, is_valid_id};
use shoutly_db::{
    entities::{activity_log::ActorType, creator, shoutout, shoutout_type},
    repositories::{
        CatalogFilter, CatalogSort, CreatorRepository, ShoutoutRepository, ShoutoutTypeRepository,
    },
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 50;

/// Listing price bounds in dollars.
const MAX_PRICE_DOLLARS: i64 = 10_000;

/// Longest promised delivery window, in hours (30 days).
const MAX_DELIVERY_HOURS: i32 = 720;

/// Taxonomy rows inserted into an empty catalog on first start.
const DEFAULT_TYPES: [(&str, &str); 6] = [
    (
        "Video Shoutout",
        "Personalized video message for special occasions, birthdays, or greetings",
    ),
    ("Audio Shoutout", "Custom audio message or voice recording"),
    ("Social Media Post", "Dedicated post on social media platforms"),
    (
        "Live Stream Mention",
        "Mention or shoutout during live streaming session",
    ),
    (
        "Custom Content",
        "Unique content creation based on specific requirements",
    ),
    (
        "Brand Endorsement",
        "Product or service endorsement and promotional content",
    ),
];

/// Catalog service: taxonomy, listings, and the public storefront.
#[derive(Clone)]
pub struct CatalogService {
    shoutout_repo: ShoutoutRepository,
    type_repo: ShoutoutTypeRepository,
    creator_repo: CreatorRepository,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

/// Payload for creating or replacing a listing.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShoutoutInput {
    pub shoutout_type_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    pub price: Decimal,

    pub delivery_time: i32,
}

/// Shoutout type as exposed to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShoutoutTypeInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<shoutout_type::Model> for ShoutoutTypeInfo {
    fn from(model: shoutout_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

/// Creator-facing view of a listing with its type annotation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShoutoutDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub delivery_time: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub shoutout_type: Option<ShoutoutTypeInfo>,
}

impl ShoutoutDetail {
    fn new(model: shoutout::Model, shoutout_type: Option<ShoutoutTypeInfo>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            delivery_time: model.delivery_time,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            shoutout_type,
        }
    }
}

/// One page of a creator's own listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoutoutList {
    pub shoutouts: Vec<ShoutoutDetail>,
    pub pagination: CatalogPagination,
}

/// Browse/search query for the public catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub query: Option<String>,
    pub shoutout_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub max_delivery_time: Option<i32>,
    pub sort_by: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Public view of a listing inside a creator card.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogShoutout {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub delivery_time: i32,
    pub shoutout_type: Option<ShoutoutTypeInfo>,
}

impl CatalogShoutout {
    fn new(model: shoutout::Model, shoutout_type: Option<ShoutoutTypeInfo>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            delivery_time: model.delivery_time,
            shoutout_type,
        }
    }
}

/// A creator in the public catalog with their matched listings.
///
/// Carries only fields safe to show to anonymous visitors.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorCard {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_sponsored: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub shoutouts: Vec<CatalogShoutout>,
}

impl CreatorCard {
    fn new(creator: creator::Model) -> Self {
        Self {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
            display_name: creator.display_name,
            avatar: creator.avatar,
            bio: creator.bio,
            is_verified: creator.is_verified,
            is_sponsored: creator.is_sponsored,
            created_at: creator.created_at,
            shoutouts: Vec::new(),
        }
    }
}

/// One page of the public catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub creators: Vec<CreatorCard>,
    pub pagination: CatalogPagination,
}

/// Pagination envelope for catalog-side pages.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl CatalogPagination {
    fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(
        shoutout_repo: ShoutoutRepository,
        type_repo: ShoutoutTypeRepository,
        creator_repo: CreatorRepository,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            shoutout_repo,
            type_repo,
            creator_repo,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the shoutout type taxonomy, name ascending.
    pub async fn list_types(&self) -> AppResult<Vec<ShoutoutTypeInfo>> {
        let types = self.type_repo.list_all().await?;
        Ok(types.into_iter().map(Into::into).collect())
    }

    /// Insert the default shoutout types when the catalog is empty.
    ///
    /// Returns the number of rows inserted; zero when any types already
    /// exist, so startup can call this unconditionally.
    pub async fn seed_default_types(&self) -> AppResult<usize> {
        if self.type_repo.count_all().await? > 0 {
            return Ok(0);
        }

        for (name, description) in DEFAULT_TYPES {
            let model = shoutout_type::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                created_at: Set(Utc::now().into()),
            };
            self.type_repo.create(model).await?;
        }

        tracing::info!(count = DEFAULT_TYPES.len(), "Seeded default shoutout types");
        Ok(DEFAULT_TYPES.len())
    }

    /// Create a listing for a creator. New listings start active.
    pub async fn create_shoutout(
        &self,
        creator_id: &str,
        input: ShoutoutInput,
        client: &ClientInfo,
    ) -> AppResult<ShoutoutDetail> {
        input.validate()?;
        validate_listing(&input)?;

        let shoutout_type = self
            .type_repo
            .find_by_id(&input.shoutout_type_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid shoutout type".to_string()))?;

        let now = Utc::now();
        let model = shoutout::ActiveModel {
            id: Set(self.id_gen.generate()),
            creator_id: Set(creator_id.to_string()),
            shoutout_type_id: Set(shoutout_type.id.clone()),
            title: Set(input.title),
            description: Set(input.description),
            price: Set(input.price),
            delivery_time: Set(input.delivery_time),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = self.shoutout_repo.create(model).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::SHOUTOUT_CREATED,
                format!("Shoutout created: {}", created.title),
                client,
                Some(json!({ "shoutoutId": created.id })),
            )
            .await;

        tracing::info!(shoutout_id = %created.id, creator_id = %creator_id, "Shoutout created");

        Ok(ShoutoutDetail::new(created, Some(shoutout_type.into())))
    }

    /// List a creator's own listings, newest first, active and inactive.
    pub async fn list_shoutouts(
        &self,
        creator_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<ShoutoutList> {
        let (page, limit, offset) = page_params(page, limit);

        let listings = self
            .shoutout_repo
            .list_by_creator(creator_id, limit, offset)
            .await?;
        let total = self.shoutout_repo.count_by_creator(creator_id).await?;
        let types = self
            .type_annotations(listings.iter().map(|s| s.shoutout_type_id.clone()).collect())
            .await?;

        let shoutouts = listings
            .into_iter()
            .map(|s| {
                let info = types.get(&s.shoutout_type_id).cloned();
                ShoutoutDetail::new(s, info)
            })
            .collect();

        Ok(ShoutoutList {
            shoutouts,
            pagination: CatalogPagination::new(page, limit, total),
        })
    }

    /// Fetch one of the creator's own listings.
    pub async fn shoutout_detail(
        &self,
        creator_id: &str,
        shoutout_id: &str,
    ) -> AppResult<ShoutoutDetail> {
        let listing = self
            .shoutout_repo
            .find_owned(shoutout_id, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shoutout not found".to_string()))?;

        let shoutout_type = self
            .type_repo
            .find_by_id(&listing.shoutout_type_id)
            .await?
            .map(Into::into);

        Ok(ShoutoutDetail::new(listing, shoutout_type))
    }

    /// Replace a listing's fields. Does not touch the active flag.
    pub async fn update_shoutout(
        &self,
        creator_id: &str,
        shoutout_id: &str,
        input: ShoutoutInput,
        client: &ClientInfo,
    ) -> AppResult<ShoutoutDetail> {
        input.validate()?;
        validate_listing(&input)?;

        let listing = self
            .shoutout_repo
            .find_owned(shoutout_id, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shoutout not found".to_string()))?;

        let shoutout_type = self
            .type_repo
            .find_by_id(&input.shoutout_type_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid shoutout type".to_string()))?;

        let mut active: shoutout::ActiveModel = listing.into();
        active.shoutout_type_id = Set(shoutout_type.id.clone());
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.price = Set(input.price);
        active.delivery_time = Set(input.delivery_time);
        active.updated_at = Set(Utc::now().into());
        let updated = self.shoutout_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::SHOUTOUT_UPDATED,
                format!("Shoutout updated: {}", updated.title),
                client,
                Some(json!({ "shoutoutId": updated.id })),
            )
            .await;

        Ok(ShoutoutDetail::new(updated, Some(shoutout_type.into())))
    }

    /// Soft-delete a listing: it disappears from the catalog but stays
    /// attached to past orders.
    pub async fn delete_shoutout(
        &self,
        creator_id: &str,
        shoutout_id: &str,
        client: &ClientInfo,
    ) -> AppResult<()> {
        let listing = self
            .shoutout_repo
            .find_owned(shoutout_id, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shoutout not found".to_string()))?;

        let mut active: shoutout::ActiveModel = listing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = self.shoutout_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::SHOUTOUT_DELETED,
                format!("Shoutout deleted: {}", updated.title),
                client,
                Some(json!({ "shoutoutId": updated.id })),
            )
            .await;

        Ok(())
    }

    /// Browse the public catalog: active listings filtered and sorted,
    /// grouped into creator cards preserving row order.
    pub async fn search(&self, query: CatalogQuery) -> AppResult<CatalogPage> {
        let (page, limit, offset) = page_params(query.page, query.limit);
        let filter = CatalogFilter {
            query: query.query,
            shoutout_type_id: query.shoutout_type,
            min_price: query.min_price,
            max_price: query.max_price,
            max_delivery_time: query.max_delivery_time,
            sort: CatalogSort::parse(query.sort_by.as_deref()),
        };

        let rows = self.shoutout_repo.search_catalog(&filter, limit, offset).await?;
        let total = self.shoutout_repo.count_catalog(&filter).await?;

        let types = self
            .type_annotations(rows.iter().map(|(s, _)| s.shoutout_type_id.clone()).collect())
            .await?;
        let creators = group_cards(rows, &types);

        Ok(CatalogPage {
            creators,
            pagination: CatalogPagination::new(page, limit, total),
        })
    }

    /// Public creator profile with active listings, cheapest first.
    pub async fn creator_profile(&self, creator_id: &str) -> AppResult<CreatorCard> {
        if !is_valid_id(creator_id) {
            return Err(AppError::BadRequest("Invalid creator ID format".to_string()));
        }

        let creator = self
            .creator_repo
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))?;

        let listings = self.shoutout_repo.list_active_by_creator(creator_id).await?;
        let types = self
            .type_annotations(listings.iter().map(|s| s.shoutout_type_id.clone()).collect())
            .await?;

        let mut card = CreatorCard::new(creator);
        card.shoutouts = listings
            .into_iter()
            .map(|s| {
                let info = types.get(&s.shoutout_type_id).cloned();
                CatalogShoutout::new(s, info)
            })
            .collect();

        Ok(card)
    }

    /// Batch-resolve type annotations for a set of listings.
    async fn type_annotations(
        &self,
        type_ids: Vec<String>,
    ) -> AppResult<HashMap<String, ShoutoutTypeInfo>> {
        let types = self.type_repo.find_by_ids(&type_ids).await?;
        Ok(types.into_iter().map(|t| (t.id.clone(), t.into())).collect())
    }
}

/// Price and delivery-window checks shared by create and update.
fn validate_listing(input: &ShoutoutInput) -> AppResult<()> {
    if input.price < Decimal::ONE {
        return Err(AppError::Validation(
            "Price must be at least $1".to_string(),
        ));
    }
    if input.price > Decimal::from(MAX_PRICE_DOLLARS) {
        return Err(AppError::Validation(
            "Price cannot exceed $10,000".to_string(),
        ));
    }
    if input.delivery_time < 1 {
        return Err(AppError::Validation(
            "Delivery time must be at least 1 hour".to_string(),
        ));
    }
    if input.delivery_time > MAX_DELIVERY_HOURS {
        return Err(AppError::Validation(
            "Delivery time cannot exceed 30 days".to_string(),
        ));
    }
    Ok(())
}

fn page_params(page: Option<u64>, limit: Option<u64>) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

/// Group catalog rows into creator cards, preserving row order for
/// both cards and the listings inside each card.
fn group_cards(
    rows: Vec<(shoutout::Model, Option<creator::Model>)>,
    types: &HashMap<String, ShoutoutTypeInfo>,
) -> Vec<CreatorCard> {
    let mut cards: Vec<CreatorCard> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (listing, creator) in rows {
        let Some(creator) = creator else { continue };

        let info = types.get(&listing.shoutout_type_id).cloned();
        let entry = CatalogShoutout::new(listing, info);

        match positions.get(&creator.id).copied() {
            Some(i) => cards[i].shoutouts.push(entry),
            None => {
                positions.insert(creator.id.clone(), cards.len());
                let mut card = CreatorCard::new(creator);
                card.shoutouts.push(entry);
                cards.push(card);
            }
        }
    }

    cards
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shoutly_db::repositories::ActivityLogRepository;
    use std::sync::Arc;

    fn create_test_type(id: &str, name: &str) -> shoutout_type::Model {
        shoutout_type::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(format!("{name} description")),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_shoutout(id: &str, creator_id: &str, type_id: &str) -> shoutout::Model {
        shoutout::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            shoutout_type_id: type_id.to_string(),
            title: "Birthday greeting".to_string(),
            description: "A personalized video".to_string(),
            price: dec!(50),
            delivery_time: 48,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_creator(id: &str, display_name: &str) -> creator::Model {
        creator::Model {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Creator".to_string(),
            display_name: display_name.to_string(),
            email: format!("{display_name}@example.com"),
            password: "hashed".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "US".to_string(),
            avatar: None,
            bio: None,
            is_verified: false,
            is_sponsored: false,
            commission_rate: dec!(15.00),
            withdrawal_permission: true,
            total_earnings: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            payout_method: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_service(
        shoutout_db: Arc<sea_orm::DatabaseConnection>,
        type_db: Arc<sea_orm::DatabaseConnection>,
        creator_db: Arc<sea_orm::DatabaseConnection>,
    ) -> CatalogService {
        CatalogService::new(
            ShoutoutRepository::new(shoutout_db),
            ShoutoutTypeRepository::new(type_db),
            CreatorRepository::new(creator_db),
            ActivityLogService::new(ActivityLogRepository::new(empty_mock())),
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn listing_input(type_id: &str) -> ShoutoutInput {
        ShoutoutInput {
            shoutout_type_id: type_id.to_string(),
            title: "Birthday greeting".to_string(),
            description: "A personalized video".to_string(),
            price: dec!(50),
            delivery_time: 48,
        }
    }

    #[tokio::test]
    async fn test_list_types() {
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_type("type1", "Audio Shoutout"),
                    create_test_type("type2", "Video Shoutout"),
                ]])
                .into_connection(),
        );

        let service = create_test_service(empty_mock(), type_db, empty_mock());
        let types = service.list_types().await.unwrap();

        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name, "Audio Shoutout");
    }

    #[tokio::test]
    async fn test_seed_skips_populated_catalog() {
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(4)]])
                .into_connection(),
        );

        let service = create_test_service(empty_mock(), type_db, empty_mock());
        let inserted = service.seed_default_types().await.unwrap();

        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_seed_inserts_default_types() {
        let rows: Vec<Vec<shoutout_type::Model>> = DEFAULT_TYPES
            .iter()
            .map(|(name, _)| vec![create_test_type("type1", name)])
            .collect();

        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .append_query_results(rows)
                .append_exec_results(vec![
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    };
                    DEFAULT_TYPES.len()
                ])
                .into_connection(),
        );

        let service = create_test_service(empty_mock(), type_db, empty_mock());
        let inserted = service.seed_default_types().await.unwrap();

        assert_eq!(inserted, DEFAULT_TYPES.len());
    }

    #[tokio::test]
    async fn test_create_shoutout_rejects_unknown_type() {
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<shoutout_type::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(empty_mock(), type_db, empty_mock());
        let result = service
            .create_shoutout("creator1", listing_input("missing"), &ClientInfo::default())
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid shoutout type"),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_create_shoutout_rejects_price_above_cap() {
        let service = create_test_service(empty_mock(), empty_mock(), empty_mock());

        let mut input = listing_input("type1");
        input.price = dec!(10001);
        let result = service
            .create_shoutout("creator1", input, &ClientInfo::default())
            .await;

        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Price cannot exceed $10,000"),
            _ => panic!("Expected validation error"),
        }
    }

    #[tokio::test]
    async fn test_create_shoutout_rejects_slow_delivery() {
        let service = create_test_service(empty_mock(), empty_mock(), empty_mock());

        let mut input = listing_input("type1");
        input.delivery_time = 721;
        let result = service
            .create_shoutout("creator1", input, &ClientInfo::default())
            .await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Delivery time cannot exceed 30 days");
            }
            _ => panic!("Expected validation error"),
        }
    }

    #[tokio::test]
    async fn test_create_shoutout_activates_listing() {
        let created = create_test_shoutout("shoutout1", "creator1", "type1");

        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_type("type1", "Video Shoutout")]])
                .into_connection(),
        );

        let service = create_test_service(shoutout_db, type_db, empty_mock());
        let detail = service
            .create_shoutout("creator1", listing_input("type1"), &ClientInfo::default())
            .await
            .unwrap();

        assert!(detail.is_active);
        assert_eq!(detail.shoutout_type.unwrap().name, "Video Shoutout");
    }

    #[tokio::test]
    async fn test_update_shoutout_missing() {
        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<shoutout::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(shoutout_db, empty_mock(), empty_mock());
        let result = service
            .update_shoutout(
                "creator1",
                "shoutout1",
                listing_input("type1"),
                &ClientInfo::default(),
            )
            .await;

        match result {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Shoutout not found"),
            _ => panic!("Expected not found error"),
        }
    }

    #[tokio::test]
    async fn test_delete_shoutout_soft_deactivates() {
        let listing = create_test_shoutout("shoutout1", "creator1", "type1");
        let mut deactivated = listing.clone();
        deactivated.is_active = false;

        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[listing]])
                .append_query_results([[deactivated]])
                .into_connection(),
        );

        let service = create_test_service(shoutout_db, empty_mock(), empty_mock());
        let result = service
            .delete_shoutout("creator1", "shoutout1", &ClientInfo::default())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_list_shoutouts_annotates_types() {
        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_shoutout("shoutout1", "creator1", "type1")]])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_type("type1", "Video Shoutout")]])
                .into_connection(),
        );

        let service = create_test_service(shoutout_db, type_db, empty_mock());
        let list = service.list_shoutouts("creator1", None, None).await.unwrap();

        assert_eq!(list.shoutouts.len(), 1);
        assert_eq!(
            list.shoutouts[0].shoutout_type.as_ref().unwrap().name,
            "Video Shoutout"
        );
        assert_eq!(list.pagination.total, 1);
        assert_eq!(list.pagination.total_pages, 1);
        assert!(!list.pagination.has_next);
    }

    #[test]
    fn test_group_cards_preserves_row_order() {
        let alice = create_test_creator("creator1", "alice_vids");
        let bob = create_test_creator("creator2", "bob_cam");
        let rows = vec![
            (
                create_test_shoutout("shoutout1", "creator1", "type1"),
                Some(alice.clone()),
            ),
            (
                create_test_shoutout("shoutout2", "creator2", "type1"),
                Some(bob),
            ),
            (
                create_test_shoutout("shoutout3", "creator1", "type1"),
                Some(alice),
            ),
        ];
        let types = HashMap::from([(
            "type1".to_string(),
            ShoutoutTypeInfo {
                id: "type1".to_string(),
                name: "Video Shoutout".to_string(),
                description: None,
            },
        )]);

        let cards = group_cards(rows, &types);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].display_name, "alice_vids");
        assert_eq!(cards[0].shoutouts.len(), 2);
        assert_eq!(cards[1].display_name, "bob_cam");
        assert_eq!(cards[1].shoutouts.len(), 1);
        assert_eq!(
            cards[0].shoutouts[0].shoutout_type.as_ref().unwrap().name,
            "Video Shoutout"
        );
    }

    #[test]
    fn test_catalog_pagination_math() {
        let middle = CatalogPagination::new(2, 20, 45);
        assert_eq!(middle.total_pages, 3);
        assert!(middle.has_next);
        assert!(middle.has_prev);

        let last = CatalogPagination::new(3, 20, 45);
        assert!(!last.has_next);

        let empty = CatalogPagination::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[tokio::test]
    async fn test_creator_profile_rejects_malformed_id() {
        let service = create_test_service(empty_mock(), empty_mock(), empty_mock());

        let result = service.creator_profile("not-an-id").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid creator ID format"),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_creator_profile_missing() {
        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<creator::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(empty_mock(), empty_mock(), creator_db);
        let id = IdGenerator::new().generate();
        let result = service.creator_profile(&id).await;

        match result {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Creator not found"),
            _ => panic!("Expected not found error"),
        }
    }

    #[tokio::test]
    async fn test_creator_profile_lists_active_shoutouts() {
        let id = IdGenerator::new().generate();
        let creator = create_test_creator(&id, "alice_vids");

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator]])
                .into_connection(),
        );
        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_shoutout("shoutout1", &id, "type1"),
                    create_test_shoutout("shoutout2", &id, "type1"),
                ]])
                .into_connection(),
        );
        let type_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_type("type1", "Video Shoutout")]])
                .into_connection(),
        );

        let service = create_test_service(shoutout_db, type_db, creator_db);
        let card = service.creator_profile(&id).await.unwrap();

        assert_eq!(card.display_name, "alice_vids");
        assert_eq!(card.shoutouts.len(), 2);
        assert_eq!(
            card.shoutouts[0].shoutout_type.as_ref().unwrap().name,
            "Video Shoutout"
        );
    }
}
