//! Data access repositories.

pub mod activity_log;
pub mod admin;
pub mod creator;
pub mod order;
pub mod shoutout;
pub mod shoutout_type;
pub mod site_setting;
pub mod user;
pub mod withdrawal;

pub use activity_log::{ActivityLogFilter, ActivityLogRepository};
pub use admin::AdminRepository;
pub use creator::CreatorRepository;
pub use order::{OrderRepository, OrderSearch};
pub use shoutout::{CatalogFilter, CatalogSort, ShoutoutRepository};
pub use shoutout_type::ShoutoutTypeRepository;
pub use site_setting::SiteSettingRepository;
pub use user::UserRepository;
pub use withdrawal::WithdrawalRepository;
