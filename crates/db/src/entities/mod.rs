//! Database entities.

pub mod activity_log;
pub mod admin;
pub mod creator;
pub mod order;
pub mod shoutout;
pub mod shoutout_type;
pub mod site_setting;
pub mod user;
pub mod withdrawal;

pub use activity_log::ActorType;
pub use activity_log::Entity as ActivityLog;
pub use admin::Entity as Admin;
pub use creator::Entity as Creator;
pub use order::Entity as Order;
pub use order::{OrderStatus, PaymentStatus};
pub use shoutout::Entity as Shoutout;
pub use shoutout_type::Entity as ShoutoutType;
pub use site_setting::Entity as SiteSetting;
pub use site_setting::SettingType;
pub use user::Entity as User;
pub use withdrawal::Entity as Withdrawal;
pub use withdrawal::WithdrawalStatus;
