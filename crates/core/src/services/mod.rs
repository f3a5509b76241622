//! Business logic services.

#![allow(missing_docs)]

pub mod activity;
pub mod admin;
pub mod bot_check;
pub mod catalog;
pub mod creator;
pub mod order;
pub mod password;
pub mod payment;
pub mod settings;
pub mod user;
pub mod withdrawal;

pub use activity::{ActivityLogService, ClientInfo, PruneOutcome, spawn_retention_task};
pub use admin::{
    ActivityLogQuery, AdminAuthResponse, AdminCreatorUpdateInput, AdminDashboard, AdminLoginInput,
    AdminService, AdminUserUpdateInput, PageQuery, Pagination,
};
pub use bot_check::BotCheckService;
pub use catalog::{
    CatalogPage, CatalogQuery, CatalogService, ShoutoutDetail, ShoutoutInput, ShoutoutList,
};
pub use creator::{
    CreatorAuthResponse, CreatorDashboard, CreatorProfile, CreatorService,
    CreatorUploadUrlInput, UpdateCreatorProfileInput,
};
pub use order::{
    AdminOrderList, AdminOrderQuery, CreateOrderInput, CreatorOrder, CreatorOrderList,
    OrderCreated, OrderDecisionInput, OrderListQuery, OrderService, PaymentCallbackQuery,
    UserOrderDetail, UserOrderList,
};
pub use password::{hash_password, is_strong_password, verify_password};
pub use payment::{NowPaymentsProvider, PaymentProvider};
pub use settings::{SettingRow, SettingsService, UpsertSettingInput};
pub use user::{
    AuthResponse, ChangePasswordInput, LoginInput, RegisterInput, SetAvatarInput,
    UpdateProfileInput, UploadUrlInput, UploadUrlResponse, UserProfile, UserService,
};
pub use withdrawal::{
    AdminWithdrawalList, AdminWithdrawalQuery, RequestWithdrawalInput, WithdrawalDecisionInput,
    WithdrawalList, WithdrawalListQuery, WithdrawalRow, WithdrawalService,
};
