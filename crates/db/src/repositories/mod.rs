//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Paginated listings share
//! the WHERE-clause machinery in [`listing`].

pub mod cattle_repo;
pub mod checkup_repo;
pub mod employee_repo;
pub mod feed_consumption_repo;
pub mod feed_stock_repo;
pub mod listing;
pub mod milk_repo;
pub mod role_repo;
pub mod session_repo;
pub mod vaccination_repo;

pub use cattle_repo::CattleRepo;
pub use checkup_repo::CheckupRepo;
pub use employee_repo::EmployeeRepo;
pub use feed_consumption_repo::{FeedConsumptionRepo, StockReconcile};
pub use feed_stock_repo::FeedStockRepo;
pub use milk_repo::MilkRecordRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use vaccination_repo::VaccinationRepo;
