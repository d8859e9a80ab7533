pub mod carts;
pub mod categories;
pub mod dashboard;
pub mod files;
pub mod orders;
pub mod products;
pub mod sellers;
pub mod shipping;
pub mod users;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use files::FileRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use sellers::SellerRepository;
pub use shipping::ShippingRepository;
pub use users::UserRepository;
