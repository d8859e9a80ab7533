pub mod audit;
pub mod cart;
pub mod category;
pub mod file;
pub mod order;
pub mod product;
pub mod seller;
pub mod shipping;
pub mod user;

pub use audit::AuditLog;
pub use cart::{Cart, CartItem};
pub use category::Category;
pub use file::StoredFile;
pub use order::{
    Order, OrderItem, OrderItemStatus, OrderStatus, PaymentInfo, PaymentMethod, PaymentStatus,
    SellerOrder,
};
pub use product::{Product, ProductStatus};
pub use seller::Seller;
pub use shipping::ShippingAddress;
pub use user::{Role, User};
