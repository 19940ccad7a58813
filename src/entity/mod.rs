pub mod admins;
pub mod audit_logs;
pub mod orders;
pub mod products;
pub mod users;

pub use admins::Entity as Admins;
pub use products::Entity as Products;
