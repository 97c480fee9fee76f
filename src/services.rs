pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod kitchen_hub;
pub use kitchen_hub::KitchenHub;
pub mod order_service;
pub use order_service::OrderService;
