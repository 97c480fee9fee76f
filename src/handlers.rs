pub mod inventory;
pub mod kitchen;
pub mod menu;
pub mod order;
