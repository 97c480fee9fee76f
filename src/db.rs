pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
