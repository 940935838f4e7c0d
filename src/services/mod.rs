pub mod database;
pub mod json_store;
pub mod category_tree;
pub mod category;
pub mod product;
pub mod alert;

// 重新导出常用类型
pub use database::Database;
pub use category::CategoryService;
pub use product::ProductService;
pub use alert::AlertService;
