pub mod books;
pub mod catalog;
pub mod core;
pub mod owners;
pub mod utils;
