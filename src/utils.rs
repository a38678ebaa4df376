pub mod blob;
pub mod date;
pub mod ddb;
