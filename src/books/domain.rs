use crate::core::domain::Identifiable;

pub mod model;

pub trait Book: Identifiable {
    fn store_owner_id(&self) -> i64;
    fn has_cover_image(&self) -> bool;
}
