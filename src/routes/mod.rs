pub mod conditions;
pub mod destinations;
pub mod health;
