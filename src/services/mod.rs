pub mod adapter;
pub mod conditions;
pub mod destinations;
pub mod forecast;
pub mod model;
pub mod owm;
pub mod scoring;
pub mod series;
pub mod timeline;
