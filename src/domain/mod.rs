//! Domain layer: variant matrix and refund calculations
pub mod aggregates;
pub mod events;
pub mod value_objects;
