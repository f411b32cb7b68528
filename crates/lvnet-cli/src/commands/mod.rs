pub mod catalog;
pub mod common;
pub mod geo;
pub mod sensitivity;
pub mod stress;
pub mod voltage_drop;
