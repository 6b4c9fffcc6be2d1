// src/services/mod.rs
pub mod calculations;
pub mod csv_prices;
pub mod portfolio;
pub mod reference;
pub mod yahoo;
