//! Core business logic - framework-agnostic fare desk operations.
//! Each module works on a `SeaORM` connection and returns structured data
//! that the web layer renders.

/// Activity log writes and listings
pub mod activity;
/// Exemption application submission and listing
pub mod application;
/// Supporting document validation and storage
pub mod documents;
/// Exemption lookups
pub mod exemption;
/// Fare pricing and ticket issuance
pub mod fare;
/// Fare type and tariff management
pub mod fare_type;
/// Passenger registration and lookup
pub mod passenger;
/// Dashboard and report queries
pub mod report;
/// Review of exemption applications
pub mod review;
