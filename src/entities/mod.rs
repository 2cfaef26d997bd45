//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Activity log entries
pub mod activity_log;
/// Uploaded supporting documents
pub mod document_record;
/// Granted exemptions
pub mod exemption;
/// Exemption applications under review
pub mod exemption_application;
/// Fare breakdown stored per ticket
pub mod fare_calculation;
/// Fare types
pub mod fare_type;
/// Registered passengers
pub mod passenger;
/// Payment confirmation per ticket
pub mod payment_confirmation;
/// String-backed enums shared by the entities
pub mod sea_orm_active_enums;
/// Pricing of a fare type
pub mod tariff;
/// Issued tickets
pub mod ticket;

// Re-export specific types to avoid conflicts
pub use activity_log::{Entity as ActivityLog, Model as ActivityLogModel};
pub use document_record::{Entity as DocumentRecord, Model as DocumentRecordModel};
pub use exemption::{Entity as Exemption, Model as ExemptionModel};
pub use exemption_application::{
    Entity as ExemptionApplication, Model as ExemptionApplicationModel,
};
pub use fare_calculation::{Entity as FareCalculation, Model as FareCalculationModel};
pub use fare_type::{Entity as FareType, Model as FareTypeModel};
pub use passenger::{Entity as Passenger, Model as PassengerModel};
pub use payment_confirmation::{
    Entity as PaymentConfirmation, Model as PaymentConfirmationModel,
};
pub use sea_orm_active_enums::{ApplicationStatus, ExemptionCategory};
pub use tariff::{Entity as Tariff, Model as TariffModel};
pub use ticket::{Entity as Ticket, Model as TicketModel};
