//! Fare calculation and ticket issuance.
//!
//! The quote shown to ticketing staff is recomputed on issuance from the
//! same inputs, so the price charged never comes from the browser.

use crate::{
    core::{
        activity::{self, ActivityKind},
        exemption::{self, ExemptionView},
        fare_type::{self, FareTypeWithTariff},
        passenger,
    },
    entities::{
        FareCalculation, PaymentConfirmation, Ticket, fare_calculation, passenger as passenger_entity,
        payment_confirmation, ticket,
    },
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Longest accepted payment method label.
pub const PAYMENT_METHOD_MAX_CHARS: usize = 50;

/// Payment status recorded for every issued ticket.
pub const PAYMENT_CONFIRMED: &str = "Confirmed";

/// Splits `base_price` into the discount and the fare left to pay.
///
/// `discount_rate` is a percentage.
///
/// # Errors
/// `Error::InvalidAmount` for a negative or non-finite price, or a rate
/// outside 0 to 100.
pub fn apply_discount(base_price: f64, discount_rate: f64) -> Result<(f64, f64)> {
    if !base_price.is_finite() || base_price < 0.0 {
        return Err(Error::InvalidAmount { amount: base_price });
    }
    if !discount_rate.is_finite() || !(0.0..=100.0).contains(&discount_rate) {
        return Err(Error::InvalidAmount {
            amount: discount_rate,
        });
    }
    let discount_amount = base_price * (discount_rate / 100.0);
    Ok((discount_amount, base_price - discount_amount))
}

/// A priced fare, ready to be confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct FareQuote {
    /// Buyer
    pub passenger: passenger_entity::Model,
    /// Fare type being priced
    pub fare_type: FareTypeWithTariff,
    /// Exemption applied, if any
    pub exemption: Option<ExemptionView>,
    /// Undiscounted tariff price
    pub base_fare: f64,
    /// Percent applied, 0 without an exemption
    pub discount_rate: f64,
    /// Amount taken off the base fare
    pub discount_amount: f64,
    /// Price to pay
    pub final_fare: f64,
}

/// Prices a fare for a passenger.
///
/// Without an exemption no discount applies. With one, the exemption must be
/// the passenger's and valid today, and the discount rate is the one of the
/// exemption's own fare type tariff.
///
/// # Errors
/// - `Error::PassengerNotFound` / `Error::FareTypeNotFound` for unknown ids
/// - `Error::Validation` for an exemption that cannot be used
pub async fn calculate_fare<C>(
    db: &C,
    passenger_id: i64,
    fare_type_id: i64,
    exemption_id: Option<i64>,
) -> Result<FareQuote>
where
    C: ConnectionTrait,
{
    let passenger = passenger::require_passenger(db, passenger_id).await?;
    let fare_type = fare_type::require_fare_type(db, fare_type_id).await?;

    let exemption = match exemption_id {
        Some(id) => Some(
            exemption::require_usable_exemption(
                db,
                passenger_id,
                id,
                chrono::Local::now().date_naive(),
            )
            .await?,
        ),
        None => None,
    };

    let base_fare = fare_type.tariff.base_price;
    let discount_rate = exemption.as_ref().map_or(0.0, |e| e.discount_rate);
    let (discount_amount, final_fare) = apply_discount(base_fare, discount_rate)?;

    Ok(FareQuote {
        passenger,
        fare_type,
        exemption,
        base_fare,
        discount_rate,
        discount_amount,
        final_fare,
    })
}

/// A confirmed ticket purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOrder {
    /// Buyer
    pub passenger_id: i64,
    /// Fare type being bought
    pub fare_type_id: i64,
    /// Exemption to apply, if any
    pub exemption_id: Option<i64>,
    /// Payment method as chosen at the desk
    pub payment_method: String,
}

/// A ticket as read back after issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedTicket {
    /// The ticket row
    pub ticket: ticket::Model,
    /// Stored fare breakdown
    pub calculation: fare_calculation::Model,
    /// Payment confirmation with the transaction reference
    pub payment: payment_confirmation::Model,
    /// The quote the ticket was priced from
    pub quote: FareQuote,
}

/// Transaction reference for a ticket: `TXN<YYYYMMDD>-<ticket id>`.
#[must_use]
pub fn transaction_ref(day: Date, ticket_id: i64) -> String {
    format!("TXN{}-{ticket_id}", day.format("%Y%m%d"))
}

/// Issues a ticket with its fare calculation and payment confirmation.
///
/// The rows are read back inside the transaction before it commits, so a
/// failed read-back leaves nothing behind.
///
/// # Errors
/// - `Error::Validation` for a missing or overlong payment method, or an
///   unusable exemption
/// - not-found errors for an unknown passenger or fare type
#[instrument(skip(db))]
pub async fn issue_ticket(db: &DatabaseConnection, order: TicketOrder) -> Result<IssuedTicket> {
    let payment_method = order.payment_method.trim().to_string();
    if payment_method.is_empty() || payment_method.chars().count() > PAYMENT_METHOD_MAX_CHARS {
        return Err(Error::validation("Please select a valid payment method"));
    }

    let quote = calculate_fare(db, order.passenger_id, order.fare_type_id, order.exemption_id).await?;
    let today = chrono::Local::now().date_naive();

    let txn = db.begin().await?;

    let ticket = ticket::ActiveModel {
        purchase_date: Set(today),
        price: Set(quote.final_fare),
        passenger_id: Set(order.passenger_id),
        fare_type_id: Set(order.fare_type_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    fare_calculation::ActiveModel {
        ticket_id: Set(ticket.id),
        base_fare: Set(quote.base_fare),
        discount: Set(quote.discount_amount),
        final_fare: Set(quote.final_fare),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    payment_confirmation::ActiveModel {
        ticket_id: Set(ticket.id),
        status: Set(PAYMENT_CONFIRMED.to_string()),
        payment_method: Set(payment_method),
        transaction_ref: Set(transaction_ref(today, ticket.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_db(e, "Transaction reference already used"))?;

    activity::record(
        &txn,
        ActivityKind::TicketIssued,
        ticket.id,
        format!(
            "Ticket {} issued to passenger {} for {} at {:.2}",
            ticket.id, quote.passenger.full_name, quote.fare_type.fare_type.name, quote.final_fare
        ),
    )
    .await?;

    let (ticket, calculation, payment) = read_back(&txn, ticket.id).await?;
    txn.commit().await?;

    info!(
        "Issued ticket {} ({}) for {:.2}",
        ticket.id, payment.transaction_ref, ticket.price
    );
    Ok(IssuedTicket {
        ticket,
        calculation,
        payment,
        quote,
    })
}

async fn read_back<C>(
    db: &C,
    ticket_id: i64,
) -> Result<(ticket::Model, fare_calculation::Model, payment_confirmation::Model)>
where
    C: ConnectionTrait,
{
    let missing = |what: &str| DbErr::RecordNotFound(format!("{what} for ticket {ticket_id}"));

    let ticket = Ticket::find_by_id(ticket_id)
        .one(db)
        .await?
        .ok_or_else(|| missing("ticket"))?;
    let calculation = ticket
        .find_related(FareCalculation)
        .one(db)
        .await?
        .ok_or_else(|| missing("fare calculation"))?;
    let payment = ticket
        .find_related(PaymentConfirmation)
        .one(db)
        .await?
        .ok_or_else(|| missing("payment confirmation"))?;

    Ok((ticket, calculation, payment))
}
