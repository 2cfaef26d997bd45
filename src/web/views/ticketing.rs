//! Ticketing desk pages.

use super::{error_banner, escape, link, page, select, table};
use crate::{
    core::{
        exemption::ExemptionView,
        fare::{FareQuote, IssuedTicket},
        fare_type::FareTypeWithTariff,
        report::format_money,
    },
    entities::PassengerModel,
};
use axum::response::Html;

/// Payment methods offered at the desk.
pub const PAYMENT_METHODS: [&str; 3] = ["Cash", "Card", "Mobile"];

/// Passengers known to the desk.
#[must_use]
pub fn passenger_list(passengers: &[PassengerModel]) -> Html<String> {
    let rows: Vec<Vec<String>> = passengers
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                link(&format!("/ticketing/passenger/{}", p.id), &p.full_name),
                escape(&p.email),
                link(&format!("/ticketing/calculate-fare/{}", p.id), "Sell ticket"),
            ]
        })
        .collect();
    page(
        "Passengers",
        &table(&["ID", "Name", "Email", ""], &rows, "No passengers registered yet."),
    )
}

fn active_rows(exemptions: &[ExemptionView]) -> Vec<Vec<String>> {
    exemptions
        .iter()
        .map(|view| {
            vec![
                view.exemption.id.to_string(),
                escape(&view.exemption.category.to_string()),
                escape(&view.fare_type_name),
                format!("{}%", view.discount_rate),
                view.exemption.valid_to.to_string(),
            ]
        })
        .collect()
}

/// Passenger profile with currently valid exemptions.
#[must_use]
pub fn profile(passenger: &PassengerModel, active: &[ExemptionView]) -> Html<String> {
    page(
        &passenger.full_name,
        &format!(
            "<p>Passenger #{} &middot; {}</p><h2>Valid exemptions</h2>{}<p>{}</p>",
            passenger.id,
            escape(&passenger.email),
            table(
                &["ID", "Category", "Fare type", "Discount", "Valid to"],
                &active_rows(active),
                "No valid exemptions."
            ),
            link(
                &format!("/ticketing/calculate-fare/{}", passenger.id),
                "Calculate fare"
            )
        ),
    )
}

/// Fare calculation form listing fare types and valid exemptions.
#[must_use]
pub fn calculate_form(
    passenger: &PassengerModel,
    fare_types: &[FareTypeWithTariff],
    active: &[ExemptionView],
    error: Option<&str>,
) -> Html<String> {
    let fares = fare_types.iter().map(|f| {
        (
            f.fare_type.id.to_string(),
            f.fare_type.name.as_str(),
        )
    });
    let labels: Vec<String> = active
        .iter()
        .map(|view| {
            format!(
                "{} ({}, {}% off)",
                view.exemption.category, view.fare_type_name, view.discount_rate
            )
        })
        .collect();
    let exemptions = std::iter::once((String::new(), "No exemption")).chain(
        active
            .iter()
            .zip(&labels)
            .map(|(view, label)| (view.exemption.id.to_string(), label.as_str())),
    );

    page(
        &format!("Calculate fare for {}", passenger.full_name),
        &format!(
            "{}<form method=\"post\" action=\"/ticketing/calculate-fare\">\
             <input type=\"hidden\" name=\"passenger_id\" value=\"{}\">\
             <label for=\"fare_type_id\">Fare type</label>{}\
             <label for=\"exemption_id\">Exemption</label>{}\
             <p><button type=\"submit\">Calculate</button></p></form>",
            error_banner(error),
            passenger.id,
            select("fare_type_id", fares, None),
            select("exemption_id", exemptions, None),
        ),
    )
}

/// Quote with the confirmation form for issuing the ticket.
#[must_use]
pub fn quote_page(quote: &FareQuote) -> Html<String> {
    let exemption = quote.exemption.as_ref().map_or_else(
        || "None".to_string(),
        |view| {
            format!(
                "{} ({})",
                escape(&view.exemption.category.to_string()),
                escape(&view.fare_type_name)
            )
        },
    );
    let exemption_id = quote
        .exemption
        .as_ref()
        .map_or_else(String::new, |view| view.exemption.id.to_string());
    let methods = PAYMENT_METHODS.iter().map(|m| ((*m).to_string(), *m));

    page(
        "Fare quote",
        &format!(
            "<table>\
             <tr><th>Passenger</th><td>{}</td></tr>\
             <tr><th>Fare type</th><td>{}</td></tr>\
             <tr><th>Exemption</th><td>{exemption}</td></tr>\
             <tr><th>Base fare</th><td>{}</td></tr>\
             <tr><th>Discount ({}%)</th><td>{}</td></tr>\
             <tr><th>Final fare</th><td><strong>{}</strong></td></tr></table>\
             <form method=\"post\" action=\"/ticketing/issue-ticket\">\
             <input type=\"hidden\" name=\"passenger_id\" value=\"{}\">\
             <input type=\"hidden\" name=\"fare_type_id\" value=\"{}\">\
             <input type=\"hidden\" name=\"exemption_id\" value=\"{exemption_id}\">\
             <label for=\"payment_method\">Payment method</label>{}\
             <p><button type=\"submit\">Issue ticket</button></p></form>",
            escape(&quote.passenger.full_name),
            escape(&quote.fare_type.fare_type.name),
            format_money(quote.base_fare),
            quote.discount_rate,
            format_money(quote.discount_amount),
            format_money(quote.final_fare),
            quote.passenger.id,
            quote.fare_type.fare_type.id,
            select("payment_method", methods, Some(PAYMENT_METHODS[0])),
        ),
    )
}

/// Receipt for an issued ticket.
#[must_use]
pub fn ticket_page(issued: &IssuedTicket) -> Html<String> {
    page(
        &format!("Ticket #{}", issued.ticket.id),
        &format!(
            "<table>\
             <tr><th>Passenger</th><td>{}</td></tr>\
             <tr><th>Fare type</th><td>{}</td></tr>\
             <tr><th>Purchase date</th><td>{}</td></tr>\
             <tr><th>Base fare</th><td>{}</td></tr>\
             <tr><th>Discount</th><td>{}</td></tr>\
             <tr><th>Price paid</th><td><strong>{}</strong></td></tr>\
             <tr><th>Payment</th><td>{} ({})</td></tr>\
             <tr><th>Transaction</th><td>{}</td></tr></table><p>{}</p>",
            escape(&issued.quote.passenger.full_name),
            escape(&issued.quote.fare_type.fare_type.name),
            issued.ticket.purchase_date,
            format_money(issued.calculation.base_fare),
            format_money(issued.calculation.discount),
            format_money(issued.ticket.price),
            escape(&issued.payment.payment_method),
            escape(&issued.payment.status),
            escape(&issued.payment.transaction_ref),
            link("/ticketing/passengers", "Back to passengers"),
        ),
    )
}
