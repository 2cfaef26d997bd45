//! Passenger-facing pages.

use super::{error_banner, escape, link, page, select, table};
use crate::{
    core::{application::ApplicationSummary, exemption::ExemptionView, fare_type::FareTypeWithTariff},
    entities::{ExemptionCategory, PassengerModel},
};
use axum::response::Html;
use sea_orm::Iterable;

/// Values the application form is re-rendered with.
#[derive(Debug, Default)]
pub struct ApplyFormValues<'a> {
    /// Selected category
    pub category: Option<&'a str>,
    /// Selected fare type
    pub fare_type_id: Option<i64>,
    /// Document description as typed
    pub document_description: &'a str,
}

/// Registration form.
#[must_use]
pub fn register_form(full_name: &str, email: &str, error: Option<&str>) -> Html<String> {
    page(
        "Passenger registration",
        &format!(
            "{}<form method=\"post\" action=\"/passenger/register\">\
             <label for=\"passenger_full_name\">Full name</label>\
             <input id=\"passenger_full_name\" name=\"passenger_full_name\" value=\"{}\" required>\
             <label for=\"email\">Email</label>\
             <input id=\"email\" name=\"email\" type=\"email\" value=\"{}\" required>\
             <p><button type=\"submit\">Register</button></p></form>",
            error_banner(error),
            escape(full_name),
            escape(email)
        ),
    )
}

/// Lets the visitor pick who they are.
#[must_use]
pub fn passenger_picker(passengers: &[PassengerModel]) -> Html<String> {
    let rows: Vec<Vec<String>> = passengers
        .iter()
        .map(|p| {
            vec![
                link(
                    &format!("/passenger/dashboard?passenger_id={}", p.id),
                    &p.full_name,
                ),
                escape(&p.email),
            ]
        })
        .collect();
    page(
        "Select passenger",
        &format!(
            "{}<p>{}</p>",
            table(&["Name", "Email"], &rows, "No passengers registered yet."),
            link("/passenger/register", "Register a new passenger")
        ),
    )
}

fn exemption_rows(exemptions: &[ExemptionView]) -> Vec<Vec<String>> {
    exemptions
        .iter()
        .map(|view| {
            vec![
                escape(&view.exemption.category.to_string()),
                escape(&view.fare_type_name),
                format!("{}%", view.discount_rate),
                view.exemption.valid_from.to_string(),
                view.exemption.valid_to.to_string(),
                if view.is_active { "Active" } else { "Expired" }.to_string(),
            ]
        })
        .collect()
}

const EXEMPTION_HEADERS: [&str; 6] = [
    "Category",
    "Fare type",
    "Discount",
    "Valid from",
    "Valid to",
    "State",
];

/// Passenger dashboard with exemptions and applications.
#[must_use]
pub fn dashboard(
    passenger: &PassengerModel,
    exemptions: &[ExemptionView],
    applications: &[ApplicationSummary],
) -> Html<String> {
    let application_rows: Vec<Vec<String>> = applications
        .iter()
        .map(|s| {
            vec![
                s.application.submitted_date.to_string(),
                escape(&s.application.category.to_string()),
                escape(&s.fare_type_name),
                escape(&s.application.status.to_string()),
            ]
        })
        .collect();

    page(
        &format!("Welcome, {}", passenger.full_name),
        &format!(
            "<p>Passenger #{} &middot; {}</p>\
             <h2>Exemptions</h2>{}\
             <h2>Applications</h2>{}\
             <p>{} &middot; {}</p>",
            passenger.id,
            escape(&passenger.email),
            table(&EXEMPTION_HEADERS, &exemption_rows(exemptions), "No exemptions yet."),
            table(
                &["Submitted", "Category", "Fare type", "Status"],
                &application_rows,
                "No applications yet."
            ),
            link(
                &format!("/passenger/exemption/apply?passenger_id={}", passenger.id),
                "Apply for an exemption"
            ),
            link(
                &format!("/passenger/exemptions?passenger_id={}", passenger.id),
                "All exemptions"
            ),
        ),
    )
}

/// All exemptions of a passenger, active and expired.
#[must_use]
pub fn exemptions_page(passenger: &PassengerModel, exemptions: &[ExemptionView]) -> Html<String> {
    page(
        &format!("Exemptions of {}", passenger.full_name),
        &format!(
            "{}<p>{}</p>",
            table(&EXEMPTION_HEADERS, &exemption_rows(exemptions), "No exemptions yet."),
            link(
                &format!("/passenger/dashboard?passenger_id={}", passenger.id),
                "Back to dashboard"
            )
        ),
    )
}

/// Exemption application form, refilled with `values` after a failed submit.
#[must_use]
pub fn apply_form(
    passenger: &PassengerModel,
    fare_types: &[FareTypeWithTariff],
    values: &ApplyFormValues<'_>,
    error: Option<&str>,
) -> Html<String> {
    let categories = ExemptionCategory::iter().map(|c| (c.to_string(), category_label(c)));
    let selected_fare = values.fare_type_id.map(|id| id.to_string());
    let fares = fare_types
        .iter()
        .map(|f| (f.fare_type.id.to_string(), f.fare_type.name.as_str()));

    page(
        "Apply for an exemption",
        &format!(
            "{}<form method=\"post\" action=\"/passenger/exemption/apply\" enctype=\"multipart/form-data\">\
             <p>Applicant: {}</p>\
             <input type=\"hidden\" name=\"passenger_id\" value=\"{}\">\
             <label for=\"exemption_category\">Category</label>{}\
             <label for=\"fare_type_id\">Fare type</label>{}\
             <label for=\"document_description\">Document description</label>\
             <input id=\"document_description\" name=\"document_description\" value=\"{}\" required>\
             <label for=\"document\">Supporting document (PDF, JPG or PNG, up to 5MB)</label>\
             <input id=\"document\" name=\"document\" type=\"file\" accept=\".pdf,.jpg,.jpeg,.png\" required>\
             <label><input type=\"checkbox\" name=\"confirm\" value=\"true\" required> \
             I confirm the information provided is accurate</label>\
             <p><button type=\"submit\">Submit application</button></p></form>",
            error_banner(error),
            escape(&passenger.full_name),
            passenger.id,
            select("exemption_category", categories, values.category),
            select("fare_type_id", fares, selected_fare.as_deref()),
            escape(values.document_description),
        ),
    )
}

/// Human label of a category.
#[must_use]
pub const fn category_label(category: ExemptionCategory) -> &'static str {
    match category {
        ExemptionCategory::Student => "Student",
        ExemptionCategory::Senior => "Senior",
        ExemptionCategory::Disability => "Disability",
        ExemptionCategory::LowIncome => "Low income",
    }
}
