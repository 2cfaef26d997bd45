//! Ticketing persona: passenger lookup, fare calculation, ticket issuance.

use super::{
    AppState,
    error::{WebError, form_failure},
    forms, views,
};
use crate::core::{
    exemption,
    fare::{self, TicketOrder},
    fare_type, passenger,
};
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

/// Ticketing desk routes under `/ticketing`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ticketing/passengers", get(passengers))
        .route("/ticketing/passenger/{passenger_id}", get(profile))
        .route("/ticketing/calculate-fare/{passenger_id}", get(calculate_form))
        .route("/ticketing/calculate-fare", post(calculate))
        .route("/ticketing/issue-ticket", post(issue))
}

#[derive(Debug, Deserialize)]
struct FareForm {
    passenger_id: i64,
    fare_type_id: i64,
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    exemption_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct IssueForm {
    passenger_id: i64,
    fare_type_id: i64,
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    exemption_id: Option<i64>,
    #[serde(default)]
    payment_method: String,
}

async fn passengers(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let passengers = passenger::list_passengers(&state.db).await?;
    Ok(views::ticketing::passenger_list(&passengers))
}

async fn profile(
    State(state): State<AppState>,
    Path(passenger_id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let passenger = passenger::require_passenger(&state.db, passenger_id).await?;
    let active = exemption::active_exemptions(&state.db, passenger_id, state.today()).await?;
    Ok(views::ticketing::profile(&passenger, &active))
}

async fn calculate_form(
    State(state): State<AppState>,
    Path(passenger_id): Path<i64>,
) -> Result<Html<String>, WebError> {
    render_calculate_form(&state, passenger_id, None).await
}

async fn render_calculate_form(
    state: &AppState,
    passenger_id: i64,
    error: Option<&str>,
) -> Result<Html<String>, WebError> {
    let passenger = passenger::require_passenger(&state.db, passenger_id).await?;
    let fare_types = fare_type::list_fare_types(&state.db).await?;
    let active = exemption::active_exemptions(&state.db, passenger_id, state.today()).await?;
    Ok(views::ticketing::calculate_form(
        &passenger,
        &fare_types,
        &active,
        error,
    ))
}

async fn calculate(
    State(state): State<AppState>,
    Form(form): Form<FareForm>,
) -> Result<Response, WebError> {
    match fare::calculate_fare(&state.db, form.passenger_id, form.fare_type_id, form.exemption_id)
        .await
    {
        Ok(quote) => Ok(views::ticketing::quote_page(&quote).into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            let html = render_calculate_form(&state, form.passenger_id, Some(&message)).await?;
            Ok((status, html).into_response())
        }
    }
}

async fn issue(
    State(state): State<AppState>,
    Form(form): Form<IssueForm>,
) -> Result<Html<String>, WebError> {
    let issued = fare::issue_ticket(
        &state.db,
        TicketOrder {
            passenger_id: form.passenger_id,
            fare_type_id: form.fare_type_id,
            exemption_id: form.exemption_id,
            payment_method: form.payment_method,
        },
    )
    .await?;
    Ok(views::ticketing::ticket_page(&issued))
}
