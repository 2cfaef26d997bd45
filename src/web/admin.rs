//! Administration persona: fare types, application review, reports.

use super::{
    AppState,
    error::{WebError, form_failure},
    forms,
    views::{self, admin::FareTypeFormValues},
};
use crate::{
    core::{
        application,
        fare_type::{self, FareTypeInput},
        report::{self, Period},
        review,
    },
    entities::ApplicationStatus,
    errors::{self, Error},
};
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use sea_orm::prelude::Date;
use serde::Deserialize;

/// Administrator routes under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/", get(dashboard))
        .route("/admin/fare-types", get(fare_types))
        .route(
            "/admin/fare-types/create",
            get(create_fare_type_form).post(create_fare_type),
        )
        .route(
            "/admin/fare-types/{id}/edit",
            get(edit_fare_type_form).post(update_fare_type),
        )
        .route(
            "/admin/fare-types/{id}/delete",
            get(delete_fare_type_form).post(delete_fare_type),
        )
        .route("/admin/exemption-applications", get(applications))
        .route("/admin/exemption-applications/{id}", get(application_detail))
        .route(
            "/admin/exemption-applications/{id}/validate",
            post(validate_application),
        )
        .route(
            "/admin/exemption-applications/{id}/process",
            post(process_application),
        )
        .route("/admin/documents/{id}", get(document))
        .route("/admin/reports/fare-usage", get(fare_usage))
        .route("/admin/reports/exemption-stats", get(exemption_stats))
}

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let summary = report::dashboard_summary(&state.db).await?;
    Ok(views::admin::dashboard(&summary))
}

// Fare types

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FareTypeForm {
    type_name: String,
    description: String,
    validity: String,
    base_price: String,
    discount_rate: String,
}

impl FareTypeForm {
    fn values(&self) -> FareTypeFormValues<'_> {
        FareTypeFormValues {
            name: &self.type_name,
            description: &self.description,
            validity: &self.validity,
            base_price: &self.base_price,
            discount_rate: &self.discount_rate,
        }
    }

    fn to_input(&self) -> errors::Result<FareTypeInput> {
        Ok(FareTypeInput {
            name: self.type_name.clone(),
            description: self.description.clone(),
            validity: self.validity.clone(),
            base_price: forms::parse_number(
                &self.base_price,
                "Base price must be a positive number",
            )?,
            discount_rate: forms::parse_number(
                &self.discount_rate,
                "Discount rate must be between 0 and 100",
            )?,
        })
    }
}

async fn fare_types(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let fare_types = fare_type::list_fare_types(&state.db).await?;
    Ok(views::admin::fare_types_list(&fare_types))
}

async fn create_fare_type_form() -> Html<String> {
    views::admin::fare_type_form(
        "Create fare type",
        "/admin/fare-types/create",
        FareTypeFormValues::default(),
        None,
    )
}

async fn create_fare_type(
    State(state): State<AppState>,
    Form(form): Form<FareTypeForm>,
) -> Result<Response, WebError> {
    let result = match form.to_input() {
        Ok(input) => fare_type::create_fare_type(&state.db, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(Redirect::to("/admin/fare-types").into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            Ok((
                status,
                views::admin::fare_type_form(
                    "Create fare type",
                    "/admin/fare-types/create",
                    form.values(),
                    Some(&message),
                ),
            )
                .into_response())
        }
    }
}

async fn edit_fare_type_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let existing = fare_type::require_fare_type(&state.db, id).await?;
    let form = FareTypeForm {
        type_name: existing.fare_type.name,
        description: existing.fare_type.description,
        validity: existing.fare_type.validity,
        base_price: existing.tariff.base_price.to_string(),
        discount_rate: existing.tariff.discount_rate.to_string(),
    };
    Ok(views::admin::fare_type_form(
        "Edit fare type",
        &format!("/admin/fare-types/{id}/edit"),
        form.values(),
        None,
    ))
}

async fn update_fare_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<FareTypeForm>,
) -> Result<Response, WebError> {
    let result = match form.to_input() {
        Ok(input) => fare_type::update_fare_type(&state.db, id, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(Redirect::to("/admin/fare-types").into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            Ok((
                status,
                views::admin::fare_type_form(
                    "Edit fare type",
                    &format!("/admin/fare-types/{id}/edit"),
                    form.values(),
                    Some(&message),
                ),
            )
                .into_response())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DeleteForm {
    #[serde(default)]
    confirm: Option<String>,
}

async fn delete_fare_type_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let (existing, tickets) = fare_type::delete_preview(&state.db, id).await?;
    Ok(views::admin::delete_confirm(&existing, tickets, None))
}

async fn delete_fare_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WebError> {
    if !forms::is_checked(form.confirm.as_deref()) {
        return Ok(Redirect::to("/admin/fare-types").into_response());
    }
    match fare_type::delete_fare_type(&state.db, id).await {
        Ok(()) => Ok(Redirect::to("/admin/fare-types").into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            let (existing, tickets) = fare_type::delete_preview(&state.db, id).await?;
            Ok((
                status,
                views::admin::delete_confirm(&existing, tickets, Some(&message)),
            )
                .into_response())
        }
    }
}

// Exemption applications

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    status: Option<String>,
}

async fn applications(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Html<String>, WebError> {
    let status = query
        .status
        .map(|s| {
            ApplicationStatus::parse(&s)
                .ok_or_else(|| Error::validation(format!("Unknown application status '{s}'")))
        })
        .transpose()?;
    let applications = application::list_applications(&state.db, status).await?;
    Ok(views::admin::applications_list(&applications, status))
}

async fn render_detail(
    state: &AppState,
    id: i64,
    error: Option<&str>,
) -> Result<Html<String>, WebError> {
    let detail = application::application_detail(&state.db, id).await?;
    let fare_types = fare_type::list_fare_types(&state.db).await?;
    Ok(views::admin::application_detail(&detail, &fare_types, error))
}

async fn application_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    render_detail(&state, id, None).await
}

async fn validate_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    match review::validate_documents(&state.db, id).await {
        Ok(_) => Ok(Redirect::to(&format!("/admin/exemption-applications/{id}")).into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            Ok((status, render_detail(&state, id, Some(&message)).await?).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProcessForm {
    #[serde(default)]
    decision: String,
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    fare_type_id: Option<i64>,
    #[serde(default)]
    exemption_category: String,
}

async fn process_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ProcessForm>,
) -> Result<Response, WebError> {
    let result = match (form.decision.as_str(), form.fare_type_id) {
        ("Approved", Some(fare_type_id)) => {
            review::approve_application(&state.db, id, fare_type_id, &form.exemption_category)
                .await
                .map(|_| ())
        }
        ("Approved", None) => Err(Error::validation("Invalid fare type selected")),
        ("Rejected", _) => review::reject_application(&state.db, id).await.map(|_| ()),
        (other, _) => Err(Error::validation(format!("Unknown decision '{other}'"))),
    };

    match result {
        Ok(()) => Ok(Redirect::to("/admin/exemption-applications").into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            Ok((status, render_detail(&state, id, Some(&message)).await?).into_response())
        }
    }
}

async fn document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let record = application::get_document(&state.db, id).await?;
    let bytes = state
        .uploads
        .read(&record.document_path)
        .await
        .map_err(|e| match e {
            Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                Error::DocumentNotFound { id }
            }
            other => other,
        })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, record.content_type),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        bytes,
    )
        .into_response())
}

// Reports

#[derive(Debug, Deserialize)]
struct UsageQuery {
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    start_date: Option<Date>,
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    end_date: Option<Date>,
}

async fn fare_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> Result<Html<String>, WebError> {
    let (default_start, default_end) = report::default_usage_range(state.today());
    let usage = report::fare_usage_report(
        &state.db,
        query.start_date.unwrap_or(default_start),
        query.end_date.unwrap_or(default_end),
    )
    .await?;
    Ok(views::admin::fare_usage(&usage))
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

async fn exemption_stats(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Html<String>, WebError> {
    let period = Period::parse(query.period.as_deref());
    let stats = report::exemption_statistics(&state.db, period, state.today()).await?;
    Ok(views::admin::exemption_stats(&stats, period))
}
