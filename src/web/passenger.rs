//! Passenger persona: registration, dashboard, exemption applications.

use super::{
    AppState,
    error::{WebError, form_failure, status_for},
    forms, views,
};
use crate::{
    core::{
        application::{self, NewApplication},
        documents::UploadedDocument,
        exemption, fare_type, passenger,
    },
    errors::Error,
};
use axum::{
    Form, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::error;

/// Passenger routes under `/passenger`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/passenger/register", get(register_form).post(register))
        .route("/passenger/dashboard", get(dashboard))
        .route("/passenger/exemptions", get(exemptions))
        .route("/passenger/exemption/apply", get(apply_form).post(apply))
}

#[derive(Debug, Deserialize)]
struct RegisterForm {
    #[serde(default)]
    passenger_full_name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct PassengerQuery {
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    passenger_id: Option<i64>,
}

impl PassengerQuery {
    fn require(&self) -> Result<i64, WebError> {
        self.passenger_id
            .ok_or_else(|| WebError::bad_request("A passenger_id is required"))
    }
}

async fn register_form() -> Html<String> {
    views::passenger::register_form("", "", None)
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    match passenger::register_passenger(&state.db, &form.passenger_full_name, &form.email).await {
        Ok(created) => Ok(Redirect::to(&format!(
            "/passenger/dashboard?passenger_id={}",
            created.id
        ))
        .into_response()),
        Err(err) => {
            let (status, message) = form_failure(err)?;
            Ok((
                status,
                views::passenger::register_form(
                    &form.passenger_full_name,
                    &form.email,
                    Some(&message),
                ),
            )
                .into_response())
        }
    }
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<PassengerQuery>,
) -> Result<Html<String>, WebError> {
    let Some(passenger_id) = query.passenger_id else {
        let passengers = passenger::list_passengers(&state.db).await?;
        return Ok(views::passenger::passenger_picker(&passengers));
    };

    let passenger = passenger::require_passenger(&state.db, passenger_id).await?;
    let exemptions =
        exemption::exemptions_for_passenger(&state.db, passenger_id, state.today()).await?;
    let applications = application::applications_for_passenger(&state.db, passenger_id).await?;

    Ok(views::passenger::dashboard(
        &passenger,
        &exemptions,
        &applications,
    ))
}

async fn exemptions(
    State(state): State<AppState>,
    Query(query): Query<PassengerQuery>,
) -> Result<Html<String>, WebError> {
    let passenger = passenger::require_passenger(&state.db, query.require()?).await?;
    let exemptions =
        exemption::exemptions_for_passenger(&state.db, passenger.id, state.today()).await?;
    Ok(views::passenger::exemptions_page(&passenger, &exemptions))
}

async fn apply_form(
    State(state): State<AppState>,
    Query(query): Query<PassengerQuery>,
) -> Result<Html<String>, WebError> {
    let passenger = passenger::require_passenger(&state.db, query.require()?).await?;
    let fare_types = fare_type::list_fare_types(&state.db).await?;
    Ok(views::passenger::apply_form(
        &passenger,
        &fare_types,
        &views::passenger::ApplyFormValues::default(),
        None,
    ))
}

/// The multipart application form, read into memory.
#[derive(Debug, Default)]
struct ApplyUpload {
    fields: HashMap<String, String>,
    document: Option<UploadedDocument>,
}

impl ApplyUpload {
    async fn read(multipart: &mut Multipart) -> Result<Self, WebError> {
        let mut upload = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::bad_request(format!("Could not read the upload: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "document" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::bad_request(format!("Could not read the upload: {e}")))?;
                upload.document = Some(UploadedDocument {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| WebError::bad_request(format!("Could not read the upload: {e}")))?;
                upload.fields.insert(name, value);
            }
        }
        Ok(upload)
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

async fn apply(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let mut upload = ApplyUpload::read(&mut multipart).await?;

    let passenger_id =
        forms::parse_number::<i64>(upload.field("passenger_id"), "Invalid passenger ID")?;
    let fare_type_id = upload.field("fare_type_id").trim().parse::<i64>().ok();
    let confirmed = forms::is_checked(upload.fields.get("confirm").map(String::as_str));

    let result = match fare_type_id {
        _ if !confirmed => Err(Error::validation(
            "Please confirm that the information provided is accurate",
        )),
        Some(fare_type_id) => {
            application::submit_application(
                &state.db,
                &state.uploads,
                NewApplication {
                    passenger_id,
                    fare_type_id,
                    category: upload.field("exemption_category").to_string(),
                    document_description: upload.field("document_description").to_string(),
                    // a missing file is reported as a bad format
                    document: upload.document.take().unwrap_or_default(),
                },
            )
            .await
        }
        // an unknown passenger is reported before a missing fare type
        None => match passenger::get_passenger(&state.db, passenger_id).await {
            Ok(None) => Err(Error::validation("Invalid passenger ID")),
            Ok(Some(_)) => Err(Error::validation("Invalid fare type selected")),
            Err(e) => Err(e),
        },
    };

    let err = match result {
        Ok(created) => {
            return Ok(Redirect::to(&format!(
                "/passenger/dashboard?passenger_id={}",
                created.passenger_id
            ))
            .into_response());
        }
        Err(err) => err,
    };

    let (status, message) = if status_for(&err).is_server_error() {
        error!(error = %err, "exemption application failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
    } else {
        form_failure(err)?
    };

    // without a known passenger there is no form to go back to
    let passenger = passenger::get_passenger(&state.db, passenger_id)
        .await?
        .ok_or_else(|| Error::validation(message.clone()))?;
    let fare_types = fare_type::list_fare_types(&state.db).await?;
    let values = views::passenger::ApplyFormValues {
        category: Some(upload.field("exemption_category")),
        fare_type_id,
        document_description: upload.field("document_description"),
    };

    Ok((
        status,
        views::passenger::apply_form(&passenger, &fare_types, &values, Some(&message)),
    )
        .into_response())
}
