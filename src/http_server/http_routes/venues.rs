use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;

use crate::entities::venue;
use crate::http_server::error::ApiError;
use crate::http_server::extract::{Form, Path, Query};
use crate::http_server::forms::{FormDescriptor, SearchForm, VENUE_FIELDS, VenueForm};
use crate::http_server::state::AppState;
use crate::services::search::SearchResults;
use crate::services::venue::{self as venues, Area};

#[derive(Debug, Serialize)]
pub struct SearchPage<T> {
    #[serde(flatten)]
    pub results: SearchResults<T>,
    pub search_term: String,
}

pub async fn list_venues(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Area>>, ApiError> {
    let areas = venues::list_areas(&app_state.db.conn).await?;
    Ok(Json(areas))
}

pub async fn search_venues(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchPage<venue::Model>>, ApiError> {
    venue_search(&app_state, form).await
}

/// `GET /venues/search?search_term=...`
pub async fn search_venues_by_query(
    State(app_state): State<Arc<AppState>>,
    Query(form): Query<SearchForm>,
) -> Result<Json<SearchPage<venue::Model>>, ApiError> {
    venue_search(&app_state, form).await
}

async fn venue_search(
    app_state: &AppState,
    form: SearchForm,
) -> Result<Json<SearchPage<venue::Model>>, ApiError> {
    let results = venues::search_venues(&app_state.db.conn, &form.search_term).await?;
    Ok(Json(SearchPage {
        results,
        search_term: form.search_term,
    }))
}

pub async fn show_venue(
    State(app_state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<Json<venue::Model>, ApiError> {
    venues::get_venue(&app_state.db.conn, venue_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Venue {venue_id}")))
}

pub async fn create_venue_form() -> impl IntoResponse {
    Json(FormDescriptor::blank("/venues/create", VENUE_FIELDS))
}

pub async fn create_venue_submission(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<VenueForm>,
) -> Result<Redirect, ApiError> {
    let listed = venues::create_venue(&app_state.db.conn, form.into_new_venue()).await?;
    tracing::info!("{}", listed.message());
    Ok(Redirect::to(&format!("/venues/{}", listed.record.id)))
}

pub async fn delete_venue(
    State(app_state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    venues::delete_venue(&app_state.db.conn, venue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn edit_venue(
    State(app_state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<Json<FormDescriptor<venue::Model>>, ApiError> {
    let venue = venues::get_venue(&app_state.db.conn, venue_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Venue {venue_id}")))?;

    Ok(Json(FormDescriptor::filled(
        format!("/venues/{venue_id}/edit"),
        VENUE_FIELDS,
        venue,
    )))
}

pub async fn edit_venue_submission(
    State(app_state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
    Form(form): Form<VenueForm>,
) -> Result<Redirect, ApiError> {
    venues::update_venue(&app_state.db.conn, venue_id, form.into_changes()).await?;
    Ok(Redirect::to(&format!("/venues/{venue_id}")))
}
