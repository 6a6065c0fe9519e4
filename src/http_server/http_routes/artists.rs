use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};

use crate::entities::artist;
use crate::http_server::error::ApiError;
use crate::http_server::extract::{Form, Path, Query};
use crate::http_server::forms::{ARTIST_FIELDS, ArtistForm, FormDescriptor, SearchForm};
use crate::http_server::http_routes::venues::SearchPage;
use crate::http_server::state::AppState;
use crate::services::artist::{self as artists, ArtistSummary};

pub async fn list_artists(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistSummary>>, ApiError> {
    let artists = artists::list_artists(&app_state.db.conn).await?;
    Ok(Json(artists))
}

pub async fn search_artists(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchPage<artist::Model>>, ApiError> {
    artist_search(&app_state, form).await
}

pub async fn search_artists_by_query(
    State(app_state): State<Arc<AppState>>,
    Query(form): Query<SearchForm>,
) -> Result<Json<SearchPage<artist::Model>>, ApiError> {
    artist_search(&app_state, form).await
}

async fn artist_search(
    app_state: &AppState,
    form: SearchForm,
) -> Result<Json<SearchPage<artist::Model>>, ApiError> {
    let results = artists::search_artists(&app_state.db.conn, &form.search_term).await?;
    Ok(Json(SearchPage {
        results,
        search_term: form.search_term,
    }))
}

pub async fn show_artist(
    State(app_state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
) -> Result<Json<artist::Model>, ApiError> {
    artists::get_artist(&app_state.db.conn, artist_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Artist {artist_id}")))
}

pub async fn edit_artist(
    State(app_state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
) -> Result<Json<FormDescriptor<artist::Model>>, ApiError> {
    let artist = artists::get_artist(&app_state.db.conn, artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artist {artist_id}")))?;

    Ok(Json(FormDescriptor::filled(
        format!("/artists/{artist_id}/edit"),
        ARTIST_FIELDS,
        artist,
    )))
}

pub async fn edit_artist_submission(
    State(app_state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
    Form(form): Form<ArtistForm>,
) -> Result<Redirect, ApiError> {
    artists::update_artist(&app_state.db.conn, artist_id, form.into_changes()).await?;
    Ok(Redirect::to(&format!("/artists/{artist_id}")))
}

pub async fn create_artist_form() -> impl IntoResponse {
    Json(FormDescriptor::blank("/artists/create", ARTIST_FIELDS))
}

pub async fn create_artist_submission(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<ArtistForm>,
) -> Result<Redirect, ApiError> {
    let listed = artists::create_artist(&app_state.db.conn, form.into_new_artist()).await?;
    tracing::info!("{}", listed.message());
    Ok(Redirect::to(&format!("/artists/{}", listed.record.id)))
}
