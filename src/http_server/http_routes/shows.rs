use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};

use crate::http_server::error::ApiError;
use crate::http_server::extract::Form;
use crate::http_server::forms::{FormDescriptor, SHOW_FIELDS, ShowForm};
use crate::http_server::state::AppState;
use crate::services::error::{Action, EntityKind, MutationError, Subject};
use crate::services::show::{self as shows, ShowListing};

pub async fn list_shows(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListing>>, ApiError> {
    let shows = shows::list_shows(&app_state.db.conn).await?;
    Ok(Json(shows))
}

pub async fn create_show_form() -> impl IntoResponse {
    Json(FormDescriptor::blank("/shows/create", SHOW_FIELDS))
}

pub async fn create_show_submission(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<ShowForm>,
) -> Result<Redirect, ApiError> {
    let input = form.into_new_show().map_err(|cause| {
        MutationError::new(Subject::new(EntityKind::Show, None), Action::Listed, cause)
    })?;
    let listed = shows::create_show(&app_state.db.conn, input).await?;
    tracing::info!("{}", listed.message());
    Ok(Redirect::to("/shows"))
}
