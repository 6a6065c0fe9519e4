use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::entities::artist;
use crate::services::error::{
    Action, EntityKind, Listed, MutationError, ServiceError, Subject,
};
use crate::services::input::{ArtistChanges, NewArtist};
use crate::services::search::{SearchResults, apply_text_search};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ArtistSummary {
    pub id: i64,
    pub name: String,
}

/// One row per distinct (id, name), ordered by id.
#[instrument(skip(conn))]
pub async fn list_artists<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<ArtistSummary>, ServiceError> {
    let artists = artist::Entity::find()
        .select_only()
        .column(artist::Column::Id)
        .column(artist::Column::Name)
        .distinct()
        .order_by_asc(artist::Column::Id)
        .into_model::<ArtistSummary>()
        .all(conn)
        .await?;

    Ok(artists)
}

#[instrument(skip(conn))]
pub async fn search_artists<C: ConnectionTrait>(
    conn: &C,
    search_term: &str,
) -> Result<SearchResults<artist::Model>, ServiceError> {
    let artists = apply_text_search(artist::Entity::find(), artist::Column::Name, search_term)
        .order_by_asc(artist::Column::Id)
        .all(conn)
        .await?;

    Ok(artists.into())
}

pub async fn get_artist<C: ConnectionTrait>(
    conn: &C,
    artist_id: i64,
) -> Result<Option<artist::Model>, ServiceError> {
    Ok(artist::Entity::find_by_id(artist_id).one(conn).await?)
}

#[instrument(skip(conn, input), fields(name = %input.name))]
pub async fn create_artist<C: TransactionTrait>(
    conn: &C,
    input: NewArtist,
) -> Result<Listed<artist::Model>, MutationError> {
    let subject = Subject::new(EntityKind::Artist, Some(&input.name));
    let fail = |cause: ServiceError| {
        tracing::warn!("Artist create rolled back: {}", cause);
        MutationError::new(subject.clone(), Action::Listed, cause)
    };

    let staged = input.validate().map_err(fail)?;
    let record = conn
        .transaction::<_, artist::Model, ServiceError>(|txn| {
            Box::pin(async move { Ok(staged.insert(txn).await?) })
        })
        .await
        .map_err(|e| fail(e.into()))?;

    tracing::info!("Artist created: '{}' (ID: {})", record.name, record.id);
    Ok(Listed { record, subject })
}

#[instrument(skip(conn, changes))]
pub async fn update_artist<C: TransactionTrait>(
    conn: &C,
    artist_id: i64,
    changes: ArtistChanges,
) -> Result<artist::Model, MutationError> {
    let subject = Subject::new(EntityKind::Artist, changes.name.as_deref());
    let fail = |cause: ServiceError| {
        tracing::warn!("Artist {} update rolled back: {}", artist_id, cause);
        MutationError::new(subject.clone(), Action::Updated, cause)
    };

    let patch = changes.validate().map_err(fail)?;
    let record = conn
        .transaction::<_, artist::Model, ServiceError>(|txn| {
            Box::pin(async move {
                let existing = artist::Entity::find_by_id(artist_id)
                    .one(txn)
                    .await?
                    .ok_or(ServiceError::NotFound {
                        entity: EntityKind::Artist,
                        id: artist_id,
                    })?;

                let mut active: artist::ActiveModel = existing.into();
                patch.apply(&mut active);
                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(|e| fail(e.into()))?;

    tracing::info!("Artist updated: '{}' (ID: {})", record.name, record.id);
    Ok(record)
}
