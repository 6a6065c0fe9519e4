use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryOrder,
    QuerySelect, RelationTrait, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::entities::{artist, show, venue};
use crate::services::error::{
    Action, EntityKind, Listed, MutationError, ServiceError, Subject,
};
use crate::services::input::NewShow;

/// A show joined with the names of its venue and artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

/// Every show, past and future, ordered by start time.
#[instrument(skip(conn))]
pub async fn list_shows<C: ConnectionTrait>(conn: &C) -> Result<Vec<ShowListing>, ServiceError> {
    let shows = show::Entity::find()
        .select_only()
        .column(show::Column::VenueId)
        .column_as(venue::Column::Name, "venue_name")
        .column(show::Column::ArtistId)
        .column_as(artist::Column::Name, "artist_name")
        .column_as(artist::Column::ImageLink, "artist_image_link")
        .column(show::Column::StartTime)
        .join(JoinType::InnerJoin, show::Relation::Venue.def())
        .join(JoinType::InnerJoin, show::Relation::Artist.def())
        .distinct()
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::VenueId)
        .order_by_asc(show::Column::ArtistId)
        .into_model::<ShowListing>()
        .all(conn)
        .await?;

    Ok(shows)
}

#[instrument(skip(conn))]
pub async fn create_show<C: TransactionTrait>(
    conn: &C,
    input: NewShow,
) -> Result<Listed<show::Model>, MutationError> {
    let subject = Subject::new(EntityKind::Show, None);
    let fail = |cause: ServiceError| {
        tracing::warn!("Show create rolled back: {}", cause);
        MutationError::new(subject.clone(), Action::Listed, cause)
    };

    let staged = input.into_active_model();
    let record = conn
        .transaction::<_, show::Model, ServiceError>(|txn| {
            Box::pin(async move { Ok(staged.insert(txn).await?) })
        })
        .await
        .map_err(|e| fail(e.into()))?;

    tracing::info!(
        "Show created: venue {} / artist {} at {} (ID: {})",
        record.venue_id,
        record.artist_id,
        record.start_time,
        record.id
    );
    Ok(Listed { record, subject })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, seed_artist, seed_show, seed_venue, test_db};

    #[tokio::test]
    async fn test_list_shows_joins_names() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;
        seed_show(&db, venue.id, artist.id, "2019-05-21 21:30:00").await;

        let shows = list_shows(&db.conn).await.unwrap();
        assert_eq!(
            shows,
            vec![ShowListing {
                venue_id: venue.id,
                venue_name: "The Musical Hop".into(),
                artist_id: artist.id,
                artist_name: "Guns N Petals".into(),
                artist_image_link: None,
                start_time: at("2019-05-21 21:30:00"),
            }]
        );
    }

    #[tokio::test]
    async fn test_same_pair_different_times_are_distinct_rows() {
        let db = test_db().await;
        let venue = seed_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "The Wild Sax Band").await;
        seed_show(&db, venue.id, artist.id, "2035-04-08 20:00:00").await;
        seed_show(&db, venue.id, artist.id, "2035-04-01 20:00:00").await;
        // Past shows are listed too
        seed_show(&db, venue.id, artist.id, "2001-01-01 20:00:00").await;

        let shows = list_shows(&db.conn).await.unwrap();
        let times: Vec<NaiveDateTime> = shows.iter().map(|s| s.start_time).collect();
        assert_eq!(
            times,
            vec![
                at("2001-01-01 20:00:00"),
                at("2035-04-01 20:00:00"),
                at("2035-04-08 20:00:00"),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_show_message() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;

        let listed = create_show(
            &db.conn,
            NewShow {
                venue_id: venue.id,
                artist_id: artist.id,
                start_time: at("2019-06-15 23:00:00"),
            },
        )
        .await
        .unwrap();

        assert_eq!(listed.message(), "Show was successfully listed!");
        assert_eq!(listed.record.venue_id, venue.id);
    }

    #[tokio::test]
    async fn test_create_show_missing_venue_is_constraint_failure() {
        let db = test_db().await;
        let artist = seed_artist(&db, "Guns N Petals").await;

        let err = create_show(
            &db.conn,
            NewShow {
                venue_id: 404,
                artist_id: artist.id,
                start_time: at("2019-06-15 23:00:00"),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err.cause, ServiceError::Constraint(_)));
        assert_eq!(err.to_string(), "An error occurred. Show could not be listed.");
        assert!(list_shows(&db.conn).await.unwrap().is_empty());
        assert_eq!(show::Entity::find().all(&db.conn).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_show_with_zero_or_negative_ids_is_constraint_failure() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;

        for (venue_id, artist_id) in [(0, artist.id), (venue.id, -1)] {
            let err = create_show(
                &db.conn,
                NewShow {
                    venue_id,
                    artist_id,
                    start_time: at("2019-06-15 23:00:00"),
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err.cause, ServiceError::Constraint(_)));
        }
        assert!(list_shows(&db.conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_show_missing_artist_is_constraint_failure() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let err = create_show(
            &db.conn,
            NewShow {
                venue_id: venue.id,
                artist_id: 404,
                start_time: at("2019-06-15 23:00:00"),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err.cause, ServiceError::Constraint(_)));
        assert_eq!(show::Entity::find().all(&db.conn).await.unwrap().len(), 0);
    }
}
