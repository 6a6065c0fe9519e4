use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::entities::{show, venue};
use crate::services::error::{
    Action, EntityKind, Listed, MutationError, ServiceError, Subject,
};
use crate::services::input::{NewVenue, VenueChanges};
use crate::services::search::{SearchResults, apply_text_search};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSummary {
    pub id: i64,
    pub name: String,
}

/// Venues sharing one exact (city, state) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

#[derive(Debug, FromQueryResult)]
struct AreaRow {
    id: i64,
    name: String,
    city: String,
    state: String,
}

/// All venues grouped by area, areas ordered by state then city.
#[instrument(skip(conn))]
pub async fn list_areas<C: ConnectionTrait>(conn: &C) -> Result<Vec<Area>, ServiceError> {
    let rows = venue::Entity::find()
        .select_only()
        .column(venue::Column::Id)
        .column(venue::Column::Name)
        .column(venue::Column::City)
        .column(venue::Column::State)
        .order_by_asc(venue::Column::State)
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::Id)
        .into_model::<AreaRow>()
        .all(conn)
        .await?;

    let mut areas: Vec<Area> = Vec::new();
    for row in rows {
        let summary = VenueSummary {
            id: row.id,
            name: row.name,
        };
        match areas.last_mut() {
            Some(area) if area.city == row.city && area.state == row.state => {
                area.venues.push(summary)
            }
            _ => areas.push(Area {
                city: row.city,
                state: row.state,
                venues: vec![summary],
            }),
        }
    }

    Ok(areas)
}

#[instrument(skip(conn))]
pub async fn search_venues<C: ConnectionTrait>(
    conn: &C,
    search_term: &str,
) -> Result<SearchResults<venue::Model>, ServiceError> {
    let venues = apply_text_search(venue::Entity::find(), venue::Column::Name, search_term)
        .order_by_asc(venue::Column::Id)
        .all(conn)
        .await?;

    Ok(venues.into())
}

pub async fn get_venue<C: ConnectionTrait>(
    conn: &C,
    venue_id: i64,
) -> Result<Option<venue::Model>, ServiceError> {
    Ok(venue::Entity::find_by_id(venue_id).one(conn).await?)
}

#[instrument(skip(conn, input), fields(name = %input.name))]
pub async fn create_venue<C: TransactionTrait>(
    conn: &C,
    input: NewVenue,
) -> Result<Listed<venue::Model>, MutationError> {
    let subject = Subject::new(EntityKind::Venue, Some(&input.name));
    let fail = |cause: ServiceError| {
        tracing::warn!("Venue create rolled back: {}", cause);
        MutationError::new(subject.clone(), Action::Listed, cause)
    };

    let staged = input.validate().map_err(fail)?;
    let record = conn
        .transaction::<_, venue::Model, ServiceError>(|txn| {
            Box::pin(async move { Ok(staged.insert(txn).await?) })
        })
        .await
        .map_err(|e| fail(e.into()))?;

    tracing::info!("Venue created: '{}' (ID: {})", record.name, record.id);
    Ok(Listed { record, subject })
}

#[instrument(skip(conn, changes))]
pub async fn update_venue<C: TransactionTrait>(
    conn: &C,
    venue_id: i64,
    changes: VenueChanges,
) -> Result<venue::Model, MutationError> {
    let subject = Subject::new(EntityKind::Venue, changes.name.as_deref());
    let fail = |cause: ServiceError| {
        tracing::warn!("Venue {} update rolled back: {}", venue_id, cause);
        MutationError::new(subject.clone(), Action::Updated, cause)
    };

    let patch = changes.validate().map_err(fail)?;
    let record = conn
        .transaction::<_, venue::Model, ServiceError>(|txn| {
            Box::pin(async move {
                let existing = venue::Entity::find_by_id(venue_id)
                    .one(txn)
                    .await?
                    .ok_or(ServiceError::NotFound {
                        entity: EntityKind::Venue,
                        id: venue_id,
                    })?;

                let mut active: venue::ActiveModel = existing.into();
                patch.apply(&mut active);
                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(|e| fail(e.into()))?;

    tracing::info!("Venue updated: '{}' (ID: {})", record.name, record.id);
    Ok(record)
}

/// Delete a venue. Venues still referenced by shows are refused; deleting an
/// id that does not exist succeeds without effect.
#[instrument(skip(conn))]
pub async fn delete_venue<C: TransactionTrait>(
    conn: &C,
    venue_id: i64,
) -> Result<(), MutationError> {
    conn.transaction::<_, (), ServiceError>(|txn| {
        Box::pin(async move {
            let show_count = show::Entity::find()
                .filter(show::Column::VenueId.eq(venue_id))
                .count(txn)
                .await?;
            if show_count > 0 {
                return Err(ServiceError::Constraint(format!(
                    "venue {venue_id} still has {show_count} show(s)"
                )));
            }

            venue::Entity::delete_by_id(venue_id).exec(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(|e| {
        let cause = ServiceError::from(e);
        tracing::warn!("Venue {} delete rolled back: {}", venue_id, cause);
        MutationError::new(
            Subject::new(EntityKind::Venue, None),
            Action::Deleted,
            cause,
        )
    })?;

    tracing::info!("Venue deleted (ID: {})", venue_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::services::input::Genres;
    use crate::test_utils::{new_venue, seed_artist, seed_show, seed_venue, test_db};

    #[tokio::test]
    async fn test_list_areas_empty() {
        let db = test_db().await;
        let areas = list_areas(&db.conn).await.unwrap();
        assert!(areas.is_empty());
    }

    #[tokio::test]
    async fn test_list_areas_partitions_venues() {
        let db = test_db().await;
        let hop = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let pianos = seed_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let park = seed_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        // Same city name in another state is a different area
        let other = seed_venue(&db, "Bay Club", "San Francisco", "TX").await;

        let areas = list_areas(&db.conn).await.unwrap();
        assert_eq!(areas.len(), 3);

        let sf = areas
            .iter()
            .find(|a| a.city == "San Francisco" && a.state == "CA")
            .unwrap();
        assert_eq!(
            sf.venues,
            vec![
                VenueSummary {
                    id: hop.id,
                    name: hop.name.clone()
                },
                VenueSummary {
                    id: park.id,
                    name: park.name.clone()
                },
            ]
        );

        let mut seen = HashSet::new();
        for area in &areas {
            for venue in &area.venues {
                assert!(seen.insert(venue.id), "venue {} listed twice", venue.id);
            }
        }
        let expected: HashSet<i64> = [hop.id, pianos.id, park.id, other.id].into();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_search_venues_substring() {
        let db = test_db().await;
        let hop = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let park = seed_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        seed_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let results = search_venues(&db.conn, "Hop").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data, vec![hop.clone()]);

        let results = search_venues(&db.conn, "Music").await.unwrap();
        let ids: Vec<i64> = results.data.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![hop.id, park.id]);
    }

    #[tokio::test]
    async fn test_search_venues_is_case_insensitive() {
        let db = test_db().await;
        seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        seed_venue(&db, "Hopscotch Hall", "Austin", "TX").await;

        let lower = search_venues(&db.conn, "hop").await.unwrap();
        let upper = search_venues(&db.conn, "HOP").await.unwrap();
        assert_eq!(lower.count, 2);
        assert_eq!(lower.data, upper.data);
    }

    #[tokio::test]
    async fn test_search_venues_empty_term_returns_all() {
        let db = test_db().await;
        seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        seed_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let results = search_venues(&db.conn, "").await.unwrap();
        assert_eq!(results.count, 2);
    }

    #[tokio::test]
    async fn test_search_venues_wildcards_match_literally() {
        let db = test_db().await;
        seed_venue(&db, "100% Jazz", "Chicago", "IL").await;
        seed_venue(&db, "1000 Jazz", "Chicago", "IL").await;

        let results = search_venues(&db.conn, "100%").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "100% Jazz");
    }

    #[tokio::test]
    async fn test_search_venues_folds_ascii_case_only() {
        let db = test_db().await;
        seed_venue(&db, "Café Tacvba", "Los Angeles", "CA").await;

        assert_eq!(search_venues(&db.conn, "CAFé").await.unwrap().count, 1);
        assert_eq!(search_venues(&db.conn, "CAFÉ").await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_get_venue_missing_is_none() {
        let db = test_db().await;
        assert!(get_venue(&db.conn, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_fields() {
        let db = test_db().await;
        let input = NewVenue {
            address: Some("1015 Folsom Street".into()),
            phone: Some("123-123-1234".into()),
            website: Some("https://www.themusicalhop.com".into()),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist".into()),
            ..new_venue("The Musical Hop", "San Francisco", "CA")
        };

        let listed = create_venue(&db.conn, input).await.unwrap();
        assert_eq!(listed.message(), "Venue The Musical Hop was successfully listed!");

        let fetched = get_venue(&db.conn, listed.record.id).await.unwrap().unwrap();
        assert_eq!(fetched, listed.record);
        assert_eq!(fetched.genres, "Jazz,Reggae");
        assert_eq!(fetched.address.as_deref(), Some("1015 Folsom Street"));
        assert!(fetched.seeking_talent);
    }

    #[tokio::test]
    async fn test_create_venue_invalid_writes_nothing() {
        let db = test_db().await;
        let input = NewVenue {
            genres: Genres::default(),
            ..new_venue("The Musical Hop", "San Francisco", "CA")
        };

        let err = create_venue(&db.conn, input).await.unwrap_err();
        assert!(matches!(err.cause, ServiceError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "An error occurred. Venue The Musical Hop could not be listed."
        );
        assert_eq!(search_venues(&db.conn, "").await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_update_venue_partial() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let updated = update_venue(
            &db.conn,
            venue.id,
            VenueChanges {
                name: Some("The Musical Hop II".into()),
                seeking_talent: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, venue.id);
        assert_eq!(updated.name, "The Musical Hop II");
        assert_eq!(updated.city, "San Francisco");
        assert!(updated.seeking_talent);
    }

    #[tokio::test]
    async fn test_update_venue_missing_is_not_found() {
        let db = test_db().await;
        let err = update_venue(
            &db.conn,
            7,
            VenueChanges {
                city: Some("Oakland".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.cause,
            ServiceError::NotFound {
                entity: EntityKind::Venue,
                id: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_update_venue_invalid_leaves_row_unchanged() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let err = update_venue(
            &db.conn,
            venue.id,
            VenueChanges {
                city: Some("Oakland".into()),
                state: Some("  ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err.cause, ServiceError::Validation(_)));
        assert_eq!(err.action, Action::Updated);

        let fetched = get_venue(&db.conn, venue.id).await.unwrap().unwrap();
        assert_eq!(fetched, venue);
    }

    #[tokio::test]
    async fn test_delete_venue_without_shows() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        delete_venue(&db.conn, venue.id).await.unwrap();
        assert!(get_venue(&db.conn, venue.id).await.unwrap().is_none());

        // A second delete of the same id is a silent no-op
        delete_venue(&db.conn, venue.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_venue_with_shows_is_blocked() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;
        seed_show(&db, venue.id, artist.id, "2019-05-21 21:30:00").await;

        let err = delete_venue(&db.conn, venue.id).await.unwrap_err();
        assert!(matches!(err.cause, ServiceError::Constraint(_)));
        assert_eq!(err.action, Action::Deleted);

        assert!(get_venue(&db.conn, venue.id).await.unwrap().is_some());
        assert_eq!(
            crate::services::show::list_shows(&db.conn).await.unwrap().len(),
            1
        );
    }
}
