use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::database::Database;
use crate::entities::{artist, show, venue};
use crate::services::input::{Genres, NewArtist, NewShow, NewVenue};
use crate::services::{artist as artists, show as shows, venue as venues};

pub async fn test_db() -> Arc<Database> {
    Arc::new(
        Database::open_in_memory()
            .await
            .unwrap_or_else(|e| panic!("Failed to open test database: {e:?}")),
    )
}

pub fn new_venue(name: &str, city: &str, state: &str) -> NewVenue {
    NewVenue {
        name: name.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        genres: Genres::parse("Jazz,Reggae"),
        ..Default::default()
    }
}

pub fn new_artist(name: &str) -> NewArtist {
    NewArtist {
        name: name.to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        genres: Genres::parse("Rock n Roll"),
        ..Default::default()
    }
}

pub fn at(timestamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub async fn seed_venue(db: &Database, name: &str, city: &str, state: &str) -> venue::Model {
    venues::create_venue(&db.conn, new_venue(name, city, state))
        .await
        .unwrap()
        .record
}

pub async fn seed_artist(db: &Database, name: &str) -> artist::Model {
    artists::create_artist(&db.conn, new_artist(name))
        .await
        .unwrap()
        .record
}

pub async fn seed_show(db: &Database, venue_id: i64, artist_id: i64, start: &str) -> show::Model {
    shows::create_show(
        &db.conn,
        NewShow {
            venue_id,
            artist_id,
            start_time: at(start),
        },
    )
    .await
    .unwrap()
    .record
}
