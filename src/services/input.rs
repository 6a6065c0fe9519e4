//! Typed inputs for the create and update operations.
//!
//! Every input is validated before any column of an active model is assigned.

use chrono::NaiveDateTime;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::entities::{artist, show, venue};
use crate::services::error::ServiceError;

/// A set of genre tags, stored as a comma-delimited string.
///
/// Tags are trimmed and de-duplicated case-insensitively; the first spelling
/// and first-seen order are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genres(Vec<String>);

impl Genres {
    pub fn parse(raw: &str) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|seen| seen.eq_ignore_ascii_case(tag)) {
                tags.push(tag.to_string());
            }
        }
        Self(tags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_column(&self) -> String {
        self.0.join(",")
    }
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_genres(genres: &Genres) -> Result<String, ServiceError> {
    if genres.is_empty() {
        return Err(ServiceError::Validation(
            "at least one genre is required".to_string(),
        ));
    }
    Ok(genres.to_column())
}

#[derive(Debug, Clone, Default)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: Genres,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl NewVenue {
    pub fn validate(self) -> Result<venue::ActiveModel, ServiceError> {
        Ok(venue::ActiveModel {
            id: NotSet,
            name: Set(required("name", &self.name)?),
            city: Set(required("city", &self.city)?),
            state: Set(required("state", &self.state)?),
            genres: Set(required_genres(&self.genres)?),
            address: Set(optional(self.address)),
            phone: Set(optional(self.phone)),
            image_link: Set(optional(self.image_link)),
            facebook_link: Set(optional(self.facebook_link)),
            website: Set(optional(self.website)),
            seeking_talent: Set(self.seeking_talent),
            seeking_description: Set(optional(self.seeking_description)),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Genres,
    pub image_link: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl NewArtist {
    pub fn validate(self) -> Result<artist::ActiveModel, ServiceError> {
        Ok(artist::ActiveModel {
            id: NotSet,
            name: Set(required("name", &self.name)?),
            city: Set(required("city", &self.city)?),
            state: Set(required("state", &self.state)?),
            genres: Set(required_genres(&self.genres)?),
            phone: Set(optional(self.phone)),
            image_link: Set(optional(self.image_link)),
            website: Set(optional(self.website)),
            facebook_link: Set(optional(self.facebook_link)),
            seeking_venue: Set(self.seeking_venue),
            seeking_description: Set(optional(self.seeking_description)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewShow {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

impl NewShow {
    /// Ids are not checked here; the foreign keys reject unknown ones.
    pub fn into_active_model(self) -> show::ActiveModel {
        show::ActiveModel {
            id: NotSet,
            venue_id: Set(self.venue_id),
            artist_id: Set(self.artist_id),
            start_time: Set(self.start_time),
        }
    }
}

/// Partial update of a venue. `None` leaves the column untouched; for the
/// optional columns an empty string clears the value.
#[derive(Debug, Clone, Default)]
pub struct VenueChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: Option<Genres>,
    pub website: Option<String>,
    pub seeking_talent: Option<bool>,
    pub seeking_description: Option<String>,
}

/// Validated column assignments, applied onto a loaded record.
pub struct Patch<A>(Box<dyn FnOnce(&mut A) + Send>);

impl<A> Patch<A> {
    pub fn apply(self, model: &mut A) {
        (self.0)(model)
    }
}

impl VenueChanges {
    pub fn validate(self) -> Result<Patch<venue::ActiveModel>, ServiceError> {
        let name = self.name.as_deref().map(|v| required("name", v)).transpose()?;
        let city = self.city.as_deref().map(|v| required("city", v)).transpose()?;
        let state = self.state.as_deref().map(|v| required("state", v)).transpose()?;
        let genres = self.genres.as_ref().map(required_genres).transpose()?;
        let address = self.address.map(|v| optional(Some(v)));
        let phone = self.phone.map(|v| optional(Some(v)));
        let image_link = self.image_link.map(|v| optional(Some(v)));
        let facebook_link = self.facebook_link.map(|v| optional(Some(v)));
        let website = self.website.map(|v| optional(Some(v)));
        let seeking_talent = self.seeking_talent;
        let seeking_description = self.seeking_description.map(|v| optional(Some(v)));

        Ok(Patch(Box::new(move |model: &mut venue::ActiveModel| {
            if let Some(v) = name {
                model.name = Set(v);
            }
            if let Some(v) = city {
                model.city = Set(v);
            }
            if let Some(v) = state {
                model.state = Set(v);
            }
            if let Some(v) = genres {
                model.genres = Set(v);
            }
            if let Some(v) = address {
                model.address = Set(v);
            }
            if let Some(v) = phone {
                model.phone = Set(v);
            }
            if let Some(v) = image_link {
                model.image_link = Set(v);
            }
            if let Some(v) = facebook_link {
                model.facebook_link = Set(v);
            }
            if let Some(v) = website {
                model.website = Set(v);
            }
            if let Some(v) = seeking_talent {
                model.seeking_talent = Set(v);
            }
            if let Some(v) = seeking_description {
                model.seeking_description = Set(v);
            }
        })))
    }
}

/// Partial update of an artist, with the same rules as [`VenueChanges`].
#[derive(Debug, Clone, Default)]
pub struct ArtistChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Genres>,
    pub image_link: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: Option<bool>,
    pub seeking_description: Option<String>,
}

impl ArtistChanges {
    pub fn validate(self) -> Result<Patch<artist::ActiveModel>, ServiceError> {
        let name = self.name.as_deref().map(|v| required("name", v)).transpose()?;
        let city = self.city.as_deref().map(|v| required("city", v)).transpose()?;
        let state = self.state.as_deref().map(|v| required("state", v)).transpose()?;
        let genres = self.genres.as_ref().map(required_genres).transpose()?;
        let phone = self.phone.map(|v| optional(Some(v)));
        let image_link = self.image_link.map(|v| optional(Some(v)));
        let website = self.website.map(|v| optional(Some(v)));
        let facebook_link = self.facebook_link.map(|v| optional(Some(v)));
        let seeking_venue = self.seeking_venue;
        let seeking_description = self.seeking_description.map(|v| optional(Some(v)));

        Ok(Patch(Box::new(move |model: &mut artist::ActiveModel| {
            if let Some(v) = name {
                model.name = Set(v);
            }
            if let Some(v) = city {
                model.city = Set(v);
            }
            if let Some(v) = state {
                model.state = Set(v);
            }
            if let Some(v) = genres {
                model.genres = Set(v);
            }
            if let Some(v) = phone {
                model.phone = Set(v);
            }
            if let Some(v) = image_link {
                model.image_link = Set(v);
            }
            if let Some(v) = website {
                model.website = Set(v);
            }
            if let Some(v) = facebook_link {
                model.facebook_link = Set(v);
            }
            if let Some(v) = seeking_venue {
                model.seeking_venue = Set(v);
            }
            if let Some(v) = seeking_description {
                model.seeking_description = Set(v);
            }
        })))
    }
}
