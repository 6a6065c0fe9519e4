//! URL-encoded form bodies and the form descriptors served on the `GET`
//! side of the create/edit routes.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::services::error::ServiceError;
use crate::services::input::{ArtistChanges, Genres, NewArtist, NewShow, NewVenue, VenueChanges};

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

/// HTML checkboxes send their value when ticked and nothing otherwise.
fn checkbox(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes" | "on" | "true" | "1")
    )
}

fn parse_id(field: &str, value: Option<&str>) -> Result<i64, ServiceError> {
    let value = value.map(str::trim).unwrap_or_default();
    value
        .parse()
        .map_err(|_| ServiceError::Validation(format!("{field} must be a record id, got '{value}'")))
}

pub fn parse_start_time(value: &str) -> Result<NaiveDateTime, ServiceError> {
    let value = value.trim();
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .ok_or_else(|| ServiceError::Validation(format!("invalid start_time '{value}'")))
}

#[derive(Debug, Default, Deserialize)]
pub struct VenueForm {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: Option<String>,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn into_new_venue(self) -> NewVenue {
        NewVenue {
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            address: self.address,
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            genres: Genres::parse(self.genres.as_deref().unwrap_or_default()),
            website: self.website,
            seeking_talent: checkbox(self.seeking_talent.as_deref()),
            seeking_description: self.seeking_description,
        }
    }

    /// Fields absent from the body are left unchanged.
    pub fn into_changes(self) -> VenueChanges {
        VenueChanges {
            name: self.name,
            city: self.city,
            state: self.state,
            address: self.address,
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            genres: self.genres.as_deref().map(Genres::parse),
            website: self.website,
            seeking_talent: self.seeking_talent.as_deref().map(|v| checkbox(Some(v))),
            seeking_description: self.seeking_description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistForm {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<String>,
    pub image_link: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn into_new_artist(self) -> NewArtist {
        NewArtist {
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            phone: self.phone,
            genres: Genres::parse(self.genres.as_deref().unwrap_or_default()),
            image_link: self.image_link,
            website: self.website,
            facebook_link: self.facebook_link,
            seeking_venue: checkbox(self.seeking_venue.as_deref()),
            seeking_description: self.seeking_description,
        }
    }

    /// Fields absent from the body are left unchanged.
    pub fn into_changes(self) -> ArtistChanges {
        ArtistChanges {
            name: self.name,
            city: self.city,
            state: self.state,
            phone: self.phone,
            genres: self.genres.as_deref().map(Genres::parse),
            image_link: self.image_link,
            website: self.website,
            facebook_link: self.facebook_link,
            seeking_venue: self.seeking_venue.as_deref().map(|v| checkbox(Some(v))),
            seeking_description: self.seeking_description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowForm {
    pub venue_id: Option<String>,
    pub artist_id: Option<String>,
    pub start_time: Option<String>,
}

impl ShowForm {
    pub fn into_new_show(self) -> Result<NewShow, ServiceError> {
        Ok(NewShow {
            venue_id: parse_id("venue_id", self.venue_id.as_deref())?,
            artist_id: parse_id("artist_id", self.artist_id.as_deref())?,
            start_time: parse_start_time(self.start_time.as_deref().unwrap_or_default())?,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub required: bool,
}

const fn field(name: &'static str, required: bool) -> FormField {
    FormField { name, required }
}

pub const VENUE_FIELDS: &[FormField] = &[
    field("name", true),
    field("city", true),
    field("state", true),
    field("address", false),
    field("phone", false),
    field("image_link", false),
    field("genres", true),
    field("facebook_link", false),
    field("website", false),
    field("seeking_talent", false),
    field("seeking_description", false),
];

pub const ARTIST_FIELDS: &[FormField] = &[
    field("name", true),
    field("city", true),
    field("state", true),
    field("phone", false),
    field("image_link", false),
    field("genres", true),
    field("facebook_link", false),
    field("website", false),
    field("seeking_venue", false),
    field("seeking_description", false),
];

pub const SHOW_FIELDS: &[FormField] = &[
    field("artist_id", true),
    field("venue_id", true),
    field("start_time", true),
];

/// What a template needs to render a create or edit form.
#[derive(Debug, Serialize)]
pub struct FormDescriptor<T: Serialize> {
    pub action: String,
    pub fields: &'static [FormField],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<T>,
}

impl FormDescriptor<()> {
    pub fn blank(action: impl Into<String>, fields: &'static [FormField]) -> Self {
        Self {
            action: action.into(),
            fields,
            values: None,
        }
    }
}

impl<T: Serialize> FormDescriptor<T> {
    pub fn filled(action: impl Into<String>, fields: &'static [FormField], values: T) -> Self {
        Self {
            action: action.into(),
            fields,
            values: Some(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::at;

    #[test]
    fn test_checkbox_values() {
        assert!(checkbox(Some("y")));
        assert!(checkbox(Some("On")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("n")));
        assert!(!checkbox(None));
    }

    #[test]
    fn test_parse_start_time_formats() {
        let expected = at("2019-05-21 21:30:00");
        assert_eq!(parse_start_time("2019-05-21 21:30:00").unwrap(), expected);
        assert_eq!(parse_start_time("2019-05-21T21:30:00").unwrap(), expected);
        assert_eq!(parse_start_time("2019-05-21T21:30").unwrap(), expected);
        assert_eq!(parse_start_time("2019-05-21T21:30:00.000Z").unwrap(), expected);
        assert_eq!(parse_start_time("2019-05-21T23:30:00+02:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_start_time_rejects_garbage() {
        assert!(matches!(
            parse_start_time("next tuesday"),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_show_form_requires_numeric_ids() {
        let form = ShowForm {
            venue_id: Some("abc".into()),
            artist_id: Some("1".into()),
            start_time: Some("2019-05-21 21:30:00".into()),
        };
        assert!(matches!(form.into_new_show(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_venue_form_into_changes_keeps_absent_fields_unset() {
        let form = VenueForm {
            name: Some("The Musical Hop".into()),
            seeking_talent: Some("y".into()),
            ..Default::default()
        };
        let changes = form.into_changes();
        assert_eq!(changes.name.as_deref(), Some("The Musical Hop"));
        assert_eq!(changes.seeking_talent, Some(true));
        assert!(changes.city.is_none());
        assert!(changes.genres.is_none());
    }

    #[test]
    fn test_artist_form_into_new_artist() {
        let form = ArtistForm {
            name: Some("The Wild Sax Band".into()),
            city: Some("San Francisco".into()),
            state: Some("CA".into()),
            genres: Some("Jazz, Classical".into()),
            ..Default::default()
        };
        let artist = form.into_new_artist();
        assert_eq!(artist.genres, Genres::parse("Jazz,Classical"));
        assert!(!artist.seeking_venue);
    }
}
