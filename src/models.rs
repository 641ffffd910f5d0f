//! Typed views of the four café documents.
//!
//! The file store and HTTP API work on raw `serde_json::Value` documents so
//! that unrecognized files can pass through untouched; the admin and public
//! clients deserialize into these structs.

use serde::{Deserialize, Serialize};

/// `menu.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuDocument {
    pub categories: Vec<String>,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// `specials.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialsDocument {
    pub specials: Vec<Special>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Special {
    pub id: u64,
    /// Weekday name, e.g. "Monday". Several specials may share a day.
    pub day: String,
    pub name: String,
    /// Names of the dishes included in the special.
    #[serde(default)]
    pub items: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// `events.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsDocument {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub featured: bool,
}

/// `contact.json` — singleton, replaced wholesale, no id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDocument {
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub social_media: SocialMedia,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(default)]
    pub weekdays: String,
    #[serde(default)]
    pub weekends: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub tripadvisor: String,
}
