//! The closed set of document types the café site knows about.
//!
//! Each kind carries its fixed filename, the key it appears under in the
//! combined `/api/data` response, the name of its item array (if it has
//! one), a shape validator, and a seed document written on first startup.
//! Every place that used to branch on the filename goes through a
//! `DocumentKind` lookup instead.

use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::error::{AppError, AppResult};

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Menu,
    Specials,
    Events,
    Contact,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Menu,
        DocumentKind::Specials,
        DocumentKind::Events,
        DocumentKind::Contact,
    ];

    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename {
            "menu.json" => Some(DocumentKind::Menu),
            "specials.json" => Some(DocumentKind::Specials),
            "events.json" => Some(DocumentKind::Events),
            "contact.json" => Some(DocumentKind::Contact),
            _ => None,
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            DocumentKind::Menu => "menu.json",
            DocumentKind::Specials => "specials.json",
            DocumentKind::Events => "events.json",
            DocumentKind::Contact => "contact.json",
        }
    }

    /// Key under which this document appears in the combined response.
    pub fn data_key(&self) -> &'static str {
        match self {
            DocumentKind::Menu => "menu",
            DocumentKind::Specials => "specials",
            DocumentKind::Events => "events",
            DocumentKind::Contact => "contact",
        }
    }

    /// Name of the item array, or `None` for the contact singleton.
    pub fn items_key(&self) -> Option<&'static str> {
        match self {
            DocumentKind::Menu => Some("items"),
            DocumentKind::Specials => Some("specials"),
            DocumentKind::Events => Some("events"),
            DocumentKind::Contact => None,
        }
    }

    pub fn validate(&self, doc: &Value) -> AppResult<()> {
        let obj = as_object(doc, self.filename())?;
        match self {
            DocumentKind::Menu => validate_menu(obj),
            DocumentKind::Specials => validate_specials(obj),
            DocumentKind::Events => validate_events(obj),
            DocumentKind::Contact => validate_contact(obj),
        }
    }

    /// Default document written when the file is missing at startup.
    pub fn seed(&self) -> Value {
        match self {
            DocumentKind::Menu => json!({ "categories": [], "items": [] }),
            DocumentKind::Specials => json!({ "specials": [] }),
            DocumentKind::Events => json!({ "events": [] }),
            DocumentKind::Contact => json!({
                "address": "",
                "phone": "",
                "email": "",
                "workingHours": { "weekdays": "", "weekends": "" },
                "socialMedia": {
                    "facebook": "",
                    "instagram": "",
                    "twitter": "",
                    "tripadvisor": ""
                }
            }),
        }
    }
}

fn validate_menu(obj: &Map<String, Value>) -> AppResult<()> {
    let categories = require_array(obj, "categories", "menu.json")?;
    for (i, cat) in categories.iter().enumerate() {
        if cat.as_str().map(str::trim).map_or(true, str::is_empty) {
            return Err(AppError::Validation(format!(
                "menu.json: categories[{}] must be a non-empty string",
                i
            )));
        }
    }

    let items = require_array(obj, "items", "menu.json")?;
    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        let item = as_item_object(item, "items", i)?;
        require_unique_id(item, &mut seen, "items", i)?;
        require_string(item, "name", "items", i)?;
        require_string(item, "category", "items", i)?;
        require_positive_number(item, "price", "items", i)?;
    }
    Ok(())
}

fn validate_specials(obj: &Map<String, Value>) -> AppResult<()> {
    let specials = require_array(obj, "specials", "specials.json")?;
    let mut seen = HashSet::new();
    for (i, special) in specials.iter().enumerate() {
        let special = as_item_object(special, "specials", i)?;
        require_unique_id(special, &mut seen, "specials", i)?;
        require_string(special, "name", "specials", i)?;
        require_positive_number(special, "price", "specials", i)?;

        let day = require_string(special, "day", "specials", i)?;
        if !WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(day)) {
            return Err(AppError::Validation(format!(
                "specials[{}].day must be a weekday name, got {:?}",
                i, day
            )));
        }
    }
    Ok(())
}

fn validate_events(obj: &Map<String, Value>) -> AppResult<()> {
    let events = require_array(obj, "events", "events.json")?;
    let mut seen = HashSet::new();
    for (i, event) in events.iter().enumerate() {
        let event = as_item_object(event, "events", i)?;
        require_unique_id(event, &mut seen, "events", i)?;
        require_string(event, "name", "events", i)?;
        require_string(event, "date", "events", i)?;
        if let Some(featured) = event.get("featured") {
            if !featured.is_boolean() {
                return Err(AppError::Validation(format!(
                    "events[{}].featured must be a boolean",
                    i
                )));
            }
        }
    }
    Ok(())
}

fn validate_contact(obj: &Map<String, Value>) -> AppResult<()> {
    for field in ["address", "phone", "email"] {
        let value = obj.get(field).and_then(Value::as_str);
        if value.map(str::trim).map_or(true, str::is_empty) {
            return Err(AppError::Validation(format!(
                "contact.json: {} must be a non-empty string",
                field
            )));
        }
    }
    for field in ["workingHours", "socialMedia"] {
        if let Some(value) = obj.get(field) {
            if !value.is_object() {
                return Err(AppError::Validation(format!(
                    "contact.json: {} must be an object",
                    field
                )));
            }
        }
    }
    Ok(())
}

fn as_object<'a>(doc: &'a Value, what: &str) -> AppResult<&'a Map<String, Value>> {
    doc.as_object()
        .ok_or_else(|| AppError::Validation(format!("{} must be a JSON object", what)))
}

fn as_item_object<'a>(
    item: &'a Value,
    array: &str,
    index: usize,
) -> AppResult<&'a Map<String, Value>> {
    item.as_object().ok_or_else(|| {
        AppError::Validation(format!("{}[{}] must be an object", array, index))
    })
}

fn require_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    file: &str,
) -> AppResult<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array).ok_or_else(|| {
        AppError::Validation(format!("{}: missing or invalid {:?} array", file, key))
    })
}

fn require_string<'a>(
    item: &'a Map<String, Value>,
    key: &str,
    array: &str,
    index: usize,
) -> AppResult<&'a str> {
    match item.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::Validation(format!(
            "{}[{}].{} must be a non-empty string",
            array, index, key
        ))),
    }
}

fn require_positive_number(
    item: &Map<String, Value>,
    key: &str,
    array: &str,
    index: usize,
) -> AppResult<f64> {
    match item.get(key).and_then(Value::as_f64) {
        Some(n) if n > 0.0 => Ok(n),
        _ => Err(AppError::Validation(format!(
            "{}[{}].{} must be a positive number",
            array, index, key
        ))),
    }
}

fn require_unique_id(
    item: &Map<String, Value>,
    seen: &mut HashSet<u64>,
    array: &str,
    index: usize,
) -> AppResult<u64> {
    let id = match item.get("id").and_then(Value::as_u64) {
        Some(id) if id > 0 => id,
        _ => {
            return Err(AppError::Validation(format!(
                "{}[{}].id must be a positive integer",
                array, index
            )))
        }
    };
    if !seen.insert(id) {
        return Err(AppError::Validation(format!(
            "{}[{}].id {} is duplicated",
            array, index, id
        )));
    }
    Ok(id)
}
