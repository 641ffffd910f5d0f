//! Public-facing site: cached document loading plus the pure view helpers
//! the menu, specials, events and contact sections render from.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Weekday};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::api::ApiClient;
use crate::client::cache::{OfflineStore, SharedCache};
use crate::documents::DocumentKind;
use crate::models::{
    ContactDocument, Event, EventsDocument, MenuDocument, MenuItem, Special, SpecialsDocument,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSort {
    Name,
    Price,
}

/// Filters applied to the menu grid; all default to off.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<MenuSort>,
}

pub struct PublicSite {
    api: ApiClient,
    cache: SharedCache,
    offline: OfflineStore,
}

impl PublicSite {
    pub fn new(api: ApiClient, cache: SharedCache, offline: OfflineStore) -> Self {
        Self {
            api,
            cache,
            offline,
        }
    }

    pub async fn menu(&self) -> Result<MenuDocument> {
        self.load(DocumentKind::Menu).await
    }

    pub async fn specials(&self) -> Result<SpecialsDocument> {
        self.load(DocumentKind::Specials).await
    }

    pub async fn events(&self) -> Result<EventsDocument> {
        self.load(DocumentKind::Events).await
    }

    pub async fn contact(&self) -> Result<ContactDocument> {
        self.load(DocumentKind::Contact).await
    }

    /// Drop the cache and refetch everything; drives the periodic refresh.
    pub async fn refresh_all(&self) -> Result<()> {
        self.cache.lock().unwrap().clear();
        for kind in DocumentKind::ALL {
            self.fetch(kind).await?;
        }
        Ok(())
    }

    /// Cache, then network, then offline fallback, in that order. A fresh
    /// network document refreshes both the cache and the offline copy.
    async fn load<T: serde::de::DeserializeOwned>(&self, kind: DocumentKind) -> Result<T> {
        let filename = kind.filename();

        if let Some(cached) = self.cache.lock().unwrap().get(filename) {
            debug!("{} served from cache", filename);
            return deserialize(cached, filename);
        }

        match self.fetch(kind).await {
            Ok(doc) => deserialize(doc, filename),
            Err(err) => {
                warn!("fetch of {} failed, trying offline copy: {}", filename, err);
                let doc = self
                    .offline
                    .get(filename)
                    .with_context(|| format!("{} unavailable and no offline copy", filename))?;
                deserialize(doc, filename)
            }
        }
    }

    async fn fetch(&self, kind: DocumentKind) -> Result<Value> {
        let filename = kind.filename();
        let doc = self.api.fetch_document(filename).await?;
        self.cache.lock().unwrap().set(filename, doc.clone());
        self.offline.set(filename, &doc);
        Ok(doc)
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(doc: Value, filename: &str) -> Result<T> {
    serde_json::from_value(doc).with_context(|| format!("malformed {}", filename))
}

/// Apply category filter, free-text search and sort to the menu grid.
/// Search matches name, description and category, case-insensitively.
pub fn filter_menu(menu: &MenuDocument, filter: &MenuFilter) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = menu
        .items
        .iter()
        .filter(|item| {
            filter
                .category
                .as_deref()
                .map_or(true, |category| item.category == category)
        })
        .filter(|item| {
            filter.search.as_deref().map_or(true, |query| {
                let query = query.to_lowercase();
                item.name.to_lowercase().contains(&query)
                    || item.description.to_lowercase().contains(&query)
                    || item.category.to_lowercase().contains(&query)
            })
        })
        .cloned()
        .collect();

    match filter.sort {
        Some(MenuSort::Name) => {
            items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        Some(MenuSort::Price) => {
            items.sort_by(|a, b| a.price.total_cmp(&b.price));
        }
        None => {}
    }
    items
}

/// Specials whose day matches the given weekday, case-insensitively.
pub fn specials_for_day(specials: &SpecialsDocument, day: Weekday) -> Vec<Special> {
    let name = weekday_name(day);
    specials
        .specials
        .iter()
        .filter(|special| special.day.eq_ignore_ascii_case(name))
        .cloned()
        .collect()
}

pub fn todays_specials(specials: &SpecialsDocument) -> Vec<Special> {
    specials_for_day(specials, Local::now().weekday())
}

/// Free-text search over event name, description and tag.
pub fn search_events(events: &EventsDocument, query: &str) -> Vec<Event> {
    let query = query.to_lowercase();
    events
        .events
        .iter()
        .filter(|event| {
            query.is_empty()
                || event.name.to_lowercase().contains(&query)
                || event.description.to_lowercase().contains(&query)
                || event.tag.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_menu() -> MenuDocument {
        let item = |id, name: &str, category: &str, price, description: &str| MenuItem {
            id,
            name: name.into(),
            category: category.into(),
            price,
            description: description.into(),
            image: String::new(),
        };
        MenuDocument {
            categories: vec!["Coffee".into(), "Pastry".into()],
            items: vec![
                item(1, "Latte", "Coffee", 4.5, "steamed milk"),
                item(2, "Croissant", "Pastry", 3.0, "buttery"),
                item(3, "Americano", "Coffee", 3.5, "long black"),
            ],
        }
    }

    #[test]
    fn category_filter_is_exact() {
        let filtered = filter_menu(
            &sample_menu(),
            &MenuFilter {
                category: Some("Coffee".into()),
                ..MenuFilter::default()
            },
        );
        let names: Vec<&str> = filtered.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Latte", "Americano"]);
    }

    #[test]
    fn search_spans_name_description_and_category() {
        let menu = sample_menu();
        let by = |query: &str| {
            filter_menu(
                &menu,
                &MenuFilter {
                    search: Some(query.into()),
                    ..MenuFilter::default()
                },
            )
        };

        assert_eq!(by("LATTE").len(), 1);
        assert_eq!(by("buttery").len(), 1);
        assert_eq!(by("pastry").len(), 1);
        assert_eq!(by("nothing-matches").len(), 0);
    }

    #[test]
    fn sorting_by_price_and_name() {
        let menu = sample_menu();

        let by_price = filter_menu(
            &menu,
            &MenuFilter {
                sort: Some(MenuSort::Price),
                ..MenuFilter::default()
            },
        );
        let prices: Vec<f64> = by_price.iter().map(|i| i.price).collect();
        assert_eq!(prices, vec![3.0, 3.5, 4.5]);

        let by_name = filter_menu(
            &menu,
            &MenuFilter {
                sort: Some(MenuSort::Name),
                ..MenuFilter::default()
            },
        );
        assert_eq!(by_name[0].name, "Americano");
    }

    #[test]
    fn specials_match_day_case_insensitively() {
        let specials = SpecialsDocument {
            specials: vec![
                Special {
                    id: 1,
                    day: "monday".into(),
                    name: "Soup combo".into(),
                    price: 8.0,
                    ..Special::default()
                },
                Special {
                    id: 2,
                    day: "Monday".into(),
                    name: "Pasta night".into(),
                    price: 11.0,
                    ..Special::default()
                },
                Special {
                    id: 3,
                    day: "Friday".into(),
                    name: "Fish friday".into(),
                    price: 12.0,
                    ..Special::default()
                },
            ],
        };

        let monday = specials_for_day(&specials, Weekday::Mon);
        assert_eq!(monday.len(), 2);
        assert_eq!(specials_for_day(&specials, Weekday::Fri).len(), 1);
        assert!(specials_for_day(&specials, Weekday::Sun).is_empty());
    }

    #[test]
    fn event_search_includes_tag() {
        let events = EventsDocument {
            events: vec![
                Event {
                    id: 1,
                    name: "Open mic".into(),
                    date: "2026-09-01".into(),
                    tag: "music".into(),
                    ..Event::default()
                },
                Event {
                    id: 2,
                    name: "Latte art class".into(),
                    date: "2026-09-10".into(),
                    tag: "workshop".into(),
                    ..Event::default()
                },
            ],
        };

        assert_eq!(search_events(&events, "music").len(), 1);
        assert_eq!(search_events(&events, "ART").len(), 1);
        assert_eq!(search_events(&events, "").len(), 2);
    }
}
