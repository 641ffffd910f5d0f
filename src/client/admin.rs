//! Admin panel controller.
//!
//! One independent edit state machine per entity type: `Idle` until a form
//! is opened, `Creating` or `Editing(id)` while the form is live, back to
//! `Idle` once a save lands or the edit is cancelled. Local document copies
//! are only mutated after the server confirms a write, so a failed save or
//! delete leaves local state exactly as it was; callers surface the
//! returned error as a toast.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::client::api::ApiClient;
use crate::client::cache::SharedCache;
use crate::documents::DocumentKind;
use crate::models::{
    ContactDocument, Event, EventsDocument, MenuDocument, MenuItem, Special, SpecialsDocument,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Creating,
    Editing(u64),
}

pub struct AdminController {
    api: ApiClient,
    cache: Option<SharedCache>,

    pub menu: MenuDocument,
    pub specials: SpecialsDocument,
    pub events: EventsDocument,
    pub contact: ContactDocument,

    menu_state: EditState,
    special_state: EditState,
    event_state: EditState,

    pub menu_form: MenuItem,
    pub special_form: Special,
    pub event_form: Event,
}

impl AdminController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: None,
            menu: MenuDocument::default(),
            specials: SpecialsDocument::default(),
            events: EventsDocument::default(),
            contact: ContactDocument::default(),
            menu_state: EditState::Idle,
            special_state: EditState::Idle,
            event_state: EditState::Idle,
            menu_form: MenuItem::default(),
            special_form: Special::default(),
            event_form: Event::default(),
        }
    }

    /// Share the public site's cache so successful writes invalidate it.
    pub fn with_shared_cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Pull all four documents through the combined endpoint. Documents
    /// missing on the server come back as `null` and stay at their
    /// defaults locally.
    pub async fn load(&mut self) -> Result<()> {
        let data = self.api.fetch_all().await.context("loading admin data")?;
        self.menu = deserialize_or_default(&data, DocumentKind::Menu)?;
        self.specials = deserialize_or_default(&data, DocumentKind::Specials)?;
        self.events = deserialize_or_default(&data, DocumentKind::Events)?;
        self.contact = deserialize_or_default(&data, DocumentKind::Contact)?;
        Ok(())
    }

    pub fn menu_state(&self) -> EditState {
        self.menu_state
    }

    pub fn special_state(&self) -> EditState {
        self.special_state
    }

    pub fn event_state(&self) -> EditState {
        self.event_state
    }

    // --- menu items ---

    pub fn new_menu_item(&mut self) {
        self.menu_form = MenuItem::default();
        self.menu_state = EditState::Creating;
    }

    pub fn edit_menu_item(&mut self, id: u64) -> Result<()> {
        let item = self
            .menu
            .items
            .iter()
            .find(|item| item.id == id)
            .with_context(|| format!("menu item {} not found", id))?;
        self.menu_form = item.clone();
        self.menu_state = EditState::Editing(id);
        Ok(())
    }

    pub fn cancel_menu_edit(&mut self) {
        self.menu_form = MenuItem::default();
        self.menu_state = EditState::Idle;
    }

    pub async fn save_menu_item(&mut self) -> Result<MenuItem> {
        validate_menu_form(&self.menu_form)?;

        let mut candidate = self.menu.clone();
        let item = match self.menu_state {
            EditState::Creating => {
                let mut item = self.menu_form.clone();
                item.id = next_id(candidate.items.iter().map(|i| i.id));
                candidate.items.push(item.clone());
                item
            }
            EditState::Editing(id) => {
                let slot = candidate
                    .items
                    .iter_mut()
                    .find(|item| item.id == id)
                    .with_context(|| format!("menu item {} disappeared", id))?;
                let mut item = self.menu_form.clone();
                item.id = id;
                *slot = item.clone();
                item
            }
            EditState::Idle => bail!("no menu item is being edited"),
        };
        if !candidate.categories.iter().any(|c| *c == item.category) {
            candidate.categories.push(item.category.clone());
        }

        self.replace(DocumentKind::Menu, &candidate).await?;
        self.menu = candidate;
        self.cancel_menu_edit();
        info!("saved menu item {} ({})", item.id, item.name);
        Ok(item)
    }

    pub async fn delete_menu_item(&mut self, id: u64) -> Result<()> {
        self.api.delete_item(DocumentKind::Menu.filename(), id).await?;
        self.menu.items.retain(|item| item.id != id);
        self.invalidate(DocumentKind::Menu);
        Ok(())
    }

    // --- specials ---

    pub fn new_special(&mut self) {
        self.special_form = Special::default();
        self.special_state = EditState::Creating;
    }

    pub fn edit_special(&mut self, id: u64) -> Result<()> {
        let special = self
            .specials
            .specials
            .iter()
            .find(|s| s.id == id)
            .with_context(|| format!("special {} not found", id))?;
        self.special_form = special.clone();
        self.special_state = EditState::Editing(id);
        Ok(())
    }

    pub fn cancel_special_edit(&mut self) {
        self.special_form = Special::default();
        self.special_state = EditState::Idle;
    }

    pub async fn save_special(&mut self) -> Result<Special> {
        validate_special_form(&self.special_form)?;

        let mut candidate = self.specials.clone();
        let special = match self.special_state {
            EditState::Creating => {
                let mut special = self.special_form.clone();
                special.id = next_id(candidate.specials.iter().map(|s| s.id));
                candidate.specials.push(special.clone());
                special
            }
            EditState::Editing(id) => {
                let slot = candidate
                    .specials
                    .iter_mut()
                    .find(|s| s.id == id)
                    .with_context(|| format!("special {} disappeared", id))?;
                let mut special = self.special_form.clone();
                special.id = id;
                *slot = special.clone();
                special
            }
            EditState::Idle => bail!("no special is being edited"),
        };

        self.replace(DocumentKind::Specials, &candidate).await?;
        self.specials = candidate;
        self.cancel_special_edit();
        info!("saved special {} ({})", special.id, special.name);
        Ok(special)
    }

    pub async fn delete_special(&mut self, id: u64) -> Result<()> {
        self.api
            .delete_item(DocumentKind::Specials.filename(), id)
            .await?;
        self.specials.specials.retain(|s| s.id != id);
        self.invalidate(DocumentKind::Specials);
        Ok(())
    }

    // --- events ---

    pub fn new_event(&mut self) {
        self.event_form = Event::default();
        self.event_state = EditState::Creating;
    }

    pub fn edit_event(&mut self, id: u64) -> Result<()> {
        let event = self
            .events
            .events
            .iter()
            .find(|e| e.id == id)
            .with_context(|| format!("event {} not found", id))?;
        self.event_form = event.clone();
        self.event_state = EditState::Editing(id);
        Ok(())
    }

    pub fn cancel_event_edit(&mut self) {
        self.event_form = Event::default();
        self.event_state = EditState::Idle;
    }

    pub async fn save_event(&mut self) -> Result<Event> {
        validate_event_form(&self.event_form)?;

        let mut candidate = self.events.clone();
        let event = match self.event_state {
            EditState::Creating => {
                let mut event = self.event_form.clone();
                event.id = next_id(candidate.events.iter().map(|e| e.id));
                candidate.events.push(event.clone());
                event
            }
            EditState::Editing(id) => {
                let slot = candidate
                    .events
                    .iter_mut()
                    .find(|e| e.id == id)
                    .with_context(|| format!("event {} disappeared", id))?;
                let mut event = self.event_form.clone();
                event.id = id;
                *slot = event.clone();
                event
            }
            EditState::Idle => bail!("no event is being edited"),
        };

        self.replace(DocumentKind::Events, &candidate).await?;
        self.events = candidate;
        self.cancel_event_edit();
        info!("saved event {} ({})", event.id, event.name);
        Ok(event)
    }

    pub async fn delete_event(&mut self, id: u64) -> Result<()> {
        self.api
            .delete_item(DocumentKind::Events.filename(), id)
            .await?;
        self.events.events.retain(|e| e.id != id);
        self.invalidate(DocumentKind::Events);
        Ok(())
    }

    // --- contact ---

    /// The contact document has no item lifecycle; it is replaced wholesale.
    pub async fn save_contact(&mut self, contact: ContactDocument) -> Result<()> {
        if contact.address.trim().is_empty()
            || contact.phone.trim().is_empty()
            || contact.email.trim().is_empty()
        {
            bail!("address, phone and email are required");
        }
        self.replace(DocumentKind::Contact, &contact).await?;
        self.contact = contact;
        Ok(())
    }

    // --- raw JSON editor ---

    /// Load any of the four documents as pretty-printed text for hand editing.
    pub async fn load_raw(&self, filename: &str) -> Result<String> {
        let doc = self.api.fetch_document(filename).await?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parse and validate hand-edited text with the same per-file validator
    /// the server applies, then replace the document.
    pub async fn save_raw(&mut self, filename: &str, text: &str) -> Result<()> {
        let doc: Value = serde_json::from_str(text).context("document is not valid JSON")?;
        let kind = DocumentKind::from_filename(filename);
        if let Some(kind) = kind {
            kind.validate(&doc)
                .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        }

        self.api.replace_document(filename, &doc).await?;
        if let Some(cache) = &self.cache {
            cache.lock().unwrap().invalidate(filename);
        }

        // Refresh the local typed copy for recognized documents.
        match kind {
            Some(DocumentKind::Menu) => self.menu = serde_json::from_value(doc)?,
            Some(DocumentKind::Specials) => self.specials = serde_json::from_value(doc)?,
            Some(DocumentKind::Events) => self.events = serde_json::from_value(doc)?,
            Some(DocumentKind::Contact) => self.contact = serde_json::from_value(doc)?,
            None => {}
        }
        Ok(())
    }

    async fn replace<T: serde::Serialize>(&self, kind: DocumentKind, doc: &T) -> Result<()> {
        let value = serde_json::to_value(doc)?;
        self.api.replace_document(kind.filename(), &value).await?;
        self.invalidate(kind);
        Ok(())
    }

    fn invalidate(&self, kind: DocumentKind) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap().invalidate(kind.filename());
        }
    }
}

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

fn deserialize_or_default<T: serde::de::DeserializeOwned + Default>(
    data: &Value,
    kind: DocumentKind,
) -> Result<T> {
    match data.get(kind.data_key()) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(doc) => serde_json::from_value(doc.clone())
            .with_context(|| format!("malformed {}", kind.filename())),
    }
}

fn validate_menu_form(item: &MenuItem) -> Result<()> {
    if item.name.trim().is_empty() {
        bail!("name is required");
    }
    if item.category.trim().is_empty() {
        bail!("category is required");
    }
    if item.price <= 0.0 {
        bail!("price must be positive");
    }
    Ok(())
}

fn validate_special_form(special: &Special) -> Result<()> {
    if special.name.trim().is_empty() {
        bail!("name is required");
    }
    if !crate::documents::WEEKDAYS
        .iter()
        .any(|w| w.eq_ignore_ascii_case(&special.day))
    {
        bail!("day must be a weekday name");
    }
    if special.price <= 0.0 {
        bail!("price must be positive");
    }
    Ok(())
}

fn validate_event_form(event: &Event) -> Result<()> {
    if event.name.trim().is_empty() {
        bail!("name is required");
    }
    if event.date.trim().is_empty() {
        bail!("date is required");
    }
    Ok(())
}
