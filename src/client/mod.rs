//! Client-side layer: the HTTP client both UIs share, the short-lived
//! document cache with its offline fallback, the admin controller, and the
//! public site views.

pub mod admin;
pub mod api;
pub mod cache;
pub mod public;

pub use admin::{AdminController, EditState};
pub use api::ApiClient;
pub use cache::{Clock, DocumentCache, OfflineStore, SharedCache, SystemClock};
pub use public::{MenuFilter, MenuSort, PublicSite};
