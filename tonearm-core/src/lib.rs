pub mod auth;
pub mod catalog;
pub mod config;
pub mod progress;
pub mod search_preview;
pub mod source;
pub mod store;
pub mod util;

pub use auth::{AuthError, CredentialManager};
pub use catalog::{Catalog, CatalogError, CatalogNotice, CatalogSettings, MusicCatalog};
pub use config::{Config, ConfigError};
pub use progress::{PlaybackProgress, ProgressState};
pub use search_preview::{PreviewState, SearchPreview};
pub use store::{MusicStore, PlaybackContext, StoreError, StoreOptions, StoreSnapshot};

pub use tonearm_catalog as tc;
pub use tonearm_state;
