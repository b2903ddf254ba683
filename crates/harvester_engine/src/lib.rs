//! Harvester engine: rate-limited transport, batch scheduling and export.
mod credentials;
mod export;
mod harvest;
mod transport;

pub use credentials::{
    env_flag, load_dotenv, ConfigError, Credentials, API_KEY_VAR, INCLUDE_ADULT_VAR,
};
pub use export::{export_records, ExportError, ExportFormat, ExportSummary};
pub use harvest::Harvester;
pub use transport::{
    CatalogTransport, TmdbTransport, TransportError, TransportSettings, DEFAULT_BASE_URL,
};
