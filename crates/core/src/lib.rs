pub mod auth;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod external_catalog;
pub mod library;
pub mod metrics;
pub mod searcher;
pub mod testing;

#[cfg(test)]
mod test_support;

pub use auth::{Session, SessionError};
pub use backend::{BackendClient, BackendError};
pub use catalog::{
    CacheReport, ExternalGame, GameImage, GameRecord, GameStore, GameStoreError, HttpGameStore,
    PlatformRef,
};
pub use config::{
    load_config, load_config_from_str, validate_config, BackendConfig, CatalogConfig, Config,
    ConfigError, RelayConfig, SanitizedConfig, SearchConfig, ServerConfig,
};
pub use external_catalog::{
    AttemptOutcome, CatalogRequest, CatalogResponse, ChainOutcome, HttpRelay, RelayAttempt,
    RelayChain, RelayError, RelayKind, RelayStrategy,
};
pub use library::{
    GameStatus, HttpLibraryClient, LibraryEntry, LibraryError, LibraryService, LibraryUpdate,
};
pub use searcher::{
    SearchAggregator, SearchError, SearchOutcome, SearchSettings, SearchSupervisor, SearchTicket,
    SearchWarning,
};
