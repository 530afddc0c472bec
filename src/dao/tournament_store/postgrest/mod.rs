mod config;
mod error;
mod models;
mod store;

pub use config::PostgrestConfig;
pub use error::PostgrestError;
pub use store::PostgrestTournamentStore;
