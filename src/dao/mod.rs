/// Database model definitions.
pub mod models;
/// Decoding helpers for embedded relations.
pub mod relation;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Tournament persistence and retrieval operations.
pub mod tournament_store;
