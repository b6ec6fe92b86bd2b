/// Database models for KudosHub
///
/// This module contains all database models and their operations.
///
/// # Models
///
/// - `user`: The user directory (identity, profile, active flag)
/// - `kudos`: The append-only kudos ledger
/// - `reaction`: The reaction aggregate (membership set + derived summary)
///
/// Ownership follows the storage layer: the directory owns user rows, the
/// ledger owns kudos rows with both foreign keys into users, and the
/// aggregate owns reaction rows with foreign keys into both. Related entities
/// are fetched through the owning model's read operations; there are no
/// in-memory back-reference graphs.

pub mod kudos;
pub mod reaction;
pub mod user;
