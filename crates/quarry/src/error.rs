//! Error types for the adapter.

use std::error::Error as StdError;

use quarry_query::QueryError;
use thiserror::Error;

/// Errors raised while reading connection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The connection string is not a valid URI.
    #[error("invalid connection URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// The URI names another database adapter.
    #[error("unsupported scheme '{scheme}', expected 'rethinkdb'")]
    UnsupportedScheme { scheme: String },

    /// The URI has no host.
    #[error("no host specified in {uri}")]
    MissingHost { uri: String },

    /// The auth key does not decode to UTF-8 text.
    #[error("auth key is not valid percent-encoded UTF-8")]
    InvalidAuthKey,

    /// The URI path does not name a database.
    #[error("no database specified in {uri}")]
    MissingDatabase { uri: String },
}

/// Errors raised by the adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A write was attempted without an entity.
    #[error("You try to {operation} a nil entity for collection <{collection}")]
    NullEntity {
        collection: String,
        operation: &'static str,
    },

    /// An entity without an identity was updated or deleted.
    #[error("entity in collection <{collection}> has no identity")]
    MissingIdentity { collection: String },

    /// The collection was never registered with the mapper.
    #[error("collection <{collection}> is not mapped")]
    UnmappedCollection { collection: String },

    /// An entity did not serialize into a JSON object.
    #[error("entity for collection <{collection}> does not serialize to a document")]
    NotADocument { collection: String },

    /// The store cannot perform the operation.
    #[error("{operation} is not supported: documents have no sequential primary keys")]
    Unsupported { operation: &'static str },

    /// Building a query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Converting between entities and documents failed.
    #[error("entity mapping failed: {0}")]
    Mapping(#[from] serde_json::Error),

    /// Connection settings were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store reported a failure.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl AdapterError {
    /// Wraps a store failure.
    pub fn store<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AdapterError::Store(Box::new(err))
    }

    /// Returns the store failure, if this is one of type `E`.
    pub fn store_error<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            AdapterError::Store(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
