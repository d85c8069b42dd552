use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the wallet core can report to a caller.
///
/// Refusals (`InsufficientFunds`, `InvalidAmount`, ...) are raised before any
/// ledger write happens, so a caller can surface them without cleanup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(
        "Invalid amount: {amount} (must be positive, have at most two decimal places and keep the balance in range)"
    )]
    InvalidAmount { amount: Decimal },

    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    #[error("Unknown direction: {direction}")]
    UnknownDirection { direction: String },

    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    #[error("Insufficient funds: balance {current}, required {required}")]
    InsufficientFunds { current: Decimal, required: Decimal },

    #[error("Identity not found: {id}")]
    IdentityNotFound { id: String },

    #[error("No identity with role {role} in the roster")]
    NoIdentityForRole { role: String },

    #[error("{kind} not found in catalog: {id}")]
    CatalogItemNotFound { kind: &'static str, id: String },

    #[error("{kind} {item_id} is already settled")]
    AlreadyClaimed { kind: String, item_id: String },

    #[error("Already registered for {event}")]
    AlreadyRegistered { event: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("No outstanding library fines")]
    NoOutstandingFines,

    #[error("Page count must be at least 1")]
    InvalidPageCount,

    #[error("Insight provider error: {message}")]
    Insight { message: String },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
