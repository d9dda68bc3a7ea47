//! Console error model.

use thiserror::Error;

use zbalo_core::DomainError;
use zbalo_records::EntityKind;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Failure of one outbound call to the remote service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The client could not be built from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    /// The service understood the request and refused it with a message.
    #[error("{0}")]
    Rejected(String),
}

impl ServiceError {
    /// Message to show the operator: the service's own text for rejections,
    /// a generic one for transport failures.
    pub fn operator_message(&self) -> String {
        match self {
            ServiceError::Rejected(msg) => msg.clone(),
            ServiceError::Api(_, msg) if !msg.is_empty() => msg.clone(),
            _ => "Erreur de connexion".to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConsoleError {
    /// Operator input rejected before any outbound call.
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{kind} {id} is not in the local mirror")]
    NotFound { kind: EntityKind, id: String },
}

impl ConsoleError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(e) if e.is_validation())
    }
}
