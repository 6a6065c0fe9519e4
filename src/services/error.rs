use std::fmt;

use sea_orm::{DbErr, SqlErr, TransactionError};

/// The kind of record a service call was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Venue => "Venue",
            EntityKind::Artist => "Artist",
            EntityKind::Show => "Show",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Constraint violated: {0}")]
    Constraint(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },
    #[error("Database error: {0}")]
    Database(#[source] DbErr),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg))
            | Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Constraint(msg),
            // SQLite reports NOT NULL and CHECK failures without a dedicated code
            _ if err.to_string().contains("constraint failed") => {
                Self::Constraint(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Listed,
    Updated,
    Deleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::Listed => "listed",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        };
        f.write_str(verb)
    }
}

/// Names the record a mutation was about, e.g. `Venue The Musical Hop`.
/// Shows carry no name of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub entity: EntityKind,
    pub name: Option<String>,
}

impl Subject {
    pub fn new(entity: EntityKind, name: Option<&str>) -> Self {
        Self {
            entity,
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.entity, name),
            None => write!(f, "{}", self.entity),
        }
    }
}

/// A failed create, update or delete. The transaction has already been rolled
/// back when this is returned.
#[derive(Debug, thiserror::Error)]
#[error("An error occurred. {subject} could not be {action}.")]
pub struct MutationError {
    pub subject: Subject,
    pub action: Action,
    #[source]
    pub cause: ServiceError,
}

impl MutationError {
    pub fn new(subject: Subject, action: Action, cause: impl Into<ServiceError>) -> Self {
        Self {
            subject,
            action,
            cause: cause.into(),
        }
    }
}

/// A successful create.
#[derive(Debug, Clone)]
pub struct Listed<T> {
    pub record: T,
    pub subject: Subject,
}

impl<T> Listed<T> {
    pub fn message(&self) -> String {
        format!("{} was successfully listed!", self.subject)
    }
}
