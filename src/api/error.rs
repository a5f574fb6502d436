use sqlx::error::ErrorKind;
use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // integrity errors
    #[error("Uniqueness Violation: {}", conflict_message(.0))]
    UniquenessViolation(Option<DbErrorMeta>),
    #[error("Reference Error: {0}")]
    ReferenceError(Cow<'static, str>),
    // sqlx errors
    #[error("Database Error: {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Configuration Error: {0}")]
    Config(Cow<'static, str>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    /// Offending columns as `table.column[, table.column]`.
    pub constraint: Option<String>,
    pub message: String,
}

pub(crate) fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    // a single column names the field, a composite key names the table
    let columns: Vec<&str> = constraint.split(',').map(str::trim).collect();
    let subject = match columns.as_slice() {
        [single] => single.rsplit('.').next().unwrap_or("value"),
        [first, ..] => first.split('.').next().unwrap_or("value"),
        [] => "value",
    }
    .replace('_', " ");

    let mut chars = subject.chars();
    let subject = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };

    format!("{subject} already exists").into()
}

fn constraint_from_message(message: &str) -> Option<String> {
    message.split_once("constraint failed:").map(|(_, cols)| cols.trim().to_string())
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    log::warn!("Unique constraint rejected write: {}", db_err.message());
                    let constraint = db_err
                        .constraint()
                        .map(|s| s.to_string())
                        .or_else(|| constraint_from_message(db_err.message()));
                    return SystemError::UniquenessViolation(Some(DbErrorMeta {
                        code: db_err.code().map(|s| s.to_string()),
                        constraint,
                        message: db_err.message().to_string(),
                    }));
                }
                ErrorKind::ForeignKeyViolation => {
                    log::warn!("Foreign key rejected write: {}", db_err.message());
                    return SystemError::reference("Referenced user does not exist");
                }
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    return SystemError::DatabaseError(db_err.message().to_string().into());
                }
            }
        }
        log::error!("{:?}", err);
        SystemError::InternalError(Box::new(err))
    }
}

impl From<validator::ValidationErrors> for SystemError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SystemError::BadRequest(errors.to_string().into())
    }
}

impl SystemError {
    pub fn uniqueness(constraint: &str, message: impl Into<String>) -> Self {
        Self::UniquenessViolation(Some(DbErrorMeta {
            code: None,
            constraint: Some(constraint.to_string()),
            message: message.into(),
        }))
    }

    pub fn reference(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::ReferenceError(msg.into())
    }

    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }
}
