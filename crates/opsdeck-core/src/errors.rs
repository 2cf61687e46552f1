use opsdeck_core_types::RequestId;
use thiserror::Error;

/// Result type alias used across crate boundaries
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code used in logs, CLI output and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    /// A filter value outside its closed enumeration
    InvalidFilter,
    /// A filter field the target table does not carry
    UnsupportedFilter,
    NotFound,
    ConstraintViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,
    ExternalService,
    Timeout,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidFilter => "ERR_INVALID_FILTER",
            ExErrorKind::UnsupportedFilter => "ERR_UNSUPPORTED_FILTER",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Errors travel as values between components: a failed fetch becomes a
/// failed view state, a failed dashboard source becomes a flagged section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (table name, row id, endpoint name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the pure query and aggregation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashError {
    /// A filter parameter is outside its closed set
    #[error("Invalid value '{value}' for filter '{field}'")]
    InvalidFilterValue { field: String, value: String },

    /// Minimum score is not a finite number
    #[error("Invalid minimum score: {value}")]
    InvalidMinScore { value: String },

    /// Table name is not one of the known tables
    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    /// Filter field set on a table that has no such column
    #[error("Table {table} does not support filter '{field}'")]
    UnsupportedFilter { table: String, field: String },

    /// Column name outside the table's column whitelist
    #[error("Table {table} has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// A page request with a zero limit
    #[error("Page limit must be at least 1")]
    ZeroLimit,

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<DashError> for ExError {
    fn from(err: DashError) -> Self {
        match err {
            DashError::InvalidFilterValue { field, value } => {
                ExError::new(ExErrorKind::InvalidFilter)
                    .with_op("validate_filter")
                    .with_entity_id(field.clone())
                    .with_message(format!("Invalid value '{}' for filter '{}'", value, field))
            }

            DashError::InvalidMinScore { value } => ExError::new(ExErrorKind::InvalidFilter)
                .with_op("validate_filter")
                .with_entity_id("min_score")
                .with_message(format!("Invalid minimum score: {}", value)),

            DashError::UnknownTable { table } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(table)
                .with_message("Unknown table"),

            DashError::UnsupportedFilter { table, field } => {
                ExError::new(ExErrorKind::UnsupportedFilter)
                    .with_op("validate_filter")
                    .with_entity_id(table)
                    .with_message(format!("Filter '{}' is not supported", field))
            }

            DashError::UnknownColumn { table, column } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_id(table)
                    .with_message(format!("Unknown column '{}'", column))
            }

            DashError::ZeroLimit => ExError::new(ExErrorKind::InvalidInput)
                .with_message("Page limit must be at least 1"),

            DashError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Serialization {
            message: err.to_string(),
        }
    }
}
