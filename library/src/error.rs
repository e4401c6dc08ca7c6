use std::io;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("missing field 'kind'")]
    MissingKind,
    #[error("'{0}' must be an object")]
    NotAnObject(&'static str),
    #[error("unknown kind '{0}', expected Star, Planet or Moon")]
    UnknownKind(String),
    #[error("a Star can only be the root of the system")]
    NestedStar,
    #[error("root body is a {0}, expected a Star")]
    RootNotStar(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Can't parse \"{input}\": {reason}")]
    UnitParse { input: String, reason: String },
    #[error("\"{input}\" is out of range: {reason}")]
    UnitRange { input: String, reason: String },
    #[error("Body '{body}': {source}")]
    Schema {
        body: String,
        #[source]
        source: SchemaError,
    },
    #[error("Body '{body}': invalid '{field}': {source}")]
    InvalidField {
        body: String,
        field: &'static str,
        #[source]
        source: Box<Error>,
    },
    #[error("Catalog line {line}: {reason}")]
    CatalogFormat { line: usize, reason: String },
    #[error("No root body found in system document")]
    NoRootBody,
    #[error("Several root bodies found: {}", .0.join(", "))]
    MultipleRootBodies(Vec<String>),
    #[error("JSON: can't deserialize system document: {0}")]
    Document(serde_json::Error),
    #[error("Can't read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn unit_parse(input: &str, reason: impl Into<String>) -> Error {
        Error::UnitParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unit_range(input: &str, reason: impl Into<String>) -> Error {
        Error::UnitRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(body: &str, source: SchemaError) -> Error {
        Error::Schema {
            body: body.to_string(),
            source,
        }
    }

    /// Unit error at the bottom of an `InvalidField` chain, if any.
    pub fn unit_cause(&self) -> Option<&Error> {
        match self {
            Error::InvalidField { source, .. } => source.unit_cause(),
            Error::UnitParse { .. } | Error::UnitRange { .. } => Some(self),
            _ => None,
        }
    }
}
