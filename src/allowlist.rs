use std::fmt;

use crate::error::AppError;

// Counter namespaces in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Sources,
    Paths,
}

impl Namespace {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sources" => Some(Namespace::Sources),
            "paths" => Some(Namespace::Paths),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Sources => "sources",
            Namespace::Paths => "paths",
        }
    }

    // Fields a client is allowed to bump under this namespace
    pub fn allowed_fields(&self) -> &'static [&'static str] {
        match self {
            Namespace::Sources => &["linkedin", "resume", "anonymous"],
            Namespace::Paths => &["immersive", "quick"],
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `(namespace, field)` pair. Only constructible through
/// [`MetricTarget::parse`], so holding one means the pair is allowlisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricTarget {
    namespace: Namespace,
    field: &'static str,
}

impl MetricTarget {
    pub fn parse(namespace: &str, field: &str) -> Result<Self, AppError> {
        let namespace = Namespace::parse(namespace).ok_or(AppError::InvalidTarget)?;
        let field = namespace
            .allowed_fields()
            .iter()
            .copied()
            .find(|allowed| *allowed == field)
            .ok_or(AppError::InvalidTarget)?;

        Ok(Self { namespace, field })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    // Store path, e.g. "paths/quick"
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace, self.field)
    }
}
