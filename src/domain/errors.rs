use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Unknown form: {0}")]
    UnknownForm(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Invalid page declaration: {0}")]
    InvalidPage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DomainError::UnknownField("species".into()).to_string(),
            "Unknown field: species"
        );
        assert_eq!(
            DomainError::InvalidPage("duplicate id".into()).to_string(),
            "Invalid page declaration: duplicate id"
        );
    }
}
