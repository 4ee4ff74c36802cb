use crate::scanner::ScanError;

pub type StrataResult<T> = Result<T, StrataError>;

#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StrataError::invalid_reference("x")
                .to_string()
                .contains("invalid reference:")
        );
        assert!(
            StrataError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            StrataError::from(ScanError::UnexpectedEof)
                .to_string()
                .contains("scan error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StrataError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
