pub type MonoprintResult<T> = Result<T, MonoprintError>;

#[derive(thiserror::Error, Debug)]
pub enum MonoprintError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("composition error: {0}")]
    Composition(String),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonoprintError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            MonoprintError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            MonoprintError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            MonoprintError::composition("x")
                .to_string()
                .contains("composition error:")
        );
        assert!(
            MonoprintError::publish("x")
                .to_string()
                .contains("publish error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = MonoprintError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
