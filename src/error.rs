pub type RoundelResult<T> = Result<T, RoundelError>;

#[derive(thiserror::Error, Debug)]
pub enum RoundelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("generation error: {0}")]
    Generate(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoundelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn generate(msg: impl Into<String>) -> Self {
        Self::Generate(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RoundelError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(RoundelError::asset("x").to_string().contains("asset error:"));
        assert!(
            RoundelError::generate("x")
                .to_string()
                .contains("generation error:")
        );
        assert!(
            RoundelError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = RoundelError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
