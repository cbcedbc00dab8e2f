use crate::error::ModelError;

/// Strongly typed artwork identifier.
///
/// The API is not consistent about whether ids are JSON numbers or strings,
/// so both are normalized into the same trimmed textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtworkId(String);

impl ArtworkId {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ModelError::InvalidId(raw.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable 64-bit digest of the id (FNV-1a), used to seed per-artwork
    /// procedural visuals.
    pub fn digest(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        self.0.bytes().fold(OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(PRIME)
        })
    }
}

impl From<u64> for ArtworkId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ArtworkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_textual_ids_normalize_identically() {
        let a = ArtworkId::from(42);
        let b = ArtworkId::parse(" 42 ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn rejects_empty_and_path_like_ids() {
        assert!(ArtworkId::parse("   ").is_err());
        assert!(ArtworkId::parse("12/../admin").is_err());
    }
}
