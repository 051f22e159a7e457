//! Pluggable byte-level snapshot transforms.
//!
//! Compression and encryption are strategy seams with explicit no-op
//! defaults. The no-ops are honest pass-throughs: they report themselves
//! as identity transforms and never imply size or security benefits.

use crate::errors::PrewarmResult;

/// Byte-level compression strategy applied to snapshot payloads.
pub trait Compressor: Send + Sync {
    fn compress(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>>;
    fn decompress(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>>;

    /// True when this strategy is a pass-through.
    fn is_identity(&self) -> bool {
        false
    }
}

/// Byte-level encryption strategy applied to snapshot payloads.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>>;
    fn decrypt(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>>;

    /// True when this strategy is a pass-through.
    fn is_identity(&self) -> bool {
        false
    }
}

/// Default compression strategy: identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompressor;

impl Compressor for NoopCompressor {
    fn compress(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn decompress(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// Default encryption strategy: identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEncryptor;

impl Encryptor for NoopEncryptor {
    fn encrypt(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn decrypt(&self, bytes: &[u8]) -> PrewarmResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn is_identity(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_transforms_are_identity() {
        let data = b"payload".to_vec();
        let c = NoopCompressor;
        let e = NoopEncryptor;
        assert!(c.is_identity());
        assert!(e.is_identity());
        assert_eq!(c.compress(&data).unwrap(), data);
        assert_eq!(c.decompress(&data).unwrap(), data);
        assert_eq!(e.encrypt(&data).unwrap(), data);
        assert_eq!(e.decrypt(&data).unwrap(), data);
    }
}
