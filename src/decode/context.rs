//! Per-call decode state.

use crate::config::DecoderConfig;

use super::errors::{DecodeError, DecodeResult};

/// State threaded through one top-level decode call.
///
/// Tracks record nesting so that a schema which embeds itself fails with
/// `DepthLimitExceeded` instead of recursing without bound.
#[derive(Debug)]
pub struct DecodeContext {
    depth: usize,
    max_depth: usize,
}

impl DecodeContext {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Current record nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Runs `f` one record level deeper.
    pub fn descend<T, F>(&mut self, record: &str, f: F) -> DecodeResult<T>
    where
        F: FnOnce(&mut Self) -> DecodeResult<T>,
    {
        if self.depth >= self.max_depth {
            return Err(DecodeError::depth_exceeded(record, self.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::errors::DecodeErrorCode;

    #[test]
    fn test_descend_restores_depth() {
        let mut cx = DecodeContext::default();
        let seen = cx.descend("a", |cx| cx.descend("b", |cx| Ok(cx.depth()))).unwrap();
        assert_eq!(seen, 2);
        assert_eq!(cx.depth(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let mut cx = DecodeContext::new(&DecoderConfig::with_max_depth(1));
        let err = cx
            .descend("outer", |cx| cx.descend("inner", |_| Ok(())))
            .unwrap_err();
        assert_eq!(err.code(), DecodeErrorCode::DepthLimitExceeded);
        assert_eq!(err.record(), "inner");
        assert_eq!(cx.depth(), 0);
    }
}
