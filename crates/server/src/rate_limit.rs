//! Token bucket rate limiter for WebSocket connections
//!
//! Prevents one connection from flooding the control channel.

use std::time::Instant;

use voxstream_config::RateLimitConfig;

/// Token bucket rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Message tokens
    message_tokens: f32,
    /// Last refill time
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: RateLimitConfig) -> Self {
        let burst_messages = config.messages_per_second as f32 * config.burst_multiplier;

        Self {
            config,
            message_tokens: burst_messages,
            last_refill: Instant::now(),
        }
    }

    /// Refill tokens based on elapsed time
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed_secs = now.duration_since(self.last_refill).as_secs_f32();

        if elapsed_secs > 0.0 {
            let refill = elapsed_secs * self.config.messages_per_second as f32;
            let max = self.config.messages_per_second as f32 * self.config.burst_multiplier;
            self.message_tokens = (self.message_tokens + refill).min(max);

            self.last_refill = now;
        }
    }

    /// Check if a message can be handled (and consume a token if so)
    pub fn check_message(&mut self) -> Result<(), RateLimitError> {
        if !self.config.enabled {
            return Ok(());
        }

        self.refill();

        if self.message_tokens >= 1.0 {
            self.message_tokens -= 1.0;
            Ok(())
        } else {
            Err(RateLimitError::MessageRateExceeded)
        }
    }

    /// Get remaining message tokens (for diagnostics)
    pub fn remaining_message_tokens(&self) -> f32 {
        self.message_tokens
    }
}

/// Rate limit errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// Too many messages per second
    MessageRateExceeded,
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimitError::MessageRateExceeded => {
                write!(f, "Message rate limit exceeded")
            }
        }
    }
}

impl std::error::Error for RateLimitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_under_limit() {
        let config = RateLimitConfig {
            enabled: true,
            messages_per_second: 10,
            burst_multiplier: 2.0,
        };
        let mut limiter = RateLimiter::new(config);

        // Should allow up to burst limit (20 messages)
        for _ in 0..20 {
            assert!(limiter.check_message().is_ok());
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let config = RateLimitConfig {
            enabled: true,
            messages_per_second: 10,
            burst_multiplier: 1.0, // No burst
        };
        let mut limiter = RateLimiter::new(config);

        // Use up all tokens
        for _ in 0..10 {
            assert!(limiter.check_message().is_ok());
        }

        // Next one should fail
        assert!(limiter.check_message().is_err());
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let config = RateLimitConfig {
            enabled: false,
            messages_per_second: 1,
            burst_multiplier: 1.0,
        };
        let mut limiter = RateLimiter::new(config);

        // Should always allow when disabled
        for _ in 0..1000 {
            assert!(limiter.check_message().is_ok());
        }
    }
}
