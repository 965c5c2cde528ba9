//! Configuration types for x402 infrastructure.
//!
//! # Environment Variable Resolution
//!
//! The [`LiteralOrEnv`] wrapper type allows configuration values to be specified
//! either as literal values or as references to environment variables:
//!
//! ```json
//! {
//!   "private_key": "$BUYER_PRIVATE_KEY",        // Simple env var
//!   "other_key": "${SECOND_BUYER_KEY}",         // Braced env var
//!   "literal": "0xcafe...0001"                  // Literal value
//! }
//! ```
//!
//! This keeps secrets out of configuration files while still allowing them to
//! be loaded at runtime.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Supports both literal values and environment variable references:
/// - Literal: `"0xcafe…"`
/// - Simple env var: `"$BUYER_PRIVATE_KEY"`
/// - Braced env var: `"${BUYER_PRIVATE_KEY}"`
///
/// The wrapper implements `Deref` to provide transparent access to the inner type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    /// Get a reference to the inner value
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns the variable name if the string matches `$VAR` or `${VAR}` syntax.
    fn parse_env_var_syntax(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            return (!braced.is_empty()).then_some(braced);
        }
        let var_name = s.strip_prefix('$')?;
        let is_name =
            !var_name.is_empty() && var_name.chars().all(|c| c.is_alphanumeric() || c == '_');
        is_name.then_some(var_name)
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let value = match Self::parse_env_var_syntax(&s) {
            Some(var_name) => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(var = var_name, "Resolving configuration value from environment");
                std::env::var(var_name).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "Environment variable '{}' not found (referenced as '{}')",
                        var_name, s
                    ))
                })?
            }
            None => s,
        };

        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {}", e)))?;

        Ok(LiteralOrEnv(parsed))
    }
}

impl<T> Serialize for LiteralOrEnv<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}
