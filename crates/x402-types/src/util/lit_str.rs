//! Compile-time string literal type generation.
//!
//! Wire messages carry a few strings that never vary, such as the scheme name.
//! The [`lit_str!`](crate::lit_str) macro turns such a string into a zero-sized type, so
//! a payload with the wrong value fails at deserialization instead of deep
//! inside scheme logic.
//!
//! # Example
//!
//! ```
//! use x402_types::lit_str;
//!
//! lit_str!(DeferredScheme, "deferred");
//!
//! let scheme: DeferredScheme = "deferred".parse().unwrap();
//! assert_eq!(scheme.to_string(), "deferred");
//! assert!("exact".parse::<DeferredScheme>().is_err());
//! ```

/// Creates a type that represents a specific string literal.
///
/// The generated type:
/// - Has a `VALUE` constant with the string
/// - Implements `FromStr` (only accepts the exact string)
/// - Implements `Serialize`/`Deserialize` (as the string)
/// - Implements `Display` (outputs the string)
#[macro_export]
macro_rules! lit_str {
    ($struct_name:ident, $val:expr) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $struct_name;

        impl $struct_name {
            pub const VALUE: &'static str = $val;
        }

        impl AsRef<str> for $struct_name {
            fn as_ref(&self) -> &str {
                Self::VALUE
            }
        }

        impl std::str::FromStr for $struct_name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s == Self::VALUE {
                    Ok($struct_name)
                } else {
                    Err(format!("expected '{}', got '{}'", Self::VALUE, s))
                }
            }
        }

        impl serde::Serialize for $struct_name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(Self::VALUE)
            }
        }

        impl<'de> serde::Deserialize<'de> for $struct_name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                if s == Self::VALUE {
                    Ok($struct_name)
                } else {
                    Err(<D::Error as serde::de::Error>::custom(format!(
                        "expected '{}', got '{}'",
                        Self::VALUE,
                        s
                    )))
                }
            }
        }

        impl std::fmt::Display for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(Self::VALUE)
            }
        }
    };
}
