//! Macro for implementing Display and FromStr for domain enums
//!
//! Settings enums are read from environment variables and config files, so
//! each variant has one canonical string plus optional aliases accepted when
//! parsing. Parsing is case-insensitive and ignores surrounding whitespace.
//!
//! # Example
//!
//! ```rust
//! use pkce_auth_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Memory,
//!     File,
//! }
//!
//! impl_domain_enum_conversions!(Backend {
//!     Memory => "memory" | "in_memory",
//!     File => "file",
//! });
//!
//! assert_eq!("IN_MEMORY".parse::<Backend>().unwrap(), Backend::Memory);
//! assert_eq!(Backend::File.to_string(), "file");
//! ```

/// Implements Display and FromStr traits for domain enums
///
/// This macro generates:
/// - Display trait: writes the canonical string of the variant
/// - FromStr trait: parses the canonical string or any alias
///   (case-insensitive) and fails with `AuthError::Configuration`
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str | $alias...` - Canonical string and optional aliases.
///   Aliases must be lowercase.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::errors::AuthError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err($crate::errors::AuthError::Configuration(format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::errors::AuthError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestMode {
        Fast,
        Careful,
    }

    impl_domain_enum_conversions!(TestMode {
        Fast => "fast" | "quick",
        Careful => "careful",
    });

    #[test]
    fn test_display_uses_canonical_string() {
        assert_eq!(TestMode::Fast.to_string(), "fast");
        assert_eq!(TestMode::Careful.to_string(), "careful");
    }

    #[test]
    fn test_fromstr_accepts_aliases_and_case() {
        assert_eq!(TestMode::from_str("fast").unwrap(), TestMode::Fast);
        assert_eq!(TestMode::from_str("QUICK").unwrap(), TestMode::Fast);
        assert_eq!(TestMode::from_str("  Careful ").unwrap(), TestMode::Careful);
    }

    #[test]
    fn test_fromstr_invalid_is_configuration_error() {
        let err = TestMode::from_str("reckless").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(ref msg) if msg.contains("TestMode")));
    }

    mod with_result_alias {
        // The crate's one-parameter alias must not leak into the expansion.
        #[allow(unused_imports)]
        use crate::errors::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub(super) enum Backend {
            Memory,
        }

        impl_domain_enum_conversions!(Backend {
            Memory => "memory" | "in_memory",
        });
    }

    #[test]
    fn test_expands_alongside_result_alias() {
        use with_result_alias::Backend;

        assert_eq!(Backend::from_str("IN_MEMORY").unwrap(), Backend::Memory);
        assert_eq!(Backend::Memory.to_string(), "memory");
    }
}
