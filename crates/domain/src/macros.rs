//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Several domain enums (environments, diagnostic codes, severities) have a
//! stable lowercase identifier that appears in configuration files and in
//! serialized output. This macro generates both conversions from one table.
//!
//! # Example
//!
//! ```rust
//! use postkit_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Retail,
//!     Commercial,
//! }
//!
//! impl_domain_enum_conversions!(Channel {
//!     Retail => "retail",
//!     Commercial => "commercial",
//! });
//!
//! assert_eq!(Channel::Retail.to_string(), "retail");
//! assert_eq!("COMMERCIAL".parse::<Channel>(), Ok(Channel::Commercial));
//! ```

/// Implements Display and FromStr traits for identifier enums
///
/// Parsing is case-insensitive and trims surrounding whitespace; output is the
/// identifier exactly as written in the table.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable identifier for this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
