//! Macro for implementing Display and FromStr for wire-name enums
//!
//! Enums that have a fixed textual form on the wire (content types, delivery
//! stages) share one implementation for both traits. Parsing is
//! case-insensitive; display always yields the canonical lowercase name.
//!
//! # Example
//!
//! ```rust
//! use moneybird_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Format {
//!     Json,
//!     Xml,
//! }
//!
//! impl_wire_name_conversions!(Format {
//!     Json => "json",
//!     Xml => "xml",
//! });
//!
//! assert_eq!(Format::Json.to_string(), "json");
//! assert_eq!("XML".parse::<Format>(), Ok(Format::Xml));
//! ```

/// Implements Display and FromStr traits for wire-name enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase wire
///   names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = std::string::String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStage {
        Draft,
        Sent,
    }

    impl_wire_name_conversions!(TestStage {
        Draft => "draft",
        Sent => "sent",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestStage::Draft.to_string(), "draft");
        assert_eq!(TestStage::Sent.to_string(), "sent");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestStage::from_str("DRAFT").unwrap(), TestStage::Draft);
        assert_eq!(TestStage::from_str("SeNt").unwrap(), TestStage::Sent);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestStage::from_str("archived");
        assert!(result.unwrap_err().contains("Invalid TestStage: archived"));
    }
}
