//! Macro for implementing Display and FromStr for small status enums
//!
//! Used for enums that appear in logs, summaries and command-line output,
//! where a stable lowercase spelling is part of the contract.
//!
//! # Example
//!
//! ```rust
//! use diradmin_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Listing,
//!     Processing,
//! }
//!
//! impl_status_conversions!(Phase {
//!     Listing => "listing",
//!     Processing => "processing",
//! });
//!
//! assert_eq!(Phase::Listing.to_string(), "listing");
//! assert_eq!("PROCESSING".parse::<Phase>(), Ok(Phase::Processing));
//! ```

/// Implements `Display` (lowercase) and case-insensitive `FromStr`.
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
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
    enum Phase {
        Listing,
        Processing,
    }

    impl_status_conversions!(Phase {
        Listing => "listing",
        Processing => "processing",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(Phase::Listing.to_string(), "listing");
        assert_eq!(Phase::Processing.to_string(), "processing");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(Phase::from_str("listing").unwrap(), Phase::Listing);
        assert_eq!(Phase::from_str("Processing").unwrap(), Phase::Processing);
    }

    mod with_result_alias {
        #[allow(dead_code)]
        type Result<T> = std::result::Result<T, String>;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Mode {
            Dry,
            Live,
        }

        impl_status_conversions!(Mode {
            Dry => "dry",
            Live => "live",
        });
    }

    #[test]
    fn test_expands_next_to_a_result_alias() {
        use with_result_alias::Mode;

        assert_eq!(Mode::from_str("LIVE").unwrap(), Mode::Live);
        assert_eq!(Mode::Dry.to_string(), "dry");
    }

    #[test]
    fn test_fromstr_invalid() {
        let err = Phase::from_str("sleeping").unwrap_err();
        assert_eq!(err, "Invalid Phase: sleeping");
    }
}
