//! Display/FromStr conversions for string-labelled enums
//!
//! ```rust
//! use punchsync_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Direction {
//!     CheckIn,
//!     CheckOut,
//! }
//!
//! impl_label_conversions!(Direction {
//!     CheckIn => "check_in",
//!     CheckOut => "check_out",
//! });
//!
//! assert_eq!(Direction::CheckOut.to_string(), "check_out");
//! assert_eq!("CHECK_IN".parse::<Direction>(), Ok(Direction::CheckIn));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a fieldless enum.
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($label),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("unknown {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
