//! Macro for implementing Display and FromStr for status enums
//!
//! Lifecycle and category enums are stored, logged and accepted from admin
//! tooling as lowercase strings. This macro keeps the string form in one place
//! so `Display`, `FromStr` and the serde representation cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use syncbridge_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum LinkState {
//!     Idle,
//!     Linked,
//!     RealTime,
//! }
//!
//! impl_domain_status_conversions!(LinkState {
//!     Idle => "idle",
//!     Linked => "linked",
//!     RealTime => "real_time",
//! });
//!
//! assert_eq!(LinkState::RealTime.to_string(), "real_time");
//! assert_eq!("LINKED".parse::<LinkState>().unwrap(), LinkState::Linked);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// Parsing is case-insensitive; output always uses the declared string.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable string form used in logs, stats keys and the admin surface.
            pub fn as_str(&self) -> &'static str {
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
            type Err = $crate::errors::SyncBridgeError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::errors::SyncBridgeError::InvalidInput(format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}
