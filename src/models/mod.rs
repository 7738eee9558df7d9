//! Entity models for the coordinator store
//!
//! Plain value records for scenarios, test runs, chaos events, test results
//! and service registrations. Enumerated fields serialize as snake_case
//! strings and reject anything outside their allowed set.

use serde_json::{Map, Value};

/// Open structured payload used for configuration, parameters and metadata.
pub type Payload = Map<String, Value>;

/// Declares a string-backed enumeration with `as_str`, `Display` and a
/// validating `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every allowed value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::AdapterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::error::AdapterError::Validation(format!(
                        "'{}' is not a valid {}",
                        other,
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

mod chaos_event;
mod scenario;
mod service;
mod test_result;
mod test_run;

pub use chaos_event::{ChaosEvent, EventStatus, EventType};
pub use scenario::{Scenario, ScenarioStatus, ScenarioType};
pub use service::ServiceInfo;
pub(crate) use service::staleness_cutoff;
pub use test_result::{AssertionType, ResultStatus, TestResult};
pub use test_run::{RunStatus, TestRun};
