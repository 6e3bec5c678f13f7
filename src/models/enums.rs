use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Labels offered by the medication entry form and stored verbatim by the backend.
str_enum!(FrequencyLabel {
    EveryDay => "Every day",
    EveryXDays => "Every x days",
    DayOfWeek => "Day of the week",
    DayOfMonth => "Day of the month",
});

impl FrequencyLabel {
    /// Lenient match used on backend data: trims, ignores case, and accepts
    /// the legacy `"daily"` spelling. Returns `None` for anything else.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "every day" | "daily" => Some(Self::EveryDay),
            "every x days" => Some(Self::EveryXDays),
            "day of the week" => Some(Self::DayOfWeek),
            "day of the month" => Some(Self::DayOfMonth),
            _ => None,
        }
    }
}
