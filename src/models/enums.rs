use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Admin => "admin",
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(TranscriptType {
    MedicalRecord => "medical_record",
    Transcript => "transcript",
});

str_enum!(TranscriptStatus {
    Draft => "draft",
    Published => "published",
});

/// Stock-threshold classification used by inventory views and analytics.
str_enum!(StockLevel {
    Critical => "Critical",
    Low => "Low",
    Adequate => "Adequate",
});

/// Expiration classification relative to "now" and "now + 30 days".
str_enum!(ExpiryStatus {
    Expired => "Expired",
    ExpiringSoon => "Expiring Soon",
    Valid => "Valid",
});
