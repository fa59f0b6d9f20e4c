//! Domain primitives for users and teams.
//!
//! Newtype ids keep user ids and team ids from being mixed up at call sites;
//! `ShirtSize` replaces the free-form string the registration form submits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                i32::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

entity_id!(
    /// Unique identifier of a registered user.
    UserId
);

entity_id!(
    /// Unique identifier of a team.
    TeamId
);

/// T-shirt sizes offered at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShirtSize {
    #[serde(rename = "XS")]
    ExtraSmall,
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
    #[serde(rename = "XXL")]
    DoubleExtraLarge,
}

impl ShirtSize {
    pub const ALL: [Self; 6] = [
        Self::ExtraSmall,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::ExtraLarge,
        Self::DoubleExtraLarge,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExtraSmall => "XS",
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
            Self::DoubleExtraLarge => "XXL",
        }
    }
}

impl fmt::Display for ShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShirtSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown shirt size: {wanted}"))
    }
}
