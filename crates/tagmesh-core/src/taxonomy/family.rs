use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagMeshError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFamily {
    Source,
    Structure,
    Type,
    Role,
    Theme,
    Target,
}

/// Inclusive bounds on how many tags of one family an item may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: usize,
    pub max: usize,
}

impl Cardinality {
    const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn admits(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

impl TagFamily {
    /// Check order for cardinality validation; the first violating family is reported.
    pub const ALL: [Self; 6] = [
        Self::Source,
        Self::Structure,
        Self::Type,
        Self::Role,
        Self::Theme,
        Self::Target,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Structure => "structure",
            Self::Type => "type",
            Self::Role => "role",
            Self::Theme => "theme",
            Self::Target => "target",
        }
    }

    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        match self {
            Self::Source | Self::Structure => Cardinality::new(0, 1),
            Self::Type => Cardinality::new(1, 2),
            Self::Role => Cardinality::new(0, 3),
            Self::Theme => Cardinality::new(1, 5),
            Self::Target => Cardinality::new(0, usize::MAX),
        }
    }
}

impl Display for TagFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagFamily {
    type Err = TagMeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "structure" => Ok(Self::Structure),
            "type" => Ok(Self::Type),
            "role" => Ok(Self::Role),
            "theme" => Ok(Self::Theme),
            "target" => Ok(Self::Target),
            _ => Err(TagMeshError::UnknownFamily {
                tag: s.to_string(),
                family: s.to_string(),
            }),
        }
    }
}
