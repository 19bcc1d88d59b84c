//! Age bands. Scaler and model selection both route through [`AgeBand::for_age`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Oldest age still served by the young-band artifacts.
pub const YOUNG_MAX_AGE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// age <= 25
    Young,
    /// age > 25
    Rest,
}

impl AgeBand {
    pub fn for_age(age: u32) -> Self {
        if age <= YOUNG_MAX_AGE {
            AgeBand::Young
        } else {
            AgeBand::Rest
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeBand::Young => "young",
            AgeBand::Rest => "rest",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per age band.
#[derive(Debug, Clone)]
pub struct Banded<T> {
    pub young: T,
    pub rest: T,
}

impl<T> Banded<T> {
    pub fn new(young: T, rest: T) -> Self {
        Self { young, rest }
    }

    pub fn get(&self, band: AgeBand) -> &T {
        match band {
            AgeBand::Young => &self.young,
            AgeBand::Rest => &self.rest,
        }
    }
}
