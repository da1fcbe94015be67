//! Identity newtypes for homes, people and employers.

use std::fmt;

use serde::Serialize;

/// Identity of a home. Homes are numbered from 1 and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HomeId(pub u32);

/// Identity of a person. Counters are monotonic across growth and shrinkage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonId(pub u32);

/// Index of an employer in `HousingState::employers`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployerId(pub usize);

impl fmt::Display for HomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{:02}", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:02}", self.0)
    }
}

impl fmt::Display for EmployerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:02}", self.0 + 1)
    }
}

/// Hands out increasing identities starting at 1.
#[derive(Clone, Debug, Default)]
pub struct IdCounter {
    last: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_like_report_labels() {
        assert_eq!(HomeId(3).to_string(), "H03");
        assert_eq!(PersonId(120).to_string(), "P120");
        assert_eq!(EmployerId(0).to_string(), "E01");
    }

    #[test]
    fn counter_is_monotonic() {
        let mut ids = IdCounter::new();
        assert_eq!(PersonId(ids.next()), PersonId(1));
        assert_eq!(PersonId(ids.next()), PersonId(2));
        assert_eq!(PersonId(ids.next()), PersonId(3));
    }
}
