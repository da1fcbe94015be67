use crate::agents::Location;
use crate::ids::EmployerId;

// ─────────────────────────────────────────────────────────────────────────────
// Data stored in HousingState::employers
// ─────────────────────────────────────────────────────────────────────────────

/// An employer: a fixed workplace with a fractional headcount.
///
/// Location and growth multiplier never change; the headcount is driven by
/// the population driver and truncated whenever people are created or
/// removed.
#[derive(Clone, Debug)]
pub struct EmployerData {
    pub id: EmployerId,
    pub location: Location,
    pub size: f64,
    pub growth_rate: f64,
}

impl EmployerData {
    pub fn new(id: EmployerId, location: Location, size: f64, growth_rate: f64) -> Self {
        EmployerData {
            id,
            location,
            size,
            growth_rate,
        }
    }

    /// Realized number of employees.
    pub fn headcount(&self) -> usize {
        self.size as usize
    }

    // ─── Step sub-methods ───────────────────────────────────────────────────

    /// Grow by the growth multiplier; returns the whole employees gained.
    pub fn grow(&mut self) -> usize {
        let before = self.headcount();
        self.size *= self.growth_rate;
        self.headcount().saturating_sub(before)
    }

    /// Shrink by the squared growth multiplier, never below one employee;
    /// returns the whole employees lost.
    pub fn shrink(&mut self) -> usize {
        let before = self.headcount();
        self.size /= self.growth_rate.powi(2);
        if self.size < 1.0 {
            self.size = 1.0;
        }
        before.saturating_sub(self.headcount())
    }
}
