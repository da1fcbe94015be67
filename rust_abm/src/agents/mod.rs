pub mod employer;
pub mod home;
pub mod person;

pub use employer::EmployerData;
pub use home::{HomeData, HomeStatus};
pub use person::PersonData;

/// Fixed position on the simulation plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Location { x, y }
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Location) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}
