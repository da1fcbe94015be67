use crate::ids::{EmployerId, HomeId, PersonId};

// ─────────────────────────────────────────────────────────────────────────────
// Data stored in MarketState::people
// ─────────────────────────────────────────────────────────────────────────────

/// All mutable state for a single person.
#[derive(Clone, Debug)]
pub struct PersonData {
    pub id: PersonId,
    pub employer: EmployerId,
    /// Home currently occupied. Cleared as soon as the home is listed.
    pub home: Option<HomeId>,
    pub loan: f64,
    pub profit: f64,
    /// Homes listed on this person's behalf and not yet sold.
    pub enlisted: u32,
}

impl PersonData {
    pub fn new(id: PersonId, employer: EmployerId) -> Self {
        PersonData {
            id,
            employer,
            home: None,
            loan: 0.0,
            profit: 0.0,
            enlisted: 0,
        }
    }

    pub fn is_listing(&self) -> bool {
        self.enlisted > 0
    }

    // ─── Settlement interface ───────────────────────────────────────────────

    /// Pay down the loan with sale proceeds; any overage is realized profit.
    pub fn receive_sale_proceeds(&mut self, price: f64) {
        self.enlisted = self.enlisted.saturating_sub(1);
        self.loan -= price;
        if self.loan < 0.0 {
            self.profit += -self.loan;
            self.loan = 0.0;
        }
    }

    pub fn take_ownership(&mut self, home: HomeId, price: f64) {
        self.loan += price;
        self.home = Some(home);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proceeds_below_loan_reduce_it() {
        let mut p = PersonData::new(PersonId(1), EmployerId(0));
        p.loan = 15_000.0;
        p.enlisted = 1;
        p.receive_sale_proceeds(10_000.0);
        assert_eq!(p.loan, 5_000.0);
        assert_eq!(p.profit, 0.0);
        assert!(!p.is_listing());
    }

    #[test]
    fn overage_becomes_profit() {
        let mut p = PersonData::new(PersonId(1), EmployerId(0));
        p.loan = 10_000.0;
        p.enlisted = 1;
        p.receive_sale_proceeds(12_500.0);
        assert_eq!(p.loan, 0.0);
        assert_eq!(p.profit, 2_500.0);
    }

    #[test]
    fn buying_adds_to_loan() {
        let mut p = PersonData::new(PersonId(1), EmployerId(0));
        p.take_ownership(HomeId(3), 11_000.0);
        assert_eq!(p.home, Some(HomeId(3)));
        assert_eq!(p.loan, 11_000.0);
    }
}
