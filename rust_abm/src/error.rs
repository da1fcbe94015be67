use thiserror::Error;

use crate::ids::{EmployerId, HomeId, PersonId};

#[derive(Error, Debug)]
pub enum HousingError {
    #[error("home {0} is not listed for sale")]
    HomeNotListed(HomeId),

    #[error("home {0} is already listed for sale")]
    HomeAlreadyListed(HomeId),

    #[error("buyer {buyer} already occupies home {home}")]
    BuyerAlreadyHoused { buyer: PersonId, home: HomeId },

    #[error("buyer {buyer} already owns home {home}")]
    BuyerOwnsHome { buyer: PersonId, home: HomeId },

    #[error("home {home} has an inconsistent owner reference: {message}")]
    OwnerInconsistent { home: HomeId, message: String },

    #[error("invalid asking price {price} for home {home}")]
    InvalidAskingPrice { home: HomeId, price: f64 },

    #[error("unknown home {0}")]
    UnknownHome(HomeId),

    #[error("unknown person {0}")]
    UnknownPerson(PersonId),

    #[error("unknown employer {0}")]
    UnknownEmployer(EmployerId),

    #[error("market invariant violated: {message}")]
    Invariant { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HousingError {
    /// Data-integrity failures that must abort the current tick.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(
            self,
            HousingError::ConfigError { .. }
                | HousingError::TomlError(_)
                | HousingError::CsvError(_)
                | HousingError::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HousingError>;
