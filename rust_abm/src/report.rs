//! Reporting: one row per settled sale, per-person valuation snapshots and a
//! CSV writer for both sale and tick records.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::agents::{HomeData, Location, PersonData};
use crate::error::{HousingError, Result};
use crate::ids::{HomeId, PersonId};
use crate::markets::SettledSale;
use crate::valuation::Valuation;

/// One settled sale, in the column layout of the sale log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "i")]
    pub tick: u64,
    #[serde(rename = "Home", serialize_with = "as_label")]
    pub home: HomeId,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "Seller", serialize_with = "as_optional_label")]
    pub seller: Option<PersonId>,
    #[serde(rename = "Buyer", serialize_with = "as_label")]
    pub buyer: PersonId,
    #[serde(rename = "OldPrice")]
    pub old_price: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "NumPeople")]
    pub num_people: usize,
    #[serde(rename = "NumHomes")]
    pub num_homes: usize,
    #[serde(rename = "NumForSale")]
    pub num_for_sale: usize,
}

impl SaleRecord {
    pub fn new(tick: u64, sale: &SettledSale, location: Location, num_people: usize, num_homes: usize) -> Self {
        SaleRecord {
            tick,
            home: sale.event.home,
            x: location.x,
            y: location.y,
            seller: sale.event.seller,
            buyer: sale.event.buyer,
            old_price: sale.event.old_price,
            price: sale.event.price,
            num_people,
            num_homes,
            num_for_sale: sale.for_sale_after,
        }
    }
}

fn as_label<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn as_optional_label<T: fmt::Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.collect_str(value),
        None => serializer.serialize_str(""),
    }
}

/// A person's position as seen by the valuation model.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonValuation {
    pub person: PersonId,
    pub listing: bool,
    pub home: Option<HomeId>,
    pub sold_price: f64,
    pub revenue: f64,
    pub cost: f64,
    /// Revenue minus carrying cost.
    pub score: f64,
    pub profit: f64,
}

impl PersonValuation {
    pub fn new(valuation: &Valuation, person: &PersonData, workplace: &Location, home: Option<&HomeData>) -> Self {
        let revenue = valuation.revenue(workplace, home);
        let cost = valuation.carrying_cost(person.loan, home);
        PersonValuation {
            person: person.id,
            listing: person.is_listing(),
            home: home.map(|h| h.id),
            sold_price: home.map_or(0.0, |h| h.sold_price),
            revenue,
            cost,
            score: revenue - cost,
            profit: person.profit,
        }
    }
}

/// CSV writer for any serializable record; the header row comes from the
/// first record written.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl CsvReport<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> CsvReport<W> {
    pub fn new(inner: W) -> Self {
        CsvReport {
            writer: csv::Writer::from_writer(inner),
            rows: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, T: Serialize + 'a>(&mut self, records: impl IntoIterator<Item = &'a T>) -> Result<()> {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| {
            let cause = e.error();
            HousingError::IoError(std::io::Error::new(cause.kind(), cause.to_string()))
        })
    }
}
