use crate::models::RawListing;
use chrono::{NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Area covering every city
pub const ALL_AREAS: &str = "nl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WantTo {
    Buy,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
}

/// Search parameters handed to the listing source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Lowercase city name, or `nl` for the whole country
    pub area: String,
    pub want_to: WantTo,
    pub property_type: PropertyType,
    /// Minimum price (EUR)
    pub min_price: Option<i64>,
    /// Maximum price (EUR)
    pub max_price: Option<i64>,
    /// Minimum living area (m2)
    pub min_living_area: Option<i64>,
    /// Only listings published within this many days
    pub days_since: Option<u32>,
    pub page_start: u32,
    /// Number of result pages to pull
    pub n_pages: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            area: "amsterdam".to_string(),
            want_to: WantTo::Buy,
            property_type: PropertyType::House,
            min_price: None,
            max_price: None,
            min_living_area: None,
            days_since: None,
            page_start: 1,
            n_pages: 1,
        }
    }
}

impl SearchParams {
    /// Whether a listing falls inside the area, price, size and recency bounds.
    ///
    /// Listings missing the field a bound looks at are given the benefit of
    /// the doubt.
    pub fn admits(&self, listing: &RawListing) -> bool {
        self.admits_on(listing, Utc::now().date_naive())
    }

    fn admits_on(&self, listing: &RawListing, today: NaiveDate) -> bool {
        let fields = &listing.fields;

        let in_area = self.area.eq_ignore_ascii_case(ALL_AREAS)
            || fields
                .city
                .as_deref()
                .map(|city| city == self.area.to_lowercase())
                .unwrap_or(true);

        let above_min = at_least(fields.price, self.min_price);
        let below_max = match (self.max_price, fields.price) {
            (Some(max), Some(price)) => price <= max,
            _ => true,
        };
        let large_enough = at_least(fields.living_area, self.min_living_area);

        let recent = match (self.days_since, fields.date_list.as_deref().and_then(listed_on)) {
            (Some(days), Some(listed)) => (today - listed).num_days() <= i64::from(days),
            _ => true,
        };

        in_area && above_min && below_max && large_enough && recent
    }
}

fn at_least(value: Option<i64>, bound: Option<i64>) -> bool {
    match (bound, value) {
        (Some(bound), Some(value)) => value >= bound,
        _ => true,
    }
}

/// Listing date as exported by the scraper, `YYYY-MM-DD` with an optional time
fn listed_on(date_list: &str) -> Option<NaiveDate> {
    let date = date_list.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
