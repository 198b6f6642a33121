use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Scalar fields shared by raw and normalized listings.
///
/// Columns the scraper emits beyond these are dropped at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFields {
    #[serde(deserialize_with = "house_id_from_scalar")]
    pub house_id: String,
    pub url: String,
    /// Lowercased on the way in, the form areas and store filters use
    #[serde(
        default,
        deserialize_with = "lowercase_city",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_area: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedroom: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathroom: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descrip: Option<String>,
}

impl ListingFields {
    pub const NAMES: &'static [&'static str] = &[
        "house_id",
        "url",
        "city",
        "address",
        "price",
        "price_m2",
        "living_area",
        "room",
        "bedroom",
        "bathroom",
        "energy_label",
        "house_type",
        "building_type",
        "zip",
        "year_built",
        "date_list",
        "descrip",
    ];
}

/// One scraped listing as exported by the listing source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(flatten)]
    pub fields: ListingFields,
    /// Comma separated `"<url> <size-tag>"` entries
    pub photo: String,
}

impl RawListing {
    pub fn house_id(&self) -> &str {
        &self.fields.house_id
    }
}

/// A listing ready for the document store.
///
/// The serialized form is the property set of the store collection, so field
/// names here must stay in step with `collection_def.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    #[serde(flatten)]
    pub fields: ListingFields,
    pub image_url: String,
    pub image_enc: String,
    #[serde(skip)]
    pub uuid: Uuid,
    pub html_url: String,
    pub linked_image: String,
}

impl NormalizedListing {
    pub const DERIVED_NAMES: &'static [&'static str] =
        &["image_url", "image_enc", "html_url", "linked_image"];

    /// Every property name this listing can carry in the store
    pub fn property_names() -> impl Iterator<Item = &'static str> {
        ListingFields::NAMES
            .iter()
            .chain(Self::DERIVED_NAMES.iter())
            .copied()
    }

    pub fn house_id(&self) -> &str {
        &self.fields.house_id
    }

    /// Store properties as a JSON object
    pub fn properties(&self) -> serde_json::Value {
        // Only plain strings, integers and floats live in here.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// The scraper emits `house_id` as either a number or a string.
fn house_id_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Text(String),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(id) => id.to_string(),
        Scalar::Text(id) => id,
    })
}

fn lowercase_city<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|city| city.to_lowercase()))
}
