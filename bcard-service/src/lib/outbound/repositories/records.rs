use serde::Deserialize;
use serde::Serialize;

use crate::domain::common::errors::FieldError;
use crate::domain::common::models::Address;
use crate::domain::common::models::Image;

/// JSONB shape of an address column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    pub state: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: i64,
    #[serde(default)]
    pub zip: String,
}

impl From<&Address> for AddressRecord {
    fn from(address: &Address) -> Self {
        Self {
            state: address.state.clone(),
            country: address.country.clone(),
            city: address.city.clone(),
            street: address.street.clone(),
            house_number: i64::from(address.house_number),
            zip: address.zip.clone(),
        }
    }
}

impl TryFrom<AddressRecord> for Address {
    type Error = FieldError;

    fn try_from(record: AddressRecord) -> Result<Self, Self::Error> {
        Address::new(
            &record.state,
            &record.country,
            &record.city,
            &record.street,
            record.house_number,
            &record.zip,
        )
    }
}

/// JSONB shape of an image column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub alt: String,
}

impl From<&Image> for ImageRecord {
    fn from(image: &Image) -> Self {
        Self {
            url: image.url.clone(),
            alt: image.alt.clone(),
        }
    }
}

impl From<ImageRecord> for Image {
    fn from(record: ImageRecord) -> Self {
        Image {
            url: record.url,
            alt: record.alt,
        }
    }
}
