use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::Serialize;
use serde_json::{Map, Value};

use super::entities::address;
use crate::shared::validation::{
    parse_integer, FieldErrors, Mode, PayloadReader, INVALID_INTEGER,
};

pub const STREET_ADDRESS_MAX_LEN: usize = 255;
pub const CITY_MAX_LEN: usize = 100;
pub const STATE_MAX_LEN: usize = 100;
pub const PINCODE_MAX_LEN: usize = 10;
pub const COUNTRY_MAX_LEN: usize = 50;

const CUSTOMER_ID_REQUIRED: &str = "Customer ID is required.";

#[derive(Debug, Clone, Serialize)]
pub struct AddressResponse {
    pub address_id: i32,
    /// Id of the owning customer.
    pub customer: i32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl From<address::Model> for AddressResponse {
    fn from(address: address::Model) -> Self {
        Self {
            address_id: address.address_id,
            customer: address.customer_id,
            street_address: address.street_address,
            city: address.city,
            state: address.state,
            pincode: address.pincode,
            country: address.country,
            created_at: address.created_at,
        }
    }
}

/// Validated address fields. The owning customer is never read from here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddressPayload {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

impl AddressPayload {
    pub fn parse(data: &Map<String, Value>, mode: Mode) -> Result<Self, FieldErrors> {
        let mut reader = PayloadReader::new(data, mode);
        let payload = Self {
            street_address: reader.string("street_address", STREET_ADDRESS_MAX_LEN),
            city: reader.string("city", CITY_MAX_LEN),
            state: reader.string("state", STATE_MAX_LEN),
            pincode: reader.string("pincode", PINCODE_MAX_LEN),
            country: reader.optional_string("country", COUNTRY_MAX_LEN),
        };
        reader.finish(payload)
    }

    pub fn apply(self, model: &mut address::ActiveModel) {
        if let Some(v) = self.street_address {
            model.street_address = Set(v);
        }
        if let Some(v) = self.city {
            model.city = Set(v);
        }
        if let Some(v) = self.state {
            model.state = Set(v);
        }
        if let Some(v) = self.pincode {
            model.pincode = Set(v);
        }
        if let Some(v) = self.country {
            model.country = Set(v);
        }
    }
}

/// Reads the mandatory `customer_id` of a standalone address create.
/// Zero and empty strings count as missing.
pub fn customer_reference(data: &Map<String, Value>) -> Result<i32, FieldErrors> {
    let missing = || FieldErrors::single("customer_id", CUSTOMER_ID_REQUIRED);
    match data.get("customer_id") {
        None | Some(Value::Null) => Err(missing()),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing()),
        Some(value) => match parse_integer(value) {
            Some(0) => Err(missing()),
            Some(id) => Ok(id),
            None => Err(FieldErrors::single("customer_id", INVALID_INTEGER)),
        },
    }
}
