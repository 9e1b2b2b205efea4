use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::Serialize;
use serde_json::{Map, Value};

use super::entities::customer;
use crate::modules::addresses::dtos::{AddressPayload, AddressResponse};
use crate::modules::addresses::entities::address;
use crate::shared::validation::{type_name, FieldErrors, Mode, PayloadReader};

pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PHONE_MAX_LEN: usize = 15;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub addresses: Vec<AddressResponse>,
}

impl CustomerResponse {
    pub fn new(customer: customer::Model, addresses: Vec<address::Model>) -> Self {
        Self {
            customer_id: customer.customer_id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            created_at: customer.created_at,
            addresses: addresses.into_iter().map(AddressResponse::from).collect(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CustomerPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerPayload {
    pub fn parse(data: &Map<String, Value>, mode: Mode) -> Result<Self, FieldErrors> {
        let mut reader = PayloadReader::new(data, mode);
        let payload = Self::read(&mut reader);
        reader.finish(payload)
    }

    fn read(reader: &mut PayloadReader<'_>) -> Self {
        Self {
            first_name: reader.string("first_name", NAME_MAX_LEN),
            last_name: reader.string("last_name", NAME_MAX_LEN),
            email: reader.email("email", EMAIL_MAX_LEN),
            phone: reader.string("phone", PHONE_MAX_LEN),
        }
    }

    pub fn apply(self, model: &mut customer::ActiveModel) {
        if let Some(v) = self.first_name {
            model.first_name = Set(v);
        }
        if let Some(v) = self.last_name {
            model.last_name = Set(v);
        }
        if let Some(v) = self.email {
            model.email = Set(v);
        }
        if let Some(v) = self.phone {
            model.phone = Set(v);
        }
    }
}

/// Body of the composite create: customer fields plus a required, possibly
/// empty, `addresses` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerWithAddressesPayload {
    pub customer: CustomerPayload,
    pub addresses: Vec<AddressPayload>,
}

impl CustomerWithAddressesPayload {
    pub fn parse(data: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = PayloadReader::new(data, Mode::Full);
        let customer = CustomerPayload::read(&mut reader);

        let mut addresses = Vec::new();
        if let Some(items) = reader.list("addresses") {
            for (i, item) in items.iter().enumerate() {
                let prefix = format!("addresses[{i}]");
                match item {
                    Value::Object(fields) => match AddressPayload::parse(fields, Mode::Full) {
                        Ok(address) => addresses.push(address),
                        Err(errors) => reader.errors_mut().merge_prefixed(&prefix, errors),
                    },
                    other => reader.errors_mut().add(
                        prefix,
                        format!(
                            "Invalid data. Expected a dictionary, but got {}.",
                            type_name(other)
                        ),
                    ),
                }
            }
        }

        reader.finish(Self {
            customer,
            addresses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::{INVALID_EMAIL, REQUIRED};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn full_customer_payload() {
        let payload = CustomerPayload::parse(
            &object(json!({
                "first_name": "A",
                "last_name": "B",
                "email": "a@b.com",
                "phone": "111",
                "addresses": []
            })),
            Mode::Full,
        )
        .unwrap();
        assert_eq!(payload.email.as_deref(), Some("a@b.com"));
        assert_eq!(payload.phone.as_deref(), Some("111"));
    }

    #[test]
    fn partial_customer_payload_keeps_only_supplied_fields() {
        let payload =
            CustomerPayload::parse(&object(json!({ "last_name": "C" })), Mode::Partial).unwrap();
        assert_eq!(
            payload,
            CustomerPayload {
                last_name: Some("C".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn customer_errors_are_collected_per_field() {
        let errors = CustomerPayload::parse(
            &object(json!({ "first_name": "A", "email": "nope" })),
            Mode::Full,
        )
        .unwrap_err();
        assert_eq!(errors.get("email"), Some(&[INVALID_EMAIL.to_string()][..]));
        assert_eq!(errors.get("last_name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("phone"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.get("first_name").is_none());
    }

    #[test]
    fn composite_requires_addresses_key() {
        let errors = CustomerWithAddressesPayload::parse(&object(json!({
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.com",
            "phone": "111"
        })))
        .unwrap_err();
        assert_eq!(errors.get("addresses"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn composite_accepts_empty_address_list() {
        let payload = CustomerWithAddressesPayload::parse(&object(json!({
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.com",
            "phone": "111",
            "addresses": []
        })))
        .unwrap();
        assert!(payload.addresses.is_empty());
    }

    #[test]
    fn composite_reports_nested_address_errors() {
        let errors = CustomerWithAddressesPayload::parse(&object(json!({
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.com",
            "phone": "111",
            "addresses": [
                { "street_address": "1 Main", "city": "Pune", "state": "MH", "pincode": "411001" },
                { "street_address": "2 Main", "state": "MH", "pincode": "411001" },
                "not an address"
            ]
        })))
        .unwrap_err();
        assert_eq!(
            errors.get("addresses[1].city"),
            Some(&[REQUIRED.to_string()][..])
        );
        assert_eq!(
            errors.get("addresses[2]"),
            Some(&["Invalid data. Expected a dictionary, but got string.".to_string()][..])
        );
        assert!(errors.get("addresses[0].city").is_none());
    }
}
