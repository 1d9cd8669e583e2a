use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::case_insensitive::deserialize_folded;
use crate::transaction::Transaction;

pub type CustomerId = i32;

/// Customer record as stored by the repository and exchanged over HTTP.
///
/// `id`, `created_at` and `updated_at` are owned by the server: whatever a
/// client sends for them on create is overwritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub cpf: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, cpf: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            cpf: cpf.into(),
            created_at: now,
            updated_at: now,
            transactions: Vec::new(),
        }
    }

    /// Set both timestamps from a single clock reading.
    pub fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CustomerFields {
    id: CustomerId,
    name: Option<String>,
    cpf: Option<String>,
    createdat: DateTime<Utc>,
    updatedat: DateTime<Utc>,
    transactions: Option<Vec<Transaction>>,
}

impl From<CustomerFields> for Customer {
    fn from(f: CustomerFields) -> Self {
        Self {
            id: f.id,
            name: f.name.unwrap_or_default(),
            cpf: f.cpf.unwrap_or_default(),
            created_at: f.createdat,
            updated_at: f.updatedat,
            transactions: f.transactions.unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for Customer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_folded::<_, CustomerFields>(deserializer).map(Customer::from)
    }
}

/// Partial update. Only the fields present are merged; unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CustomerPatchFields {
    name: Option<String>,
    cpf: Option<String>,
    transactions: Option<Vec<Transaction>>,
}

impl<'de> Deserialize<'de> for CustomerPatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let f = deserialize_folded::<_, CustomerPatchFields>(deserializer)?;
        Ok(Self { name: f.name, cpf: f.cpf, transactions: f.transactions })
    }
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cpf.is_none() && self.transactions.is_none()
    }

    /// Merge into `customer` and refresh `updated_at`. `id` and `created_at` never change.
    pub fn apply_to(self, customer: &mut Customer, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(cpf) = self.cpf {
            customer.cpf = cpf;
        }
        if let Some(transactions) = self.transactions {
            customer.transactions = transactions;
        }
        customer.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn new_customer_has_equal_timestamps_and_no_transactions() {
        let c = Customer::new(1, "Ana", "123.456.789-00");
        assert_eq!(c.created_at, c.updated_at);
        assert!(c.transactions.is_empty());
    }

    #[test]
    fn serializes_camel_case_with_transactions_array() {
        let value = serde_json::to_value(Customer::new(1, "Ana", "1")).unwrap();
        for key in ["id", "name", "cpf", "createdAt", "updatedAt", "transactions"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["transactions"], json!([]));
    }

    #[test]
    fn deserializes_field_names_in_any_case() {
        let c: Customer = serde_json::from_value(json!({
            "ID": 4,
            "NAME": "Bruno",
            "Cpf": "987",
            "CreatedAt": "2024-01-02T03:04:05Z",
            "transactions": [{"Description": "pix", "AMOUNT": 100}]
        }))
        .unwrap();
        assert_eq!(c.id, 4);
        assert_eq!(c.name, "Bruno");
        assert_eq!(c.cpf, "987");
        assert_eq!(c.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert_eq!(c.transactions.len(), 1);
        assert_eq!(c.transactions[0].description, "pix");
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let c: Customer = serde_json::from_value(json!({"name": "Ana"})).unwrap();
        assert_eq!(c.id, 0);
        assert!(c.cpf.is_empty());
        assert!(c.transactions.is_empty());
    }

    #[test]
    fn null_fields_decode_like_missing_ones() {
        let c: Customer = serde_json::from_value(json!({
            "name": null,
            "cpf": null,
            "transactions": null
        }))
        .unwrap();
        assert!(c.name.is_empty());
        assert!(c.cpf.is_empty());
        assert!(c.transactions.is_empty());
    }

    #[test]
    fn round_trips_through_own_encoding() {
        let original = Customer::new(7, "Carla", "555");
        let decoded: Customer =
            serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn stamp_created_overrides_client_timestamps() {
        let mut c: Customer = serde_json::from_value(json!({
            "createdAt": "2000-01-01T00:00:00Z",
            "updatedAt": "2001-01-01T00:00:00Z"
        }))
        .unwrap();
        let now = Utc::now();
        c.stamp_created(now);
        assert_eq!(c.created_at, now);
        assert_eq!(c.updated_at, now);
    }

    #[test]
    fn patch_ignores_unknown_and_server_owned_keys() {
        let patch: CustomerPatch = serde_json::from_value(json!({
            "Name": "Novo",
            "id": 99,
            "createdAt": "2000-01-01T00:00:00Z",
            "color": "blue"
        }))
        .unwrap();
        assert_eq!(patch, CustomerPatch { name: Some("Novo".into()), ..Default::default() });
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let mut c = Customer::new(1, "Ana", "111");
        let created = c.created_at;
        let later = created + Duration::seconds(5);
        CustomerPatch { cpf: Some("222".into()), ..Default::default() }.apply_to(&mut c, later);
        assert_eq!(c.name, "Ana");
        assert_eq!(c.cpf, "222");
        assert_eq!(c.id, 1);
        assert_eq!(c.created_at, created);
        assert_eq!(c.updated_at, later);
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: CustomerPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
    }
}
