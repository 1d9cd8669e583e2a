use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::case_insensitive::deserialize_folded;

/// A money movement recorded against a customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i32,
    pub description: String,
    /// Minor currency units (cents); negative for debits.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TransactionFields {
    id: i32,
    description: String,
    amount: i64,
    createdat: DateTime<Utc>,
}

impl From<TransactionFields> for Transaction {
    fn from(f: TransactionFields) -> Self {
        Self { id: f.id, description: f.description, amount: f.amount, created_at: f.createdat }
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_folded::<_, TransactionFields>(deserializer).map(Transaction::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_camel_case() {
        let tx = Transaction {
            id: 3,
            description: "deposit".into(),
            amount: 1250,
            created_at: DateTime::<Utc>::default(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert!(value["createdAt"].is_string());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["amount"], json!(1250));
    }

    #[test]
    fn decodes_any_key_case_with_defaults() {
        let tx: Transaction = serde_json::from_value(json!({"ID": 9, "Amount": -300})).unwrap();
        assert_eq!(tx.id, 9);
        assert_eq!(tx.amount, -300);
        assert!(tx.description.is_empty());
    }
}
