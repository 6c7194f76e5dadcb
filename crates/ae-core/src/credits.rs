use std::collections::HashMap;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Credits of the signed-in user. `available == total - used` and never
/// goes negative, whatever the backend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "CreditsWire")]
pub struct CreditBalance {
    #[serde(rename = "total_credits")]
    total: u64,
    #[serde(rename = "credits_used")]
    used: u64,
    #[serde(rename = "credits_available")]
    available: u64,
}

#[derive(Deserialize)]
struct CreditsWire {
    #[serde(default)]
    total_credits: i64,
    #[serde(default)]
    credits_used: i64,
}

impl From<CreditsWire> for CreditBalance {
    fn from(wire: CreditsWire) -> Self {
        Self::new(wire.total_credits.max(0) as u64, wire.credits_used.max(0) as u64)
    }
}

impl CreditBalance {
    pub fn new(total: u64, used: u64) -> Self {
        let used = used.min(total);
        Self {
            total,
            used,
            available: total - used,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn can_generate(&self) -> bool {
        self.available > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditPackage {
    pub id: serde_json::Value,
    pub name: String,
    pub credits: u64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPlan {
    pub id: serde_json::Value,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_billing_cycle")]
    pub billing_cycle: String,
    #[serde(default, alias = "credits_per_month")]
    pub credits_per_cycle: Option<u64>,
    #[serde(default, deserialize_with = "features_from_wire")]
    pub features: Vec<String>,
}

fn default_billing_cycle() -> String {
    "month".to_string()
}

/// Plans carry `features` either as a list or as a JSON-encoded string
fn features_from_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(encoded)) => {
            serde_json::from_str::<Vec<String>>(&encoded).unwrap_or_default()
        }
        _ => Vec::new(),
    })
}

/// Renders a backend id (number or string) the way it appears in price ids
pub fn id_label(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentRequest {
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentRequest {
    pub fn for_package(package: &CreditPackage) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("credit_amount".to_string(), package.credits.to_string());
        Self {
            amount: package.price,
            currency: DEFAULT_CURRENCY.to_string(),
            description: format!("Credit Purchase - {} credits", package.credits),
            metadata,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    pub plan_id: serde_json::Value,
    pub auto_renew: bool,
    pub price_id: String,
}

impl SubscriptionRequest {
    pub fn for_plan(plan: &SubscriptionPlan) -> Self {
        Self {
            plan_id: plan.id.clone(),
            auto_renew: true,
            price_id: format!("price_{}", id_label(&plan.id)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubscriptionPlanRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubscriptionResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    pub plan: SubscriptionPlanRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_is_derived() {
        let balance: CreditBalance =
            serde_json::from_str(r#"{"total_credits":10,"credits_used":3,"credits_available":99}"#)
                .unwrap();
        assert_eq!(balance.available(), 7);
        assert!(balance.can_generate());
    }

    #[test]
    fn test_available_never_negative() {
        let balance: CreditBalance =
            serde_json::from_str(r#"{"total_credits":2,"credits_used":5}"#).unwrap();
        assert_eq!(balance.available(), 0);
        assert_eq!(balance.used(), 2);
        assert!(!balance.can_generate());
    }

    #[test]
    fn test_plan_features_from_encoded_string() {
        let plan: SubscriptionPlan = serde_json::from_str(
            r#"{"id":2,"name":"Pro","price":9.99,"billing_cycle":"month","features":"[\"HD output\",\"Priority queue\"]"}"#,
        )
        .unwrap();
        assert_eq!(plan.features, vec!["HD output", "Priority queue"]);

        let plan: SubscriptionPlan = serde_json::from_str(
            r#"{"id":2,"name":"Pro","price":9.99,"features":"not json"}"#,
        )
        .unwrap();
        assert!(plan.features.is_empty());
        assert_eq!(plan.billing_cycle, "month");
    }

    #[test]
    fn test_payment_intent_for_package() {
        let package = CreditPackage {
            id: serde_json::json!(1),
            name: "Starter".into(),
            credits: 50,
            price: 4.99,
        };
        let req = PaymentIntentRequest::for_package(&package);
        assert_eq!(req.description, "Credit Purchase - 50 credits");
        assert_eq!(req.metadata["credit_amount"], "50");
        assert_eq!(req.currency, "USD");
    }

    #[test]
    fn test_subscription_price_id() {
        let plan: SubscriptionPlan =
            serde_json::from_str(r#"{"id":"pro","name":"Pro","price":9.99}"#).unwrap();
        assert_eq!(SubscriptionRequest::for_plan(&plan).price_id, "price_pro");
    }
}
