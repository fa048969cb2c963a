use serde::{Deserialize, Serialize};

/// Paid plans from the pricing page. The free tier is the signup bonus, not
/// a purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Creator,
    Pro,
}

impl Plan {
    /// Credits granted per purchase; always positive.
    pub fn credits(self) -> i64 {
        match self {
            Plan::Creator => 50,
            Plan::Pro => 200,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub credits: i64,
}
