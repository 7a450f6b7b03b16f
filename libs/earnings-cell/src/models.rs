// libs/earnings-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Payment,
    Refund,
    Payout,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Payment => write!(f, "payment"),
            TransactionType::Refund => write!(f, "refund"),
            TransactionType::Payout => write!(f, "payout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Derived earnings aggregates for the therapist dashboard. All pure
/// functions over the fetched transaction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSummary {
    pub total_earnings: f64,
    pub pending_earnings: f64,
    pub this_month_earnings: f64,
    pub monthly: Vec<MonthlyEarnings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEarnings {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Client activity aggregates for the therapist's clients page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientActivityStats {
    pub unique_clients: usize,
    pub active_clients: usize,
    /// Share of unique clients with an appointment in the last 30 days,
    /// in [0, 100]. Zero clients yields 0.
    pub active_client_rate: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EarningsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
