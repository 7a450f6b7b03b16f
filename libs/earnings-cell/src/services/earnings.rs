use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    ClientActivityStats, EarningsSummary, MonthlyEarnings, Transaction, TransactionStatus,
    TransactionType,
};

const MONTHS_IN_SERIES: usize = 12;
const ACTIVE_WINDOW_DAYS: i64 = 30;

pub struct EarningsService {
    supabase: SupabaseClient,
}

impl EarningsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_transactions(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Transaction>> {
        let path = format!(
            "/rest/v1/transactions?therapist_id=eq.{}&order=created_at.desc",
            therapist_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        debug!("Fetched {} transactions for therapist", rows.len());
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect()
    }

    pub async fn get_summary(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<EarningsSummary> {
        let transactions = self.list_transactions(therapist_id, auth_token).await?;
        Ok(summarize(&transactions, Utc::now()))
    }

    /// Client activity for the therapist's clients page, derived from the
    /// appointment history in one pass.
    pub async fn get_client_stats(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<ClientActivityStats> {
        let path = format!(
            "/rest/v1/appointments?therapist_id=eq.{}&select=client_id,start_time",
            therapist_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let visits: Vec<(Uuid, DateTime<Utc>)> = rows
            .iter()
            .filter_map(|row| {
                let client = row["client_id"].as_str()?.parse().ok()?;
                let start = row["start_time"].as_str()?.parse().ok()?;
                Some((client, start))
            })
            .collect();

        Ok(client_activity(&visits, Utc::now()))
    }
}

/// Effective earnings contribution of one transaction: completed payments
/// count positive, completed refunds negative, payouts and non-completed
/// rows not at all.
fn earned_amount(transaction: &Transaction) -> f64 {
    if transaction.status != TransactionStatus::Completed {
        return 0.0;
    }
    match transaction.transaction_type {
        TransactionType::Payment => transaction.amount,
        TransactionType::Refund => -transaction.amount,
        TransactionType::Payout => 0.0,
    }
}

pub fn summarize(transactions: &[Transaction], now: DateTime<Utc>) -> EarningsSummary {
    let total_earnings = transactions.iter().map(earned_amount).sum();

    let pending_earnings = transactions
        .iter()
        .filter(|t| {
            t.status == TransactionStatus::Pending
                && t.transaction_type == TransactionType::Payment
        })
        .map(|t| t.amount)
        .sum();

    let this_month_earnings = transactions
        .iter()
        .filter(|t| t.created_at.year() == now.year() && t.created_at.month() == now.month())
        .map(earned_amount)
        .sum();

    EarningsSummary {
        total_earnings,
        pending_earnings,
        this_month_earnings,
        monthly: monthly_series(transactions, now),
    }
}

/// Rolling 12-month earnings, oldest month first. Months with no activity
/// appear with a zero total so the chart axis stays continuous.
pub fn monthly_series(transactions: &[Transaction], now: DateTime<Utc>) -> Vec<MonthlyEarnings> {
    let mut totals: HashMap<(i32, u32), f64> = HashMap::new();
    for transaction in transactions {
        let key = (transaction.created_at.year(), transaction.created_at.month());
        *totals.entry(key).or_insert(0.0) += earned_amount(transaction);
    }

    let mut months = Vec::with_capacity(MONTHS_IN_SERIES);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..MONTHS_IN_SERIES {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();

    months
        .into_iter()
        .map(|(year, month)| MonthlyEarnings {
            year,
            month,
            total: totals.get(&(year, month)).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Share of unique clients seen within the last 30 days. Replaces the
/// legacy `unique / (unique + 5)` placeholder with a rate that has a
/// stated meaning.
pub fn client_activity(
    visits: &[(Uuid, DateTime<Utc>)],
    now: DateTime<Utc>,
) -> ClientActivityStats {
    let unique: HashSet<Uuid> = visits.iter().map(|(client, _)| *client).collect();

    let cutoff = now - Duration::days(ACTIVE_WINDOW_DAYS);
    let active: HashSet<Uuid> = visits
        .iter()
        .filter(|(_, start)| *start >= cutoff && *start <= now)
        .map(|(client, _)| *client)
        .collect();

    let active_client_rate = if unique.is_empty() {
        0.0
    } else {
        (active.len() as f64 / unique.len() as f64) * 100.0
    };

    ClientActivityStats {
        unique_clients: unique.len(),
        active_clients: active.len(),
        active_client_rate,
    }
}
