//! Domain model for exchange transactions.
//!
//! A [`Transaction`] is the sole entity: one recorded deal of one of three
//! fixed kinds. Profit is computed once by the formula engine when the
//! record is built and is never recomputed afterwards; the only sanctioned
//! mutation is the one-way liquidation transition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Betcris,
    Rusos,
    General,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::Betcris,
        TransactionKind::Rusos,
        TransactionKind::General,
    ];
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Betcris => "Betcris",
            TransactionKind::Rusos => "Rusos",
            TransactionKind::General => "General",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Cancelled => "Cancelled",
        };
        write!(f, "{label}")
    }
}

/// Direction of a general buy/sell conversion, seen from the USDT side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneralOperation {
    Buy,
    Sell,
}

impl fmt::Display for GeneralOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GeneralOperation::Buy => "Buy",
            GeneralOperation::Sell => "Sell",
        };
        write!(f, "{label}")
    }
}

/// Currency the counterpart amount of a general conversion is quoted in.
/// `Local` quotes need a positive exchange rate to reach USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteCurrency {
    Usd,
    Local,
}

/// Kind-specific fields, carried alongside the computed quote so a stored
/// record can be displayed without re-running the formula engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransactionDetail {
    BetcrisCollection {
        usd_amount: f64,
        total_value: f64,
    },
    BetcrisPurchase {
        cost_percent: f64,
        total_cost: f64,
    },
    RusosMargin {
        margin_percent: f64,
        total_profit: f64,
    },
    GeneralConversion {
        operation: GeneralOperation,
        quote_currency: QuoteCurrency,
        quote_amount: f64,
        amount_in_usd: f64,
    },
}

impl TransactionDetail {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionDetail::BetcrisCollection { .. }
            | TransactionDetail::BetcrisPurchase { .. } => TransactionKind::Betcris,
            TransactionDetail::RusosMargin { .. } => TransactionKind::Rusos,
            TransactionDetail::GeneralConversion { .. } => TransactionKind::General,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiquidationError {
    #[error("{0} transactions cannot be liquidated")]
    WrongKind(TransactionKind),
    #[error("transaction is already liquidated")]
    Already,
}

/// A fully computed transaction awaiting an id from the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: DateTime<Utc>,
    pub client: String,
    pub usdt_amount: f64,
    pub local_amount: f64,
    pub exchange_rate: f64,
    pub profit: f64,
    pub detail: TransactionDetail,
    pub notes: String,
}

impl NewTransaction {
    /// Stamps the repository-assigned id. Freshly created records are
    /// completed and not yet liquidated.
    pub fn into_transaction(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            date: self.date,
            client: self.client,
            usdt_amount: self.usdt_amount,
            local_amount: self.local_amount,
            exchange_rate: self.exchange_rate,
            profit: self.profit,
            status: TransactionStatus::Completed,
            liquidated: false,
            liquidation_date: None,
            detail: self.detail,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub client: String,
    /// Settlement-currency quantity. For Betcris collections this is the
    /// amount to settle, not the gross value collected.
    pub usdt_amount: f64,
    /// Local-currency quantity, 0 when the deal had no local leg.
    pub local_amount: f64,
    /// Local units per USDT; 0 only when `local_amount` is 0.
    pub exchange_rate: f64,
    /// Computed at creation and stored; never recomputed.
    pub profit: f64,
    pub status: TransactionStatus,
    pub liquidated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidation_date: Option<DateTime<Utc>>,
    pub detail: TransactionDetail,
    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        self.detail.kind()
    }

    /// Liquidation applies to Betcris and Rusos balances only.
    pub fn awaits_liquidation(&self) -> bool {
        matches!(
            self.kind(),
            TransactionKind::Betcris | TransactionKind::Rusos
        ) && !self.liquidated
    }

    /// One-way `false -> true` transition stamping the liquidation date.
    pub fn liquidate(&mut self, at: DateTime<Utc>) -> Result<(), LiquidationError> {
        if self.kind() == TransactionKind::General {
            return Err(LiquidationError::WrongKind(self.kind()));
        }
        if self.liquidated {
            return Err(LiquidationError::Already);
        }
        self.liquidated = true;
        self.liquidation_date = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rusos_transaction() -> Transaction {
        NewTransaction {
            date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            client: "Cliente Ruso".to_string(),
            usdt_amount: 10000.0,
            local_amount: 0.0,
            exchange_rate: 0.0,
            profit: 750.0,
            detail: TransactionDetail::RusosMargin {
                margin_percent: 15.0,
                total_profit: 1500.0,
            },
            notes: String::new(),
        }
        .into_transaction(Uuid::new_v4())
    }

    #[test]
    fn new_transactions_start_completed_and_unliquidated() {
        let txn = rusos_transaction();
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert!(!txn.liquidated);
        assert!(txn.liquidation_date.is_none());
        assert!(txn.awaits_liquidation());
        assert_eq!(txn.kind(), TransactionKind::Rusos);
    }

    #[test]
    fn liquidation_is_one_way() {
        let mut txn = rusos_transaction();
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();

        txn.liquidate(at).unwrap();
        assert!(txn.liquidated);
        assert_eq!(txn.liquidation_date, Some(at));
        assert!(!txn.awaits_liquidation());

        let again = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        assert_eq!(txn.liquidate(again), Err(LiquidationError::Already));
        assert_eq!(txn.liquidation_date, Some(at));
    }

    #[test]
    fn general_transactions_cannot_be_liquidated() {
        let mut txn = NewTransaction {
            date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            client: "Cliente General".to_string(),
            usdt_amount: 2000.0,
            local_amount: 119000.0,
            exchange_rate: 59.5,
            profit: 0.0,
            detail: TransactionDetail::GeneralConversion {
                operation: GeneralOperation::Sell,
                quote_currency: QuoteCurrency::Local,
                quote_amount: 119000.0,
                amount_in_usd: 2000.0,
            },
            notes: String::new(),
        }
        .into_transaction(Uuid::new_v4());

        assert!(!txn.awaits_liquidation());
        assert_eq!(
            txn.liquidate(Utc::now()),
            Err(LiquidationError::WrongKind(TransactionKind::General))
        );
        assert!(!txn.liquidated);
    }
}
