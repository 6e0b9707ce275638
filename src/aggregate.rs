//! Derived views over an in-memory snapshot of transactions.
//!
//! Nothing here performs I/O; callers pass the slice they got from the
//! repository together with the reference instant the view is anchored on.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::{Transaction, TransactionKind};

/// Dashboard lookback window. `All` is the identity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
    All,
}

/// Lower bound of the window ending at `as_of`, or `None` for `All`.
/// Weeks start on Sunday; every boundary is a calendar start.
pub fn period_start(period: Period, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = as_of.date_naive();
    let start = match period {
        Period::Today => today,
        Period::Week => today - Duration::days(today.weekday().num_days_from_sunday() as i64),
        Period::Month => NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today),
        Period::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        Period::All => return None,
    };
    Some(Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)))
}

pub fn filter_by_period(
    transactions: &[Transaction],
    period: Period,
    as_of: DateTime<Utc>,
) -> Vec<Transaction> {
    match period_start(period, as_of) {
        Some(start) => transactions
            .iter()
            .filter(|t| t.date >= start)
            .cloned()
            .collect(),
        None => transactions.to_vec(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_usdt: f64,
    pub total_profit: f64,
    pub count: usize,
    /// `total_profit / total_usdt * 100`, 0 when nothing was moved.
    pub avg_margin_pct: f64,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let total_usdt: f64 = transactions.iter().map(|t| t.usdt_amount).sum();
    let total_profit: f64 = transactions.iter().map(|t| t.profit).sum();
    let avg_margin_pct = if total_usdt > 0.0 {
        total_profit / total_usdt * 100.0
    } else {
        0.0
    };
    Summary {
        total_usdt,
        total_profit,
        count: transactions.len(),
        avg_margin_pct,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub label: String,
    pub profit: f64,
}

/// Profit per calendar month for the `months` trailing months ending at
/// `as_of`'s month inclusive, oldest first. Quiet months stay at zero.
pub fn monthly_series(
    transactions: &[Transaction],
    months: u32,
    as_of: DateTime<Utc>,
) -> Vec<MonthBucket> {
    let mut series = Vec::with_capacity(months as usize);
    for back in (0..months).rev() {
        let (year, month) = shift_month(as_of.year(), as_of.month(), back);
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default();
        let profit = transactions
            .iter()
            .filter(|t| t.date.year() == year && t.date.month() == month)
            .map(|t| t.profit)
            .sum();
        series.push(MonthBucket { label, profit });
    }
    series
}

fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

/// Profit summed per kind over the whole set, zero for absent kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindTotals {
    pub betcris: f64,
    pub rusos: f64,
    pub general: f64,
}

impl KindTotals {
    pub fn for_kind(&self, kind: TransactionKind) -> f64 {
        match kind {
            TransactionKind::Betcris => self.betcris,
            TransactionKind::Rusos => self.rusos,
            TransactionKind::General => self.general,
        }
    }

    pub fn total(&self) -> f64 {
        self.betcris + self.rusos + self.general
    }
}

pub fn type_distribution(transactions: &[Transaction]) -> KindTotals {
    let mut totals = KindTotals::default();
    for txn in transactions {
        match txn.kind() {
            TransactionKind::Betcris => totals.betcris += txn.profit,
            TransactionKind::Rusos => totals.rusos += txn.profit,
            TransactionKind::General => totals.general += txn.profit,
        }
    }
    totals
}
