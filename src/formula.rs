//! Profit formulas for the three transaction kinds.
//!
//! All functions are pure over IEEE doubles; rounding to two decimals is a
//! display concern and stored values keep full precision.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    GeneralOperation, NewTransaction, QuoteCurrency, TransactionDetail,
};

/// Betcris keeps 1/1.03 of the collected value; the rest is the margin.
const COLLECTION_FEE_DIVISOR: f64 = 1.03;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("exchange rate must be greater than zero")]
    RateRequired,
    #[error("{0} must be greater than zero")]
    AmountRequired(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionQuote {
    /// Gross USD value collected: `usd + local / rate`.
    pub total_value: f64,
    /// USDT owed back to the counter: `total_value / 1.03`.
    pub amount_to_settle: f64,
    pub profit: f64,
}

pub fn betcris_collection(
    local_amount: f64,
    usd_amount: f64,
    rate: f64,
) -> Result<CollectionQuote, InputError> {
    if rate <= 0.0 {
        return Err(InputError::RateRequired);
    }
    let total_value = usd_amount + local_amount / rate;
    let amount_to_settle = total_value / COLLECTION_FEE_DIVISOR;
    Ok(CollectionQuote {
        total_value,
        amount_to_settle,
        profit: total_value - amount_to_settle,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseQuote {
    /// `usdt * (1 + cost_percent / 100)`.
    pub total_cost: f64,
    pub profit: f64,
}

/// Degenerates to all zeros when no USDT is being purchased.
pub fn betcris_purchase(usdt_amount: f64, cost_percent: f64) -> PurchaseQuote {
    if usdt_amount == 0.0 {
        return PurchaseQuote {
            total_cost: 0.0,
            profit: 0.0,
        };
    }
    let total_cost = usdt_amount * (1.0 + cost_percent / 100.0);
    PurchaseQuote {
        total_cost,
        profit: total_cost - usdt_amount,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginQuote {
    pub total_profit: f64,
    pub your_share: f64,
    pub partner_share: f64,
}

/// Margin deals split 50/50 between the two parties; the split is fixed.
pub fn rusos_margin(usdt_amount: f64, margin_percent: f64) -> MarginQuote {
    let total_profit = usdt_amount * (margin_percent / 100.0);
    let your_share = total_profit / 2.0;
    MarginQuote {
        total_profit,
        your_share,
        partner_share: your_share,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionQuote {
    pub amount_in_usd: f64,
    pub profit: f64,
}

pub fn general_conversion(
    operation: GeneralOperation,
    usdt_amount: f64,
    quote_currency: QuoteCurrency,
    quote_amount: f64,
    rate: f64,
) -> Result<ConversionQuote, InputError> {
    let amount_in_usd = match quote_currency {
        QuoteCurrency::Usd => quote_amount,
        QuoteCurrency::Local => {
            if rate <= 0.0 {
                return Err(InputError::RateRequired);
            }
            quote_amount / rate
        }
    };
    let profit = match operation {
        GeneralOperation::Buy => usdt_amount - amount_in_usd,
        GeneralOperation::Sell => amount_in_usd - usdt_amount,
    };
    Ok(ConversionQuote {
        amount_in_usd,
        profit,
    })
}

/// Validated per-kind input, the only path into the formula engine from
/// user-supplied data.
#[derive(Debug, Clone)]
pub enum TradeInput {
    BetcrisCollection {
        office: Option<String>,
        local_amount: f64,
        usd_amount: f64,
        rate: f64,
    },
    BetcrisPurchase {
        office: Option<String>,
        usdt_amount: f64,
        cost_percent: f64,
    },
    Rusos {
        client: Option<String>,
        usdt_amount: f64,
        margin_percent: f64,
    },
    General {
        client: Option<String>,
        operation: GeneralOperation,
        usdt_amount: f64,
        quote_currency: QuoteCurrency,
        quote_amount: f64,
        rate: f64,
    },
}

impl TradeInput {
    /// Runs validation and the matching formula, producing a draft record
    /// with its profit already computed. Nothing is persisted on error.
    pub fn build(self, date: DateTime<Utc>, notes: String) -> Result<NewTransaction, InputError> {
        match self {
            TradeInput::BetcrisCollection {
                office,
                local_amount,
                usd_amount,
                rate,
            } => {
                let quote = betcris_collection(local_amount, usd_amount, rate)?;
                Ok(NewTransaction {
                    date,
                    client: office.unwrap_or_else(|| "Betcris".to_string()),
                    usdt_amount: quote.amount_to_settle,
                    local_amount,
                    exchange_rate: rate,
                    profit: quote.profit,
                    detail: TransactionDetail::BetcrisCollection {
                        usd_amount,
                        total_value: quote.total_value,
                    },
                    notes,
                })
            }
            TradeInput::BetcrisPurchase {
                office,
                usdt_amount,
                cost_percent,
            } => {
                if usdt_amount == 0.0 {
                    return Err(InputError::AmountRequired("USDT amount"));
                }
                let quote = betcris_purchase(usdt_amount, cost_percent);
                Ok(NewTransaction {
                    date,
                    client: office.unwrap_or_else(|| "Betcris".to_string()),
                    usdt_amount,
                    local_amount: 0.0,
                    exchange_rate: 0.0,
                    profit: quote.profit,
                    detail: TransactionDetail::BetcrisPurchase {
                        cost_percent,
                        total_cost: quote.total_cost,
                    },
                    notes,
                })
            }
            TradeInput::Rusos {
                client,
                usdt_amount,
                margin_percent,
            } => {
                if usdt_amount == 0.0 {
                    return Err(InputError::AmountRequired("USDT amount"));
                }
                let quote = rusos_margin(usdt_amount, margin_percent);
                Ok(NewTransaction {
                    date,
                    client: client.unwrap_or_else(|| "Cliente Ruso".to_string()),
                    usdt_amount,
                    local_amount: 0.0,
                    exchange_rate: 0.0,
                    // The stored profit is this side's half, not the total.
                    profit: quote.your_share,
                    detail: TransactionDetail::RusosMargin {
                        margin_percent,
                        total_profit: quote.total_profit,
                    },
                    notes,
                })
            }
            TradeInput::General {
                client,
                operation,
                usdt_amount,
                quote_currency,
                quote_amount,
                rate,
            } => {
                if usdt_amount == 0.0 {
                    return Err(InputError::AmountRequired("USDT amount"));
                }
                if quote_amount == 0.0 {
                    return Err(InputError::AmountRequired("counterpart amount"));
                }
                let quote =
                    general_conversion(operation, usdt_amount, quote_currency, quote_amount, rate)?;
                Ok(NewTransaction {
                    date,
                    client: client.unwrap_or_else(|| "Cliente General".to_string()),
                    usdt_amount,
                    local_amount: match quote_currency {
                        QuoteCurrency::Local => quote_amount,
                        QuoteCurrency::Usd => 0.0,
                    },
                    exchange_rate: rate,
                    profit: quote.profit,
                    detail: TransactionDetail::GeneralConversion {
                        operation,
                        quote_currency,
                        quote_amount,
                        amount_in_usd: quote.amount_in_usd,
                    },
                    notes,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EPS: f64 = 1e-9;

    #[test]
    fn collection_worked_example() {
        // S=0, L=300000, R=60 from the ledger the formulas were lifted from.
        let quote = betcris_collection(300000.0, 0.0, 60.0).unwrap();
        assert_eq!(quote.total_value, 5000.0);
        assert!((quote.amount_to_settle - 4854.37).abs() < 0.005);
        assert!((quote.profit - 145.63).abs() < 0.005);
    }

    #[test]
    fn collection_profit_identity() {
        let quote = betcris_collection(250000.0, 1200.0, 58.25).unwrap();
        let total = 1200.0 + 250000.0 / 58.25;
        assert_eq!(quote.total_value, total);
        assert_eq!(quote.profit, total - total / 1.03);
        // Settling plus the 3% margin round-trips to the gross value.
        assert!((quote.amount_to_settle * 1.03 - quote.total_value).abs() < EPS);
    }

    #[test]
    fn collection_requires_positive_rate() {
        assert_eq!(
            betcris_collection(300000.0, 0.0, 0.0),
            Err(InputError::RateRequired)
        );
    }

    #[test]
    fn purchase_profit_is_cost_percent_of_amount() {
        let quote = betcris_purchase(2000.0, 3.5);
        assert!((quote.profit - 2000.0 * 3.5 / 100.0).abs() < EPS);
        assert!((quote.total_cost - 2070.0).abs() < EPS);
    }

    #[test]
    fn purchase_of_nothing_is_all_zeros() {
        let quote = betcris_purchase(0.0, 3.5);
        assert_eq!(quote.total_cost, 0.0);
        assert_eq!(quote.profit, 0.0);
    }

    #[test]
    fn rusos_split_is_equal_halves() {
        let quote = rusos_margin(10000.0, 15.0);
        assert_eq!(quote.total_profit, 1500.0);
        assert_eq!(quote.your_share, 750.0);
        assert_eq!(quote.partner_share, quote.your_share);
        assert_eq!(quote.your_share + quote.partner_share, quote.total_profit);
    }

    #[test]
    fn general_buy_and_sell_are_antisymmetric() {
        let buy = general_conversion(
            GeneralOperation::Buy,
            1500.0,
            QuoteCurrency::Usd,
            1480.0,
            0.0,
        )
        .unwrap();
        let sell = general_conversion(
            GeneralOperation::Sell,
            1500.0,
            QuoteCurrency::Usd,
            1480.0,
            0.0,
        )
        .unwrap();
        assert_eq!(buy.amount_in_usd, sell.amount_in_usd);
        assert_eq!(buy.profit, -sell.profit);
    }

    #[test]
    fn general_sell_at_par_has_zero_profit() {
        let quote = general_conversion(
            GeneralOperation::Sell,
            2000.0,
            QuoteCurrency::Local,
            119000.0,
            59.5,
        )
        .unwrap();
        assert_eq!(quote.amount_in_usd, 2000.0);
        assert_eq!(quote.profit, 0.0);
    }

    #[test]
    fn general_local_quote_requires_rate() {
        assert_eq!(
            general_conversion(
                GeneralOperation::Buy,
                1000.0,
                QuoteCurrency::Local,
                59000.0,
                0.0
            ),
            Err(InputError::RateRequired)
        );
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn collection_draft_stores_settle_amount_as_usdt() {
        let draft = TradeInput::BetcrisCollection {
            office: None,
            local_amount: 300000.0,
            usd_amount: 0.0,
            rate: 60.0,
        }
        .build(day(1), String::new())
        .unwrap();

        assert_eq!(draft.client, "Betcris");
        assert_eq!(draft.usdt_amount, 5000.0 / 1.03);
        assert_eq!(draft.local_amount, 300000.0);
        assert_eq!(draft.exchange_rate, 60.0);
        match draft.detail {
            TransactionDetail::BetcrisCollection { total_value, .. } => {
                assert_eq!(total_value, 5000.0)
            }
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn rusos_draft_keeps_half_as_profit() {
        let draft = TradeInput::Rusos {
            client: Some("Dmitri".to_string()),
            usdt_amount: 10000.0,
            margin_percent: 15.0,
        }
        .build(day(2), String::new())
        .unwrap();

        assert_eq!(draft.client, "Dmitri");
        assert_eq!(draft.profit, 750.0);
        match draft.detail {
            TransactionDetail::RusosMargin { total_profit, .. } => {
                assert_eq!(total_profit, 1500.0)
            }
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn draft_validation_rejects_missing_amounts() {
        let purchase = TradeInput::BetcrisPurchase {
            office: None,
            usdt_amount: 0.0,
            cost_percent: 3.0,
        }
        .build(day(3), String::new());
        assert_eq!(purchase, Err(InputError::AmountRequired("USDT amount")));

        let general = TradeInput::General {
            client: None,
            operation: GeneralOperation::Buy,
            usdt_amount: 1000.0,
            quote_currency: QuoteCurrency::Usd,
            quote_amount: 0.0,
            rate: 0.0,
        }
        .build(day(3), String::new());
        assert_eq!(general, Err(InputError::AmountRequired("counterpart amount")));
    }

    #[test]
    fn general_local_draft_records_local_leg() {
        let draft = TradeInput::General {
            client: None,
            operation: GeneralOperation::Sell,
            usdt_amount: 2000.0,
            quote_currency: QuoteCurrency::Local,
            quote_amount: 119000.0,
            rate: 59.5,
        }
        .build(day(4), "settled in cash".to_string())
        .unwrap();

        assert_eq!(draft.client, "Cliente General");
        assert_eq!(draft.local_amount, 119000.0);
        assert_eq!(draft.exchange_rate, 59.5);
        assert_eq!(draft.profit, 0.0);
        assert_eq!(draft.notes, "settled in cash");
    }
}
