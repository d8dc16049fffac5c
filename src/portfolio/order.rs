//! Order elements and plans produced by the planner.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;
use crate::{Money, Ticker};

/// Which side of the book an [`OrderElement`] represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
}

/// A single planned order. Exactly one of `value`/`qty` is set at plan
/// time — fractional-share adapters receive `value`, integer-share
/// adapters receive `qty`. `price` is informational unless used to derive
/// notional from `qty`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderElement {
    pub ticker: Ticker,
    pub order_type: OrderType,
    pub value: Option<Money>,
    pub qty: Option<Decimal>,
    pub price: Option<Money>,
    pub provider: Option<ProviderId>,
}

impl OrderElement {
    pub fn buy_value(ticker: Ticker, value: Money) -> Self {
        Self {
            ticker,
            order_type: OrderType::Buy,
            value: Some(value),
            qty: None,
            price: None,
            provider: None,
        }
    }

    pub fn buy_qty(ticker: Ticker, qty: Decimal, price: Money) -> Self {
        Self {
            ticker,
            order_type: OrderType::Buy,
            value: None,
            qty: Some(qty),
            price: Some(price),
            provider: None,
        }
    }

    pub fn sell_value(ticker: Ticker, value: Money) -> Self {
        Self {
            ticker,
            order_type: OrderType::Sell,
            value: Some(value),
            qty: None,
            price: None,
            provider: None,
        }
    }

    pub fn sell_qty(ticker: Ticker, qty: Decimal, price: Money) -> Self {
        Self {
            ticker,
            order_type: OrderType::Sell,
            value: None,
            qty: Some(qty),
            price: Some(price),
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// `value` if set, else `qty * price`. `None` if neither can resolve
    /// a notional amount.
    pub fn inferred_value(&self) -> Option<Money> {
        match (self.value, self.qty, self.price) {
            (Some(v), _, _) => Some(v),
            (None, Some(qty), Some(price)) => Some(price * qty),
            _ => None,
        }
    }

    /// Merge another element of the same ticker and order type into this
    /// one, summing whichever of `value`/`qty` is populated. Panics if the
    /// two disagree on ticker/order_type or mix value with qty — callers
    /// are expected to have already grouped by `(ticker, order_type)`.
    pub fn merge(mut self, other: &OrderElement) -> Self {
        assert_eq!(self.ticker, other.ticker, "merge requires same ticker");
        assert_eq!(
            self.order_type, other.order_type,
            "merge requires same order type"
        );
        match (self.value, other.value, self.qty, other.qty) {
            (Some(a), Some(b), None, None) => self.value = Some(a + b),
            (None, None, Some(a), Some(b)) => self.qty = Some(a + b),
            _ => panic!("cannot merge OrderElements mixing value and qty"),
        }
        if self.price.is_none() {
            self.price = other.price;
        }
        self
    }
}

/// Paired buy/sell lists produced by a planner invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderPlan {
    pub to_buy: Vec<OrderElement>,
    pub to_sell: Vec<OrderElement>,
}

impl OrderPlan {
    pub fn new() -> Self {
        Self::default()
    }

    fn merge_side(lhs: &mut Vec<OrderElement>, rhs: &[OrderElement]) {
        for incoming in rhs {
            if let Some(existing) = lhs.iter_mut().find(|e| e.ticker == incoming.ticker) {
                *existing = existing.clone().merge(incoming);
            } else {
                lhs.push(incoming.clone());
            }
        }
    }

    /// Merge another plan's orders into this one, summing per-ticker within
    /// each side.
    pub fn extend(&mut self, other: &OrderPlan) {
        Self::merge_side(&mut self.to_buy, &other.to_buy);
        Self::merge_side(&mut self.to_sell, &other.to_sell);
    }
}

impl std::ops::AddAssign<&OrderPlan> for OrderPlan {
    fn add_assign(&mut self, rhs: &OrderPlan) {
        self.extend(rhs);
    }
}
