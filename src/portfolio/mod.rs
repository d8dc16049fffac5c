//! The portfolio data model: ideal/real/composite portfolios, order
//! elements, and order plans.

pub mod composite;
pub mod ideal;
pub mod order;
pub mod profit;
pub mod real;

pub use composite::CompositePortfolio;
pub use ideal::{IdealPortfolio, IdealPortfolioElement};
pub use order::{OrderElement, OrderPlan, OrderType};
pub use profit::ProfitModel;
pub use real::{RealPortfolio, RealPortfolioElement};

use crate::Money;
use crate::Ticker;

/// Anything that can be asked "what's your total value and what do you
/// hold" — shared by [`RealPortfolio`] and [`CompositePortfolio`] so the
/// planner (`generate_order_plan`) can operate over either.
pub trait PortfolioLike {
    /// Total value, including cash where applicable.
    fn value(&self) -> Money;

    /// Look up a single ticker's current value, if held.
    fn holding_value(&self, ticker: Ticker) -> Option<Money>;
}
