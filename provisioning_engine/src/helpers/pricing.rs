use hosting_common::Money;

use crate::db_types::BillingCycle;

/// The amount charged for one billing cycle of a plan whose monthly price is `monthly_price`.
///
/// `price × months × (1 − discount)`, rounded half-up to the cent.
pub fn charge_for(monthly_price: Money, cycle: BillingCycle) -> Money {
    monthly_price.discounted(cycle.multiplier(), cycle.discount_percent())
}
