//! One shared routine turns a [`TierTerms`] descriptor into a payment
//! schedule. Every rounding remainder lands in the last payment, and the
//! schedule is checked to reconcile with its financed total before it is
//! returned.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{DownPaymentBasis, PaymentSplit, TierTerms};
use crate::error::LotCalcError;
use crate::rounding::{checked_add, checked_mul, floor_units, round_minor, round_units};
use crate::types::Money;
use crate::LotCalcResult;

/// Distinguished mid-schedule payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalloonPayment {
    /// 1-based period the payment falls in
    pub period: u32,
    pub amount: Money,
}

/// Fully disclosed schedule for one down-payment tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSchedule {
    /// Tier label in percent
    pub tier: u32,
    /// Surcharge added to the list price
    pub markup: Money,
    /// List price plus markup; what the buyer pays in total
    pub financed_total: Money,
    pub down_payment: Money,
    /// Fixed payment actually used, after capping to the balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon: Option<BalloonPayment>,
    /// Periodic payments after the down payment, in order
    pub payments: Vec<Money>,
}

impl TierSchedule {
    /// First periodic payment; the regular monthly amount for equal splits.
    pub fn installment(&self) -> Money {
        self.payments.first().copied().unwrap_or_default()
    }

    /// Final periodic payment, which absorbs every remainder.
    pub fn last_payment(&self) -> Money {
        self.payments.last().copied().unwrap_or_default()
    }

    pub fn balloon_payment(&self) -> Option<Money> {
        self.balloon.map(|b| b.amount)
    }

    /// Down payment plus every periodic payment.
    pub fn total_paid(&self) -> Money {
        self.down_payment + self.payments.iter().copied().sum::<Money>()
    }
}

/// Build the schedule for `terms` over `periods` payments.
pub fn build_schedule(price: Money, periods: u32, terms: &TierTerms) -> LotCalcResult<TierSchedule> {
    if periods == 0 {
        return Err(LotCalcError::InternalComputation {
            context: "installment schedule with no periods".into(),
        });
    }

    // Markup is kept to kopecks so an unsurcharged tier finances exactly the price.
    let markup = round_minor(checked_mul(price, terms.surcharge_rate, "installment surcharge")?);
    let financed_total = checked_add(price, markup, "installment surcharge")?;
    let basis = match terms.basis {
        DownPaymentBasis::ListPrice => price,
        DownPaymentBasis::FinancedTotal => financed_total,
    };
    let down_payment = floor_units(basis * terms.down_payment_rate);
    let balance = financed_total - down_payment;
    if balance < Decimal::ZERO {
        return Err(LotCalcError::InternalComputation {
            context: format!("{}% tier: down payment exceeds financed total", terms.tier),
        });
    }

    let n = Decimal::from(periods);
    let mut increment = None;
    let mut balloon = None;

    let payments = match &terms.split {
        PaymentSplit::Equal => {
            let regular_count = Decimal::from(periods - 1);
            let mut monthly = round_units(balance / n);
            if monthly * regular_count > balance {
                monthly = floor_units(balance / n);
            }
            let last = balance - monthly * regular_count;
            let mut payments = vec![monthly; periods as usize - 1];
            payments.push(last);
            payments
        }
        PaymentSplit::Fixed { increment: fixed } => {
            let regular_count = Decimal::from(periods - 1);
            let inc = fit_increment(*fixed, balance, regular_count, n);
            increment = Some(inc);
            let mut payments = vec![inc; periods as usize - 1];
            payments.push(balance - inc * regular_count);
            payments
        }
        PaymentSplit::FixedWithBalloon {
            increment: fixed,
            balloon_rate,
            balloon_period,
        } => {
            if periods < 2 || *balloon_period == 0 || *balloon_period >= periods {
                return Err(LotCalcError::InternalComputation {
                    context: format!(
                        "{}% tier: balloon period {balloon_period} does not fit {periods} payments",
                        terms.tier
                    ),
                });
            }
            let amount = floor_units(price * *balloon_rate).min(balance);
            let rest = balance - amount;
            let regular_count = Decimal::from(periods - 2);
            let inc = fit_increment(*fixed, rest, regular_count, Decimal::from(periods - 1));
            increment = Some(inc);
            balloon = Some(BalloonPayment {
                period: *balloon_period,
                amount,
            });

            let last = rest - inc * regular_count;
            (1..=periods)
                .map(|p| {
                    if p == *balloon_period {
                        amount
                    } else if p == periods {
                        last
                    } else {
                        inc
                    }
                })
                .collect()
        }
    };

    let schedule = TierSchedule {
        tier: terms.tier,
        markup,
        financed_total,
        down_payment,
        increment,
        balloon,
        payments,
    };
    verify(&schedule)?;
    Ok(schedule)
}

/// Use the configured round increment unless the regular payments would
/// consume the whole balance; then spread it as evenly as whole units allow.
fn fit_increment(fixed: Money, balance: Money, regular_count: Decimal, slots: Decimal) -> Money {
    if fixed * regular_count >= balance {
        floor_units(balance / slots)
    } else {
        fixed
    }
}

fn verify(schedule: &TierSchedule) -> LotCalcResult<()> {
    if let Some(p) = schedule.payments.iter().find(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(LotCalcError::InternalComputation {
            context: format!("{}% tier: negative payment {p}", schedule.tier),
        });
    }
    if schedule.total_paid() != schedule.financed_total {
        return Err(LotCalcError::InternalComputation {
            context: format!(
                "{}% tier: payments sum to {} but financed total is {}",
                schedule.tier,
                schedule.total_paid(),
                schedule.financed_total
            ),
        });
    }
    Ok(())
}
