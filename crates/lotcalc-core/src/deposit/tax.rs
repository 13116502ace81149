use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::DepositTaxRule;
use crate::rounding::{pct_to_rate, round_minor};
use crate::types::{Money, Percent};

/// Tax assessed on one year of deposit interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearTax {
    pub tax_free_limit: Money,
    pub taxable_income: Money,
    pub tax_amount: Money,
}

impl DepositTaxRule {
    /// Assess one year of interest.
    ///
    /// The allowance is `allowance_base * key rate`. Taxable income above the
    /// allowance is charged at `base_rate` until the running total crosses
    /// `higher_threshold`, and at `higher_rate` beyond it.
    /// `prior_taxable` is the taxable income of earlier years.
    pub fn assess(&self, gross_interest: Money, key_rate: Percent, prior_taxable: Money) -> YearTax {
        let tax_free_limit = self.allowance_base * pct_to_rate(key_rate);
        let taxable_income = (gross_interest - tax_free_limit).max(Decimal::ZERO);
        if taxable_income.is_zero() {
            return YearTax {
                tax_free_limit,
                taxable_income,
                tax_amount: Decimal::ZERO,
            };
        }

        let running_total = prior_taxable + taxable_income;
        let tax = if running_total <= self.higher_threshold {
            taxable_income * self.base_rate
        } else if prior_taxable >= self.higher_threshold {
            taxable_income * self.higher_rate
        } else {
            let at_base = self.higher_threshold - prior_taxable;
            at_base * self.base_rate + (taxable_income - at_base) * self.higher_rate
        };

        YearTax {
            tax_free_limit,
            taxable_income,
            tax_amount: round_minor(tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_interest_under_allowance_is_tax_free() {
        let t = DepositTaxRule::default().assess(dec!(150000), dec!(16.5), Decimal::ZERO);
        assert_eq!(t.tax_free_limit, dec!(165000));
        assert_eq!(t.taxable_income, Decimal::ZERO);
        assert_eq!(t.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn test_base_bracket() {
        // 1,000,000 interest, 140,000 allowance at 14%
        let t = DepositTaxRule::default().assess(dec!(1000000), dec!(14), Decimal::ZERO);
        assert_eq!(t.taxable_income, dec!(860000));
        assert_eq!(t.tax_amount, dec!(111800));
    }

    #[test]
    fn test_income_straddling_threshold() {
        // 2,000,000 already taxed; 1,000,000 more: 400k at 13%, 600k at 15%
        let t = DepositTaxRule::default().assess(dec!(1070000), dec!(7), dec!(2000000));
        assert_eq!(t.taxable_income, dec!(1000000));
        assert_eq!(t.tax_amount, dec!(142000));
    }

    #[test]
    fn test_above_threshold_uses_higher_rate() {
        let t = DepositTaxRule::default().assess(dec!(170000), dec!(7), dec!(2500000));
        assert_eq!(t.taxable_income, dec!(100000));
        assert_eq!(t.tax_amount, dec!(15000));
    }

    #[test]
    fn test_tax_rounded_to_kopecks() {
        let t = DepositTaxRule::default().assess(dec!(165000.37), dec!(16.5), Decimal::ZERO);
        // 0.37 * 0.13 = 0.0481
        assert_eq!(t.tax_amount, dec!(0.05));
    }
}
