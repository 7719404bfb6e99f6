//! Configuration types for benefit calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Instalment splitting configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstalmentConfig {
    /// Whether the payment instalments feature is enabled.
    ///
    /// Only affects which monthly benefit cap applies to unsubsidised
    /// applications; instalments are produced either way.
    pub enabled: bool,
    /// Totals at or below this amount are paid in a single instalment.
    pub threshold: Decimal,
    /// The fixed amount of the first instalment when the total is split.
    pub first_instalment_limit: Decimal,
    /// Days between the calculation and the due date of the second instalment.
    pub second_instalment_delay_days: i64,
}

/// Monthly benefit ceilings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenefitCaps {
    /// Fixed ceiling for the salary benefit monthly amount.
    pub max_monthly_benefit: Decimal,
    /// Higher ceiling for unsubsidised applications when instalments are enabled.
    pub salary_benefit_new_max: Decimal,
    /// The flat monthly employee benefit.
    pub employee_benefit_monthly: Decimal,
}

/// Pay subsidy deduction parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaySubsidyConfig {
    /// Work time percent used when a pay subsidy does not record one.
    pub default_work_time_percent: Decimal,
    /// Fraction of full-time cost a 100% subsidy is based on.
    pub full_time_work_fraction: Decimal,
    /// Employer side-cost multiplier applied to 100% subsidies.
    pub employer_cost_multiplier: Decimal,
    /// Maximum monthly subsidy for a 100% pay subsidy.
    pub max_full: Decimal,
    /// Maximum monthly subsidy for a 70% pay subsidy.
    pub max_70_percent: Decimal,
    /// Maximum monthly subsidy for any other (50%) pay subsidy.
    pub max_other: Decimal,
}

impl PaySubsidyConfig {
    /// Returns the monthly subsidy ceiling for the given subsidy percent.
    ///
    /// # Example
    ///
    /// ```
    /// use benefit_engine::config::BenefitConfig;
    /// use rust_decimal::Decimal;
    ///
    /// let config = BenefitConfig::default();
    /// assert_eq!(config.pay_subsidy.max_for_percent(100), Decimal::new(2020, 0));
    /// assert_eq!(config.pay_subsidy.max_for_percent(70), Decimal::new(1770, 0));
    /// assert_eq!(config.pay_subsidy.max_for_percent(50), Decimal::new(1260, 0));
    /// ```
    pub fn max_for_percent(&self, percent: u32) -> Decimal {
        match percent {
            100 => self.max_full,
            70 => self.max_70_percent,
            _ => self.max_other,
        }
    }
}

/// The complete engine configuration loaded from `benefit.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenefitConfig {
    /// Instalment settings.
    pub instalments: InstalmentConfig,
    /// Monthly benefit ceilings.
    pub benefit: BenefitCaps,
    /// Pay subsidy deduction settings.
    pub pay_subsidy: PaySubsidyConfig,
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            instalments: InstalmentConfig {
                enabled: false,
                threshold: Decimal::new(30000, 0),
                first_instalment_limit: Decimal::new(9000, 0),
                second_instalment_delay_days: 181,
            },
            benefit: BenefitCaps {
                max_monthly_benefit: Decimal::new(800, 0),
                salary_benefit_new_max: Decimal::new(1500, 0),
                employee_benefit_monthly: Decimal::new(500, 0),
            },
            pay_subsidy: PaySubsidyConfig {
                default_work_time_percent: Decimal::new(65, 0),
                full_time_work_fraction: Decimal::new(65, 2),
                employer_cost_multiplier: Decimal::new(123, 2),
                max_full: Decimal::new(2020, 0),
                max_70_percent: Decimal::new(1770, 0),
                max_other: Decimal::new(1260, 0),
            },
        }
    }
}

impl BenefitConfig {
    /// Returns the monthly benefit ceiling for an application.
    ///
    /// Subsidised applications always get the fixed cap. Unsubsidised ones get
    /// the higher cap, but only while the payment instalments feature is on.
    pub fn max_monthly_benefit(&self, subsidized: bool) -> Decimal {
        if self.instalments.enabled && !subsidized {
            self.benefit.salary_benefit_new_max
        } else {
            self.benefit.max_monthly_benefit
        }
    }
}
