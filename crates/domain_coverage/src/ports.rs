//! Coverage Domain Ports

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{CoverageRuleId, DomainPort, PlanId, PortError};

use crate::category::ServiceCategory;
use crate::plan::{InsurancePlan, InsuranceTariff};
use crate::rule::CoverageRule;

/// Port for insurance plans
#[async_trait]
pub trait PlanPort: DomainPort {
    async fn get_plan(&self, id: PlanId) -> Result<InsurancePlan, PortError>;

    async fn save_plan(&self, plan: &InsurancePlan) -> Result<(), PortError>;

    /// The plan's price for an item in force on `date`
    async fn insurance_tariff(
        &self,
        plan_id: PlanId,
        category: ServiceCategory,
        item_code: &str,
        date: NaiveDate,
    ) -> Result<Option<InsuranceTariff>, PortError>;

    /// Fails with `NotFound` when the plan does not exist
    async fn save_insurance_tariff(&self, tariff: &InsuranceTariff) -> Result<(), PortError>;
}

/// Port for coverage rules
#[async_trait]
pub trait CoverageRulePort: DomainPort {
    /// Every rule of a plan for one category, active or not
    async fn rules_for(&self, plan_id: PlanId, category: ServiceCategory) -> Result<Vec<CoverageRule>, PortError>;

    async fn save_rule(&self, rule: &CoverageRule) -> Result<(), PortError>;

    async fn delete_rule(&self, id: CoverageRuleId) -> Result<(), PortError>;
}
