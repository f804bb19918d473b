//! Coverage service
//!
//! Loads the plan, picks its strategy once, materialises the rules, the
//! mapped NHIS tariff or the plan's own item price through ports, then hands
//! everything to the strategy.

use std::sync::Arc;

use tracing::{debug, instrument};

use core_kernel::{CoverageRuleId, PlanId, PortError};
use domain_tariff::MappingPort;

use crate::error::CoverageError;
use crate::plan::{InsurancePlan, InsuranceTariff};
use crate::ports::{CoverageRulePort, PlanPort};
use crate::rule::CoverageRule;
use crate::strategy::{strategy_for, CoverageContext, CoverageRequest, CoverageResult};

/// Service that prices billable lines against a plan
#[derive(Clone)]
pub struct CoverageService {
    plans: Arc<dyn PlanPort>,
    rules: Arc<dyn CoverageRulePort>,
    mappings: Arc<dyn MappingPort>,
}

impl CoverageService {
    pub fn new(
        plans: Arc<dyn PlanPort>,
        rules: Arc<dyn CoverageRulePort>,
        mappings: Arc<dyn MappingPort>,
    ) -> Self {
        Self { plans, rules, mappings }
    }

    /// Calculates the insurer / patient split for one line
    ///
    /// # Errors
    ///
    /// Returns `PlanNotFound` for an unknown plan, `PlanInactive` for a
    /// deactivated one, and propagates storage failures.
    #[instrument(skip(self), fields(plan = %request.plan_id, category = %request.category, item = %request.item_code))]
    pub async fn calculate(&self, request: &CoverageRequest) -> Result<CoverageResult, CoverageError> {
        let plan = self.load_plan(request).await?;
        let strategy = strategy_for(&plan);

        let rules = self.rules.rules_for(plan.id, request.category).await?;
        let mapped_tariff = match (strategy.requires_tariff_lookup(), request.item) {
            (true, Some(key)) => self.mappings.tariff_for_item(key).await?,
            _ => None,
        };

        let insurance_tariff = if strategy.requires_tariff_lookup() {
            None
        } else {
            self.plans
                .insurance_tariff(plan.id, request.category, &request.item_code, request.date)
                .await?
        };

        let context = CoverageContext { plan, rules, mapped_tariff, insurance_tariff };
        let result = strategy.evaluate(request, &context)?;

        debug!(
            strategy = strategy.name(),
            rule_type = %result.rule_type,
            insurance_pays = %result.insurance_pays,
            patient_pays = %result.patient_pays,
            "Coverage calculated"
        );
        Ok(result)
    }

    /// Validates and stores a coverage rule
    #[instrument(skip(self, rule), fields(rule = %rule.id))]
    pub async fn save_rule(&self, rule: &CoverageRule) -> Result<(), CoverageError> {
        rule.validate()?;
        self.plans.get_plan(rule.plan_id).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => CoverageError::PlanNotFound(id),
            other => other.into(),
        })?;
        self.rules.save_rule(rule).await?;
        Ok(())
    }

    /// Validates and stores a plan's negotiated item price
    #[instrument(skip(self, tariff), fields(plan = %tariff.plan_id, item = %tariff.item_code))]
    pub async fn save_insurance_tariff(&self, tariff: &InsuranceTariff) -> Result<(), CoverageError> {
        tariff.validate()?;
        self.plans.save_insurance_tariff(tariff).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => CoverageError::PlanNotFound(id),
            other => other.into(),
        })
    }

    pub async fn delete_rule(&self, id: CoverageRuleId) -> Result<(), CoverageError> {
        Ok(self.rules.delete_rule(id).await?)
    }

    pub async fn save_plan(&self, plan: &InsurancePlan) -> Result<(), CoverageError> {
        Ok(self.plans.save_plan(plan).await?)
    }

    pub async fn plan(&self, id: PlanId) -> Result<InsurancePlan, CoverageError> {
        self.plans.get_plan(id).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => CoverageError::PlanNotFound(id),
            other => other.into(),
        })
    }

    async fn load_plan(&self, request: &CoverageRequest) -> Result<InsurancePlan, CoverageError> {
        let plan = self.plan(request.plan_id).await?;
        if !plan.is_active {
            return Err(CoverageError::PlanInactive(plan.id.to_string()));
        }
        Ok(plan)
    }
}
