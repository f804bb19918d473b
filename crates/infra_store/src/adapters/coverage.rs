//! Plan and coverage rule adapters

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;

use core_kernel::{CoverageRuleId, PlanId, PortError};
use domain_coverage::{CoverageRule, CoverageRulePort, InsurancePlan, InsuranceTariff, PlanPort, ServiceCategory};

use crate::error::StoreError;
use crate::store::InMemoryStore;

#[async_trait]
impl PlanPort for InMemoryStore {
    async fn get_plan(&self, id: PlanId) -> Result<InsurancePlan, PortError> {
        self.read()
            .await
            .plans
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("InsurancePlan", id).into())
    }

    #[instrument(skip(self, plan), fields(plan = %plan.name))]
    async fn save_plan(&self, plan: &InsurancePlan) -> Result<(), PortError> {
        self.write().await.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn insurance_tariff(
        &self,
        plan_id: PlanId,
        category: ServiceCategory,
        item_code: &str,
        date: NaiveDate,
    ) -> Result<Option<InsuranceTariff>, PortError> {
        let tables = self.read().await;
        Ok(InsuranceTariff::in_force(tables.insurance_tariffs.values(), plan_id, category, item_code, date).cloned())
    }

    #[instrument(skip(self, tariff), fields(plan = %tariff.plan_id, item = %tariff.item_code))]
    async fn save_insurance_tariff(&self, tariff: &InsuranceTariff) -> Result<(), PortError> {
        let mut tables = self.write().await;
        if !tables.plans.contains_key(&tariff.plan_id) {
            return Err(StoreError::not_found("InsurancePlan", tariff.plan_id).into());
        }
        tables.insurance_tariffs.insert(tariff.id, tariff.clone());
        Ok(())
    }
}

#[async_trait]
impl CoverageRulePort for InMemoryStore {
    async fn rules_for(&self, plan_id: PlanId, category: ServiceCategory) -> Result<Vec<CoverageRule>, PortError> {
        let mut rules: Vec<CoverageRule> = self
            .read()
            .await
            .rules
            .values()
            .filter(|rule| rule.plan_id == plan_id && rule.category == category)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| rule.id);
        Ok(rules)
    }

    #[instrument(skip(self, rule), fields(plan = %rule.plan_id, category = %rule.category))]
    async fn save_rule(&self, rule: &CoverageRule) -> Result<(), PortError> {
        let mut tables = self.write().await;
        if !tables.plans.contains_key(&rule.plan_id) {
            return Err(StoreError::not_found("InsurancePlan", rule.plan_id).into());
        }
        tables.rules.insert(rule.id, rule.clone());
        Ok(())
    }

    async fn delete_rule(&self, id: CoverageRuleId) -> Result<(), PortError> {
        self.write()
            .await
            .rules
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("CoverageRule", id).into())
    }
}
