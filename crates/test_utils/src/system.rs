//! Wired-up services over a seeded in-memory store

use std::sync::Arc;

use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Money, PlanId};
use domain_claims::{BatchService, ClaimService, ClaimVettingService};
use domain_coverage::{CategoryDefaults, CoverageRule, CoverageService, InsurancePlan, InsuranceProvider, ServiceCategory};
use domain_tariff::{GdrgTariff, TariffService};
use infra_store::InMemoryStore;
use nhia_export::ExportService;

use crate::fixtures::CatalogueFixtures;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init().ok();
});

/// Routes service logs to the test harness once per process; `RUST_LOG`
/// raises the level.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}

/// Every service sharing one store
pub struct TestSystem {
    pub store: Arc<InMemoryStore>,
    pub tariffs: TariffService,
    pub coverage: CoverageService,
    pub claims: ClaimService,
    pub vetting: ClaimVettingService,
    pub batches: BatchService,
    pub export: ExportService,
    pub nhis_plan: PlanId,
    pub private_plan: PlanId,
    pub gdrg: GdrgTariff,
}

impl TestSystem {
    /// An empty store with services attached
    pub fn empty() -> Self {
        init_test_tracing();
        let store = Arc::new(InMemoryStore::new());
        let coverage = CoverageService::new(store.clone(), store.clone(), store.clone());

        Self {
            tariffs: TariffService::new(store.clone(), store.clone(), store.clone(), store.clone()),
            claims: ClaimService::new(store.clone(), coverage.clone()),
            vetting: ClaimVettingService::new(store.clone(), store.clone(), store.clone()),
            batches: BatchService::new(store.clone(), store.clone(), store.clone()),
            export: ExportService::new(store.clone(), store.clone(), CatalogueFixtures::facility()),
            coverage,
            nhis_plan: PlanId::new(),
            private_plan: PlanId::new(),
            gdrg: CatalogueFixtures::malaria_gdrg(),
            store,
        }
    }

    /// Catalogue, tariffs, mappings, the malaria G-DRG and two plans
    ///
    /// The NHIS plan charges a 4.50 copay on amoxicillin. The private plan
    /// covers 80% of drugs and 100% of labs by default.
    pub async fn seeded() -> Self {
        let mut system = Self::empty();
        system.store.insert_items(CatalogueFixtures::hospital_items()).await;

        system.tariffs.import_tariffs(CatalogueFixtures::tariff_rows()).await.unwrap();
        system.tariffs.import_mappings(CatalogueFixtures::mapping_rows()).await.unwrap();
        system.tariffs.save_gdrg(&system.gdrg).await.unwrap();

        let nhis = InsurancePlan::new("NHIS Standard", InsuranceProvider::nhis());
        let private = InsurancePlan::new("Corporate Gold", InsuranceProvider::new("GLICO", "GLICO Healthcare", false))
            .with_defaults(CategoryDefaults {
                drugs: Some(dec!(80)),
                labs: Some(dec!(100)),
                ..Default::default()
            });
        system.coverage.save_plan(&nhis).await.unwrap();
        system.coverage.save_plan(&private).await.unwrap();

        let amoxicillin_copay = CoverageRule::percentage(nhis.id, ServiceCategory::Drug, dec!(100))
            .for_item("DRG-AMOX")
            .with_copay_amount(Money::ghs(dec!(4.50)));
        system.coverage.save_rule(&amoxicillin_copay).await.unwrap();

        system.nhis_plan = nhis.id;
        system.private_plan = private.id;
        system
    }
}
