//! End-to-end workflows across tariffs, coverage, claims, batches and export

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, Money};
use domain_claims::{BatchPayment, BatchStatus, Claim, ClaimResponse, ClaimStatus, VetRequest};
use domain_coverage::ServiceCategory;
use nhia_export::parse_batch_xml;
use test_utils::{assert_ghs, assert_line_split, assert_totals_consistent, CatalogueFixtures, ClaimLineBuilder, DateFixtures, NewClaimBuilder, TestSystem};

async fn nhis_claim(system: &TestSystem, code: &str) -> Claim {
    let claim = system
        .claims
        .create_claim(NewClaimBuilder::new(system.nhis_plan).with_code(code).build())
        .await
        .unwrap();
    system
        .claims
        .add_item(claim.id, ClaimLineBuilder::drug(CatalogueFixtures::ARTEMETHER, "DRG-ART", dec!(20)).quantity(6).build())
        .await
        .unwrap();
    system
        .claims
        .add_item(claim.id, ClaimLineBuilder::lab(CatalogueFixtures::FULL_BLOOD_COUNT, "LAB-FBC", dec!(30)).build())
        .await
        .unwrap();
    system.claims.submit_for_vetting(claim.id, "records").await.unwrap()
}

async fn vetted_nhis_claim(system: &TestSystem, code: &str) -> Claim {
    let claim = nhis_claim(system, code).await;
    system
        .vetting
        .vet(claim.id, VetRequest::new("vetting.officer").with_gdrg(system.gdrg.id))
        .await
        .unwrap()
}

/// A vetted private-plan claim whose total is one lab line at `price`
async fn vetted_private_claim(system: &TestSystem, code: &str, price: rust_decimal::Decimal) -> Claim {
    let claim = system
        .claims
        .create_claim(NewClaimBuilder::new(system.private_plan).with_code(code).build())
        .await
        .unwrap();
    system
        .claims
        .add_item(claim.id, ClaimLineBuilder::lab(CatalogueFixtures::FULL_BLOOD_COUNT, "LAB-FBC", price).build())
        .await
        .unwrap();
    system.claims.submit_for_vetting(claim.id, "records").await.unwrap();
    system.vetting.vet(claim.id, VetRequest::new("vetting.officer")).await.unwrap()
}

async fn submitted_batch(system: &TestSystem, claims: &[ClaimId]) -> core_kernel::BatchId {
    let batch = system
        .batches
        .create_batch("June OPD", DateFixtures::submission_period(), "claims.officer", None)
        .await
        .unwrap();
    system.batches.add_claims(batch.id, claims).await.unwrap();
    system.batches.finalize(batch.id, "claims.officer").await.unwrap();
    system.batches.mark_submitted(batch.id, "claims.officer", None).await.unwrap();
    batch.id
}

// ============================================================================
// Coverage
// ============================================================================

#[tokio::test]
async fn test_nhis_line_pays_tariff_and_copay() {
    let system = TestSystem::seeded().await;
    let claim = system
        .claims
        .create_claim(NewClaimBuilder::new(system.nhis_plan).build())
        .await
        .unwrap();

    let line = system
        .claims
        .add_item(
            claim.id,
            ClaimLineBuilder::drug(CatalogueFixtures::AMOXICILLIN, "DRG-AMOX", dec!(75.00)).build(),
        )
        .await
        .unwrap();

    assert!(line.is_covered);
    assert_ghs(line.insurance_pays, dec!(45.00));
    assert_ghs(line.patient_pays, dec!(4.50));
}

#[tokio::test]
async fn test_nhis_unmapped_line_is_not_covered() {
    let system = TestSystem::seeded().await;
    let claim = system
        .claims
        .create_claim(NewClaimBuilder::new(system.nhis_plan).build())
        .await
        .unwrap();

    let line = system
        .claims
        .add_item(claim.id, ClaimLineBuilder::drug(CatalogueFixtures::PARACETAMOL, "DRG-PARA", dec!(2)).build())
        .await
        .unwrap();

    assert!(!line.is_covered);
    assert_ghs(line.insurance_pays, dec!(0));
}

#[tokio::test]
async fn test_private_plan_uses_category_default() {
    let system = TestSystem::seeded().await;
    let claim = system
        .claims
        .create_claim(NewClaimBuilder::new(system.private_plan).build())
        .await
        .unwrap();

    let line = system
        .claims
        .add_item(
            claim.id,
            ClaimLineBuilder::new(ServiceCategory::Drug, "DRG-PARA", dec!(10)).quantity(3).build(),
        )
        .await
        .unwrap();

    assert_ghs(line.insurance_pays, dec!(24));
    assert_ghs(line.patient_pays, dec!(6));
    assert_line_split(&line);
}

// ============================================================================
// Vetting
// ============================================================================

#[tokio::test]
async fn test_vetting_totals_gdrg_plus_mapped_lines() {
    let system = TestSystem::seeded().await;

    let claim = vetted_nhis_claim(&system, "CCC-1001").await;

    assert_eq!(claim.status, ClaimStatus::Vetted);
    assert_ghs(claim.total_claim_amount, dec!(49.73));
    assert_eq!(claim.totals().unwrap().unmapped_count, 1);
    assert_totals_consistent(&claim);
}

#[tokio::test]
async fn test_tariff_update_leaves_vetted_claims_and_exports_alone() {
    let system = TestSystem::seeded().await;
    let claim = vetted_nhis_claim(&system, "CCC-1002").await;
    let batch_id = submitted_batch(&system, &[claim.id]).await;

    let tariff = system
        .tariffs
        .search_tariffs(&domain_tariff::TariffQuery::search("ARTLUMTB1"))
        .await
        .unwrap()
        .remove(0);
    system.tariffs.update_price(tariff.id, Money::ghs(dec!(9.99))).await.unwrap();

    let reloaded = system.claims.claim(claim.id).await.unwrap();
    assert_ghs(reloaded.total_claim_amount, dec!(49.73));

    let document = system.export.export_batch(batch_id).await.unwrap();
    let parsed = parse_batch_xml(&document.body).unwrap();
    assert_eq!(parsed.claims[0].items[0].unit_price, dec!(4.00));
    assert_eq!(parsed.claims[0].totals.total_claim_amount, dec!(49.73));
}

#[tokio::test]
async fn test_vetting_resplits_lines_at_the_frozen_price() {
    let system = TestSystem::seeded().await;
    let claim = nhis_claim(&system, "CCC-1003").await;
    assert_ghs(claim.items[0].insurance_pays, dec!(24.00));

    let tariff = system
        .tariffs
        .search_tariffs(&domain_tariff::TariffQuery::search("ARTLUMTB1"))
        .await
        .unwrap()
        .remove(0);
    system.tariffs.update_price(tariff.id, Money::ghs(dec!(5.00))).await.unwrap();

    let vetted = system
        .vetting
        .vet(claim.id, VetRequest::new("vetting.officer").with_gdrg(system.gdrg.id))
        .await
        .unwrap();

    assert_ghs(vetted.items[0].insurance_pays, dec!(30.00));
    assert_ghs(vetted.insurance_covered_amount, dec!(30.00));
    assert_ghs(vetted.total_claim_amount, dec!(55.73));
    assert_totals_consistent(&vetted);
}

// ============================================================================
// Batches
// ============================================================================

#[tokio::test]
async fn test_batch_add_is_best_effort() {
    let system = TestSystem::seeded().await;
    let first = vetted_private_claim(&system, "CCC-2001", dec!(100)).await;
    let second = vetted_private_claim(&system, "CCC-2002", dec!(200)).await;
    let draft = system
        .claims
        .create_claim(NewClaimBuilder::new(system.private_plan).with_code("CCC-2003").build())
        .await
        .unwrap();
    let batch = system
        .batches
        .create_batch("June OPD", DateFixtures::submission_period(), "claims.officer", None)
        .await
        .unwrap();

    let result = system.batches.add_claims(batch.id, &[first.id, second.id, draft.id]).await.unwrap();

    assert_eq!(result.added, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(
        result.errors,
        vec!["Claim CCC-2003 is not vetted. Only vetted claims can be added to a batch.".to_string()]
    );
    let batch = system.batches.batch(batch.id).await.unwrap();
    assert_eq!(batch.total_claims, 2);
    assert_ghs(batch.total_amount, dec!(300));
}

#[tokio::test]
async fn test_rejected_claim_is_resubmitted_in_a_new_batch() {
    let system = TestSystem::seeded().await;
    let claim = vetted_nhis_claim(&system, "CCC-3001").await;
    let first_batch = submitted_batch(&system, &[claim.id]).await;

    let result = system
        .batches
        .record_response(
            first_batch,
            vec![ClaimResponse::rejected(claim.id, "G-DRG does not match diagnosis")],
            None,
            "claims.officer",
        )
        .await
        .unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(system.claims.claim(claim.id).await.unwrap().status, ClaimStatus::Rejected);
    assert_eq!(system.batches.batch(first_batch).await.unwrap().status, BatchStatus::Processing);

    let resubmitted = system
        .claims
        .prepare_for_resubmission(claim.id, "claims.officer")
        .await
        .unwrap();
    assert_eq!(resubmitted.status, ClaimStatus::Vetted);
    assert_eq!(resubmitted.resubmission_count, 1);
    assert!(resubmitted
        .notes
        .as_deref()
        .unwrap_or_default()
        .contains("Previous rejection reason: G-DRG does not match diagnosis"));

    let second_batch = submitted_batch(&system, &[claim.id]).await;
    system
        .batches
        .record_response(
            second_batch,
            vec![ClaimResponse::paid(claim.id, None)],
            Some(BatchPayment { paid_at: Utc::now(), paid_amount: None }),
            "claims.officer",
        )
        .await
        .unwrap();

    assert_eq!(system.claims.claim(claim.id).await.unwrap().status, ClaimStatus::Paid);
    assert_eq!(system.batches.batch(second_batch).await.unwrap().status, BatchStatus::Completed);
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_round_trip() {
    let system = TestSystem::seeded().await;
    let a = vetted_nhis_claim(&system, "CCC-4001").await;
    let b = vetted_nhis_claim(&system, "CCC-4002").await;
    let batch_id = submitted_batch(&system, &[a.id, b.id]).await;

    let document = system.export.export_batch(batch_id).await.unwrap();
    assert!(document.filename.starts_with("nhis-batch-BATCH-"));
    assert_eq!(document.content_type, "application/xml");

    let parsed = parse_batch_xml(&document.body).unwrap();
    assert_eq!(parsed.facility, CatalogueFixtures::facility());
    assert_eq!(parsed.details.total_claims, 2);
    assert_eq!(parsed.details.total_amount, dec!(99.46));

    let first = &parsed.claims[0];
    assert_eq!(first.claim_check_code, "CCC-4001");
    assert_eq!(first.patient.nhis_member_id, a.patient.nhis_member_id.clone().unwrap());
    assert_eq!(first.gdrg.code, "OPDC06A");
    assert_eq!(first.gdrg.amount, dec!(25.73));
    assert_eq!(first.items[0].nhis_code, "ARTLUMTB1");
    assert_eq!(first.items[1].nhis_code, "");
    assert!(first.diagnoses[0].is_primary);
}
