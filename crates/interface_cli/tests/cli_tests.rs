//! Export and verify commands against files on disk

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PatientId, PlanId};
use domain_claims::{
    Attendance, Claim, ClaimBatch, ClaimDiagnosis, ClaimItem, GdrgSelection, NewClaim, PatientDetails,
    VettingDecision,
};
use domain_coverage::ServiceCategory;
use domain_tariff::GdrgTariff;
use interface_cli::{export_snapshot, read_snapshot, verify_file, AppConfig, Cli, CliError};
use nhia_export::{BatchSnapshot, ExportError};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nhis-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn vetted_claim(code: &str) -> Claim {
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let mut claim = Claim::draft(
        NewClaim {
            claim_check_code: code.to_string(),
            patient_id: PatientId::new(),
            plan_id: PlanId::new(),
            patient: PatientDetails::new("Mensah", "Ama").with_member_id("NHIS-0012345"),
            attendance: Attendance::outpatient(day),
            diagnoses: vec![ClaimDiagnosis::primary("B54", "Unspecified malaria")],
        },
        true,
        Currency::GHS,
    );
    let consult = ClaimItem::new(claim.id, ServiceCategory::Consultation, "OPD-CONS", "OPD consultation", 1, Money::ghs(dec!(50)), day);
    claim.add_item(consult).unwrap();
    claim.submit_for_vetting("records").unwrap();

    let gdrg = GdrgTariff::new("OPDC06A", "Malaria", "Out Patient", Money::ghs(dec!(25.73))).unwrap();
    claim
        .vet(VettingDecision {
            actor: "vetting.officer".into(),
            gdrg: Some(GdrgSelection::from(&gdrg)),
            ..Default::default()
        })
        .unwrap();
    claim
}

fn snapshot(finalize: bool) -> BatchSnapshot {
    let claims = vec![vetted_claim("CCC-0001"), vetted_claim("CCC-0002")];
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let (mut batch, _) = ClaimBatch::create("BATCH-202406-0001", "June OPD", day, "claims.officer", None, Currency::GHS);
    for claim in &claims {
        batch.add_claim(claim).unwrap();
    }
    if finalize {
        batch.finalize("claims.officer").unwrap();
    }
    BatchSnapshot { batch, claims }
}

fn config(output_dir: PathBuf) -> AppConfig {
    AppConfig {
        facility_code: "FAC-0042".into(),
        facility_name: "Ridge Community Hospital".into(),
        output_dir,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_export_then_verify() {
    let dir = scratch_dir("export");
    let snapshot_path = dir.join("batch.json");
    std::fs::write(&snapshot_path, serde_json::to_string_pretty(&snapshot(true)).unwrap()).unwrap();

    let snapshot = read_snapshot(&snapshot_path).unwrap();
    let written = export_snapshot(&config(dir.join("out")), snapshot).await.unwrap();

    assert_eq!(written.file_name().unwrap(), "nhis-batch-BATCH-202406-0001.xml");
    let parsed = verify_file(&written).unwrap();
    assert_eq!(parsed.facility.code, "FAC-0042");
    assert_eq!(parsed.claims.len(), 2);
    assert_eq!(parsed.details.total_amount, dec!(51.46));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_draft_snapshot_is_refused() {
    let dir = scratch_dir("draft");

    let err = export_snapshot(&config(dir.clone()), snapshot(false)).await.unwrap_err();

    assert!(matches!(err, CliError::Export(ExportError::BatchNotFinalized(_))));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_snapshot_names_the_path() {
    let path = PathBuf::from("/nonexistent/batch.json");

    let err = read_snapshot(&path).unwrap_err();

    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/batch.json"));
}

#[tokio::test]
async fn test_command_line_export_and_verify() {
    let dir = scratch_dir("cli");
    let snapshot_path = dir.join("batch.json");
    let out = dir.join("out");
    std::fs::write(&snapshot_path, serde_json::to_string(&snapshot(true)).unwrap()).unwrap();

    let snapshot_arg = snapshot_path.to_str().unwrap();
    let out_arg = out.to_str().unwrap();

    let export = Cli::try_parse_from(["nhis-export", "export", snapshot_arg, "--output-dir", out_arg]).unwrap();
    let written = export.cmd.run(&config(dir.join("unused"))).await.unwrap();
    assert_eq!(PathBuf::from(&written), out.join("nhis-batch-BATCH-202406-0001.xml"));

    let verify = Cli::try_parse_from(["nhis-export", "verify", written.as_str()]).unwrap();
    let summary = verify.cmd.run(&config(out.clone())).await.unwrap();
    assert_eq!(summary, "BATCH-202406-0001 (2024-06): 2 claims, total 51.46");

    std::fs::remove_dir_all(&dir).ok();
}
