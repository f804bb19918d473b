//! Export document model
//!
//! A flat, payer-facing view of a finalized batch. The same model is
//! produced by [`crate::parse_batch_xml`], so a parsed document can be
//! compared field by field with the one that was written.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;
use domain_claims::{BatchStatus, Claim, ClaimBatch, ClaimItem};

use crate::error::ExportError;

/// Facility submitting the batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityInfo {
    pub code: String,
    pub name: String,
}

impl FacilityInfo {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDetails {
    pub batch_number: String,
    pub batch_name: String,
    /// First day of the submission month
    pub submission_period: NaiveDate,
    pub total_claims: usize,
    pub total_amount: Decimal,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub nhis_member_id: String,
    pub surname: String,
    pub other_names: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date_of_attendance: Option<NaiveDate>,
    pub date_of_discharge: Option<NaiveDate>,
    pub type_of_attendance: String,
    pub type_of_service: String,
    pub specialty_attended: String,
    pub attending_prescriber: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdrgRecord {
    pub code: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub icd10_code: String,
    pub description: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Service category, e.g. `drug` or `lab`
    pub item_type: String,
    pub item_date: Option<NaiveDate>,
    pub nhis_code: String,
    pub hospital_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub is_covered: bool,
    pub insurance_pays: Decimal,
    pub patient_pays: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecord {
    pub total_claim_amount: Decimal,
    pub insurance_covered_amount: Decimal,
    pub patient_copay_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_check_code: String,
    pub patient: PatientRecord,
    pub attendance: AttendanceRecord,
    pub gdrg: GdrgRecord,
    pub diagnoses: Vec<DiagnosisRecord>,
    pub items: Vec<ItemRecord>,
    pub totals: TotalsRecord,
}

/// Everything written into one `NHIAClaimBatch` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchExport {
    pub facility: FacilityInfo,
    pub details: BatchDetails,
    pub claims: Vec<ClaimRecord>,
}

/// A document read back from XML
pub type ParsedBatch = BatchExport;

/// A batch with its claims, as stored in a JSON snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batch: ClaimBatch,
    pub claims: Vec<Claim>,
}

impl BatchExport {
    /// Builds the export for a finalized (or later) batch
    ///
    /// Claims are written in batch order. Amounts are rounded to two
    /// decimals, matching what the XML carries.
    pub fn build(
        facility: FacilityInfo,
        batch: &ClaimBatch,
        claims: &[Claim],
        generated_at: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        if batch.status == BatchStatus::Draft {
            return Err(ExportError::BatchNotFinalized(batch.batch_number.clone()));
        }

        let by_id: HashMap<_, _> = claims.iter().map(|c| (c.id, c)).collect();
        let records = batch
            .items
            .iter()
            .map(|item| {
                by_id
                    .get(&item.claim_id)
                    .map(|claim| ClaimRecord::from_claim(claim))
                    .ok_or_else(|| ExportError::MissingClaim(item.claim_check_code.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            facility,
            details: BatchDetails {
                batch_number: batch.batch_number.clone(),
                batch_name: batch.name.clone(),
                submission_period: batch.submission_period,
                total_claims: batch.total_claims,
                total_amount: two_places(batch.total_amount),
                generated_at,
            },
            claims: records,
        })
    }
}

impl ClaimRecord {
    pub fn from_claim(claim: &Claim) -> Self {
        let patient = &claim.patient;
        let attendance = &claim.attendance;

        Self {
            claim_check_code: claim.claim_check_code.clone(),
            patient: PatientRecord {
                nhis_member_id: patient.nhis_member_id.clone().unwrap_or_default(),
                surname: patient.surname.clone(),
                other_names: patient.other_names.clone(),
                date_of_birth: patient.date_of_birth,
                gender: patient.gender.clone().unwrap_or_default(),
                folder_id: patient.folder_id.clone().unwrap_or_default(),
            },
            attendance: AttendanceRecord {
                date_of_attendance: Some(attendance.date_of_attendance),
                date_of_discharge: attendance.date_of_discharge,
                type_of_attendance: attendance.type_of_attendance.clone(),
                type_of_service: attendance.type_of_service.clone(),
                specialty_attended: attendance.specialty_attended.clone().unwrap_or_default(),
                attending_prescriber: attendance.attending_prescriber.clone().unwrap_or_default(),
            },
            gdrg: claim
                .gdrg
                .as_ref()
                .map(|g| GdrgRecord {
                    code: g.code.clone(),
                    name: g.name.clone(),
                    amount: two_places(g.amount),
                })
                .unwrap_or_default(),
            diagnoses: claim
                .diagnoses
                .iter()
                .map(|d| DiagnosisRecord {
                    icd10_code: d.icd10_code.clone(),
                    description: d.description.clone(),
                    is_primary: d.is_primary,
                })
                .collect(),
            items: claim.items.iter().map(ItemRecord::from_item).collect(),
            totals: TotalsRecord {
                total_claim_amount: two_places(claim.total_claim_amount),
                insurance_covered_amount: two_places(claim.insurance_covered_amount),
                patient_copay_amount: two_places(claim.patient_copay_amount),
            },
        }
    }
}

impl ItemRecord {
    /// The payer sees the frozen NHIS price where there is one, the
    /// hospital tariff otherwise.
    pub fn from_item(item: &ClaimItem) -> Self {
        let unit_price = item.nhis_price.unwrap_or(item.unit_tariff);
        let subtotal = item.nhis_subtotal().unwrap_or(item.subtotal);

        Self {
            item_type: item.category.as_str().to_string(),
            item_date: Some(item.item_date),
            nhis_code: item.nhis_code.clone().unwrap_or_default(),
            hospital_code: item.code.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: two_places(unit_price),
            subtotal: two_places(subtotal),
            is_covered: item.is_covered,
            insurance_pays: two_places(item.insurance_pays),
            patient_pays: two_places(item.patient_pays),
        }
    }
}

fn two_places(money: Money) -> Decimal {
    money.amount().round_dp(2)
}
