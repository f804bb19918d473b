//! Test Data Builders
//!
//! Builders for claims and claim lines. Tests set only the fields they
//! care about; patient names and claim check codes are generated.

use chrono::NaiveDate;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{Money, PatientId, PlanId};
use domain_claims::{Attendance, ClaimDiagnosis, NewClaim, NewClaimItem, PatientDetails};
use domain_coverage::ServiceCategory;
use domain_tariff::ItemKey;

use crate::fixtures::DateFixtures;

/// Builder for [`NewClaim`]
pub struct NewClaimBuilder {
    claim_check_code: String,
    plan_id: PlanId,
    patient: PatientDetails,
    attendance: Attendance,
    diagnoses: Vec<ClaimDiagnosis>,
}

impl NewClaimBuilder {
    pub fn new(plan_id: PlanId) -> Self {
        let surname: String = LastName().fake();
        let other_names: String = FirstName().fake();
        let member_number: u32 = (1_000_000..9_999_999).fake();

        Self {
            claim_check_code: format!("CCC-{}", (100_000..999_999u32).fake::<u32>()),
            plan_id,
            patient: PatientDetails::new(surname, other_names).with_member_id(format!("NHIS-{member_number}")),
            attendance: Attendance::outpatient(DateFixtures::attendance()),
            diagnoses: vec![ClaimDiagnosis::primary("B54", "Unspecified malaria")],
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.claim_check_code = code.into();
        self
    }

    pub fn with_patient(mut self, patient: PatientDetails) -> Self {
        self.patient = patient;
        self
    }

    pub fn attended_on(mut self, date: NaiveDate) -> Self {
        self.attendance.date_of_attendance = date;
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: ClaimDiagnosis) -> Self {
        self.diagnoses.push(diagnosis);
        self
    }

    pub fn build(self) -> NewClaim {
        NewClaim {
            claim_check_code: self.claim_check_code,
            patient_id: PatientId::new(),
            plan_id: self.plan_id,
            patient: self.patient,
            attendance: self.attendance,
            diagnoses: self.diagnoses,
        }
    }
}

/// Builder for [`NewClaimItem`]
pub struct ClaimLineBuilder {
    line: NewClaimItem,
}

impl ClaimLineBuilder {
    pub fn new(category: ServiceCategory, code: impl Into<String>, unit_price: Decimal) -> Self {
        let code = code.into();
        Self {
            line: NewClaimItem {
                category,
                item: None,
                description: code.clone(),
                code,
                quantity: 1,
                unit_price: Money::ghs(unit_price),
                item_date: DateFixtures::attendance(),
            },
        }
    }

    /// A drug line for a catalogue item
    pub fn drug(key: ItemKey, code: impl Into<String>, unit_price: Decimal) -> Self {
        Self::new(ServiceCategory::Drug, code, unit_price).for_item(key)
    }

    /// A lab line for a catalogue item
    pub fn lab(key: ItemKey, code: impl Into<String>, unit_price: Decimal) -> Self {
        Self::new(ServiceCategory::Lab, code, unit_price).for_item(key)
    }

    pub fn for_item(mut self, key: ItemKey) -> Self {
        self.line.item = Some(key);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.line.quantity = quantity;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.line.description = description.into();
        self
    }

    pub fn build(self) -> NewClaimItem {
        self.line
    }
}
