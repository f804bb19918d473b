//! Patient, attendance and diagnosis details carried on a claim

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{GdrgTariffId, Money};
use domain_tariff::GdrgTariff;

/// Patient as identified to the payer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub nhis_member_id: Option<String>,
    pub surname: String,
    pub other_names: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Hospital folder number
    pub folder_id: Option<String>,
}

impl PatientDetails {
    pub fn new(surname: impl Into<String>, other_names: impl Into<String>) -> Self {
        Self {
            surname: surname.into(),
            other_names: other_names.into(),
            ..Default::default()
        }
    }

    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.nhis_member_id = Some(member_id.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.other_names, self.surname).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub date_of_attendance: NaiveDate,
    pub date_of_discharge: Option<NaiveDate>,
    /// e.g. `EAE` (emergency), `ANC`, `OPD`
    pub type_of_attendance: String,
    /// `OPD` or `IPD`
    pub type_of_service: String,
    pub specialty_attended: Option<String>,
    pub attending_prescriber: Option<String>,
}

impl Attendance {
    pub fn outpatient(date: NaiveDate) -> Self {
        Self {
            date_of_attendance: date,
            date_of_discharge: None,
            type_of_attendance: "OPD".to_string(),
            type_of_service: "OPD".to_string(),
            specialty_attended: None,
            attending_prescriber: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDiagnosis {
    pub icd10_code: String,
    pub description: String,
    pub is_primary: bool,
}

impl ClaimDiagnosis {
    pub fn primary(icd10_code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            icd10_code: icd10_code.into(),
            description: description.into(),
            is_primary: true,
        }
    }

    pub fn secondary(icd10_code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            is_primary: false,
            ..Self::primary(icd10_code, description)
        }
    }
}

/// G-DRG chosen at vetting, with the tariff amount frozen at that moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdrgSelection {
    pub tariff_id: GdrgTariffId,
    pub code: String,
    pub name: String,
    pub amount: Money,
}

impl From<&GdrgTariff> for GdrgSelection {
    fn from(tariff: &GdrgTariff) -> Self {
        Self {
            tariff_id: tariff.id,
            code: tariff.code.clone(),
            name: tariff.name.clone(),
            amount: tariff.tariff_price,
        }
    }
}
