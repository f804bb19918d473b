//! NHIA XML writer

use chrono::{NaiveDate, SecondsFormat};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::ExportError;
use crate::model::{AttendanceRecord, BatchExport, ClaimRecord, ItemRecord, PatientRecord};

pub const NHIA_NAMESPACE: &str = "http://nhia.gov.gh/claims";
pub const SCHEMA_VERSION: &str = "1.0";
pub const CONTENT_TYPE: &str = "application/xml";

/// `nhis-batch-{batch_number}.xml`
pub fn export_filename(batch_number: &str) -> String {
    format!("nhis-batch-{}.xml", batch_number)
}

/// Writes batches as indented `NHIAClaimBatch` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct NhiaXmlWriter;

impl NhiaXmlWriter {
    #[instrument(skip(self, export), fields(batch = %export.details.batch_number, claims = export.claims.len()))]
    pub fn generate(&self, export: &BatchExport) -> Result<String, ExportError> {
        let mut out = XmlOut::new();
        out.declaration()?;

        let mut root = BytesStart::new("NHIAClaimBatch");
        root.push_attribute(("xmlns", NHIA_NAMESPACE));
        root.push_attribute(("version", SCHEMA_VERSION));
        out.open(root)?;

        out.open(BytesStart::new("Facility"))?;
        out.leaf("FacilityCode", &export.facility.code)?;
        out.leaf("FacilityName", &export.facility.name)?;
        out.close("Facility")?;

        let details = &export.details;
        out.open(BytesStart::new("BatchDetails"))?;
        out.leaf("BatchNumber", &details.batch_number)?;
        out.leaf("BatchName", &details.batch_name)?;
        out.leaf("SubmissionPeriod", &details.submission_period.format("%Y-%m").to_string())?;
        out.leaf("TotalClaims", &details.total_claims.to_string())?;
        out.leaf("TotalAmount", &amount(details.total_amount))?;
        out.leaf(
            "GeneratedAt",
            &details.generated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )?;
        out.close("BatchDetails")?;

        let count = details.total_claims.to_string();
        let mut claims = BytesStart::new("Claims");
        claims.push_attribute(("count", count.as_str()));
        out.open(claims)?;
        for claim in &export.claims {
            write_claim(&mut out, claim)?;
        }
        out.close("Claims")?;

        out.close("NHIAClaimBatch")?;
        let xml = out.finish()?;

        debug!(bytes = xml.len(), "NHIA XML generated");
        Ok(xml)
    }
}

fn write_claim(out: &mut XmlOut, claim: &ClaimRecord) -> Result<(), ExportError> {
    let mut start = BytesStart::new("Claim");
    start.push_attribute(("id", claim.claim_check_code.as_str()));
    out.open(start)?;

    write_patient(out, &claim.patient)?;
    write_attendance(out, &claim.attendance)?;

    out.open(BytesStart::new("GDRG"))?;
    out.leaf("Code", &claim.gdrg.code)?;
    out.leaf("Name", &claim.gdrg.name)?;
    out.leaf("Amount", &amount(claim.gdrg.amount))?;
    out.close("GDRG")?;

    out.open(BytesStart::new("Diagnoses"))?;
    for diagnosis in &claim.diagnoses {
        let mut start = BytesStart::new("Diagnosis");
        start.push_attribute(("isPrimary", flag(diagnosis.is_primary)));
        out.open(start)?;
        out.leaf("ICD10Code", &diagnosis.icd10_code)?;
        out.leaf("Description", &diagnosis.description)?;
        out.close("Diagnosis")?;
    }
    out.close("Diagnoses")?;

    out.open(BytesStart::new("Items"))?;
    for item in &claim.items {
        write_item(out, item)?;
    }
    out.close("Items")?;

    out.open(BytesStart::new("Totals"))?;
    out.leaf("TotalClaimAmount", &amount(claim.totals.total_claim_amount))?;
    out.leaf("InsuranceCoveredAmount", &amount(claim.totals.insurance_covered_amount))?;
    out.leaf("PatientCopayAmount", &amount(claim.totals.patient_copay_amount))?;
    out.close("Totals")?;

    out.close("Claim")
}

fn write_patient(out: &mut XmlOut, patient: &PatientRecord) -> Result<(), ExportError> {
    out.open(BytesStart::new("Patient"))?;
    out.leaf("NhisMemberId", &patient.nhis_member_id)?;
    out.leaf("Surname", &patient.surname)?;
    out.leaf("OtherNames", &patient.other_names)?;
    out.leaf("DateOfBirth", &date(patient.date_of_birth))?;
    out.leaf("Gender", &patient.gender)?;
    out.leaf("FolderId", &patient.folder_id)?;
    out.close("Patient")
}

fn write_attendance(out: &mut XmlOut, attendance: &AttendanceRecord) -> Result<(), ExportError> {
    out.open(BytesStart::new("Attendance"))?;
    out.leaf("DateOfAttendance", &date(attendance.date_of_attendance))?;
    out.leaf("DateOfDischarge", &date(attendance.date_of_discharge))?;
    out.leaf("TypeOfAttendance", &attendance.type_of_attendance)?;
    out.leaf("TypeOfService", &attendance.type_of_service)?;
    out.leaf("SpecialtyAttended", &attendance.specialty_attended)?;
    out.leaf("AttendingPrescriber", &attendance.attending_prescriber)?;
    out.close("Attendance")
}

fn write_item(out: &mut XmlOut, item: &ItemRecord) -> Result<(), ExportError> {
    let mut start = BytesStart::new("Item");
    start.push_attribute(("type", item.item_type.as_str()));
    out.open(start)?;
    out.leaf("ItemDate", &date(item.item_date))?;
    out.leaf("NhisCode", &item.nhis_code)?;
    out.leaf("HospitalCode", &item.hospital_code)?;
    out.leaf("Description", &item.description)?;
    out.leaf("Quantity", &item.quantity.to_string())?;
    out.leaf("UnitPrice", &amount(item.unit_price))?;
    out.leaf("Subtotal", &amount(item.subtotal))?;
    out.leaf("IsCovered", flag(item.is_covered))?;
    out.leaf("InsurancePays", &amount(item.insurance_pays))?;
    out.leaf("PatientPays", &amount(item.patient_pays))?;
    out.close("Item")
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Thin wrapper over the quick-xml event writer
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn declaration(&mut self) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn open(&mut self, start: BytesStart<'_>) -> Result<(), ExportError> {
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ExportError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<name>value</name>`, with the value escaped
    fn leaf(&mut self, name: &str, value: &str) -> Result<(), ExportError> {
        self.writer
            .create_element(name)
            .write_text_content(BytesText::new(value))?;
        Ok(())
    }

    fn finish(self) -> Result<String, ExportError> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("BATCH-202406-0001"), "nhis-batch-BATCH-202406-0001.xml");
    }

    #[test]
    fn test_amounts_always_carry_two_decimals() {
        assert_eq!(amount(Decimal::new(45, 0)), "45.00");
        assert_eq!(amount(Decimal::new(4505, 3)), "4.50");
        assert_eq!(amount(Decimal::new(12345, 4)), "1.23");
    }

    #[test]
    fn test_missing_dates_are_empty() {
        assert_eq!(date(None), "");
        assert_eq!(date(NaiveDate::from_ymd_opt(2024, 6, 3)), "2024-06-03");
    }
}
