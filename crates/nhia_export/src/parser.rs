//! Reads `NHIAClaimBatch` documents back into [`ParsedBatch`]

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rust_decimal::Decimal;

use crate::error::ExportError;
use crate::model::{
    AttendanceRecord, BatchDetails, ClaimRecord, DiagnosisRecord, FacilityInfo, GdrgRecord, ItemRecord,
    ParsedBatch, PatientRecord, TotalsRecord,
};

/// Parses a document produced by [`crate::NhiaXmlWriter`]
pub fn parse_batch_xml(xml: &str) -> Result<ParsedBatch, ExportError> {
    let root = read_tree(xml)?;
    if root.name != "NHIAClaimBatch" {
        return Err(ExportError::UnexpectedRoot(root.name));
    }

    let facility = root.child("Facility")?;
    let details = root.child("BatchDetails")?;

    let claims = root
        .child("Claims")?
        .children_named("Claim")
        .map(parse_claim)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedBatch {
        facility: FacilityInfo {
            code: facility.text_of("FacilityCode")?,
            name: facility.text_of("FacilityName")?,
        },
        details: BatchDetails {
            batch_number: details.text_of("BatchNumber")?,
            batch_name: details.text_of("BatchName")?,
            submission_period: period(details.child("SubmissionPeriod")?)?,
            total_claims: details.parsed("TotalClaims")?,
            total_amount: details.parsed("TotalAmount")?,
            generated_at: timestamp(details.child("GeneratedAt")?)?,
        },
        claims,
    })
}

fn parse_claim(node: &Node) -> Result<ClaimRecord, ExportError> {
    let patient = node.child("Patient")?;
    let attendance = node.child("Attendance")?;
    let gdrg = node.child("GDRG")?;
    let totals = node.child("Totals")?;

    let diagnoses = node
        .child("Diagnoses")?
        .children_named("Diagnosis")
        .map(|d| {
            Ok(DiagnosisRecord {
                icd10_code: d.text_of("ICD10Code")?,
                description: d.text_of("Description")?,
                is_primary: boolean("isPrimary", d.attribute("isPrimary").unwrap_or("false"))?,
            })
        })
        .collect::<Result<Vec<_>, ExportError>>()?;

    let items = node
        .child("Items")?
        .children_named("Item")
        .map(parse_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClaimRecord {
        claim_check_code: node
            .attribute("id")
            .map(str::to_string)
            .ok_or_else(|| ExportError::MissingElement("Claim@id".to_string()))?,
        patient: PatientRecord {
            nhis_member_id: patient.text_of("NhisMemberId")?,
            surname: patient.text_of("Surname")?,
            other_names: patient.text_of("OtherNames")?,
            date_of_birth: optional_date(patient.child("DateOfBirth")?)?,
            gender: patient.text_of("Gender")?,
            folder_id: patient.text_of("FolderId")?,
        },
        attendance: AttendanceRecord {
            date_of_attendance: optional_date(attendance.child("DateOfAttendance")?)?,
            date_of_discharge: optional_date(attendance.child("DateOfDischarge")?)?,
            type_of_attendance: attendance.text_of("TypeOfAttendance")?,
            type_of_service: attendance.text_of("TypeOfService")?,
            specialty_attended: attendance.text_of("SpecialtyAttended")?,
            attending_prescriber: attendance.text_of("AttendingPrescriber")?,
        },
        gdrg: GdrgRecord {
            code: gdrg.text_of("Code")?,
            name: gdrg.text_of("Name")?,
            amount: gdrg.parsed("Amount")?,
        },
        diagnoses,
        items,
        totals: TotalsRecord {
            total_claim_amount: totals.parsed("TotalClaimAmount")?,
            insurance_covered_amount: totals.parsed("InsuranceCoveredAmount")?,
            patient_copay_amount: totals.parsed("PatientCopayAmount")?,
        },
    })
}

fn parse_item(node: &Node) -> Result<ItemRecord, ExportError> {
    Ok(ItemRecord {
        item_type: node.attribute("type").unwrap_or_default().to_string(),
        item_date: optional_date(node.child("ItemDate")?)?,
        nhis_code: node.text_of("NhisCode")?,
        hospital_code: node.text_of("HospitalCode")?,
        description: node.text_of("Description")?,
        quantity: node.parsed("Quantity")?,
        unit_price: node.parsed::<Decimal>("UnitPrice")?,
        subtotal: node.parsed("Subtotal")?,
        is_covered: boolean("IsCovered", &node.child("IsCovered")?.text)?,
        insurance_pays: node.parsed("InsurancePays")?,
        patient_pays: node.parsed("PatientPays")?,
    })
}

fn optional_date(node: &Node) -> Result<Option<NaiveDate>, ExportError> {
    if node.text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(&node.text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ExportError::invalid(&node.name, node.text.as_str()))
}

/// `YYYY-MM`, read as the first day of that month
fn period(node: &Node) -> Result<NaiveDate, ExportError> {
    NaiveDate::parse_from_str(&format!("{}-01", node.text), "%Y-%m-%d")
        .map_err(|_| ExportError::invalid(&node.name, node.text.as_str()))
}

fn timestamp(node: &Node) -> Result<DateTime<Utc>, ExportError> {
    DateTime::parse_from_rfc3339(&node.text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| ExportError::invalid(&node.name, node.text.as_str()))
}

fn boolean(element: &str, value: &str) -> Result<bool, ExportError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ExportError::invalid(element, other)),
    }
}

/// Element tree with unescaped text and attributes
#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ExportError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Result<&Node, ExportError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ExportError::MissingElement(format!("{}/{}", self.name, name)))
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text_of(&self, name: &str) -> Result<String, ExportError> {
        Ok(self.child(name)?.text.clone())
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Result<T, ExportError> {
        let node = self.child(name)?;
        node.text
            .parse()
            .map_err(|_| ExportError::invalid(name, node.text.as_str()))
    }
}

fn read_tree(xml: &str) -> Result<Node, ExportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| ExportError::MissingElement("NHIAClaimBatch".to_string()))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            root.get_or_insert(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_root() {
        let err = parse_batch_xml("<?xml version=\"1.0\"?><Invoices></Invoices>").unwrap_err();
        assert!(matches!(err, ExportError::UnexpectedRoot(name) if name == "Invoices"));
    }

    #[test]
    fn test_reports_missing_sections() {
        let xml = r#"<NHIAClaimBatch xmlns="http://nhia.gov.gh/claims" version="1.0"><Facility><FacilityCode>F1</FacilityCode><FacilityName>Clinic</FacilityName></Facility></NHIAClaimBatch>"#;
        let err = parse_batch_xml(xml).unwrap_err();
        assert!(matches!(err, ExportError::MissingElement(path) if path == "NHIAClaimBatch/BatchDetails"));
    }

    #[test]
    fn test_reads_unescaped_text_and_attributes() {
        let tree = read_tree(r#"<A k="x &amp; y"><B>1 &lt; 2</B><C/></A>"#).unwrap();
        assert_eq!(tree.attribute("k"), Some("x & y"));
        assert_eq!(tree.text_of("B").unwrap(), "1 < 2");
        assert_eq!(tree.text_of("C").unwrap(), "");
    }
}
