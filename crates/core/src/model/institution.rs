//! Institution directory records.

use serde::{Deserialize, Serialize};

use super::wire::string_or_number;

/// One institution offering one program.
///
/// The same institution appears once per program it offers; records that
/// describe the same offering share `program_offering_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub id: String,
    pub name: String,
    pub locality: String,
    pub region: String,
    pub address: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub program_name: String,
    pub program_offering_id: String,
    #[serde(default)]
    pub founder_type: Option<String>,
    #[serde(default)]
    pub duration_years: Option<u32>,
}

impl InstitutionRecord {
    /// The program reference sent to the recommendation service.
    pub fn program_ref(&self) -> ProgramRef {
        ProgramRef { program_offering_id: self.program_offering_id.clone(), program_name: self.program_name.clone() }
    }

    /// "Locality, Region" for display, skipping empty parts.
    pub fn location_label(&self) -> String {
        match (self.locality.is_empty(), self.region.is_empty()) {
            (false, false) => format!("{}, {}", self.locality, self.region),
            (false, true) => self.locality.clone(),
            (true, false) => self.region.clone(),
            (true, true) => String::new(),
        }
    }
}

/// A program offering as exchanged with the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramRef {
    #[serde(rename = "programOfferingId", alias = "skolaProgramRokId", deserialize_with = "string_or_number")]
    pub program_offering_id: String,
    #[serde(rename = "programName", alias = "program")]
    pub program_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, locality: &str, program: &str, offering: &str) -> InstitutionRecord {
        InstitutionRecord {
            id: format!("{name}-{offering}"),
            name: name.to_string(),
            locality: locality.to_string(),
            region: "Grad Zagreb".to_string(),
            address: String::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            website: None,
            program_name: program.to_string(),
            program_offering_id: offering.to_string(),
            founder_type: None,
            duration_years: None,
        }
    }

    #[test]
    fn test_program_ref() {
        let r = record("Gimnazija Zagreb", "Zagreb", "Opća gimnazija", "42");
        let p = r.program_ref();
        assert_eq!(p.program_offering_id, "42");
        assert_eq!(p.program_name, "Opća gimnazija");
    }

    #[test]
    fn test_location_label() {
        let mut r = record("Gimnazija Zagreb", "Zagreb", "Opća gimnazija", "42");
        assert_eq!(r.location_label(), "Zagreb, Grad Zagreb");
        r.region.clear();
        assert_eq!(r.location_label(), "Zagreb");
    }

    #[test]
    fn test_program_ref_wire_names() {
        let json = serde_json::to_value(ProgramRef { program_offering_id: "7".into(), program_name: "Kuhar".into() })
            .unwrap();
        assert_eq!(json, serde_json::json!({"programOfferingId": "7", "programName": "Kuhar"}));
    }

    #[test]
    fn test_program_ref_accepts_localized_labels() {
        let p: ProgramRef = serde_json::from_str(r#"{"skolaProgramRokId": 1234, "program": "Kuhar"}"#).unwrap();
        assert_eq!(p.program_offering_id, "1234");
        assert_eq!(p.program_name, "Kuhar");
    }

    #[test]
    fn test_record_cache_round_trip_keeps_optional_fields() {
        let mut r = record("Gimnazija Zagreb", "Zagreb", "Opća gimnazija", "42");
        r.founder_type = Some("Javni".into());
        let back: InstitutionRecord = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back, r);
    }
}
