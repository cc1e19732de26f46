//! Engine API response types and normalization.

use serde::Deserialize;

use eduform_core::model::{lenient_string, normalize_website, split_contacts};
use eduform_core::{InstitutionRecord, ProgramRef};

/// Raw directory object with its localized labels.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionWire {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "Skola", alias = "name", default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Sent next to `Skola` by the directory; only used when `Skola` is blank.
    #[serde(rename = "Naziv", default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "Mjesto", alias = "locality", default, deserialize_with = "lenient_string")]
    pub locality: String,
    #[serde(rename = "Zupanija", alias = "region", default, deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(rename = "Adresa", alias = "address", default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(rename = "BrojTelefona", default, deserialize_with = "lenient_string")]
    pub phones: String,
    #[serde(rename = "EMail", default, deserialize_with = "lenient_string")]
    pub emails: String,
    #[serde(rename = "Web", alias = "website", default, deserialize_with = "lenient_string")]
    pub website: String,
    #[serde(rename = "Program", alias = "programName", default, deserialize_with = "lenient_string")]
    pub program_name: String,
    #[serde(
        rename = "SkolaProgramRokId",
        alias = "programOfferingId",
        default,
        deserialize_with = "lenient_string"
    )]
    pub program_offering_id: String,
    #[serde(
        rename = "VrstaOsnivaca",
        alias = "Osnivac",
        alias = "founderType",
        default,
        deserialize_with = "lenient_string"
    )]
    pub founder_type: String,
    #[serde(rename = "Trajanje", alias = "durationYears", default, deserialize_with = "lenient_string")]
    pub duration: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

impl From<InstitutionWire> for InstitutionRecord {
    fn from(wire: InstitutionWire) -> Self {
        let program_offering_id = wire.program_offering_id.trim().to_string();
        let name = non_empty(wire.name).or_else(|| non_empty(wire.title)).unwrap_or_default();
        let id = match non_empty(wire.id) {
            Some(id) => id,
            None if !program_offering_id.is_empty() => program_offering_id.clone(),
            None => name.clone(),
        };

        InstitutionRecord {
            id,
            name,
            locality: wire.locality.trim().to_string(),
            region: wire.region.trim().to_string(),
            address: wire.address.trim().to_string(),
            phones: split_contacts(&wire.phones),
            emails: split_contacts(&wire.emails),
            website: normalize_website(&wire.website),
            program_name: wire.program_name.trim().to_string(),
            program_offering_id,
            founder_type: non_empty(wire.founder_type),
            duration_years: wire.duration.trim().parse().ok(),
        }
    }
}

/// Result of the recommendation call.
///
/// An empty `programs` list with an explanation is a valid answer: the
/// service found nothing suitable and says why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecommendationResponse {
    #[serde(alias = "objasnjenje", default, deserialize_with = "lenient_string")]
    pub explanation: String,
    #[serde(alias = "programi", default)]
    pub programs: Vec<ProgramRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_to_record() {
        let json = serde_json::json!({
            "_id": "abc",
            "Skola": " Gimnazija Pula ",
            "Mjesto": "Pula",
            "Zupanija": "Istarska",
            "Adresa": "Trierska 8",
            "BrojTelefona": "052 123;; 052 456 ,",
            "EMail": "ured@gimpu.hr",
            "Web": "Službena: www.gimpu.hr",
            "Program": "Opća gimnazija",
            "SkolaProgramRokId": 1234,
            "Osnivac": "Javni",
            "Trajanje": 4
        });
        let wire: InstitutionWire = serde_json::from_value(json).unwrap();
        let record = InstitutionRecord::from(wire);

        assert_eq!(record.id, "abc");
        assert_eq!(record.name, "Gimnazija Pula");
        assert_eq!(record.phones, vec!["052 123", "052 456"]);
        assert_eq!(record.emails, vec!["ured@gimpu.hr"]);
        assert_eq!(record.website.as_deref(), Some("https://www.gimpu.hr"));
        assert_eq!(record.program_offering_id, "1234");
        assert_eq!(record.founder_type.as_deref(), Some("Javni"));
        assert_eq!(record.duration_years, Some(4));
    }

    #[test]
    fn test_wire_directory_object() {
        let json = serde_json::json!({
            "Skola": "Gimnazija Pula",
            "EMail": "ured@gimpu.hr",
            "BrojTelefona": "052 123",
            "BrojFaksa": null,
            "Web": "www.gimpu.hr",
            "Zupanija": "Istarska",
            "SkolaProgramRokId": 321,
            "VrstaOsnivaca": "Javni",
            "Program": "Opća gimnazija",
            "VrstaPrograma": "Gimnazijski",
            "VrstaProgramaId": 1,
            "SkolaId": 7,
            "Kvota": 56,
            "ParalelnaKvota": 2,
            "Trajanje": 4,
            "Prag": null,
            "Adresa": "Trierska 8",
            "Mjesto": "Pula",
            "Lat": 44.87,
            "Lng": 13.85,
            "Naziv": "Gimnazija Pula",
            "Id": 7,
            "ImaDodatnuProvjeru": false
        });
        let record = InstitutionRecord::from(serde_json::from_value::<InstitutionWire>(json).unwrap());

        assert_eq!(record.name, "Gimnazija Pula");
        assert_eq!(record.id, "321");
        assert_eq!(record.founder_type.as_deref(), Some("Javni"));
        assert_eq!(record.region, "Istarska");
        assert_eq!(record.duration_years, Some(4));
    }

    #[test]
    fn test_wire_blank_skola_uses_naziv() {
        let json = serde_json::json!({ "Skola": "  ", "Naziv": "Strukovna škola Vice Vlatkovića", "SkolaProgramRokId": 8 });
        let record = InstitutionRecord::from(serde_json::from_value::<InstitutionWire>(json).unwrap());
        assert_eq!(record.name, "Strukovna škola Vice Vlatkovića");
    }

    #[test]
    fn test_wire_alternate_labels_and_gaps() {
        let json = serde_json::json!({
            "Naziv": "OŠ Ivana Gundulića",
            "Mjesto": "Zagreb",
            "BrojTelefona": null,
            "Web": "nema",
            "SkolaProgramRokId": "77",
            "Trajanje": "n/a"
        });
        let record = InstitutionRecord::from(serde_json::from_value::<InstitutionWire>(json).unwrap());

        assert_eq!(record.name, "OŠ Ivana Gundulića");
        assert_eq!(record.id, "77");
        assert!(record.phones.is_empty());
        assert!(record.website.is_none());
        assert!(record.founder_type.is_none());
        assert!(record.duration_years.is_none());
    }

    #[test]
    fn test_wire_english_aliases() {
        let json = serde_json::json!({
            "id": "x1",
            "name": "Tehnička škola",
            "locality": "Split",
            "programName": "Elektrotehničar",
            "programOfferingId": 9
        });
        let record = InstitutionRecord::from(serde_json::from_value::<InstitutionWire>(json).unwrap());

        assert_eq!(record.id, "x1");
        assert_eq!(record.locality, "Split");
        assert_eq!(record.program_name, "Elektrotehničar");
        assert_eq!(record.program_offering_id, "9");
    }

    #[test]
    fn test_recommendation_response_english() {
        let json = serde_json::json!({
            "explanation": "Odgovara tvojim interesima.",
            "programs": [{ "programOfferingId": 12, "programName": "Kuhar" }]
        });
        let response: RecommendationResponse = serde_json::from_value(json).unwrap();

        assert_eq!(response.explanation, "Odgovara tvojim interesima.");
        assert_eq!(response.programs[0].program_offering_id, "12");
    }

    #[test]
    fn test_recommendation_response_localized() {
        let json = serde_json::json!({
            "objasnjenje": "Nema prikladnih programa.",
            "programi": [{ "skolaProgramRokId": "5", "program": "Konobar" }]
        });
        let response: RecommendationResponse = serde_json::from_value(json).unwrap();

        assert_eq!(response.explanation, "Nema prikladnih programa.");
        assert_eq!(response.programs[0].program_name, "Konobar");
    }

    #[test]
    fn test_recommendation_response_empty_programs() {
        let response: RecommendationResponse =
            serde_json::from_value(serde_json::json!({ "explanation": "Ništa ne odgovara." })).unwrap();
        assert!(response.programs.is_empty());
        assert!(!response.explanation.is_empty());
    }
}
