//! Grouping records by program and resolving recommended offerings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{InstitutionRecord, ProgramRef};

/// One program with every institution that offers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedProgram {
    pub program_name: String,
    pub schools: Vec<InstitutionRecord>,
}

/// Partition records by program name.
///
/// Groups appear in first-seen order; records keep their relative order inside a group.
pub fn group_by_program<I>(records: I) -> Vec<GroupedProgram>
where
    I: IntoIterator<Item = InstitutionRecord>,
{
    let mut groups: Vec<GroupedProgram> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for record in records {
        match slots.get(&record.program_name) {
            Some(&slot) => groups[slot].schools.push(record),
            None => {
                slots.insert(record.program_name.clone(), groups.len());
                groups.push(GroupedProgram { program_name: record.program_name.clone(), schools: vec![record] });
            }
        }
    }

    groups
}

/// Resolve recommended offerings against the directory.
///
/// Keeps recommendation order, takes the first directory record per offering
/// id and drops ids the directory does not know.
pub fn select_offerings(directory: &[InstitutionRecord], programs: &[ProgramRef]) -> Vec<InstitutionRecord> {
    let mut by_offering: HashMap<&str, &InstitutionRecord> = HashMap::with_capacity(directory.len());
    for record in directory {
        by_offering.entry(record.program_offering_id.as_str()).or_insert(record);
    }

    programs
        .iter()
        .filter_map(|p| {
            let found = by_offering.get(p.program_offering_id.as_str()).map(|r| (*r).clone());
            if found.is_none() {
                tracing::debug!(offering = %p.program_offering_id, "recommended offering not in directory");
            }
            found
        })
        .collect()
}

/// Flat table order: program name, then institution name.
pub fn sort_for_table(records: &mut [InstitutionRecord]) {
    records.sort_by(|a, b| a.program_name.cmp(&b.program_name).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, program: &str, offering: &str) -> InstitutionRecord {
        InstitutionRecord {
            id: offering.to_string(),
            name: name.to_string(),
            locality: "Zagreb".to_string(),
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

    fn program(offering: &str) -> ProgramRef {
        ProgramRef { program_offering_id: offering.to_string(), program_name: String::new() }
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let records = vec![record("s1", "A", "1"), record("s2", "B", "2"), record("s3", "A", "3"), record("s4", "C", "4")];
        let groups = group_by_program(records);

        let names: Vec<&str> = groups.iter().map(|g| g.program_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let a_schools: Vec<&str> = groups[0].schools.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(a_schools, vec!["s1", "s3"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_by_program(Vec::new()).is_empty());
    }

    #[test]
    fn test_select_offerings_keeps_recommendation_order() {
        let directory = vec![record("s1", "A", "1"), record("s2", "B", "2"), record("s3", "C", "3")];
        let selected = select_offerings(&directory, &[program("3"), program("99"), program("1")]);

        let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s3", "s1"]);
    }

    #[test]
    fn test_select_offerings_first_match_wins() {
        let directory = vec![record("first", "A", "7"), record("second", "A", "7")];
        let selected = select_offerings(&directory, &[program("7")]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "first");
    }

    #[test]
    fn test_sort_for_table() {
        let mut records = vec![record("Zeta", "Kuhar", "1"), record("Alfa", "Kuhar", "2"), record("Beta", "Ekonomist", "3")];
        sort_for_table(&mut records);

        let names: Vec<&str> = records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alfa", "Zeta"]);
    }
}
