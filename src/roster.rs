use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institute: String,
    pub major: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructorRecord {
    pub designation: String,
    pub email: String,
    pub biography: String,
    #[serde(serialize_with = "ordinal_map")]
    pub education: Vec<EducationEntry>,
}

impl InstructorRecord {
    /// Placeholder record for a profile page without a content region.
    pub fn degraded(designation: Option<String>) -> Self {
        Self {
            designation: designation.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            email: NOT_AVAILABLE.to_string(),
            biography: NOT_AVAILABLE.to_string(),
            education: Vec::new(),
        }
    }
}

/// Education rows keyed by their 1-based position: `{"1": {...}, "2": {...}}`.
fn ordinal_map<S: Serializer>(entries: &[EducationEntry], s: S) -> Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(entries.len()))?;
    for (i, entry) in entries.iter().enumerate() {
        map.serialize_entry(&(i + 1).to_string(), entry)?;
    }
    map.end()
}

/// Instructor name → record. Sorted by name so output is stable across runs.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Roster {
    records: BTreeMap<String, InstructorRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing any earlier one under the same name.
    /// Returns true when a previous record was replaced.
    pub fn insert(&mut self, name: String, record: InstructorRecord) -> bool {
        self.records.insert(name, record).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&InstructorRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut ser)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Overwrite `path` with the whole roster as one JSON document.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(degree: &str, institute: &str, major: &str, year: &str) -> EducationEntry {
        EducationEntry {
            degree: degree.into(),
            institute: institute.into(),
            major: major.into(),
            year: year.into(),
        }
    }

    #[test]
    fn education_serializes_as_ordinal_keys_in_row_order() {
        let mut roster = Roster::new();
        roster.insert(
            "Jane Doe".into(),
            InstructorRecord {
                designation: "Professor".into(),
                email: "jane.doe@iba-suk.edu.pk".into(),
                biography: "Works on compilers.".into(),
                education: vec![
                    entry("PhD", "MIT", "CS", "2010"),
                    entry("MS", "Stanford", "EE", "2005"),
                ],
            },
        );

        let value: serde_json::Value = serde_json::from_str(&roster.to_json().unwrap()).unwrap();
        let edu = &value["Jane Doe"]["education"];
        assert_eq!(edu["1"]["degree"], "PhD");
        assert_eq!(edu["1"]["institute"], "MIT");
        assert_eq!(edu["2"]["year"], "2005");
        assert!(edu.get("0").is_none());
    }

    #[test]
    fn pretty_printed_with_four_spaces() {
        let mut roster = Roster::new();
        roster.insert("A".into(), InstructorRecord::degraded(Some("Lecturer".into())));
        let json = roster.to_json().unwrap();
        let expected = "{\n    \"A\": {\n        \"designation\": \"Lecturer\",\n        \"email\": \"Not available\",\n        \"biography\": \"Not available\",\n        \"education\": {}\n    }\n}";
        assert_eq!(json, expected);
    }

    #[test]
    fn later_insert_replaces_earlier() {
        let mut roster = Roster::new();
        assert!(!roster.insert("Ali".into(), InstructorRecord::degraded(Some("Lecturer".into()))));
        assert!(roster.insert("Ali".into(), InstructorRecord::degraded(Some("Professor".into()))));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("Ali").unwrap().designation, "Professor");
    }

    #[test]
    fn write_json_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instructors_data.json");
        std::fs::write(&path, "stale").unwrap();

        let roster = Roster::new();
        roster.write_json(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
