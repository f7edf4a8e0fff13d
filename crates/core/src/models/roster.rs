//! Roster model - the students to be seated

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One roster entry. Only the display name is required; extra fields in
/// the source file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An ordered, immutable list of students. Identity is positional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    /// Parse a roster from a JSON array of `{ "name": ... }` records
    pub fn from_json(content: &str) -> Result<Self> {
        let students: Vec<Student> = serde_json::from_str(content)?;
        Ok(Self { students })
    }

    /// Load a roster file once. Any failure here is fatal for the caller.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::RosterLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_json(&content)?;

        tracing::info!(path = %path.display(), students = roster.len(), "Roster loaded");
        Ok(roster)
    }

    /// Drop entries that can never be seated
    pub fn truncate_to(mut self, seat_count: usize) -> Self {
        if self.students.len() > seat_count {
            tracing::warn!(
                students = self.students.len(),
                seats = seat_count,
                "Roster larger than seat grid, extra students dropped"
            );
            self.students.truncate(seat_count);
        }
        self
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_roster_ignores_extra_fields() {
        let json = r#"[
            { "name": "Ada", "id": 7 },
            { "name": "Grace", "photo": "grace.png" }
        ]"#;
        let roster = Roster::from_json(json).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.students()[0].name, "Ada");
        assert_eq!(roster.students()[1].name, "Grace");
    }

    #[test]
    fn test_parse_roster_requires_name() {
        let result = Roster::from_json(r#"[{ "nickname": "Ada" }]"#);
        assert!(matches!(result, Err(Error::RosterParse(_))));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = Roster::load_from_file(&dir.path().join("students.json"));
        assert!(matches!(result, Err(Error::RosterLoad { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name":"Linus"}},{{"name":"Barbara"}}]"#).unwrap();

        let roster = Roster::load_from_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_truncate_to_seat_count() {
        let roster = Roster::new((0..20).map(|i| Student::new(format!("s{}", i))).collect());
        let roster = roster.truncate_to(14);
        assert_eq!(roster.len(), 14);
        assert_eq!(roster.students()[13].name, "s13");

        let small = Roster::new(vec![Student::new("a")]).truncate_to(14);
        assert_eq!(small.len(), 1);
    }
}
