use std::{fs, path::Path, sync::Arc};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScribeError;

/// One contiguous changed region within a file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Hunk {
    /// Path of the file the hunk belongs to
    #[serde(rename = "file")]
    pub file_name: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// Context and removed lines, as they read before the change
    pub old_text: String,
    /// Context and added lines, as they read after the change
    pub new_text: String,
}

impl Hunk {
    pub fn from_value(record: Value) -> Result<Self, ScribeError> {
        serde_json::from_value(record).map_err(|source| ScribeError::Malformed {
            record: "hunk",
            source,
        })
    }
}

/// A set of hunks across files plus the commit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub hunks: Vec<Hunk>,
}

impl Commit {
    pub fn from_value(record: Value) -> Result<Self, ScribeError> {
        serde_json::from_value(record).map_err(|source| ScribeError::Malformed {
            record: "commit",
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ScribeError> {
        serde_json::from_str(text).map_err(|source| ScribeError::Malformed {
            record: "commit",
            source,
        })
    }

    /// Parses a records file holding either a single commit object or an
    /// array of them.
    pub fn list_from_json(text: &str) -> Result<Vec<Self>, ScribeError> {
        let value: Value = serde_json::from_str(text).map_err(|source| ScribeError::Malformed {
            record: "commit",
            source,
        })?;

        match value {
            Value::Array(records) => records.into_iter().map(Self::from_value).collect(),
            record => Ok(vec![Self::from_value(record)?]),
        }
    }

    pub fn list_from_path(path: &Path) -> Result<Vec<Self>, ScribeError> {
        Self::list_from_json(&fs::read_to_string(path)?)
    }
}

/// A generation request paired with its result and the commit behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub output: String,
    pub reference: Arc<Commit>,
    pub input: String,
}

impl Node {
    pub fn new(output: String, reference: Arc<Commit>, input: String) -> Self {
        Self {
            output,
            reference,
            input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HUNK_KEYS: [&str; 7] = [
        "file",
        "old_start",
        "old_lines",
        "new_start",
        "new_lines",
        "old_text",
        "new_text",
    ];

    fn hunk_record(file: &str) -> Value {
        json!({
            "file": file,
            "old_start": 1,
            "old_lines": 2,
            "new_start": 1,
            "new_lines": 3,
            "old_text": "x=1",
            "new_text": "x=1\ny=2"
        })
    }

    #[test]
    fn parses_the_documented_commit_record() {
        let text = r#"{"id":"abc123","message":"fix bug","hunks":[{"file":"a.py","old_start":1,"old_lines":2,"new_start":1,"new_lines":3,"old_text":"x=1","new_text":"x=1\ny=2"}]}"#;
        let commit = Commit::from_json(text).unwrap();

        assert_eq!(commit.id, "abc123");
        assert_eq!(commit.message, "fix bug");
        assert_eq!(commit.hunks.len(), 1);
        assert_eq!(commit.hunks[0].file_name, "a.py");
        assert_eq!(commit.hunks[0].old_lines, 2);
        assert_eq!(commit.hunks[0].new_text, "x=1\ny=2");
    }

    #[test]
    fn hunks_keep_input_length_and_order() {
        let record = json!({
            "id": "c1",
            "message": "touch files",
            "hunks": [hunk_record("a.rs"), hunk_record("b.rs"), hunk_record("c.rs")]
        });
        let commit = Commit::from_value(record).unwrap();

        let files: Vec<_> = commit.hunks.iter().map(|h| h.file_name.as_str()).collect();
        assert_eq!(files, ["a.rs", "b.rs", "c.rs"]);
    }

    #[test]
    fn hunk_missing_any_key_names_it() {
        for key in HUNK_KEYS {
            let mut record = hunk_record("a.py");
            record.as_object_mut().unwrap().remove(key);

            let err = Hunk::from_value(record).unwrap_err();
            assert!(
                err.to_string().contains(&format!("missing field `{key}`")),
                "unexpected error for {key}: {err}"
            );
        }
    }

    #[test]
    fn commit_missing_top_level_key_fails() {
        for key in ["id", "message", "hunks"] {
            let mut record = json!({"id": "c1", "message": "m", "hunks": []});
            record.as_object_mut().unwrap().remove(key);

            let err = Commit::from_value(record).unwrap_err();
            assert!(matches!(err, ScribeError::Malformed { record: "commit", .. }));
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn malformed_hunk_fails_the_commit() {
        let mut broken = hunk_record("a.py");
        broken.as_object_mut().unwrap().remove("new_text");
        let record = json!({"id": "c1", "message": "m", "hunks": [hunk_record("b.py"), broken]});

        let err = Commit::from_value(record).unwrap_err();
        assert!(err.to_string().contains("missing field `new_text`"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let mut record = hunk_record("a.py");
        record["old_start"] = json!("one");

        assert!(Hunk::from_value(record).is_err());
    }

    #[test]
    fn records_file_accepts_object_or_array() {
        let single = r#"{"id":"a","message":"m","hunks":[]}"#;
        let many = r#"[{"id":"a","message":"m","hunks":[]},{"id":"b","message":"n","hunks":[]}]"#;

        assert_eq!(Commit::list_from_json(single).unwrap().len(), 1);
        let commits = Commit::list_from_json(many).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[1].id, "b");
    }

    #[test]
    fn records_file_is_read_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("commits.json");
        fs::write(&path, r#"{"id":"a","message":"m","hunks":[]}"#).unwrap();

        let commits = Commit::list_from_path(&path).unwrap();
        assert_eq!(commits[0].id, "a");
    }

    #[test]
    fn missing_records_file_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Commit::list_from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScribeError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
