use anyhow::Result;
use schemars::schema_for;

use crate::record::Commit;

pub(super) fn run() -> Result<()> {
    let schema = schema_for!(Commit);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_uses_record_field_names() {
        let schema = serde_json::to_value(schema_for!(Commit)).unwrap();
        let hunk = &schema["definitions"]["Hunk"];

        assert!(hunk["properties"].get("file").is_some());
        assert!(hunk["properties"].get("file_name").is_none());
        let required = hunk["required"].as_array().unwrap();
        assert_eq!(required.len(), 7);
    }
}
