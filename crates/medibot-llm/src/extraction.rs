//! Structured fact parsing from model output.
//!
//! The extraction and revision prompts end with a lone JSON-style
//! dictionary. Models pad their answers with reasoning steps, so the
//! contract is: the parseable object is the **last** brace-delimited
//! substring whose closing brace sits at a line break, at end-of-text, or
//! directly before a period. When several candidate objects appear, last
//! wins.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Extraction errors. Contract violations, never panics.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no brace-delimited object found in model response")]
    MissingObject,

    #[error("tail object is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    #[error("key {0} has an unexpected shape")]
    BadShape(&'static str),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw fact sheet as the model labels it, before vocabulary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSheet {
    /// Labels under "Desired fact"; `None` when the key is absent
    /// (legal for revision responses).
    pub desired: Option<Vec<String>>,
    /// Label → value map under "Fact provided".
    pub provided: BTreeMap<String, String>,
}

/// Parse an extraction response. Both "Desired fact" and "Fact provided"
/// are required.
pub fn parse_extraction(response: &str) -> ExtractionResult<FactSheet> {
    let sheet = parse_fact_sheet(response)?;
    if sheet.desired.is_none() {
        return Err(ExtractionError::MissingKey("Desired fact"));
    }
    Ok(sheet)
}

/// Parse a revision response. Only "Fact provided" is required; the model
/// returns the fully merged corrected map.
pub fn parse_revision(response: &str) -> ExtractionResult<FactSheet> {
    parse_fact_sheet(response)
}

fn parse_fact_sheet(response: &str) -> ExtractionResult<FactSheet> {
    let object = last_object(response).ok_or(ExtractionError::MissingObject)?;
    let value = parse_lenient(object)?;
    let root = match value.as_object() {
        Some(root) => root.clone(),
        None => return Err(ExtractionError::MissingObject),
    };

    let provided_value = root
        .get("Fact provided")
        .ok_or(ExtractionError::MissingKey("Fact provided"))?;
    let provided_object = provided_value
        .as_object()
        .ok_or(ExtractionError::BadShape("Fact provided"))?;

    let mut provided = BTreeMap::new();
    for (label, value) in provided_object {
        // Non-string values are model noise; skip them rather than fail.
        if let Some(text) = value.as_str() {
            provided.insert(label.clone(), text.to_string());
        }
    }

    let desired = match root.get("Desired fact") {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        Some(_) => return Err(ExtractionError::BadShape("Desired fact")),
    };

    Ok(FactSheet { desired, provided })
}

/// Locate the last balanced `{...}` whose closing brace is followed by a
/// newline, a period, or end-of-text.
fn last_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    // Closing positions with a valid terminator, scanned back to front.
    let closers = bytes
        .iter()
        .enumerate()
        .rev()
        .filter(|(i, b)| **b == b'}' && is_terminator(bytes.get(i + 1)));

    for (end, _) in closers {
        // Walk backwards balancing braces to find the matching opener.
        let mut depth = 0i32;
        for start in (0..=end).rev() {
            match bytes[start] {
                b'}' => depth += 1,
                b'{' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=end]);
                    }
                }
                _ => {}
            }
        }
        // Unbalanced tail (truncated output); try an earlier terminator.
    }

    None
}

fn is_terminator(byte: Option<&u8>) -> bool {
    matches!(byte, None | Some(b'\n') | Some(b'\r') | Some(b'.'))
}

/// Parse an object, tolerating Python-style single-quoted dictionaries,
/// which the upstream models emit about as often as real JSON.
fn parse_lenient(object: &str) -> ExtractionResult<Value> {
    match serde_json::from_str(object) {
        Ok(value) => Ok(value),
        Err(err) => {
            let requoted = object.replace('\'', "\"");
            serde_json::from_str(&requoted).map_err(|_| ExtractionError::Malformed(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_extraction_object() {
        let response = r#"{"Desired fact": ["Side Effects"], "Fact provided": {"Drug Name": "panadol"}}"#;
        let sheet = parse_extraction(response).unwrap();
        assert_eq!(sheet.desired.unwrap(), vec!["Side Effects"]);
        assert_eq!(sheet.provided["Drug Name"], "panadol");
    }

    #[test]
    fn takes_last_object_when_reasoning_precedes() {
        let response = concat!(
            "Step 5 gives {\"Desired fact\": [], \"Fact provided\": {\"Drug Name\": \"salah\"}}\n",
            "Output: {\"Desired fact\": [\"Dosage\"], \"Fact provided\": {\"Drug Name\": \"panadol\"}}"
        );
        let sheet = parse_extraction(response).unwrap();
        assert_eq!(sheet.provided["Drug Name"], "panadol");
        assert_eq!(sheet.desired.unwrap(), vec!["Dosage"]);
    }

    #[test]
    fn accepts_period_terminator() {
        let response = r#"The answer is {"Fact provided": {"Drug Name": "panadol"}}."#;
        let sheet = parse_revision(response).unwrap();
        assert_eq!(sheet.provided["Drug Name"], "panadol");
    }

    #[test]
    fn ignores_object_with_trailing_prose() {
        // The first object is mid-sentence, the second terminates a line.
        let response = "maybe {\"Fact provided\": {}} or so\n{\"Fact provided\": {\"Drug Name\": \"bodrex\"}}\ndone";
        let sheet = parse_revision(response).unwrap();
        assert_eq!(sheet.provided["Drug Name"], "bodrex");
    }

    #[test]
    fn handles_nested_braces() {
        let response = "{\"Desired fact\": [], \"Fact provided\": {\"Drug Name\": \"panadol\", \"Dosage\": \"3x1\"}}\n";
        let sheet = parse_extraction(response).unwrap();
        assert_eq!(sheet.provided.len(), 2);
    }

    #[test]
    fn tolerates_python_style_quotes() {
        let response = "{'Desired fact': ['Manufacturer'], 'Fact provided': {'Drug Name': 'panadol'}}";
        let sheet = parse_extraction(response).unwrap();
        assert_eq!(sheet.desired.unwrap(), vec!["Manufacturer"]);
        assert_eq!(sheet.provided["Drug Name"], "panadol");
    }

    #[test]
    fn no_object_is_an_error() {
        assert!(matches!(
            parse_extraction("I could not find any facts."),
            Err(ExtractionError::MissingObject)
        ));
    }

    #[test]
    fn missing_desired_fact_fails_extraction_only() {
        let response = r#"{"Fact provided": {"Drug Name": "panadol"}}"#;
        assert!(matches!(
            parse_extraction(response),
            Err(ExtractionError::MissingKey("Desired fact"))
        ));
        assert!(parse_revision(response).is_ok());
    }

    #[test]
    fn missing_fact_provided_is_an_error() {
        let response = r#"{"Desired fact": ["Dosage"]}"#;
        assert!(matches!(
            parse_revision(response),
            Err(ExtractionError::MissingKey("Fact provided"))
        ));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let response = r#"{"Desired fact": "Dosage", "Fact provided": {}}"#;
        assert!(matches!(
            parse_extraction(response),
            Err(ExtractionError::BadShape("Desired fact"))
        ));
    }

    #[test]
    fn truncated_object_falls_back_to_earlier_terminator() {
        let response = "{\"Fact provided\": {\"Drug Name\": \"panadol\"}}\ngarbage }";
        let sheet = parse_revision(response).unwrap();
        assert_eq!(sheet.provided["Drug Name"], "panadol");
    }

    proptest! {
        #[test]
        fn parser_never_panics(response in ".{0,200}") {
            let _ = parse_extraction(&response);
            let _ = parse_revision(&response);
        }
    }
}
