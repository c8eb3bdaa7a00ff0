use crate::error::HarnessError;

/// Decodes the stdout of `terraform output -json <name>` as a single string
/// and rejects empty values.
pub fn extract_output_value(name: &str, stdout: &str) -> Result<String, HarnessError> {
    let value: String = serde_json::from_str(stdout).map_err(|source| HarnessError::Decode {
        name: name.to_string(),
        output: stdout.to_string(),
        source,
    })?;

    if value.is_empty() {
        return Err(HarnessError::EmptyOutput {
            name: name.to_string(),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_string() {
        let value = extract_output_value("s3_bucket_id", "\"my-test-bucket\"\n").unwrap();
        assert_eq!(value, "my-test-bucket");
    }

    #[test]
    fn test_extract_unescapes_json() {
        let value =
            extract_output_value("s3_bucket_arn", r#""arn:aws:s3:::bucket-name""#).unwrap();
        assert_eq!(value, "arn:aws:s3:::bucket-name");
    }

    #[test]
    fn test_empty_string_is_empty_output_not_decode() {
        let err = extract_output_value("s3_bucket_id", "\"\"").unwrap_err();
        assert!(matches!(err, HarnessError::EmptyOutput { ref name } if name == "s3_bucket_id"));
        assert!(err.to_string().contains("expected non-empty"));
    }

    #[test]
    fn test_unquoted_text_is_decode_error() {
        let err = extract_output_value("s3_bucket_region", "us-east-1").unwrap_err();
        assert!(matches!(err, HarnessError::Decode { ref name, .. } if name == "s3_bucket_region"));
        assert!(err.to_string().contains("failed to parse s3_bucket_region output"));
        assert!(!err.to_string().contains("expected non-empty"));
    }

    #[test]
    fn test_non_string_json_is_decode_error() {
        let err = extract_output_value("s3_bucket_id", r#"{"value":"x"}"#).unwrap_err();
        assert!(matches!(err, HarnessError::Decode { .. }));
    }

    #[test]
    fn test_blank_stdout_is_decode_error() {
        let err = extract_output_value("s3_bucket_arn", "").unwrap_err();
        assert!(matches!(err, HarnessError::Decode { .. }));
    }
}
