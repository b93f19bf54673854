use super::*;
use std::io::Write;

#[test]
fn test_defaults_fill_missing_fields() {
    let options = ResolverOptions::from_json(r#"{ "sam_adapters": false }"#).expect("valid json");
    assert!(!options.sam_adapters);
    assert!(options.sam_constructors);
    assert_eq!(options.abi_version, CURRENT_ABI_VERSION);
    assert_eq!(options.max_resolution_depth, MAX_RESOLUTION_DEPTH);
}

#[test]
fn test_abi_version_override() {
    let options = ResolverOptions::from_json(
        r#"{ "abi_version": { "major": 2, "minor": 1, "patch": 0 } }"#,
    )
    .expect("valid json");
    assert_eq!(options.abi_version, AbiVersion::new(2, 1, 0));
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = ResolverOptions::from_json("{ sam_adapters: ").expect_err("malformed");
    assert!(matches!(err, OptionsError::Json(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{ "nullable_annotations": ["my.Nullable"] }}"#).expect("write");
    let options = ResolverOptions::from_file(file.path()).expect("readable");
    assert!(options.is_nullable_annotation(&FqNameUnsafe::new("my.Nullable")));
    assert!(!options.is_nullable_annotation(&FqNameUnsafe::new("javax.annotation.Nullable")));

    let missing = ResolverOptions::from_file(Path::new("/nonexistent/options.json"));
    assert!(matches!(missing, Err(OptionsError::Io(_))));
}

#[test]
fn test_internal_annotations() {
    let options = ResolverOptions::default();
    assert!(options.is_internal_annotation(&FqNameUnsafe::new("fdr.runtime.metadata.Info")));
    assert!(options.is_internal_annotation(&FqNameUnsafe::new("org.jetbrains.annotations.NotNull")));
    assert!(!options.is_internal_annotation(&FqNameUnsafe::new("fdr.runtime.Other")));
    assert!(!options.is_internal_annotation(&FqNameUnsafe::new("a.Marker")));
}
