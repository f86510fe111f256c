//! Integration tests: binary module images and standalone type annotations

mod common;
use common::*;

use solid::builder::binary::ImageFlags;
use solid::{BinaryError, SolidConfig, SolidType};

// ==================== Binary images ====================

#[test]
fn test_image_holds_the_printed_module() {
    let src = "let unfixed n: float = 2; n = n * 1.5;";
    let config = unfolded();
    let bytes = solid::compile(src, Some(&config)).unwrap();
    assert_eq!(&bytes[..4], b"SLDB");

    let image = solid::decode(&bytes).unwrap();
    assert_eq!(image.version, 1);
    assert_eq!(
        image.flags,
        ImageFlags {
            constant_folding: false,
            int_coercion: true,
        }
    );
    assert_eq!(image.module.to_string(), print_ok(src, &config));
}

#[test]
fn test_default_image_flags() {
    let image = solid::decode(&solid::compile("1;", None).unwrap()).unwrap();
    assert!(image.flags.constant_folding);
    assert!(image.flags.int_coercion);
}

#[test]
fn test_damaged_images_are_rejected() {
    let mut bytes = solid::compile("1;", None).unwrap();
    assert!(matches!(
        solid::decode(&bytes[..10]),
        Err(BinaryError::Truncated { .. })
    ));

    bytes[0] = b'X';
    assert_eq!(solid::decode(&bytes), Err(BinaryError::InvalidMagic));
}

#[test]
fn test_compile_reports_semantic_errors() {
    let err = solid::compile("let x: int = 1; x = 3;", Some(&SolidConfig::default())).unwrap_err();
    assert_eq!(err.code(), 2210);
}

// ==================== Type annotations ====================

#[test]
fn test_parse_type_normalizes_unions() {
    let ty = solid::parse_type("int | float | int").unwrap();
    assert_eq!(ty, SolidType::Integer.union(&SolidType::Float));
    assert!(SolidType::Integer.is_subtype_of(&ty));
}

#[test]
fn test_printed_types_parse_back() {
    for annotation in [
        "[int, ?: str]",
        "[a: int, b?: str]",
        "(mutable int[])[]",
        "[:float]",
        "int{}",
        "-4.5",
        "[1, 'a', true]",
    ] {
        let ty = solid::parse_type(annotation).unwrap();
        assert_eq!(ty.to_string(), annotation);
        assert_eq!(solid::parse_type(&ty.to_string()).unwrap(), ty);
    }
}

#[test]
fn test_parse_type_errors() {
    assert_eq!(solid::parse_type("Missing").unwrap_err().code(), 2101);
    assert!(matches!(
        solid::parse_type("int |").unwrap_err(),
        solid::SolidError::Parse(_)
    ));
}
