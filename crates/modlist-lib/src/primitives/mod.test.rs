use super::*;
use std::error::Error;

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant
                    .to_possible_value()
                    .expect("PossibleValue should exist for all variants");
                let parsed: $enum_type = possible_value.get_name().parse().unwrap();
                assert_eq!(parsed, *variant, "Round-trip should preserve variant");
            }
        }
    };
}

test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(TerminalCapsDetectIntent, test_color_intent_completeness);

#[test]
fn test_log_format_aliases() {
    assert_eq!("txt".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert_eq!("PLAIN".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
}

#[test]
fn test_invalid_value_reports_parse_error() {
    let err = "xml".parse::<LogFormat>().unwrap_err();
    match err {
        ConfigError::ParseError { value, reason } => {
            assert_eq!(value, "xml");
            assert_eq!(reason, "invalid log format");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_verbosity_mapping() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Error);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(200), LogLevel::Trace);
    assert_eq!(LogLevel::Warning.as_filter(), "warn");
}

#[test]
fn test_missing_api_key_message_names_env_var() {
    let err = ConfigError::MissingApiKey {
        provider: ProviderKind::CurseForge,
        env_var: "CURSEFORGE_API_KEY",
    };
    let message = err.to_string();
    assert!(message.contains("curseforge"));
    assert!(message.contains("CURSEFORGE_API_KEY"));
}

#[test]
fn test_io_error_chains_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = ConfigError::from(io);
    assert!(err.source().is_some());
}

#[test]
fn test_sha256_hex_known_vector() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_sha1_hex_known_vector() {
    assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
}
