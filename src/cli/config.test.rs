use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> Result<CliConfig, clap::Error> {
    CliConfig::try_parse_from(std::iter::once("aiter").chain(args.iter().copied()))
}

#[test]
fn test_name_collects_argument_tokens() {
    let config = parse(&["name", "module_gemm", "int8", "4096"]).unwrap();
    assert_eq!(
        config.command,
        Command::Name {
            module: "module_gemm".to_string(),
            args: vec!["int8".to_string(), "4096".to_string()],
        }
    );
    assert_eq!(config.output_format, OutputFormat::Text);
}

#[test]
fn test_name_requires_arguments() {
    assert!(parse(&["name", "module_gemm"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let config = parse(&["select", "5", "1280", "8192", "-vv", "--output-format", "json"]).unwrap();
    assert_eq!(config.verbose, 2);
    assert_eq!(config.output_format, OutputFormat::Json);
    assert_eq!(config.command, Command::Select { m: 5, n: 1280, k: 8192 });
}

#[test]
fn test_validate_rejects_zero_dimensions() {
    let config = parse(&["select", "0", "1280", "8192"]).unwrap();
    assert!(matches!(config.validate(), Err(CliError::InvalidArgument(_))));
}

#[test]
fn test_validate_rejects_paths_as_folders() {
    let config = parse(&["probe", "../etc", "main"]).unwrap();
    assert!(config.validate().is_err());
    let config = parse(&["status", "module_gemm_a8w8"]).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_subcommand_is_a_parse_error() {
    match CliConfig::from_args(["aiter", "compile", "module_gemm"]) {
        Err(CliError::ArgParseError(err)) => assert!(err.use_stderr()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_help_is_reported_without_stderr() {
    match CliConfig::from_args(["aiter", "--help"]) {
        Err(CliError::ArgParseError(err)) => assert!(!err.use_stderr()),
        other => panic!("expected help request, got {other:?}"),
    }
}
