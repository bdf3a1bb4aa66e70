use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_get_with_query() {
    match parse(&[
        "restconf",
        "get",
        "Cisco-IOS-XE-native:native/interface",
        "--query",
        "depth=2",
        "--query",
        "fields=name",
        "--timeout",
        "30",
    ])
    .command
    {
        CliCommand::Get(args) => {
            assert_eq!(args.path, "Cisco-IOS-XE-native:native/interface");
            assert_eq!(
                args.query,
                vec![
                    ("depth".to_string(), "2".to_string()),
                    ("fields".to_string(), "name".to_string())
                ]
            );
            assert_eq!(args.timeout, Some(30));
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_query_value_may_contain_equals() {
    match parse(&["restconf", "get", "x", "--query", "filter=a=b"]).command {
        CliCommand::Get(args) => assert_eq!(args.query[0], ("filter".to_string(), "a=b".to_string())),
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_rejects_malformed_query() {
    assert!(Cli::try_parse_from(["restconf", "get", "x", "--query", "depth"]).is_err());
    assert!(Cli::try_parse_from(["restconf", "get", "x", "--query", "=1"]).is_err());
}

#[test]
fn cli_parse_post_with_data_and_wait() {
    match parse(&["restconf", "post", "native", "--data", r#"{"hostname":"r1"}"#, "--wait"]).command {
        CliCommand::Post(w) => {
            assert_eq!(w.target.path, "native");
            assert_eq!(w.data.as_deref(), Some(r#"{"hostname":"r1"}"#));
            assert!(w.wait);
        }
        _ => panic!("expected Post"),
    }
}

#[test]
fn cli_parse_put_and_patch() {
    assert!(matches!(
        parse(&["restconf", "put", "native", "--data", "@body.json"]).command,
        CliCommand::Put(_)
    ));
    match parse(&["restconf", "patch", "native", "--data", "{}"]).command {
        CliCommand::Patch(w) => assert!(!w.wait),
        _ => panic!("expected Patch"),
    }
}

#[test]
fn cli_parse_delete() {
    match parse(&["restconf", "delete", "native/interface/Loopback=9"]).command {
        CliCommand::Delete(w) => {
            assert_eq!(w.target.path, "native/interface/Loopback=9");
            assert!(w.data.is_none());
        }
        _ => panic!("expected Delete"),
    }
}

#[test]
fn cli_parse_requires_path() {
    assert!(Cli::try_parse_from(["restconf", "get"]).is_err());
}
