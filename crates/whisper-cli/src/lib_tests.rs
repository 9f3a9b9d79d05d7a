use super::*;

#[test]
fn parses_create_with_inline_secret() {
    let cli = Cli::try_parse_from([
        "whisper",
        "create",
        "do not share this",
        "--accesses",
        "3",
        "--lifetime",
        "1h",
    ])
    .unwrap();

    match cli.command {
        Commands::Create {
            secret,
            file,
            accesses,
            lifetime,
            ..
        } => {
            assert_eq!(secret.as_deref(), Some("do not share this"));
            assert!(file.is_none());
            assert_eq!(accesses, 3);
            assert_eq!(lifetime.as_deref(), Some("1h"));
        }
        _ => panic!("expected Create command"),
    }
}

#[test]
fn create_defaults_accesses_to_one() {
    let cli = Cli::try_parse_from(["whisper", "create", "x"]).unwrap();
    match cli.command {
        Commands::Create { accesses, .. } => assert_eq!(accesses, 1),
        _ => panic!("expected Create command"),
    }
}

#[test]
fn secret_argument_and_file_flag_are_mutually_exclusive() {
    let result = Cli::try_parse_from(["whisper", "create", "x", "--file", "y.txt"]);
    assert!(result.is_err());
}

#[test]
fn parses_fetch_with_password_and_output() {
    let cli = Cli::try_parse_from([
        "whisper",
        "fetch",
        "abc123",
        "--password",
        "hunter2",
        "--output",
        "out.bin",
    ])
    .unwrap();

    match cli.command {
        Commands::Fetch {
            token,
            password,
            output,
        } => {
            assert_eq!(token, "abc123");
            assert_eq!(password.as_deref(), Some("hunter2"));
            assert_eq!(output, Some(std::path::PathBuf::from("out.bin")));
        }
        _ => panic!("expected Fetch command"),
    }
}

#[test]
fn parses_destroy() {
    let cli = Cli::try_parse_from(["whisper", "destroy", "abc123"]).unwrap();
    match cli.command {
        Commands::Destroy { token, password } => {
            assert_eq!(token, "abc123");
            assert!(password.is_none());
        }
        _ => panic!("expected Destroy command"),
    }
}

#[test]
fn parses_status() {
    let cli = Cli::try_parse_from(["whisper", "status"]).unwrap();
    assert!(matches!(cli.command, Commands::Status));
}

#[test]
fn server_url_defaults_to_loopback() {
    let cli = Cli::try_parse_from(["whisper", "status"]).unwrap();
    assert_eq!(cli.server, "http://127.0.0.1:8080");
}

#[test]
fn bearer_header_encodes_the_password_as_url_safe_base64() {
    let header = bearer_header("hunter2");
    assert!(header.starts_with("Bearer "));
    let encoded = header.strip_prefix("Bearer ").unwrap();
    let decoded = URL_SAFE_NO_PAD.decode(encoded).unwrap();
    assert_eq!(decoded, b"hunter2");
}
