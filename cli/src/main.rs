//! Glyphstamp CLI

use clap::{Arg, ArgAction, Command};
use glyphstamp_cli::pipeline;
use glyphstamp_cryptography::{KeyAlgorithm, Provider, SignAlgorithm, SignatureSpec};
use std::path::PathBuf;
use tracing::{error, warn};

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

const SIGN_CMD: &str = "sign";
const VERIFY_CMD: &str = "verify";

fn artifact_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("payload")
            .long("payload")
            .required(true)
            .help("Path to the payload file to sign or verify")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("dir")
            .long("dir")
            .default_value("files")
            .help("Base directory for persisted keys, signatures, and symbols")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("name")
            .long("name")
            .default_value("ste")
            .help("Logical name all artifact filenames are derived from")
            .value_parser(clap::value_parser!(String)),
    )
    .arg(
        Arg::new("algorithm")
            .long("algorithm")
            .default_value("dsa")
            .help("Key algorithm (dsa, rsa, or ec)")
            .value_parser(clap::value_parser!(KeyAlgorithm)),
    )
    .arg(
        Arg::new("sign-algorithm")
            .long("sign-algorithm")
            .help("Signature algorithm (defaults to sha256 paired with the key algorithm)")
            .value_parser(clap::value_parser!(SignAlgorithm)),
    )
    .arg(
        Arg::new("provider")
            .long("provider")
            .default_value("rustcrypto")
            .help("Implementation provider backing the signing primitive")
            .value_parser(clap::value_parser!(Provider)),
    )
}

fn spec_from(matches: &clap::ArgMatches) -> Result<SignatureSpec, glyphstamp_cryptography::Error> {
    let key_algorithm = *matches.get_one::<KeyAlgorithm>("algorithm").unwrap();
    let provider = *matches.get_one::<Provider>("provider").unwrap();
    let sign_algorithm = match matches.get_one::<SignAlgorithm>("sign-algorithm") {
        Some(sign_algorithm) => *sign_algorithm,
        None => SignatureSpec::sha256(key_algorithm).sign_algorithm,
    };
    SignatureSpec::new(key_algorithm, sign_algorithm, provider)
}

/// Entrypoint for the glyphstamp CLI
fn main() -> std::process::ExitCode {
    // Define application
    let matches = Command::new("glyphstamp")
        .version(crate_version())
        .about("Sign payloads and render the signed envelope as a scannable symbol.")
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            artifact_args(
                Command::new(SIGN_CMD)
                    .about("Sign a payload file, render the signed envelope as a symbol, and persist key pair, signature, and symbol."),
            )
            .arg(
                Arg::new("key-size")
                    .long("key-size")
                    .default_value("1024")
                    .help("Key length in bits")
                    .value_parser(clap::builder::RangedU64ValueParser::<usize>::new().range(1..)),
            ),
        )
        .subcommand(artifact_args(
            Command::new(VERIFY_CMD)
                .about("Verify a payload file against the persisted signature and public key."),
        ))
        .get_matches();

    // Create logger
    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Parse subcommands
    match matches.subcommand() {
        Some((SIGN_CMD, matches)) => {
            let spec = match spec_from(matches) {
                Ok(spec) => spec,
                Err(e) => {
                    error!(error = ?e, "invalid signature spec");
                    return std::process::ExitCode::FAILURE;
                }
            };
            let dir = matches.get_one::<PathBuf>("dir").unwrap();
            let name = matches.get_one::<String>("name").unwrap();
            let payload = matches.get_one::<PathBuf>("payload").unwrap();
            let key_size = *matches.get_one::<usize>("key-size").unwrap();
            if let Err(e) = pipeline::sign(dir, &spec, name, payload, key_size) {
                error!(error = ?e, "failed to sign payload");
            } else {
                return std::process::ExitCode::SUCCESS;
            }
        }
        Some((VERIFY_CMD, matches)) => {
            let spec = match spec_from(matches) {
                Ok(spec) => spec,
                Err(e) => {
                    error!(error = ?e, "invalid signature spec");
                    return std::process::ExitCode::FAILURE;
                }
            };
            let dir = matches.get_one::<PathBuf>("dir").unwrap();
            let name = matches.get_one::<String>("name").unwrap();
            let payload = matches.get_one::<PathBuf>("payload").unwrap();
            match pipeline::verify(dir, &spec, name, payload) {
                Ok(true) => return std::process::ExitCode::SUCCESS,
                Ok(false) => warn!(name = name.as_str(), "signature does not match payload"),
                Err(e) => error!(error = ?e, "failed to verify payload"),
            }
        }
        _ => {
            error!("no subcommand provided (expected 'sign' or 'verify')");
        }
    }
    std::process::ExitCode::FAILURE
}
