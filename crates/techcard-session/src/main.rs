use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use techcard_model::EditState;
use techcard_session::{parse_envelope, SessionConfig};
use techcard_sync::{decode_with, encode, flat_view, validate, ValueType};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("techcard")
        .version(techcard_session::VERSION)
        .about("Decode, re-encode and validate tech-card parameter trees")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Session configuration (TOML)"),
        )
        .subcommand(
            Command::new("decode")
                .about("Print the ordered flat view of a wire response")
                .arg(
                    Arg::new("wire")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Wire response (JSON, optionally double-encoded)"),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Re-encode a wire response with edits applied")
                .arg(
                    Arg::new("wire")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Wire response (JSON, optionally double-encoded)"),
                )
                .arg(
                    Arg::new("edits")
                        .long("edits")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Edits as a JSON object of composite key to text"),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("Object type to send (defaults to the response's type)"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a value against a type")
                .arg(
                    Arg::new("type")
                        .required(true)
                        .help("int, double, bool or string (aliases accepted)"),
                )
                .arg(
                    Arg::new("value")
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("Candidate text"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    init_tracing(&config);

    match matches.subcommand() {
        Some(("decode", args)) => {
            let wire = read_wire(required_path(args, "wire")?)?;
            let tree = decode_with(&wire, &config.decode_options());
            tracing::info!(blocks = tree.blocks.len(), params = tree.param_count(), "decoded");
            println!("{}", serde_json::to_string_pretty(&flat_view(&tree))?);
        }
        Some(("encode", args)) => {
            let wire = read_wire(required_path(args, "wire")?)?;
            let tree = decode_with(&wire, &config.decode_options());
            let edits = match args.get_one::<PathBuf>("edits") {
                Some(path) => read_edits(path)?,
                None => EditState::new(),
            };
            let object_type = args
                .get_one::<String>("type")
                .map(String::as_str)
                .or(tree.object_type.as_deref());
            let payload = encode(object_type, &tree, &edits);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Some(("validate", args)) => {
            let value_type: ValueType = args
                .get_one::<String>("type")
                .context("missing type")?
                .parse()?;
            let value = args.get_one::<String>("value").context("missing value")?;
            let verdict = validate(value, value_type);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if !verdict.is_valid {
                std::process::exit(1);
            }
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

fn init_tracing(config: &SessionConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing {name}"))
}

fn read_wire(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_envelope(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_edits(path: &Path) -> Result<EditState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
