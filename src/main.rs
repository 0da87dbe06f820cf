//! cfgweave CLI
//!
//! Entry point for the `cfgweave` command-line tool.

use cfgweave::config::CoreConfig;
use cfgweave::{
    Cfgweave, CfgweaveBuilder, ConfigNode, EnvironmentConfigSource, FileConfigSource,
    MapConfigSource, Tag, Tags, Value,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cfgweave")]
#[command(about = "Resolve typed configuration from files and the environment", version)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Configuration file (TOML or JSON); later files override earlier ones
    #[arg(long, short = 'f', global = true)]
    file: Vec<PathBuf>,

    /// Load environment variables starting with this prefix (prefix removed)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Inline value, e.g. --set db.port=5432; applied after files and environment
    #[arg(long, global = true)]
    set: Vec<String>,

    /// Tag to resolve against, e.g. --tag environment=dev
    #[arg(long, short = 't', global = true)]
    tag: Vec<String>,

    /// Engine settings file (default: built-in settings)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print one path
    Get {
        /// Path to resolve, e.g. db.hosts[0].url
        path: String,

        /// Type to decode the value as
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print every leaf of the merged configuration, secrets masked
    Print,

    /// Load every source and report problems
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueType {
    String,
    Int,
    Float,
    Bool,
    List,
    Duration,
    Node,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tags = match parse_tags(&cli.sources.tag) {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let engine = match build_engine(&cli.sources) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Get {
            path,
            value_type,
            json,
        } => run_get(&engine, &path, value_type, &tags, json),
        Commands::Print => run_print(&engine, &tags),
        Commands::Check => println!("Configuration valid"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_tags(raw: &[String]) -> Result<Tags, String> {
    raw.iter().try_fold(Tags::new(), |tags, entry| {
        Tag::parse(entry)
            .map(|tag| tags.with(tag))
            .ok_or_else(|| format!("invalid tag {:?}, expected key=value", entry))
    })
}

fn build_engine(args: &SourceArgs) -> Result<Cfgweave, String> {
    let config = match &args.config {
        Some(path) => CoreConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        None => CoreConfig::default(),
    };

    let mut builder = CfgweaveBuilder::new().with_config(config);
    for file in &args.file {
        builder = builder.add_source(FileConfigSource::new(file));
    }
    if let Some(prefix) = &args.env {
        builder = builder.add_source(EnvironmentConfigSource::with_prefix(prefix, true));
    }
    if !args.set.is_empty() {
        let pairs = args
            .set
            .iter()
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                    .ok_or_else(|| format!("invalid --set {:?}, expected path=value", entry))
            })
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.add_source(MapConfigSource::new(pairs));
    }

    let engine = builder.build().map_err(|e| e.to_string())?;
    engine.load_configs().map_err(|e| e.to_string())?;
    Ok(engine)
}

fn run_get(engine: &Cfgweave, path: &str, value_type: ValueType, tags: &Tags, json: bool) {
    let resolved = match value_type {
        ValueType::String => engine.get_config_with_tags::<String>(path, tags).map(Value::String),
        ValueType::Int => engine.get_config_with_tags::<i64>(path, tags).map(Value::Int),
        ValueType::Float => engine.get_config_with_tags::<f64>(path, tags).map(Value::Float),
        ValueType::Bool => engine.get_config_with_tags::<bool>(path, tags).map(Value::Bool),
        ValueType::List => engine
            .get_config_with_tags::<Vec<String>>(path, tags)
            .map(|items| Value::List(items.into_iter().map(Value::String).collect())),
        ValueType::Duration => engine
            .get_config_with_tags::<std::time::Duration>(path, tags)
            .map(Value::Duration),
        ValueType::Node => engine
            .get_config_with_tags::<ConfigNode>(path, tags)
            .map(Value::Node),
    };

    let value = match resolved {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if json {
        let output = serde_json::json!({ "path": path, "value": to_json(&value) });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", to_text(&value));
    }
}

fn run_print(engine: &Cfgweave, tags: &Tags) {
    match engine.debug_print(tags) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(v) => serde_json::json!(v),
        Value::Float(v) => serde_json::json!(v),
        Value::Bool(v) => serde_json::json!(v),
        Value::List(items) => items.iter().map(to_json).collect(),
        Value::Duration(d) => serde_json::json!(d.as_millis() as u64),
        Value::Node(node) => node_to_json(node),
        other => serde_json::Value::String(to_text(other)),
    }
}

fn node_to_json(node: &ConfigNode) -> serde_json::Value {
    match node {
        ConfigNode::Leaf(leaf) if leaf.metadata.is_secret() => {
            serde_json::Value::String(cfgweave::node::SECRET_MASK.to_string())
        }
        ConfigNode::Leaf(leaf) => leaf
            .value
            .clone()
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
        ConfigNode::Array(items) => items
            .iter()
            .map(|item| item.as_ref().map(node_to_json).unwrap_or(serde_json::Value::Null))
            .collect(),
        ConfigNode::Map(entries) => entries
            .iter()
            .map(|(k, v)| (k.clone(), node_to_json(v)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::List(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        Value::Duration(d) => format!("{}ms", d.as_millis()),
        Value::Node(node) => node_to_json(node).to_string(),
        other => format!("{:?}", other),
    }
}
