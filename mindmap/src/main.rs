//! AI mind-map conversion CLI.
//!
//! Converts saved model replies into tree JSON, exports trees to the
//! `<mindmap>` XML dialect, and validates tree files against the v1 schema
//! and semantic invariants.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use jsonschema::Draft;
use serde_json::Value;
use tracing::warn;

use mindmap::core::export::{to_json, to_xml};
use mindmap::core::invariants::validate_invariants;
use mindmap::io::config::load_config;
use mindmap::node::Node;
use mindmap::pipeline::{create_simple_mind_map, detect_and_parse, parse_json_reply};

const V1_SCHEMA: &str = include_str!("../schemas/mindmap/v1.schema.json");
const CONFIG_PATH: &str = ".mindmap/config.toml";

#[derive(Parser)]
#[command(
    name = "mindmap",
    version,
    about = "Convert AI chat replies into mind-map trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a saved model reply into tree JSON (JSON payload first, then
    /// XML, then plain-text fallback).
    Convert {
        /// Reply text file.
        input: PathBuf,
        /// Output path; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a tree JSON file to another format.
    Export {
        /// Tree JSON file.
        input: PathBuf,
        /// Output path; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Xml)]
        format: ExportFormat,
    },
    /// Check a tree file against the v1 schema and invariants (label budget,
    /// no empty notes).
    Validate {
        /// Tree JSON file.
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Xml,
}

fn main() {
    mindmap::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert { input, output } => cmd_convert(&input, output.as_deref()),
        Command::Export {
            input,
            output,
            format,
        } => cmd_export(&input, output.as_deref(), format),
        Command::Validate { input } => cmd_validate(&input),
    }
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> Result<()> {
    let reply = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let config = load_config(Path::new(CONFIG_PATH))?;
    let tree = convert_reply(&reply, config.note_limit);
    emit(output, &to_json(&tree)?)
}

/// Try JSON ingestion, then XML, then wrap the reply as plain text.
fn convert_reply(reply: &str, note_limit: usize) -> Node {
    if let Some(tree) = parse_json_reply(reply) {
        return tree;
    }
    if let Some(tree) = detect_and_parse(reply) {
        return tree;
    }
    warn!("no structured payload found, wrapping reply as plain text");
    create_simple_mind_map(reply, note_limit)
}

fn cmd_export(input: &Path, output: Option<&Path>, format: ExportFormat) -> Result<()> {
    let raw = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let tree = validate_tree(&raw)?;
    let payload = match format {
        ExportFormat::Json => to_json(&tree)?,
        ExportFormat::Xml => to_xml(&tree),
    };
    emit(output, &payload)
}

fn cmd_validate(input: &Path) -> Result<()> {
    let raw = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    validate_tree(&raw)?;
    Ok(())
}

fn emit(output: Option<&Path>, payload: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, payload).with_context(|| format!("write {}", path.display()))
        }
        None => {
            print!("{payload}");
            Ok(())
        }
    }
}

/// Parse and validate a tree file: schema conformance + semantic invariants.
///
/// Returns the parsed [`Node`] on success, or an error describing violations.
fn validate_tree(raw: &str) -> Result<Node> {
    let instance: Value = serde_json::from_str(raw).context("parse tree json")?;
    let schema: Value = serde_json::from_str(V1_SCHEMA).context("parse v1 schema")?;
    validate_schema(&instance, &schema)?;
    let tree: Node = serde_json::from_str(raw).context("parse tree as v1 struct")?;
    let errors = validate_invariants(&tree);
    if !errors.is_empty() {
        bail!("invariant violations:\n- {}", errors.join("\n- "));
    }
    Ok(tree)
}

/// Validate JSON instance against a JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .context("compile json schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_convert() {
        let cli = Cli::parse_from(["mindmap", "convert", "reply.txt"]);
        assert!(matches!(cli.command, Command::Convert { output: None, .. }));
    }

    #[test]
    fn parse_export_with_format() {
        let cli = Cli::parse_from(["mindmap", "export", "tree.json", "--format", "json"]);
        match cli.command {
            Command::Export { format, .. } => assert_eq!(format, ExportFormat::Json),
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn validate_accepts_normalized_tree() {
        let raw = r#"{"data":{"text":"Root","expand":true,"isActive":false},"children":[{"data":{"text":"Child"}}]}"#;
        let tree = validate_tree(raw).expect("valid");
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn validate_rejects_over_budget_label() {
        let long = "字".repeat(16);
        let raw = format!(r#"{{"data":{{"text":"{long}"}}}}"#);
        let err = validate_tree(&raw).unwrap_err();
        assert!(err.to_string().contains("length budget"));
    }

    #[test]
    fn validate_rejects_schema_violations() {
        let raw = r#"{"data":{"text":123}}"#;
        let err = validate_tree(raw).unwrap_err();
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn convert_reply_prefers_json_over_xml() {
        let reply = "```json\n{\"data\":{\"text\":\"J\"}}\n```\n<map><node TEXT=\"X\"/></map>";
        let tree = convert_reply(reply, 500);
        assert_eq!(tree.data.text, "J");
    }

    #[test]
    fn convert_reply_accepts_xml_only() {
        let reply = "```xml\n<map><node TEXT=\"Root\"/></map>\n```";
        let tree = convert_reply(reply, 500);
        assert_eq!(tree.data.text, "Root");
    }

    #[test]
    fn convert_reply_wraps_plain_text() {
        let tree = convert_reply("只是普通聊天", 500);
        assert_eq!(tree.data.text, "只是普通聊天");
        assert_eq!(tree.data.expand, Some(true));
    }
}
