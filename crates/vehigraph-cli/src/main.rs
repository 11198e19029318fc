//! CLI entry point for vehigraph.
//!
//! Results are written to stdout as JSON; logs go to stderr so the output can
//! be piped into an agent or another tool.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use vehigraph_core::{ParamValue, Settings};
use vehigraph_graph::{GraphQueryClient, RelationshipTool};

#[derive(Parser)]
#[command(name = "vehigraph")]
#[command(about = "Query people/vehicle relationships in Neo4j (Bolt with HTTP fallback)")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: vehigraph).
    #[arg(short, long, default_value = "vehigraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run a relationship keyword (LIVES_WITH, DRIVES, OWNS) or a read-only Cypher query.
    Query {
        /// Keyword or Cypher statement.
        query: String,

        /// Query parameter as name=value; values are parsed as JSON scalars, else strings.
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,

        /// Maximum number of records (default: settings.default_limit).
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Invoke the agent tool with JSON arguments read from stdin.
    Tool,
    /// Print the agent tool descriptor as JSON.
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let records = match cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&RelationshipTool::descriptor())?);
            return Ok(());
        }
        Command::Query {
            query,
            params,
            limit,
        } => {
            let tool = build_tool(&cli.config)?;
            let params: BTreeMap<String, ParamValue> = params.into_iter().collect();
            tool.search_relationships(&query, Some(params), limit)
                .await?
        }
        Command::Tool => {
            let tool = build_tool(&cli.config)?;
            let input = std::io::read_to_string(std::io::stdin())?;
            let args: serde_json::Value = if input.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&input)?
            };
            tool.invoke(args).await?
        }
    };

    println!("{}", serde_json::to_string(&records)?);
    Ok(())
}

/// Settings are read once here and handed to the client explicitly.
fn build_tool(config_prefix: &str) -> anyhow::Result<RelationshipTool> {
    let settings = Settings::load(config_prefix)?;
    let client = GraphQueryClient::from_settings(&settings)?;
    tracing::debug!(config = %config_prefix, bolt = client.has_primary(), "Client built");
    Ok(RelationshipTool::new(client, settings.credentials()))
}

fn parse_param(s: &str) -> Result<(String, ParamValue), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in {s:?}"));
    }
    let value = serde_json::from_str::<ParamValue>(raw)
        .unwrap_or_else(|_| ParamValue::String(raw.to_string()));
    Ok((name.to_string(), value))
}
