//! isotope-convert - service graph to Kubernetes manifest converter

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use isotope_convert::labels::Labels;
use isotope_convert::{
    CompileParams, ManifestCompiler, ServiceGraph, DEFAULT_CLIENT_IMAGE, DEFAULT_ENVIRONMENT,
    DEFAULT_SERVICE_IMAGE,
};

/// Convert service graphs into deployable manifests
#[derive(Parser, Debug)]
#[command(name = "isotope-convert", version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, env = "ISOTOPE_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate Kubernetes manifests for one cluster
    ///
    /// Writes a multi-document YAML stream: graph ConfigMaps, a Deployment
    /// and Service per in-cluster service, then the client pair.
    Kubernetes(KubernetesArgs),
}

/// Kubernetes conversion arguments
#[derive(Args, Debug)]
struct KubernetesArgs {
    /// Path to the service graph YAML file
    graph_file: PathBuf,

    /// Target cluster; services assigned elsewhere are skipped
    #[arg(long, env = "ISOTOPE_CLUSTER")]
    cluster: String,

    /// Environment name (e.g. NONE, ISTIO)
    #[arg(long, env = "ISOTOPE_ENVIRONMENT_NAME", default_value = DEFAULT_ENVIRONMENT)]
    environment_name: String,

    /// Mock service container image
    #[arg(long, env = "ISOTOPE_SERVICE_IMAGE", default_value = DEFAULT_SERVICE_IMAGE)]
    service_image: String,

    /// Maximum idle connections per host for each mock service
    #[arg(long, env = "ISOTOPE_SERVICE_MAX_IDLE_CONNECTIONS_PER_HOST", default_value_t = 0)]
    service_max_idle_connections_per_host: u32,

    /// Node selector for mock service pods, as key=value (repeatable)
    #[arg(
        long,
        env = "ISOTOPE_SERVICE_NODE_SELECTOR",
        value_delimiter = ',',
        value_parser = parse_key_val
    )]
    service_node_selector: Vec<(String, String)>,

    /// Load-generating client image
    #[arg(long, env = "ISOTOPE_CLIENT_IMAGE", default_value = DEFAULT_CLIENT_IMAGE)]
    client_image: String,

    /// Namespace for the client Deployment and Service
    #[arg(long, env = "ISOTOPE_CLIENT_NAMESPACE", default_value = "default")]
    client_namespace: String,

    /// Node selector for client pods, as key=value (repeatable)
    #[arg(
        long,
        env = "ISOTOPE_CLIENT_NODE_SELECTOR",
        value_delimiter = ',',
        value_parser = parse_key_val
    )]
    client_node_selector: Vec<(String, String)>,

    /// Write manifests to this file instead of stdout
    #[arg(short, long, env = "ISOTOPE_OUTPUT")]
    output: Option<PathBuf>,

    /// Reject malformed graphs before compiling
    #[arg(long, env = "ISOTOPE_VALIDATE")]
    validate: bool,
}

impl KubernetesArgs {
    fn compile_params(&self) -> CompileParams {
        CompileParams {
            cluster: self.cluster.clone(),
            environment: self.environment_name.clone(),
            client_image: self.client_image.clone(),
            client_namespace: self.client_namespace.clone(),
            client_node_selector: to_labels(&self.client_node_selector),
            service_image: self.service_image.clone(),
            service_node_selector: to_labels(&self.service_node_selector),
            service_max_idle_connections_per_host: self.service_max_idle_connections_per_host,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("invalid selector '{s}', expected key=value")),
    }
}

fn to_labels(pairs: &[(String, String)]) -> Labels {
    pairs.iter().cloned().collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean manifest stream
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    match cli.command {
        Commands::Kubernetes(args) => run_kubernetes(args),
    }
}

fn run_kubernetes(args: KubernetesArgs) -> anyhow::Result<()> {
    let graph = ServiceGraph::from_file(&args.graph_file)
        .with_context(|| format!("failed to load graph {}", args.graph_file.display()))?;

    if args.validate {
        graph.validate().context("service graph failed validation")?;
    }

    let params = args.compile_params();
    let yaml = ManifestCompiler::new(&params)
        .compile_to_yaml(&graph)
        .context("failed to generate manifests")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &yaml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = yaml.len(), "wrote manifests");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(yaml.as_bytes())
                .context("failed to write manifests to stdout")?;
        }
    }

    Ok(())
}
