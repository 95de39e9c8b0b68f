mod config;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use authz::PolicyStore;
use clap::{Parser, Subcommand};
use policy::{Acl, PolicyDocument};
use storage::SqliteView;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "vigil.toml";

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Manage access policies and check what they grant", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, e.g. "debug" or "authz=debug"
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List assignable policies
    Policies,
    /// Print the text of a policy
    Read {
        /// Policy name
        name: String,
    },
    /// Create or replace a policy from a file
    Write {
        /// Policy name
        name: String,
        /// File containing the policy text
        file: PathBuf,
    },
    /// Delete a policy
    Delete {
        /// Policy name
        name: String,
    },
    /// Show the capabilities a set of policies grants on a path
    Check {
        /// Request path, e.g. secret/dev/db
        path: String,
        /// Policies to merge (repeatable)
        #[arg(short, long = "policy", required = true)]
        policies: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = load_config(&cli.config)?;
    let store = open_store(&config)?;

    match cli.command {
        Commands::Policies => cmd_policies(&store),
        Commands::Read { name } => cmd_read(&store, &name),
        Commands::Write { name, file } => cmd_write(&store, &name, &file),
        Commands::Delete { name } => cmd_delete(&store, &name),
        Commands::Check { path, policies } => cmd_check(&store, &path, &policies),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

fn open_store(config: &Config) -> Result<PolicyStore> {
    let view = SqliteView::open(&config.storage.path)?;
    Ok(PolicyStore::setup(Arc::new(view), &config.store)?)
}

fn cmd_policies(store: &PolicyStore) -> Result<()> {
    for name in store.list_policies()? {
        println!("{name}");
    }
    Ok(())
}

fn cmd_read(store: &PolicyStore, name: &str) -> Result<()> {
    let policy = store
        .get_policy(name)?
        .ok_or_else(|| Error::PolicyNotFound {
            name: name.to_string(),
        })?;

    if policy.raw.is_empty() {
        println!("# {} has no stored text", policy.name());
    } else {
        print!("{}", policy.raw);
    }
    Ok(())
}

fn cmd_write(store: &PolicyStore, name: &str, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(|source| Error::PolicyFile {
        path: file.to_path_buf(),
        source,
    })?;
    let policy = PolicyDocument::parse(&text)?.named(name);
    store.set_policy(policy)?;
    println!("Wrote policy {name}");
    Ok(())
}

fn cmd_delete(store: &PolicyStore, name: &str) -> Result<()> {
    store.delete_policy(name)?;
    println!("Deleted policy {name}");
    Ok(())
}

fn cmd_check(store: &PolicyStore, path: &str, policies: &[String]) -> Result<()> {
    let acl = store.acl(policies)?;
    println!("{}", describe(&acl, path));
    Ok(())
}

fn describe(acl: &Acl, path: &str) -> String {
    let resolved = acl.capabilities(path);
    let verdict = if acl.is_root() {
        "root"
    } else if resolved.capabilities.is_deny() {
        "denied"
    } else if resolved.granted().is_empty() {
        "no access"
    } else {
        "granted"
    };
    format!(
        "{path}: {verdict} {} sudo={}",
        resolved.granted(),
        if resolved.sudo { "yes" } else { "no" }
    )
}
