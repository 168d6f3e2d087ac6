use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use cask_crypto::random_identifier;
use cask_server::{CaskServer, ServerConfig};
use cask_store::{BackendKind, DataStore, Database, KeyedStore, StoreConfig};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli { command, global } = cli;
    let open = || -> anyhow::Result<DataStore> {
        let config = store_config(&global)?;
        DataStore::open_with(&config).context("failed to open store")
    };
    match command {
        Command::RandomId => cmd_random_id(),
        Command::Init => cmd_init(&open()?),
        Command::Add(args) => cmd_add(&open()?, args),
        Command::Get(args) => cmd_get(&open()?, args),
        Command::Put(args) => cmd_put(&open()?, args),
        Command::Rm(args) => cmd_rm(&open()?, args),
        Command::Find(args) => cmd_find(&open()?, args),
        Command::Contains(args) => cmd_contains(&open()?, args),
        Command::Resolve(args) => cmd_resolve(&open()?, args),
        Command::Serve(args) => cmd_serve(open()?, global.config.as_deref(), args),
    }
}

/// Store configuration from the global flags: `--config` file (or the
/// environment), then `--root` and `--memory` on top.
pub fn store_config(global: &GlobalArgs) -> anyhow::Result<StoreConfig> {
    let mut config = match &global.config {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => StoreConfig::resolve(global.root.clone())?,
    };
    if let Some(root) = &global.root {
        config.root = root.clone();
    }
    if global.memory {
        config.backend = BackendKind::Memory;
    }
    tracing::debug!(root = %config.root.display(), backend = %config.backend, "store config resolved");
    Ok(config)
}

fn cmd_random_id() -> anyhow::Result<()> {
    println!("{}", random_identifier());
    Ok(())
}

fn cmd_init(store: &DataStore) -> anyhow::Result<()> {
    match store.root() {
        Some(root) => println!(
            "{} Initialized cask store in {}",
            "✓".green().bold(),
            root.display().to_string().bold()
        ),
        None => println!("{} In-memory store ready", "✓".green().bold()),
    }
    println!("  Algorithm: {}", store.algorithm().to_string().cyan());
    Ok(())
}

fn cmd_add(store: &DataStore, args: AddArgs) -> anyhow::Result<()> {
    let payload = match (args.text, args.file) {
        (Some(text), _) => text.into_bytes(),
        (None, Some(path)) => std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
            buf
        }
    };
    let id = store.content_db().add(&payload)?;
    println!("{id}");
    Ok(())
}

fn cmd_get(store: &DataStore, args: GetArgs) -> anyhow::Result<()> {
    let payload = if args.pointer {
        let pointer = store.expand(Database::Pointer, &args.id)?;
        store.fetch(pointer.as_str())?
    } else {
        let id = store.expand(Database::Content, &args.id)?;
        store.content_db().get(id.as_str())?
    };
    let Some(payload) = payload else {
        bail!("not found: {}", args.id);
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(&payload)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_put(store: &DataStore, args: PutArgs) -> anyhow::Result<()> {
    let content = store.expand(Database::Content, &args.content)?;
    let previous = store.pointer_db().put(&args.pointer, content.as_str())?;
    println!(
        "{} {} -> {}",
        "✓".green().bold(),
        args.pointer.yellow(),
        content.short().cyan()
    );
    if let Some(previous) = previous {
        println!("  was: {}", previous.short().dimmed());
    }
    Ok(())
}

fn cmd_rm(store: &DataStore, args: RmArgs) -> anyhow::Result<()> {
    let db = database(args.pointer);
    let id = store.expand(db, &args.id)?;
    match store.database(db).remove(id.as_str())? {
        Some(_) => println!("{} Removed {} {}", "✓".green(), db, id.short().yellow()),
        None => println!("No {db} entry {}", id.short().yellow()),
    }
    Ok(())
}

fn cmd_find(store: &DataStore, args: FindArgs) -> anyhow::Result<()> {
    let ids: Vec<_> = if args.pointer || args.content {
        let mut ids: Vec<_> = store
            .database(database(args.pointer))
            .find(&args.prefix)?
            .into_iter()
            .collect();
        ids.sort();
        ids
    } else {
        store.find(&args.prefix)?.into_iter().collect()
    };
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn cmd_contains(store: &DataStore, args: ContainsArgs) -> anyhow::Result<()> {
    let present = store.database(database(args.pointer)).contains_key(&args.id)?;
    if present {
        println!("{}", "yes".green());
    } else {
        println!("{}", "no".red());
    }
    Ok(())
}

fn cmd_resolve(store: &DataStore, args: ResolveArgs) -> anyhow::Result<()> {
    let pointer = store.expand(Database::Pointer, &args.pointer)?;
    match store.pointer_db().resolve(pointer.as_str())? {
        Some(content) => println!("{content}"),
        None => bail!("pointer {} is not bound", pointer.short()),
    }
    Ok(())
}

fn cmd_serve(store: DataStore, config_file: Option<&Path>, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match config_file {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config = config.with_bind(&bind)?;
    }
    println!(
        "cask server on {} ({} store)",
        config.endpoint.to_string().bold(),
        store.backend()
    );
    let server = CaskServer::new(config, Arc::new(store));
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn database(pointer: bool) -> Database {
    if pointer {
        Database::Pointer
    } else {
        Database::Content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn explicit_root_is_used() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("store");
        let cli = parse(&["cask", "init", "--root", root.to_str().unwrap()]);
        let config = store_config(&cli.global).unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.backend, BackendKind::File);
    }

    #[test]
    fn memory_flag_selects_memory_backend() {
        let cli = parse(&["cask", "find", "--memory"]);
        assert_eq!(store_config(&cli.global).unwrap().backend, BackendKind::Memory);
    }

    #[test]
    fn config_file_then_root_override() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("cask.toml");
        std::fs::write(&file, "[store]\nroot = \"/from/file\"\nbackend = \"memory\"\n").unwrap();

        let cli = parse(&["cask", "init", "--config", file.to_str().unwrap()]);
        let config = store_config(&cli.global).unwrap();
        assert_eq!(config.root, std::path::PathBuf::from("/from/file"));
        assert_eq!(config.backend, BackendKind::Memory);

        let cli = parse(&["cask", "init", "--config", file.to_str().unwrap(), "--root", "/cli"]);
        assert_eq!(store_config(&cli.global).unwrap().root, std::path::PathBuf::from("/cli"));
    }

    #[test]
    fn commands_against_file_store() {
        let tmp = TempDir::new().unwrap();
        let store = DataStore::open(tmp.path()).unwrap();
        cmd_add(&store, AddArgs { file: None, text: Some("hello".into()) }).unwrap();
        let id = cask_crypto::digest(b"hello");
        assert!(store.content_db().contains_key(id.as_str()).unwrap());

        let pointer = random_identifier();
        cmd_put(
            &store,
            PutArgs { pointer: pointer.to_string(), content: id.short().to_string() },
        )
        .unwrap();
        assert_eq!(store.pointer_db().resolve(pointer.as_str()).unwrap(), Some(id.clone()));

        cmd_rm(&store, RmArgs { id: pointer.short().to_string(), pointer: true }).unwrap();
        assert!(store.pointer_db().is_empty().unwrap());
    }

    #[test]
    fn random_id_does_not_touch_the_store() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.toml");
        let cli = parse(&["cask", "random-id", "--config", missing.to_str().unwrap()]);
        run_command(cli).unwrap();
        assert!(!missing.exists());
    }

    #[test]
    fn get_unknown_prefix_fails() {
        let store = DataStore::in_memory();
        let err = cmd_get(&store, GetArgs { id: "abc".into(), pointer: false }).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn resolve_unbound_pointer_fails() {
        let store = DataStore::in_memory();
        let args = ResolveArgs { pointer: random_identifier().to_string() };
        assert!(cmd_resolve(&store, args).is_err());
    }
}
