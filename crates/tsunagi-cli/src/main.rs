//! Tsunagi CLI - Workspace and memory curation
//!
//! Works directly on a local workspaces tree, no server needed.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tsunagi::{
    AddMemoryOptions, Importance, KeywordSearch, MemoryChanges, MemoryStore, Platform,
    ResolvedMemory, SearchMemoriesOptions, Visibility, WorkspaceInfo, WorkspaceKeyComponents,
    WorkspaceManager,
};

use config::Config;

#[derive(Parser)]
#[command(name = "tsunagi")]
#[command(about = "Tsunagi CLI - Workspace and memory curation", long_about = None)]
#[command(version)]
struct Cli {
    /// Workspaces root (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workspace operations
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },

    /// Memory operations
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Show current configuration
    Config,
}

/// Which conversation's workspace to act on
#[derive(Args, Clone)]
struct WorkspaceArgs {
    /// Platform (discord, misskey)
    #[arg(long, default_value = "discord")]
    platform: Platform,
    /// User ID
    #[arg(short, long)]
    user: String,
    /// Channel ID
    #[arg(short, long)]
    channel: String,
    /// Direct-message workspace (enables private memory)
    #[arg(long)]
    dm: bool,
}

#[derive(Subcommand)]
enum WorkspaceAction {
    /// List all workspaces under the root
    List,
    /// Resolve (and create) a workspace
    Resolve {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Add a memory
    Add {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Memory content (or use -f for file)
        content: Option<String>,
        /// Read content from file
        #[arg(short, long)]
        file: Option<String>,
        /// Store in the private log (DM workspaces only)
        #[arg(long)]
        private: bool,
        /// Mark as high importance
        #[arg(long)]
        high: bool,
    },
    /// List memories, oldest first
    List {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Include disabled memories
        #[arg(short, long)]
        all: bool,
    },
    /// Search memories by keywords (any keyword matches)
    Search {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Keywords
        #[arg(required = true)]
        keywords: Vec<String>,
        /// Max results (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show important memories
    Important {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// Disable a memory
    Disable {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        id: String,
    },
    /// Re-enable a memory
    Enable {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        id: String,
    },
    /// Change importance, visibility or enabled state
    Patch {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        id: String,
        #[arg(long)]
        enabled: Option<bool>,
        /// public or private
        #[arg(long)]
        visibility: Option<Visibility>,
        /// high or normal
        #[arg(long)]
        importance: Option<Importance>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Workspace { action } => cmd_workspace(&config, cli.root, action).await,
        Commands::Memory { action } => cmd_memory(&config, cli.root, action).await,
        Commands::Config => cmd_config(&config, cli.root),
    }
}

// ============================================
// Command Implementations
// ============================================

fn open_workspaces(config: &Config, root: Option<PathBuf>) -> Result<Arc<WorkspaceManager>> {
    let root = config.workspaces_root(root.as_deref());
    let manager = WorkspaceManager::new(&root)
        .with_context(|| format!("Invalid workspaces root {:?}", root))?;
    Ok(Arc::new(manager))
}

async fn resolve(manager: &WorkspaceManager, args: &WorkspaceArgs) -> Result<WorkspaceInfo> {
    let components = WorkspaceKeyComponents::new(args.platform, &args.user, &args.channel);
    manager
        .get_or_create(components, args.dm)
        .await
        .context("Failed to resolve workspace")
}

async fn cmd_workspace(config: &Config, root: Option<PathBuf>, action: WorkspaceAction) -> Result<()> {
    let manager = open_workspaces(config, root)?;

    match action {
        WorkspaceAction::List => {
            let workspaces = manager.list_workspaces().await?;

            if workspaces.is_empty() {
                println!("No workspaces under {:?}", manager.root());
                return Ok(());
            }

            println!("{}", "Workspaces:".bold());
            for ws in workspaces {
                let dm_marker = if ws.is_dm { " [dm]".yellow().to_string() } else { String::new() };
                let created = ws
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("  {}{} {}", ws.key.cyan(), dm_marker, created.dimmed());
            }
        }

        WorkspaceAction::Resolve { workspace } => {
            let ws = resolve(&manager, &workspace).await?;
            println!("{} {}", "✓".green(), ws.key.cyan());
            println!("  {}", ws.path.display().to_string().dimmed());
        }
    }

    Ok(())
}

async fn cmd_memory(config: &Config, root: Option<PathBuf>, action: MemoryAction) -> Result<()> {
    let manager = open_workspaces(config, root)?;
    let store = MemoryStore::new(
        Arc::clone(&manager),
        KeywordSearch::from_config(&config.bridge.search),
        config.bridge.memory.clone(),
    );

    match action {
        MemoryAction::Add { workspace, content, file, private, high } => {
            let ws = resolve(&manager, &workspace).await?;

            // Get content from file or argument
            let memory_content = match (content, file) {
                (Some(c), None) => c,
                (None, Some(f)) => {
                    fs::read_to_string(&f)
                        .with_context(|| format!("Failed to read file: {}", f))?
                }
                (Some(_), Some(_)) => {
                    bail!("Cannot specify both content and --file");
                }
                (None, None) => {
                    // Interactive input
                    Input::new()
                        .with_prompt("Memory content")
                        .interact_text()
                        .context("Failed to read input")?
                }
            };

            let options = AddMemoryOptions {
                visibility: if private { Visibility::Private } else { Visibility::Public },
                importance: if high { Importance::High } else { Importance::Normal },
            };
            let entry = store.add_memory(&ws, &memory_content, options).await?;

            println!(
                "{} Memory {} added to {} [{}/{}]",
                "✓".green(),
                entry.id.dimmed(),
                ws.key.cyan(),
                entry.visibility,
                entry.importance
            );
            println!("  {}", truncate_string(&memory_content, 80).dimmed());
        }

        MemoryAction::List { workspace, all } => {
            let ws = resolve(&manager, &workspace).await?;
            let memories = store.list_memories(&ws, all).await?;

            if memories.is_empty() {
                println!("No memories in {}", ws.key);
                return Ok(());
            }

            println!("{} ({}):", "Memories".bold(), ws.key.cyan());
            print_memories(&memories);
        }

        MemoryAction::Search { workspace, keywords, limit } => {
            let ws = resolve(&manager, &workspace).await?;
            let memories = store
                .search_memories(&ws, &keywords, SearchMemoriesOptions { limit })
                .await?;

            let query = keywords.join(" ");
            if memories.is_empty() {
                println!("No memories found for '{}'", query);
                return Ok(());
            }

            println!(
                "{} results for '{}' ({}):",
                memories.len().to_string().green(),
                query,
                ws.key.cyan()
            );
            print_memories(&memories);
        }

        MemoryAction::Important { workspace } => {
            let ws = resolve(&manager, &workspace).await?;
            let memories = store.get_important_memories(&ws).await?;

            if memories.is_empty() {
                println!("No important memories in {}", ws.key);
                return Ok(());
            }

            println!("{} ({}):", "Important memories".bold(), ws.key.cyan());
            print_memories(&memories);
        }

        MemoryAction::Disable { workspace, id } => {
            let ws = resolve(&manager, &workspace).await?;
            store.disable_memory(&ws, &id).await?;
            println!("{} Memory {} disabled", "✓".green(), id);
        }

        MemoryAction::Enable { workspace, id } => {
            let ws = resolve(&manager, &workspace).await?;
            store.enable_memory(&ws, &id).await?;
            println!("{} Memory {} enabled", "✓".green(), id);
        }

        MemoryAction::Patch { workspace, id, enabled, visibility, importance } => {
            let changes = MemoryChanges { enabled, visibility, importance };
            if changes.is_empty() {
                bail!("Nothing to change: pass --enabled, --visibility or --importance");
            }

            let ws = resolve(&manager, &workspace).await?;
            let patch = store.patch_memory(&ws, &id, changes).await?;
            println!("{} Memory {} patched ({})", "✓".green(), id, patch.ts.dimmed());
        }
    }

    Ok(())
}

fn print_memories(memories: &[ResolvedMemory]) {
    for mem in memories {
        let badge = format!("[{}/{}]", mem.visibility, mem.importance);
        let badge = if mem.importance == Importance::High {
            badge.yellow()
        } else {
            badge.dimmed()
        };
        let preview = truncate_string(&mem.content, 60);
        if mem.enabled {
            println!("  {} {} {}", mem.id.dimmed(), badge, preview);
        } else {
            println!("  {} {} {}", mem.id.dimmed(), badge, preview.strikethrough().dimmed());
        }
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}

fn cmd_config(config: &Config, root: Option<PathBuf>) -> Result<()> {
    let bridge = &config.bridge;

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Workspaces root: {:?}", config.workspaces_root(root.as_deref()));
    println!("  Search limit: {}", bridge.memory.search_limit);
    println!("  Search char budget: {}", bridge.memory.max_search_chars);
    println!(
        "  Ripgrep fast path: {}",
        if bridge.search.fast_path {
            bridge.search.ripgrep_bin.green()
        } else {
            "disabled".red()
        }
    );

    Ok(())
}
