//! bareclaw — a self-hostable runtime for tool-using LLM agents.

mod agent;
mod channels;
mod config;
mod cron;
mod errors;
mod gateway;
mod mcp;
mod providers;
mod repl;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::agent::agent_loop::{Agent, AgentSettings};
use crate::agent::audit::AuditLog;
use crate::agent::memory::MemoryStore;
use crate::agent::policy::SecurityPolicy;
use crate::agent::tools::filesystem::{FileReadTool, FileWriteTool};
use crate::agent::tools::git::GitTool;
use crate::agent::tools::http::HttpRequestTool;
use crate::agent::tools::introspect::{AgentStatusTool, AuditLogReadTool};
use crate::agent::tools::mcp_proxy::McpProxyTool;
use crate::agent::tools::memory_tools::{
    MemoryDeletePrefixTool, MemoryForgetTool, MemoryListKeysTool, MemoryRecallTool,
    MemoryStoreTool,
};
use crate::agent::tools::registry::ToolRegistry;
use crate::agent::tools::shell::ShellTool;
use crate::channels::base::Channel;
use crate::channels::discord::DiscordChannel;
use crate::channels::telegram::TelegramChannel;
use crate::config::loader::{
    ensure_workspace, get_config_path, get_cron_path, load_config, save_config,
};
use crate::config::schema::Config;
use crate::cron::service::CronService;
use crate::mcp::pool::McpSessionPool;
use crate::mcp::session::McpSession;
use crate::providers::factory::build_chat_provider;

#[derive(Parser)]
#[command(name = "bareclaw", about = "BareClaw - self-hostable agent runtime", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config file and workspace.
    Onboard,
    /// Show runtime configuration and workspace state.
    Status,
    /// Run one agent turn and print the reply.
    Agent {
        /// The prompt to send.
        message: String,
    },
    /// Interactive REPL.
    Repl,
    /// Start the HTTP gateway.
    Gateway {
        /// Bind address.
        #[arg(long, default_value = gateway::DEFAULT_ADDR)]
        addr: SocketAddr,
    },
    /// Manage and run scheduled tasks.
    Cron {
        #[command(subcommand)]
        action: Option<CronAction>,
    },
    /// Read or change configuration values.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run a chat channel.
    Channel {
        #[command(subcommand)]
        which: ChannelKind,
    },
}

#[derive(Subcommand)]
enum CronAction {
    /// Add a shell task.
    Add { schedule: String, command: String },
    /// Add an agent-prompt task.
    AddPrompt { schedule: String, prompt: String },
    /// Remove a task by id.
    Remove { id: String },
    /// Disable a task.
    Pause { id: String },
    /// Re-enable a task.
    Resume { id: String },
    /// List all tasks.
    List,
    /// Run all due tasks once.
    Run,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print all values (secrets masked).
    Get,
    /// Set one value and persist it.
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum ChannelKind {
    /// Telegram long-poll channel.
    Telegram,
    /// Discord gateway channel.
    Discord,
}

/// Everything one agent run needs, built from config.
struct Stack {
    config: Config,
    agent: Arc<Agent>,
    memory: Arc<MemoryStore>,
    policy: Arc<SecurityPolicy>,
    pool: Arc<McpSessionPool>,
}

/// Build the full stack: policy, audit, memory, tools (built-in plus any
/// discovered capability-server tools), provider chain, agent.
async fn build_stack() -> Result<Stack> {
    let config = load_config(None);
    let workspace = ensure_workspace().context("cannot create workspace directory")?;

    let policy = Arc::new(SecurityPolicy::new(workspace.clone()));
    let audit = Arc::new(AuditLog::new(&workspace));
    let memory = Arc::new(MemoryStore::new(&workspace));
    let pool = Arc::new(McpSessionPool::new());

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool::new(policy.clone(), audit.clone())));
    registry.register(Box::new(FileReadTool::new(policy.clone(), audit.clone())));
    registry.register(Box::new(FileWriteTool::new(policy.clone(), audit.clone())));
    registry.register(Box::new(MemoryStoreTool::new(memory.clone(), audit.clone())));
    registry.register(Box::new(MemoryRecallTool::new(memory.clone(), audit.clone())));
    registry.register(Box::new(MemoryForgetTool::new(memory.clone(), audit.clone())));
    registry.register(Box::new(MemoryListKeysTool::new(memory.clone(), audit.clone())));
    registry.register(Box::new(MemoryDeletePrefixTool::new(
        memory.clone(),
        audit.clone(),
    )));
    registry.register(Box::new(HttpRequestTool::new(audit.clone())));
    registry.register(Box::new(GitTool::new(policy.clone(), audit.clone())));
    registry.register(Box::new(AgentStatusTool::new(
        policy.clone(),
        memory.clone(),
        audit.clone(),
    )));
    registry.register(Box::new(AuditLogReadTool::new(audit.clone())));

    // Discover capability-server tools with short-lived probe sessions;
    // a hung or broken server is skipped, not fatal.
    for spec in config.mcp_server_specs() {
        match McpSession::probe(&spec.argv).await {
            Ok(mut session) => {
                for (remote_name, description) in session.list_tools().await {
                    registry.register(Box::new(McpProxyTool::new(
                        &spec.name,
                        &remote_name,
                        &description,
                        spec.argv.clone(),
                        pool.clone(),
                        audit.clone(),
                    )));
                }
                session.shutdown().await;
            }
            Err(e) => warn!("capability server '{}' unavailable: {}", spec.name, e),
        }
    }

    let provider: Arc<dyn providers::base::ChatProvider> =
        Arc::from(build_chat_provider(&config));
    let agent = Arc::new(Agent::new(
        provider,
        Arc::new(registry),
        memory.clone(),
        AgentSettings::new(config.default_model.clone()),
    ));

    Ok(Stack {
        config,
        agent,
        memory,
        policy,
        pool,
    })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

async fn cmd_onboard() -> Result<()> {
    let workspace = ensure_workspace()?;
    let config_path = get_config_path();
    if !config_path.exists() {
        save_config(&Config::default(), None);
        println!("wrote default config to {}", config_path.display());
    } else {
        println!("config already exists at {}", config_path.display());
    }
    println!("workspace ready at {}", workspace.display());
    Ok(())
}

async fn cmd_status() -> Result<()> {
    let stack = build_stack().await?;
    println!("config:     {}", get_config_path().display());
    println!("workspace:  {}", stack.policy.workspace_dir().display());
    println!("provider:   {}", stack.config.default_provider);
    println!("model:      {}", stack.config.default_model);
    println!("memory:     {} ({} entries)", stack.config.memory_backend, stack.memory.entry_count());
    println!("mcp:        {} server(s) configured", stack.config.mcp_server_specs().len());
    println!("tools:      {} registered", stack.agent.registry().len());
    Ok(())
}

async fn cmd_agent(message: &str) -> Result<()> {
    let stack = build_stack().await?;
    let reply = stack.agent.run_once(message).await?;
    println!("{}", reply);
    stack.pool.shutdown().await;
    Ok(())
}

async fn cmd_cron(action: Option<CronAction>) -> Result<()> {
    let mut service = CronService::load(get_cron_path());
    match action.unwrap_or(CronAction::Run) {
        CronAction::Add { schedule, command } => {
            let task = service.add(&schedule, &command)?;
            println!("added {} ({})", task.id, task.schedule);
        }
        CronAction::AddPrompt { schedule, prompt } => {
            let task = service.add_prompt(&schedule, &prompt)?;
            println!("added {} ({})", task.id, task.schedule);
        }
        CronAction::Remove { id } => {
            service.remove(&id)?;
            println!("removed {}", id);
        }
        CronAction::Pause { id } => {
            service.pause(&id)?;
            println!("paused {}", id);
        }
        CronAction::Resume { id } => {
            service.resume(&id)?;
            println!("resumed {}", id);
        }
        CronAction::List => println!("{}", service.list()),
        CronAction::Run => {
            let stack = build_stack().await?;
            let outcomes = service
                .run_due(&stack.agent, &stack.memory, unix_now())
                .await;
            if outcomes.is_empty() {
                println!("(no tasks due)");
            }
            for outcome in outcomes {
                let status = if outcome.success { "ok" } else { "error" };
                println!("[{}] {}: {}", status, outcome.task_id, outcome.output.trim_end());
            }
            stack.pool.shutdown().await;
        }
    }
    Ok(())
}

async fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get => {
            println!("{}", load_config(None).display_masked());
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config(None);
            config
                .set_value(&key, &value)
                .map_err(|e| anyhow::anyhow!(e))?;
            save_config(&config, None);
            println!("set {}", key);
        }
    }
    Ok(())
}

async fn cmd_channel(which: ChannelKind) -> Result<()> {
    let stack = build_stack().await?;
    let mut channel: Box<dyn Channel> = match which {
        ChannelKind::Telegram => {
            let token = stack.config.effective_telegram_token();
            anyhow::ensure!(!token.is_empty(), "no telegram token configured");
            Box::new(TelegramChannel::new(token, stack.agent.clone()))
        }
        ChannelKind::Discord => {
            let token = stack.config.effective_discord_token();
            anyhow::ensure!(!token.is_empty(), "no discord token configured");
            Box::new(DiscordChannel::new(token, stack.agent.clone()))
        }
    };
    let result = channel.run().await;
    stack.pool.shutdown().await;
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Onboard => cmd_onboard().await,
        Commands::Status => cmd_status().await,
        Commands::Agent { message } => cmd_agent(&message).await,
        Commands::Repl => {
            let stack = build_stack().await?;
            let result = repl::run(stack.agent.clone()).await;
            stack.pool.shutdown().await;
            result
        }
        Commands::Gateway { addr } => gateway::serve(addr).await,
        Commands::Cron { action } => cmd_cron(action).await,
        Commands::Config { action } => cmd_config(action).await,
        Commands::Channel { which } => cmd_channel(which).await,
    }
}
