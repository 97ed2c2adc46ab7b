#![forbid(unsafe_code)]

use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory as _, Parser, Subcommand};

use crate::api::mock::MockTaskApi;
use crate::config;
use crate::error::TaskdeckError;
use crate::output::table::Table;
use crate::store::TaskStore;
use crate::store::persist::SnapshotStorage;
use crate::store::view;
use crate::task::model::{Priority, StatusFilter, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::tui;

#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Terminal task manager")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Add(AddArgs),
    List(ListArgs),
    Show(ShowArgs),
    Edit(EditArgs),
    #[command(alias = "toggle")]
    Done(DoneArgs),
    #[command(alias = "rm")]
    Remove(RemoveArgs),
    Clear,
    Filter(FilterArgs),
    Search(SearchArgs),
    Stats(StatsArgs),
    Fetch,
    Reset(ResetArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
    /// Priority: low, medium, high
    #[arg(short = 'p', long = "priority", default_value = "medium")]
    pub priority: String,
    /// Initial status: pending, in-progress, completed
    #[arg(short = 's', long = "status", default_value = "pending")]
    pub status: String,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Status filter (all, pending, in-progress, completed); defaults to the stored filter
    #[arg(short = 'f', long = "filter")]
    pub filter: Option<String>,
    /// Substring search over title and description; defaults to the stored query
    #[arg(short = 'q', long = "search")]
    pub search: Option<String>,
    /// Show description and update timestamps
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Task id (unique prefix accepted)
    pub id: String,
}

#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Task id (unique prefix accepted)
    pub id: String,
    /// New title
    #[arg(long = "title")]
    pub title: Option<String>,
    /// New description
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,
    /// New priority: low, medium, high
    #[arg(short = 'p', long = "priority")]
    pub priority: Option<String>,
    /// New status: pending, in-progress, completed
    #[arg(short = 's', long = "status")]
    pub status: Option<String>,
}

#[derive(Debug, Parser)]
pub struct DoneArgs {
    /// Task id (unique prefix accepted)
    pub id: String,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Task id (unique prefix accepted)
    pub id: String,
}

#[derive(Debug, Parser)]
pub struct FilterArgs {
    /// New status filter; prints the current one when omitted
    pub value: Option<String>,
}

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// New search query; prints the current one when omitted. Pass "" to clear.
    pub query: Option<String>,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ResetArgs {
    /// Required: discard all tasks and criteria
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Print the resolved configuration
    List,
    /// Print one configuration value
    Get(ConfigGetArgs),
    /// Set one configuration value
    Set(ConfigSetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_default().await,
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "taskdeck", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => match args.cmd {
            ConfigCmd::List => {
                print!("{}", config::list_resolved_toml()?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Set(set) => {
                config::set_value_string(&set.key, &set.value)?;
                println!("Set {} = {}", set.key, set.value);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Get(get) => {
                let val = config::get_value_string(&get.key)?;
                match val {
                    Some(v) => {
                        println!("{v}");
                        Ok(ExitCode::SUCCESS)
                    }
                    None => anyhow::bail!(
                        "configuration key '{}' not set - use 'taskdeck config list' to see resolved values",
                        get.key
                    ),
                }
            }
        },
        Some(Commands::Add(args)) => cmd_add(args).await,
        Some(Commands::List(args)) => cmd_list(args).await,
        Some(Commands::Show(args)) => cmd_show(args).await,
        Some(Commands::Edit(args)) => cmd_edit(args).await,
        Some(Commands::Done(args)) => cmd_done(args).await,
        Some(Commands::Remove(args)) => cmd_remove(args).await,
        Some(Commands::Clear) => cmd_clear().await,
        Some(Commands::Filter(args)) => cmd_filter(args).await,
        Some(Commands::Search(args)) => cmd_search(args).await,
        Some(Commands::Stats(args)) => cmd_stats(args).await,
        Some(Commands::Fetch) => cmd_fetch().await,
        Some(Commands::Reset(args)) => cmd_reset(args).await,
        Some(Commands::Version) => Ok(cmd_version()),
    }
}

async fn load_cfg() -> anyhow::Result<config::Config> {
    let cfg = tokio::task::spawn_blocking(|| -> anyhow::Result<config::Config> {
        let (cfg, _doc, _paths) = config::load()?;
        Ok(cfg)
    })
    .await??;
    Ok(cfg)
}

fn open_store(cfg: &config::Config) -> anyhow::Result<TaskStore> {
    if !cfg.storage.enabled {
        return Ok(TaskStore::new());
    }
    let dir = config::expand_path(&cfg.storage.dir)?;
    Ok(TaskStore::with_storage(SnapshotStorage::new(
        dir,
        &cfg.storage.file,
    )))
}

fn make_source(cfg: &config::Config) -> MockTaskApi {
    let delay = Duration::from_millis(cfg.fetch.delay_ms);
    if cfg.fetch.fail {
        MockTaskApi::failing(delay, cfg.fetch.failure_message.clone())
    } else {
        MockTaskApi::new(delay)
    }
}

/// Match a user-supplied id: exact first, then unique prefix.
fn resolve_task_id(store: &TaskStore, pattern: &str) -> Result<String, TaskdeckError> {
    if store.task(pattern).is_some() {
        return Ok(pattern.to_owned());
    }
    let matches: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(pattern))
        .collect();
    match matches.as_slice() {
        [] => Err(TaskdeckError::TaskNotFound(pattern.to_owned())),
        [one] => Ok(one.id.clone()),
        _ => Err(TaskdeckError::AmbiguousTask(pattern.to_owned())),
    }
}

fn parse_status(s: &str) -> anyhow::Result<TaskStatus> {
    match s.trim().to_lowercase().as_str() {
        "pending" | "todo" => Ok(TaskStatus::Pending),
        "in-progress" | "in progress" | "inprogress" | "active" => Ok(TaskStatus::InProgress),
        "completed" | "done" => Ok(TaskStatus::Completed),
        other => anyhow::bail!("unknown status '{other}' (expected pending|in-progress|completed)"),
    }
}

fn parse_priority(s: &str) -> anyhow::Result<Priority> {
    match s.trim().to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" | "med" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => anyhow::bail!("unknown priority '{other}' (expected low|medium|high)"),
    }
}

async fn cmd_default() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;

    if tui::is_tty() {
        tui::app::run(cfg).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Non-TTY fallback: print the current filtered list.
    let args = ListArgs {
        filter: None,
        search: None,
        verbose: false,
        json: false,
        csv: false,
    };
    cmd_list_with(&cfg, args)
}

async fn cmd_add(args: AddArgs) -> anyhow::Result<ExitCode> {
    let title = args.title.trim().to_owned();
    if title.is_empty() {
        anyhow::bail!("task title must not be empty");
    }

    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let id = store.add_task(TaskDraft {
        title,
        description: args.description,
        status: parse_status(&args.status)?,
        priority: parse_priority(&args.priority)?,
    });
    println!("Added task {id}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    cmd_list_with(&cfg, args)
}

fn cmd_list_with(cfg: &config::Config, args: ListArgs) -> anyhow::Result<ExitCode> {
    let store = open_store(cfg)?;

    // Flags are one-off view overrides; they do not touch the stored criteria.
    let filter = args
        .filter
        .as_deref()
        .map_or_else(|| store.filter(), StatusFilter::parse);
    let query = args
        .search
        .unwrap_or_else(|| store.search_query().to_owned());
    let tasks = view::filtered_tasks(store.tasks(), filter, &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(ExitCode::SUCCESS);
    }

    let table = task_table(&tasks, args.verbose, cfg.ui.icons);
    if args.csv {
        table.write_csv(std::io::stdout().lock())?;
        return Ok(ExitCode::SUCCESS);
    }

    if table.is_empty() {
        println!("No tasks match.");
        return Ok(ExitCode::SUCCESS);
    }
    table.print()?;
    Ok(ExitCode::SUCCESS)
}

fn task_table(tasks: &[&Task], verbose: bool, icons: bool) -> Table {
    let mut table = if verbose {
        Table::new(["ID", "TITLE", "STATUS", "PRIORITY", "CREATED", "UPDATED", "DESCRIPTION"])
    } else {
        Table::new(["ID", "TITLE", "STATUS", "PRIORITY", "CREATED"])
    };

    for t in tasks {
        let marker = if icons && t.status == TaskStatus::Completed {
            "✓ "
        } else {
            "  "
        };
        let title = format!("{marker}{}", t.title);
        let created = short_timestamp(&t.created_at);
        if verbose {
            table.row([
                t.id.clone(),
                title,
                t.status.label().to_owned(),
                t.priority.label().to_owned(),
                created,
                t.updated_at.as_deref().map(short_timestamp).unwrap_or_else(|| "-".to_owned()),
                t.description.clone(),
            ]);
        } else {
            table.row([
                t.id.clone(),
                title,
                t.status.label().to_owned(),
                t.priority.label().to_owned(),
                created,
            ]);
        }
    }
    table
}

/// Trim an RFC 3339 stamp to minute precision for table display.
fn short_timestamp(ts: &str) -> String {
    ts.chars().take(16).collect::<String>().replacen('T', " ", 1)
}

async fn cmd_show(args: ShowArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = open_store(&cfg)?;
    let id = resolve_task_id(&store, &args.id)?;
    let Some(task) = store.task(&id) else {
        return Err(TaskdeckError::TaskNotFound(id).into());
    };

    println!("Id:          {}", task.id);
    println!("Title:       {}", task.title);
    if !task.description.is_empty() {
        println!("Description: {}", task.description);
    }
    println!("Status:      {}", task.status.label());
    println!("Priority:    {}", task.priority.label());
    println!("Created:     {}", task.created_at);
    if let Some(updated) = &task.updated_at {
        println!("Updated:     {updated}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_edit(args: EditArgs) -> anyhow::Result<ExitCode> {
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
    };
    if patch.is_empty() {
        anyhow::bail!("nothing to change - pass at least one of --title, --description, --status, --priority");
    }
    if let Some(title) = &patch.title
        && title.trim().is_empty()
    {
        anyhow::bail!("task title must not be empty");
    }

    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let id = resolve_task_id(&store, &args.id)?;
    store.update_task(&id, patch);
    println!("Updated task {id}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_done(args: DoneArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let id = resolve_task_id(&store, &args.id)?;
    store.toggle_task_status(&id);
    let status = store.task(&id).map(|t| t.status.label()).unwrap_or("?");
    println!("Task {id} is now {status}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_remove(args: RemoveArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let id = resolve_task_id(&store, &args.id)?;
    store.delete_task(&id);
    println!("Removed task {id}");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_clear() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let removed = store.clear_completed();
    println!("Cleared {removed} completed task(s)");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_filter(args: FilterArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    match args.value {
        Some(value) => {
            let filter = StatusFilter::parse(&value);
            store.set_filter(filter);
            println!("Filter set to {}", filter.label());
        }
        None => println!("{}", store.filter().label()),
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_search(args: SearchArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    match args.query {
        Some(query) => {
            store.set_search_query(query.clone());
            if query.is_empty() {
                println!("Search cleared");
            } else {
                println!("Searching for '{query}'");
            }
        }
        None => println!("{}", store.search_query()),
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_stats(args: StatsArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = open_store(&cfg)?;
    let stats = store.stats();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Total:       {}", stats.total);
    println!(
        "Completed:   {} ({}%)",
        stats.completed,
        stats.completion_percent()
    );
    println!("Pending:     {}", stats.pending);
    println!("In progress: {}", stats.in_progress);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_fetch() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let source = make_source(&cfg);

    store.fetch_tasks(&source).await;
    if let Some(error) = store.error() {
        return Err(TaskdeckError::Fetch(error.to_owned()).into());
    }
    println!("Fetched {} task(s)", store.tasks().len());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_reset(args: ResetArgs) -> anyhow::Result<ExitCode> {
    if !args.force {
        anyhow::bail!("reset discards every task - pass --force to confirm");
    }
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    store.reset();
    println!("Store reset");
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    println!("taskdeck version {}", env!("CARGO_PKG_VERSION"));
    if let Some(commit) = option_env!("TASKDECK_GIT_COMMIT") {
        println!("  commit: {commit}");
    }
    if let Some(date) = option_env!("TASKDECK_BUILD_DATE") {
        println!("  built:  {date}");
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::persist::Snapshot;

    fn store_with_ids(dir: &std::path::Path, ids: &[&str]) -> TaskStore {
        let storage = SnapshotStorage::new(dir.to_path_buf(), "taskdeck.json");
        let snapshot = Snapshot {
            tasks: ids
                .iter()
                .map(|id| Task {
                    id: (*id).to_owned(),
                    title: format!("task {id}"),
                    description: String::new(),
                    status: TaskStatus::Pending,
                    priority: Priority::Medium,
                    created_at: crate::task::model::now_rfc3339(),
                    updated_at: None,
                })
                .collect(),
            ..Snapshot::default()
        };
        storage.save(&snapshot).expect("seed snapshot");
        TaskStore::with_storage(storage)
    }

    #[test]
    fn resolve_matches_exact_then_unique_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with_ids(dir.path(), &["ab12cd34", "ab99ff00", "ee00aa11"]);

        assert_eq!(resolve_task_id(&store, "ab12cd34").unwrap(), "ab12cd34");
        assert_eq!(resolve_task_id(&store, "ee").unwrap(), "ee00aa11");

        assert!(matches!(
            resolve_task_id(&store, "ab"),
            Err(TaskdeckError::AmbiguousTask(_))
        ));
        assert!(matches!(
            resolve_task_id(&store, "zz"),
            Err(TaskdeckError::TaskNotFound(_))
        ));
    }

    #[test]
    fn status_and_priority_parsing() {
        assert_eq!(parse_status("in-progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(parse_status("DONE").unwrap(), TaskStatus::Completed);
        assert!(parse_status("later").is_err());

        assert_eq!(parse_priority("high").unwrap(), Priority::High);
        assert!(parse_priority("urgent").is_err());
    }

    #[test]
    fn short_timestamp_trims_to_minutes() {
        assert_eq!(short_timestamp("2026-08-07T12:34:56Z"), "2026-08-07 12:34");
    }
}
