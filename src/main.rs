use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tasklist::{DEFAULT_STORAGE_KEY, FileStorage, StatusFilter, TaskStore};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "TaskList CLI - manage a to-do list persisted to disk")]
#[command(version)]
struct Cli {
    /// Path to the storage directory (default: platform data dir)
    #[arg(short, long)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },

    /// List tasks
    List {
        /// Show only tasks with this status (all, pending, completed)
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Emit the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle a task's completion flag
    Toggle {
        /// Task id
        id: String,
    },

    /// Remove a task
    Rm {
        /// Task id
        id: String,
    },

    /// Remove all completed tasks
    Clear,

    /// Show completion counts
    Stats,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let store_dir = cli.store_dir.unwrap_or_else(default_store_dir);
    let storage = FileStorage::open(&store_dir)?;
    let mut store = TaskStore::new(Box::new(storage), DEFAULT_STORAGE_KEY);
    store.load();

    match cli.command {
        Commands::Add { text } => match store.add_task(&text) {
            Some(task) => println!("Added {} {}", task.id.dimmed(), task.text),
            None => eprintln!("{}", "Task text cannot be empty".red()),
        },
        Commands::List { status, json } => {
            let tasks: Vec<_> = store.tasks().iter().filter(|t| status.matches(t)).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks");
            } else {
                for task in tasks {
                    let mark = if task.completed {
                        "[x]".green()
                    } else {
                        "[ ]".normal()
                    };
                    println!("{} {} {}", mark, task.id.dimmed(), task.text);
                }
            }
        }
        Commands::Toggle { id } => match store.toggle_complete(&id) {
            Some(task) => {
                let state = if task.completed {
                    "completed".green()
                } else {
                    "pending".yellow()
                };
                println!("{} is now {}", task.text, state);
            }
            None => eprintln!("{}", format!("No task with id {}", id).red()),
        },
        Commands::Rm { id } => {
            if store.delete_task(&id) {
                println!("Removed {}", id);
            } else {
                eprintln!("{}", format!("No task with id {}", id).red());
            }
        }
        Commands::Clear => {
            let removed = store.clear_completed();
            println!("Removed {} completed task(s)", removed);
        }
        Commands::Stats => {
            let counts = store.counts();
            println!(
                "total: {}  pending: {}  completed: {}",
                counts.total,
                counts.pending.to_string().yellow(),
                counts.completed.to_string().green()
            );
        }
    }

    Ok(())
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tasklist"))
        .unwrap_or_else(|| PathBuf::from(".tasklist"))
}
