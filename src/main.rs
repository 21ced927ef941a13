use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tasktracker::{Config, Error, Priority, Repeat, SortKey, Status, Task, TaskStore};

#[derive(Parser)]
#[command(name = "tasktracker")]
#[command(about = "Personal task tracker with SQLite storage and single-slot undo")]
#[command(version)]
struct Cli {
    /// Path to the task database (default: per-user data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        title: String,

        /// Due date, free-form (e.g. 2025-02-20)
        #[arg(long)]
        due: Option<String>,

        /// Task priority: low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Recurrence label: daily, weekly or monthly
        #[arg(long)]
        repeat: Option<Repeat>,
    },

    /// Replace the title of a task
    Update { id: i64, title: String },

    /// Delete a task
    Delete { id: i64 },

    /// List all tasks
    List {
        /// Sort ascending by priority or due_date
        #[arg(long)]
        sort: Option<SortKey>,

        /// Print tasks as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Set a task's status: todo, in_progress or done
    Mark { id: i64, status: Status },

    /// Case-insensitive substring search over titles
    Search { keyword: String },

    /// Restore the state before the most recent write
    Undo,

    /// Export all tasks to a CSV file
    Export {
        #[arg(long, default_value = "tasks.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match cli.store_path {
        Some(path) => Config::new(path),
        None => Config::default_location()
            .ok_or_else(|| eyre::eyre!("no data directory available; pass --store-path"))?,
    };
    let mut store = TaskStore::open(config)?;

    match cli.command {
        Commands::Add {
            title,
            due,
            priority,
            repeat,
        } => {
            let task = store.add(&title, due.as_deref(), priority, repeat)?;
            println!(
                "Task added: {} (Priority: {}, Due: {}, Repeats: {})",
                task.title,
                task.priority,
                task.due_date.as_deref().unwrap_or("-"),
                task.repeat.map(Repeat::as_str).unwrap_or("-"),
            );
        }
        Commands::Update { id, title } => match store.update(id, &title) {
            Ok(()) => println!("Task {} updated.", id),
            Err(Error::NotFound(_)) => println!("Task not found."),
            Err(e) => return Err(e.into()),
        },
        Commands::Delete { id } => {
            store.delete(id)?;
            println!("Task deleted.");
        }
        Commands::List { sort, json } => {
            let tasks = store.list(sort)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", render(task));
                }
            }
        }
        Commands::Mark { id, status } => match store.mark(id, status) {
            Ok(task) => println!("Task {} marked as {}.", task.id, task.status),
            Err(Error::NotFound(_)) => println!("Task not found."),
            Err(e) => return Err(e.into()),
        },
        Commands::Search { keyword } => {
            let results = store.search(&keyword)?;
            if results.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &results {
                    println!("{}", render(task));
                }
            }
        }
        Commands::Undo => {
            if store.undo()? {
                println!("Undo successful!");
            } else {
                println!("No previous action to undo.");
            }
        }
        Commands::Export { output } => {
            let count = store.export_csv(&output)?;
            println!("Exported {} tasks to {}", count, output.display());
        }
    }

    Ok(())
}

fn render(task: &Task) -> String {
    let status = match task.status {
        Status::Todo => task.status.as_str().yellow(),
        Status::InProgress => task.status.as_str().blue(),
        Status::Done => task.status.as_str().green(),
    };
    let priority = match task.priority {
        Priority::Low => task.priority.as_str().dimmed(),
        Priority::Medium => task.priority.as_str().normal(),
        Priority::High => task.priority.as_str().red().bold(),
    };

    let mut line = format!("[{}] {} - {} ({})", task.id, task.title, status, priority);
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    if let Some(repeat) = task.repeat {
        line.push_str(&format!(" repeats {}", repeat));
    }
    line
}
