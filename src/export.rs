// CSV export of the task sequence

use crate::error::Result;
use crate::models::Task;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const HEADER: &str = "ID,Title,Status,Due Date,Priority,Repeats";

/// Write all tasks to a UTF-8 CSV file, one row per task in the order
/// given. Missing optional fields render as empty strings.
pub fn write_csv(path: &Path, tasks: &[Task]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", HEADER)?;
    for task in tasks {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            task.id,
            escape(&task.title),
            task.status,
            escape(task.due_date.as_deref().unwrap_or("")),
            task.priority,
            task.repeat.map(|r| r.as_str()).unwrap_or(""),
        )?;
    }
    writer.flush()?;

    info!(path = ?path, count = tasks.len(), "Exported tasks to CSV");
    Ok(())
}

/// Quote a field if it contains a comma, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Repeat, Status};
    use std::fs;
    use tempfile::TempDir;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            status: Status::Todo,
            due_date: None,
            priority: Priority::Medium,
            repeat: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_header_and_one_row_per_task() {
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("tasks.csv");

        let tasks = vec![
            Task {
                due_date: Some("2025-02-20".to_string()),
                priority: Priority::High,
                repeat: Some(Repeat::Weekly),
                ..task(1, "Buy milk")
            },
            task(2, "Walk dog"),
        ];

        write_csv(&csv_path, &tasks).unwrap();

        let content = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Title,Status,Due Date,Priority,Repeats");
        assert_eq!(lines[1], "1,Buy milk,todo,2025-02-20,high,weekly");
        assert_eq!(lines[2], "2,Walk dog,todo,,medium,");
    }

    #[test]
    fn test_empty_store_writes_header_only() {
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("tasks.csv");

        write_csv(&csv_path, &[]).unwrap();

        let content = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content, "ID,Title,Status,Due Date,Priority,Repeats\n");
    }

    #[test]
    fn test_title_with_comma_is_quoted() {
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("tasks.csv");

        write_csv(&csv_path, &[task(1, "Call Bob, then Alice")]).unwrap();

        let content = fs::read_to_string(&csv_path).unwrap();
        assert!(content.contains("\"Call Bob, then Alice\""));
    }

    #[test]
    fn test_escape_doubles_quotes() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
