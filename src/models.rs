// Data models for the task tracker

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One trackable to-do item, one row in the tasks table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub status: Status,
    pub due_date: Option<String>,
    pub priority: Priority,
    pub repeat: Option<Repeat>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "todo" => Ok(Status::Todo),
            "in_progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(Error::Validation(format!("unknown status: {}", other))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::Validation(format!("unknown priority: {}", other))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory recurrence label. Stored and exported, never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
}

impl Repeat {
    pub fn as_str(self) -> &'static str {
        match self {
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
        }
    }
}

impl FromStr for Repeat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            other => Err(Error::Validation(format!("unknown repeat: {}", other))),
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current local time formatted for the completed_at column.
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Todo).unwrap(), "\"todo\"");
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["todo", "in_progress", "done"] {
            let status: Status = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("doing".parse::<Status>().is_err());
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_round_trip() {
        for p in ["low", "medium", "high"] {
            let priority: Priority = p.parse().unwrap();
            assert_eq!(priority.as_str(), p);
        }
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_repeat_round_trip() {
        for r in ["daily", "weekly", "monthly"] {
            let repeat: Repeat = r.parse().unwrap();
            assert_eq!(repeat.as_str(), r);
        }
        assert!("yearly".parse::<Repeat>().is_err());
    }

    #[test]
    fn test_task_serialization() {
        let task = Task {
            id: 1,
            title: "Buy milk".to_string(),
            status: Status::Todo,
            due_date: Some("2025-02-20".to_string()),
            priority: Priority::High,
            repeat: Some(Repeat::Weekly),
            completed_at: None,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"status\":\"todo\""));
        assert!(json.contains("\"priority\":\"high\""));
        assert!(json.contains("\"repeat\":\"weekly\""));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, task);
    }

    #[test]
    fn test_now_stamp_format() {
        let stamp = now_stamp();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }
}
