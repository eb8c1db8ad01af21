//! Closed classifiers attached to every task: type, priority and repetition.
//!
//! Each variant has a stable on-disk name (`TEST`, `NOT_USED`, ...) which is
//! what the codec writes and what the command surface accepts. Parsing is
//! case-insensitive on that name and rejects anything else.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Test,
    Homework,
    Meeting,
    Training,
    #[default]
    Work,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Test,
        TaskType::Homework,
        TaskType::Meeting,
        TaskType::Training,
        TaskType::Work,
    ];

    /// On-disk variant name
    pub fn name(self) -> &'static str {
        match self {
            TaskType::Test => "TEST",
            TaskType::Homework => "HOMEWORK",
            TaskType::Meeting => "MEETING",
            TaskType::Training => "TRAINING",
            TaskType::Work => "WORK",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Test => "Test",
            TaskType::Homework => "Homework",
            TaskType::Meeting => "Meeting",
            TaskType::Training => "Training",
            TaskType::Work => "Work",
        }
    }

    /// Presentation color tag
    pub fn color(self) -> &'static str {
        match self {
            TaskType::Test => "#FF6B6B",
            TaskType::Homework => "#4ECDC4",
            TaskType::Meeting => "#DDE66D",
            TaskType::Training => "#95E1D3",
            TaskType::Work => "#A8E6CF",
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant("task type", &Self::ALL, TaskType::name, s)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Task priority. Ordering follows [`Priority::rank`], not declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    NotUsed,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::NotUsed,
    ];

    /// Sort rank; lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::NotUsed => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::NotUsed => "NOT_USED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::NotUsed => "Not Used",
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant("priority", &Self::ALL, Priority::name, s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Repetition {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repetition {
    pub const ALL: [Repetition; 5] = [
        Repetition::None,
        Repetition::Daily,
        Repetition::Weekly,
        Repetition::Monthly,
        Repetition::Yearly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Repetition::None => "NONE",
            Repetition::Daily => "DAILY",
            Repetition::Weekly => "WEEKLY",
            Repetition::Monthly => "MONTHLY",
            Repetition::Yearly => "YEARLY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Repetition::None => "None",
            Repetition::Daily => "Daily",
            Repetition::Weekly => "Weekly",
            Repetition::Monthly => "Monthly",
            Repetition::Yearly => "Yearly",
        }
    }
}

impl FromStr for Repetition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant("repetition", &Self::ALL, Repetition::name, s)
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_variant<T: Copy>(
    kind: &'static str,
    all: &[T],
    name: fn(T) -> &'static str,
    value: &str,
) -> Result<T> {
    let trimmed = value.trim();
    all.iter()
        .copied()
        .find(|variant| name(*variant).eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| Error::InvalidVariant {
            kind,
            value: value.to_string(),
            expected: all
                .iter()
                .map(|variant| name(*variant))
                .collect::<Vec<_>>()
                .join("|"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_defines_order() {
        let mut all = vec![
            Priority::NotUsed,
            Priority::Low,
            Priority::High,
            Priority::Medium,
        ];
        all.sort();
        assert_eq!(all, Priority::ALL.to_vec());
        assert!(Priority::High < Priority::NotUsed);
    }

    #[test]
    fn parse_accepts_names_case_insensitively() {
        assert_eq!("TEST".parse::<TaskType>().unwrap(), TaskType::Test);
        assert_eq!("homework".parse::<TaskType>().unwrap(), TaskType::Homework);
        assert_eq!("not_used".parse::<Priority>().unwrap(), Priority::NotUsed);
        assert_eq!(" WEEKLY ".parse::<Repetition>().unwrap(), Repetition::Weekly);
    }

    #[test]
    fn parse_rejects_unknown_literal() {
        let err = "URGENT".parse::<Priority>().expect_err("unknown priority");
        match err {
            Error::InvalidVariant { kind, value, expected } => {
                assert_eq!(kind, "priority");
                assert_eq!(value, "URGENT");
                assert_eq!(expected, "HIGH|MEDIUM|LOW|NOT_USED");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Labels are not variant names.
        assert!("Not Used".parse::<Priority>().is_err());
        assert!("".parse::<TaskType>().is_err());
    }

    #[test]
    fn defaults_match_decode_fallbacks() {
        assert_eq!(TaskType::default(), TaskType::Work);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Repetition::default(), Repetition::None);
    }

    #[test]
    fn task_type_presentation() {
        assert_eq!(TaskType::Test.label(), "Test");
        assert_eq!(TaskType::Test.color(), "#FF6B6B");
        assert_eq!(TaskType::Meeting.color(), "#DDE66D");
        assert_eq!(TaskType::Work.to_string(), "WORK");
    }
}
