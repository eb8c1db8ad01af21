use chrono::NaiveDate;
use prowork::classify::{Priority, Repetition, TaskType};
use prowork::codec::{decode, decode_report, encode, SkipReason};
use prowork::task::Task;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn encoded_file_decodes_to_equal_tasks() {
    let mut exam = Task::new(
        "Final exam: \"Algorithms\"",
        date(2024, 6, 12),
        TaskType::Test,
        Priority::High,
        Repetition::None,
    );
    exam.set_notes("C:\\notes\\algo.txt\n\tsection 2");
    exam.set_completed(true);

    let gym = Task::new(
        "Gym",
        date(2024, 6, 13),
        TaskType::Training,
        Priority::NotUsed,
        Repetition::Weekly,
    );

    let tasks = vec![exam, gym];
    let text = encode(&tasks);
    assert!(text.starts_with("[\n  {\"id\":"));
    assert_eq!(decode(&text), tasks);
}

#[test]
fn keys_are_written_in_canonical_order() {
    let task = Task::new(
        "Order",
        date(2024, 1, 1),
        TaskType::Work,
        Priority::Low,
        Repetition::Monthly,
    );
    let text = encode(&[task]);
    let keys = [
        "\"id\"",
        "\"name\"",
        "\"deadline\"",
        "\"type\"",
        "\"priority\"",
        "\"repetition\"",
        "\"notes\"",
        "\"completed\"",
        "\"completedAt\"",
    ];
    let positions: Vec<_> = keys
        .iter()
        .map(|key| text.find(key).expect("key present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(text.contains("\"completedAt\":null"));
}

#[test]
fn one_bad_record_does_not_spoil_the_rest() {
    let text = r#"[
  {"id":"1","name":"first","deadline":"2024-02-01","priority":"LOW"},
  {"id":"2","name":"broken","deadline":"2024-02-30"},
  {"id":"3","name":"third","deadline":"2024-02-03"}
]"#;

    let report = decode_report(text);
    let names: Vec<_> = report.tasks.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["first", "third"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::InvalidDeadline("2024-02-30".to_string())
    );
    assert_eq!(report.tasks[0].priority(), Priority::Low);
    assert_eq!(report.tasks[1].priority(), Priority::Medium);
    assert_eq!(report.tasks[1].task_type(), TaskType::Work);
    assert_eq!(report.tasks[1].repetition(), Repetition::None);
}
