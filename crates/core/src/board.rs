//! Derived kanban views: column counts, completion percentage, per-member
//! workload and the board's search filter.
//!
//! All functions here are pure; callers pass the task list of one project.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task, TaskStatus};

/// Bucket name for tasks without an assignee.
pub const UNASSIGNED_LABEL: &str = "(unassigned)";

/// Percentage rounded to the nearest integer, 0 when `total` is 0.
fn percent(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Board summary
// ---------------------------------------------------------------------------

/// Per-column counts and completion of one project's board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub todo: u32,
    pub doing: u32,
    pub done: u32,
    pub total: u32,
    /// `round(done / total * 100)`, 0 for an empty board.
    pub progress: u8,
}

impl BoardSummary {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut summary = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => summary.todo += 1,
                TaskStatus::Doing => summary.doing += 1,
                TaskStatus::Done => summary.done += 1,
            }
        }
        summary.total = summary.todo + summary.doing + summary.done;
        summary.progress = percent(summary.done, summary.total);
        summary
    }
}

// ---------------------------------------------------------------------------
// Member workload
// ---------------------------------------------------------------------------

/// One row of the "work by member" table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub name: String,
    pub todo: u32,
    pub doing: u32,
    pub done: u32,
    /// Tasks without an assignee. Only non-zero on the unassigned row.
    pub unassigned: u32,
    pub overdue: u32,
    /// Assigned tasks only; the unassigned row always has 0.
    pub total: u32,
    pub progress: u8,
}

/// Group tasks by assignee and count columns, unassigned and overdue work.
///
/// Rows are sorted by name.
pub fn member_workload(tasks: &[Task], now: NaiveDateTime) -> Vec<MemberStats> {
    let mut rows: BTreeMap<String, MemberStats> = BTreeMap::new();

    for task in tasks {
        let name = task
            .assignee
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNASSIGNED_LABEL);

        let row = rows.entry(name.to_string()).or_insert_with(|| MemberStats {
            name: name.to_string(),
            ..MemberStats::default()
        });

        match task.status {
            TaskStatus::Todo => row.todo += 1,
            TaskStatus::Doing => row.doing += 1,
            TaskStatus::Done => row.done += 1,
        }

        if name == UNASSIGNED_LABEL {
            row.unassigned += 1;
        } else {
            row.total += 1;
        }

        if task.is_overdue(now) {
            row.overdue += 1;
        }
    }

    rows.into_values()
        .map(|mut row| {
            row.progress = percent(row.done, row.total.max(1));
            row
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Board search: free-text query plus an optional exact priority.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default, rename = "q")]
    pub query: String,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Case-insensitive substring match on title or assignee, and equal
    /// priority when one is set.
    pub fn matches(&self, task: &Task) -> bool {
        let keyword = self.query.trim().to_lowercase();
        let query_ok = keyword.is_empty()
            || task.title.to_lowercase().contains(&keyword)
            || task
                .assignee
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&keyword));
        let priority_ok = self.priority.map_or(true, |p| task.priority == p);
        query_ok && priority_ok
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::task::NewTask;

    fn task(title: &str, assignee: Option<&str>, status: TaskStatus) -> Task {
        let mut t = Task::create(
            "P1",
            NewTask {
                assignee: assignee.map(String::from),
                ..NewTask::titled(title)
            },
            Utc::now(),
        )
        .unwrap();
        t.status = status;
        t
    }

    #[test]
    fn empty_board_has_zero_progress() {
        let summary = BoardSummary::from_tasks(&Vec::<Task>::new());
        assert_eq!(summary, BoardSummary::default());
    }

    #[test]
    fn summary_counts_columns_and_rounds_progress() {
        let tasks = vec![
            task("a", None, TaskStatus::Todo),
            task("b", None, TaskStatus::Doing),
            task("c", None, TaskStatus::Done),
        ];
        let summary = BoardSummary::from_tasks(&tasks);
        assert_eq!(summary.todo, 1);
        assert_eq!(summary.doing, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.progress, 33);
    }

    #[test]
    fn workload_buckets_unassigned_and_sorts_rows() {
        let now = Utc::now().naive_utc();
        let mut late = task("late", Some("mina"), TaskStatus::Doing);
        late.due = Some(now - Duration::days(2));

        let tasks = vec![
            task("x", Some("jun"), TaskStatus::Done),
            task("y", Some("jun"), TaskStatus::Todo),
            late,
            task("z", Some("  "), TaskStatus::Todo),
        ];

        let rows = member_workload(&tasks, now);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![UNASSIGNED_LABEL, "jun", "mina"]);

        let unassigned = &rows[0];
        assert_eq!(unassigned.unassigned, 1);
        assert_eq!(unassigned.total, 0);
        assert_eq!(unassigned.progress, 0);

        let jun = &rows[1];
        assert_eq!((jun.todo, jun.done, jun.total, jun.progress), (1, 1, 2, 50));

        let mina = &rows[2];
        assert_eq!(mina.overdue, 1);
    }

    #[test]
    fn filter_matches_title_or_assignee_case_insensitively() {
        let tasks = vec![
            task("Fix Login", None, TaskStatus::Todo),
            task("Docs", Some("Alice"), TaskStatus::Todo),
            task("Deploy", Some("bob"), TaskStatus::Todo),
        ];

        let filter = TaskFilter {
            query: "LOG".into(),
            priority: None,
        };
        assert_eq!(filter.apply(&tasks).len(), 1);

        let filter = TaskFilter {
            query: "alice".into(),
            priority: None,
        };
        assert_eq!(filter.apply(&tasks)[0].title, "Docs");
    }

    #[test]
    fn filter_by_priority() {
        let mut high = task("urgent", None, TaskStatus::Todo);
        high.priority = Priority::High;
        let tasks = vec![high, task("normal", None, TaskStatus::Todo)];

        let filter = TaskFilter {
            query: String::new(),
            priority: Some(Priority::High),
        };
        let matched = filter.apply(&tasks);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "urgent");
    }
}
