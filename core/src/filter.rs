//! Pure views over the collection: filtering and the derived flags.

use crate::types::{FilterMode, Todo};

/// Todos visible under `mode`, in their original relative order.
pub fn filter_todos(todos: &[Todo], mode: FilterMode) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|todo| match mode {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        })
        .collect()
}

/// True when there is at least one todo and every todo is completed.
/// An empty list is never "all completed".
pub fn all_completed(todos: &[Todo]) -> bool {
    !todos.is_empty() && todos.iter().all(|todo| todo.completed)
}

pub fn active_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

pub fn has_completed(todos: &[Todo]) -> bool {
    todos.iter().any(|todo| todo.completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: u64, completed: bool) -> Todo {
        Todo {
            id,
            user_id: 1,
            title: format!("todo {id}"),
            completed,
        }
    }

    #[test]
    fn active_keeps_incomplete_in_order() {
        let todos = vec![todo(1, true), todo(2, false), todo(3, true), todo(4, false)];
        let ids: Vec<u64> = filter_todos(&todos, FilterMode::Active).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn completed_keeps_done_items() {
        let todos = vec![todo(1, true), todo(2, false)];
        let visible = filter_todos(&todos, FilterMode::Completed);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);
    }

    #[test]
    fn all_returns_everything() {
        let todos = vec![todo(1, true), todo(2, false)];
        assert_eq!(filter_todos(&todos, FilterMode::All).len(), 2);
    }

    #[test]
    fn filtering_does_not_touch_the_source() {
        let todos = vec![todo(1, true), todo(2, false)];
        let before = todos.clone();
        let _ = filter_todos(&todos, FilterMode::Active);
        assert_eq!(todos, before);
    }

    #[test]
    fn empty_list_is_not_all_completed() {
        assert!(!all_completed(&[]));
        assert!(all_completed(&[todo(1, true)]));
        assert!(!all_completed(&[todo(1, true), todo(2, false)]));
    }

    #[test]
    fn counts() {
        let todos = vec![todo(1, true), todo(2, false), todo(3, false)];
        assert_eq!(active_count(&todos), 2);
        assert!(has_completed(&todos));
        assert!(!has_completed(&todos[1..]));
    }
}
