//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one list operation. Bulk clears ask for
//! confirmation on the terminal unless `--yes` is given.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::db::print_table;
use crate::fields::Category;
use crate::seed::{seed_if_empty, SeedSource};
use crate::todos::TodoList;
use crate::tui::app::SeedPlan;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive screen (default).
    Ui,

    /// Add a new task.
    Add {
        /// Task text. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Category: home | work | other.
        #[arg(long, short, value_enum, default_value_t = Category::Other)]
        category: Category,
    },

    /// List all tasks.
    List,

    /// Flip a task between open and completed.
    Toggle {
        /// Task ID.
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: String,
    },

    /// Remove every completed task.
    ClearCompleted {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Remove every task.
    ClearAll {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Fetch starter tasks now if the list is empty.
    Seed,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(todos: TodoList, seed: Option<SeedPlan>) -> Result<()> {
    run_tui(todos, seed).context("UI error")
}

/// Add a new task.
pub fn cmd_add(todos: &mut TodoList, text: &[String], category: Category) -> Result<()> {
    let task = todos.add(&text.join(" "), category)?;
    println!("Added task {} [{}]", task.id, task.category.label());
    Ok(())
}

/// Print the task table.
pub fn cmd_list(todos: &TodoList) {
    if todos.is_empty() {
        println!("No tasks.");
        return;
    }
    print_table(todos.tasks());
}

/// Toggle completion of a task.
pub fn cmd_toggle(todos: &mut TodoList, id: &str) -> Result<()> {
    match todos.toggle(id)? {
        Some(true) => println!("Completed task {id}"),
        Some(false) => println!("Reopened task {id}"),
        None => bail!("Task {id} not found"),
    }
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(todos: &mut TodoList, id: &str) -> Result<()> {
    if !todos.delete(id)? {
        bail!("Task {id} not found");
    }
    println!("Deleted task {id}");
    Ok(())
}

/// Remove completed tasks after confirmation.
pub fn cmd_clear_completed(todos: &mut TodoList, yes: bool) -> Result<()> {
    if !yes && !confirm("Remove all completed tasks?")? {
        println!("Cancelled.");
        return Ok(());
    }
    let removed = todos.clear_completed()?;
    println!("Removed {removed} completed task(s)");
    Ok(())
}

/// Remove every task after confirmation.
pub fn cmd_clear_all(todos: &mut TodoList, yes: bool) -> Result<()> {
    if !yes && !confirm("Remove all tasks?")? {
        println!("Cancelled.");
        return Ok(());
    }
    let removed = todos.clear_all()?;
    println!("Removed {removed} task(s)");
    Ok(())
}

/// Run the seed loader against an empty list.
pub fn cmd_seed(todos: &mut TodoList, source: &dyn SeedSource, count: u32) -> Result<()> {
    if !todos.is_empty() {
        println!("List already has {} task(s); nothing to seed.", todos.len());
        return Ok(());
    }
    let added = seed_if_empty(todos, source, count)?;
    println!("Seeded {} task(s)", added.len());
    Ok(())
}

/// Write a completion script for `shell` to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_with(stdin.lock(), io::stderr(), question).context("failed to read confirmation")
}

/// Ask `question` and read a yes/no answer. Anything but y/yes is "no".
fn confirm_with(mut input: impl BufRead, mut output: impl Write, question: &str) -> io::Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TaskRepository;
    use crate::error::TodoError;
    use crate::seed::RemoteTodo;
    use crate::storage::MemoryStore;

    fn list() -> TodoList {
        TodoList::new(TaskRepository::new(Box::new(MemoryStore::new())))
    }

    #[test]
    fn test_confirm_with_answers() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false), ("", false)] {
            let mut out = Vec::new();
            let got = confirm_with(answer.as_bytes(), &mut out, "Remove?").unwrap();
            assert_eq!(got, expected, "answer {answer:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Remove? [y/N] ");
        }
    }

    #[test]
    fn test_add_joins_words() {
        let mut todos = list();
        cmd_add(&mut todos, &["buy".into(), "milk".into()], Category::Home).unwrap();
        assert_eq!(todos.tasks()[0].text, "buy milk");
        assert!(cmd_add(&mut todos, &["  ".into()], Category::Home).is_err());
        assert_eq!(todos.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_error() {
        let mut todos = list();
        let err = cmd_toggle(&mut todos, "9").unwrap_err();
        assert_eq!(err.to_string(), "Task 9 not found");
        assert!(cmd_delete(&mut todos, "9").is_err());
    }

    #[test]
    fn test_clear_with_yes_skips_prompt() {
        let mut todos = list();
        cmd_add(&mut todos, &["a".into()], Category::Other).unwrap();
        cmd_add(&mut todos, &["b".into()], Category::Other).unwrap();
        cmd_toggle(&mut todos, "1").unwrap();
        cmd_clear_completed(&mut todos, true).unwrap();
        assert_eq!(todos.len(), 1);
        cmd_clear_all(&mut todos, true).unwrap();
        assert!(todos.is_empty());
    }

    struct OneTitle;

    impl SeedSource for OneTitle {
        fn fetch(&self, n: u32) -> Result<RemoteTodo, TodoError> {
            Ok(RemoteTodo {
                title: format!("starter {n}"),
            })
        }
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut todos = list();
        cmd_seed(&mut todos, &OneTitle, 3).unwrap();
        assert_eq!(todos.len(), 3);
        cmd_seed(&mut todos, &OneTitle, 3).unwrap();
        assert_eq!(todos.len(), 3);
    }
}
