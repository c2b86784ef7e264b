mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use rusqlite::Connection;
use serde::Serialize;

use cli::{Cli, Command, StepCommand, TaskCommand, WorkspaceCommand};
use trellis::model::{Priority, StepFilter, TaskStatus, Workspace};
use trellis::output::{self, DoneChange, Deleted, StatusChange};
use trellis::{db, logging, ops, paths, tui};

fn open_db(db_path: &str) -> Result<Connection> {
    let conn = db::open(db_path)?;
    db::init(&conn)?;
    Ok(conn)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", output::to_json(value)?);
    Ok(())
}

/// Join positional words into one trimmed, non-empty string.
fn join_words(words: &[String], what: &str) -> Result<String> {
    let text = words.join(" ").trim().to_string();
    if text.is_empty() {
        bail!("{what} must not be empty");
    }
    Ok(text)
}

fn workspace_or_first(conn: &Connection, workspace: Option<&str>) -> Result<Workspace> {
    match workspace {
        Some(w) => ops::resolve_workspace(conn, w),
        None => ops::first_workspace(conn),
    }
}

fn main() {
    if let Err(e) = run() {
        log::error!("{e:#}");
        eprintln!("{}", serde_json::json!({ "error": format!("{e:#}") }));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;
    let db_path = paths::resolve_db_path(cli.db)?;
    paths::ensure_db_dir(&db_path)?;
    let conn = open_db(&db_path)?;
    log::info!("opened database {db_path}");

    match cli.command.unwrap_or(Command::Tree { workspace: None }) {
        Command::Tree { workspace } => {
            let ws = workspace_or_first(&conn, workspace.as_deref())?;
            tui::run(&conn, ws)?;
        }

        Command::Dump { workspace } => match workspace {
            Some(w) => {
                let ws = ops::resolve_workspace(&conn, &w)?;
                print_json(&output::dump_workspace(&conn, ws)?)?;
            }
            None => print_json(&output::dump_all(&conn)?)?,
        },

        Command::Workspace { action } => match action {
            WorkspaceCommand::List => print_json(&ops::list_workspaces(&conn)?)?,
            WorkspaceCommand::Add { name } => {
                let name = join_words(&[name], "workspace name")?;
                let ws = ops::create_workspace(&conn, &name)?;
                log::info!("created workspace {} ({})", ws.name, ws.id);
                print_json(&ws)?;
            }
            WorkspaceCommand::Rm { workspace } => {
                let ws = ops::resolve_workspace(&conn, &workspace)?;
                ops::delete_workspace(&conn, ws.id)?;
                log::info!("deleted workspace {} ({})", ws.name, ws.id);
                print_json(&Deleted { deleted: ws.id })?;
            }
        },

        Command::Task { action } => run_task(&conn, action)?,
        Command::Step { action } => run_step(&conn, action)?,
    }

    Ok(())
}

fn set_status(conn: &Connection, id: i64, status: TaskStatus) -> Result<()> {
    ops::set_task_status(conn, id, status)?;
    log::info!("task {id} status={status}");
    print_json(&StatusChange { id, status })
}

fn run_task(conn: &Connection, action: TaskCommand) -> Result<()> {
    match action {
        TaskCommand::List { workspace, status } => {
            let status = status.as_deref().map(TaskStatus::parse).transpose()?;
            let tasks = match workspace {
                Some(w) => {
                    let ws = ops::resolve_workspace(conn, &w)?;
                    ops::list_tasks(conn, ws.id, status)?
                }
                None => ops::list_all_tasks(conn, status)?,
            };
            let summaries = tasks
                .into_iter()
                .map(|t| output::summarize(conn, t))
                .collect::<Result<Vec<_>>>()?;
            print_json(&summaries)
        }
        TaskCommand::Add { name, workspace } => {
            let name = join_words(&name, "task name")?;
            let ws = workspace_or_first(conn, workspace.as_deref())?;
            let task = ops::create_task(conn, ws.id, &name)?;
            log::info!("created task {} in workspace {}", task.id, ws.id);
            print_json(&output::summarize(conn, task)?)
        }
        TaskCommand::Start { id } => set_status(conn, id, TaskStatus::InProgress),
        TaskCommand::Done { id } => set_status(conn, id, TaskStatus::Done),
        TaskCommand::Undone { id } => set_status(conn, id, TaskStatus::Active),
        TaskCommand::Rm { id } => {
            ops::delete_task(conn, id)?;
            log::info!("deleted task {id}");
            print_json(&Deleted { deleted: id })
        }
    }
}

fn set_done(conn: &Connection, id: i64, done: bool) -> Result<()> {
    ops::set_step_done(conn, id, done)?;
    log::info!("step {id} done={done}");
    print_json(&DoneChange { id, done })
}

fn run_step(conn: &Connection, action: StepCommand) -> Result<()> {
    match action {
        StepCommand::List {
            task,
            workspace,
            status,
        } => {
            let filter = StepFilter::parse(&status)?;
            let steps = match (task, workspace) {
                (Some(task_id), _) => {
                    ops::get_task(conn, task_id)?;
                    ops::list_steps_ranked(conn, task_id, filter)?
                }
                (None, Some(w)) => {
                    let ws = ops::resolve_workspace(conn, &w)?;
                    let mut steps = Vec::new();
                    for t in ops::list_tasks(conn, ws.id, None)? {
                        steps.extend(ops::list_steps_ranked(conn, t.id, filter)?);
                    }
                    steps
                }
                (None, None) => ops::list_all_steps(conn, filter)?,
            };
            print_json(&steps)
        }
        StepCommand::Add {
            text,
            task,
            priority,
            note,
        } => {
            let text = join_words(&text, "step text")?;
            let priority = Priority::parse(&priority)?;
            let step = ops::create_step(conn, task, &text, priority, note.trim())?;
            log::info!("created step {} under task {task}", step.id);
            print_json(&step)
        }
        StepCommand::Done { id } => set_done(conn, id, true),
        StepCommand::Undone { id } => set_done(conn, id, false),
        StepCommand::Edit { id, text } => {
            let text = join_words(&text, "step text")?;
            ops::update_step_text(conn, id, &text)?;
            log::info!("edited step {id}");
            print_json(&ops::get_step(conn, id)?)
        }
        StepCommand::Note { id, text } => {
            let note = text.join(" ");
            ops::set_step_note(conn, id, note.trim())?;
            log::info!("set note on step {id}");
            print_json(&ops::get_step(conn, id)?)
        }
        StepCommand::Rm { id } => {
            ops::delete_step(conn, id)?;
            log::info!("deleted step {id}");
            print_json(&Deleted { deleted: id })
        }
    }
}
