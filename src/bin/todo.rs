// src/bin/todo.rs

//! `todo`: a plain-text task list built on gantry.

use anyhow::{Context, Result, anyhow};
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};
use gantry::{App, CliError, Command, Options, Outcome};
use std::fs;
use std::path::PathBuf;

const DEFAULT_TASK_FILE: &str = "~/.todo.txt";

/// Exit code for a command missing the arguments it needs.
const EXIT_USAGE: i32 = 2;

/// Exit code for a command line that names a task that does not exist.
const EXIT_NO_SUCH_TASK: i32 = 3;

/// One line of the task file: `<done>\t<priority>\t<text>`.
#[derive(Debug, Clone, PartialEq)]
struct Task {
    done: bool,
    priority: u8,
    text: String,
}

impl Task {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, '\t');
        let done = parts.next()? == "x";
        let priority = parts.next()?.parse().ok()?;
        let text = parts.next()?.to_string();
        Some(Self {
            done,
            priority,
            text,
        })
    }

    fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}",
            if self.done { "x" } else { "-" },
            self.priority,
            self.text
        )
    }
}

fn task_file(global: &Options) -> PathBuf {
    let declared = global.text("file").unwrap_or(DEFAULT_TASK_FILE);
    PathBuf::from(shellexpand::tilde(declared).as_ref())
}

fn load_tasks(global: &Options) -> Result<Vec<Task>> {
    let path = task_file(global);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read task file '{}'", path.display()))?;
    Ok(content
        .lines()
        .filter_map(|line| {
            let task = Task::parse(line);
            if task.is_none() && !line.trim().is_empty() {
                log::warn!("Skipping malformed task line: {:?}", line);
            }
            task
        })
        .collect())
}

fn save_tasks(global: &Options, tasks: &[Task]) -> Result<()> {
    let path = task_file(global);
    let mut content: String = tasks.iter().map(|t| t.to_line() + "\n").collect();
    if content.is_empty() {
        content.push('\n');
    }
    fs::write(&path, content)
        .with_context(|| format!("Could not write task file '{}'", path.display()))
}

// --- Command bodies ---

fn add(global: &Options, options: &Options, args: &[String]) -> Result<Outcome> {
    if args.is_empty() {
        return Ok(Outcome::exit(EXIT_USAGE, "Nothing to add; pass the task text"));
    }
    let priority: u8 = options
        .text("priority")
        .unwrap_or("3")
        .parse()
        .map_err(|_| anyhow!("Priority must be a number between 0 and 255"))?;

    let mut tasks = load_tasks(global)?;
    tasks.push(Task {
        done: false,
        priority,
        text: args.join(" "),
    });
    save_tasks(global, &tasks)?;
    println!("{} task {}", "Added".green().bold(), tasks.len());
    Ok(Outcome::Success)
}

fn list(global: &Options, options: &Options, _args: &[String]) -> Result<Outcome> {
    let tasks = load_tasks(global)?;
    let mut numbered: Vec<(usize, &Task)> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (i + 1, t))
        .filter(|(_, t)| options.is_on("all") || !t.done)
        .collect();
    numbered.sort_by_key(|(_, t)| t.priority);

    if numbered.is_empty() {
        println!("{}", "Nothing to do.".dimmed());
    }
    for (number, task) in numbered {
        let line = format!("{:>3}. (p{}) {}", number, task.priority, task.text);
        if task.done {
            println!("{}", line.dimmed().strikethrough());
        } else {
            println!("{}", line);
        }
    }
    Ok(Outcome::Success)
}

fn done(global: &Options, _options: &Options, args: &[String]) -> Result<Outcome> {
    let mut tasks = load_tasks(global)?;
    let Some(number) = args.first().and_then(|n| n.parse::<usize>().ok()) else {
        return Ok(Outcome::exit(EXIT_USAGE, "Pass the number of the task to finish"));
    };
    let Some(task) = number.checked_sub(1).and_then(|i| tasks.get_mut(i)) else {
        let message = format!("There is no task {}", number);
        return Err(CliError::exit(message, EXIT_NO_SUCH_TASK).into());
    };
    task.done = true;
    println!("{} {}", "Done:".green().bold(), task.text);
    save_tasks(global, &tasks)?;
    Ok(Outcome::Success)
}

fn clear(global: &Options, options: &Options, _args: &[String]) -> Result<Outcome> {
    if options.is_on("yes") {
        return clear_finished(global, |_| Ok(true));
    }
    clear_finished(global, |finished| {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove {} finished task(s)?", finished))
            .default(false)
            .interact()?)
    })
}

/// Removes finished tasks once `confirm` agrees. Declining is not a failure.
fn clear_finished(
    global: &Options,
    confirm: impl FnOnce(usize) -> Result<bool>,
) -> Result<Outcome> {
    let mut tasks = load_tasks(global)?;
    let finished = tasks.iter().filter(|t| t.done).count();
    if finished == 0 {
        println!("{}", "No finished tasks.".dimmed());
        return Ok(Outcome::Success);
    }

    if !confirm(finished)? {
        println!("{}", "Cancelled; nothing removed.".dimmed());
        return Ok(Outcome::Success);
    }

    tasks.retain(|t| !t.done);
    save_tasks(global, &tasks)?;
    println!("{} {} task(s)", "Removed".yellow().bold(), finished);
    Ok(Outcome::Success)
}

/// Stops mutating commands when `--dry-run` is given.
fn pre(global: &Options, command: &Command, _options: &Options, args: &[String]) -> Result<bool> {
    if global.is_on("verbose") {
        eprintln!("todo: using {}", task_file(global).display());
    }
    if global.is_on("dry-run") && command.name() != "list" {
        println!("Would run '{}' with {:?}", command.name(), args);
        return Ok(false);
    }
    Ok(true)
}

fn build_app() -> Result<App, CliError> {
    let mut app = App::new("todo");
    app.program_desc("Manage a plain-text task list")
        .config_file(".todo.toml")
        .default_command("list");
    app.version(env!("CARGO_PKG_VERSION"))?;

    app.flag(["f", "file"])?
        .desc("Task file")
        .arg_name("FILE")
        .default_value(DEFAULT_TASK_FILE);
    app.switch(["v", "verbose"])?.desc("Print what todo is doing");
    app.switch(["n", "dry-run"])?
        .desc("Show what would change without writing anything");

    let mut cmd = app.command(["add", "a"])?;
    cmd.desc("Add a task").arg_name("text...");
    cmd.flag(["p", "priority"])?
        .desc("Priority, lower is more urgent")
        .arg_name("N")
        .default_value("3");
    cmd.action(add);

    let mut cmd = app.command(["list", "ls"])?;
    cmd.desc("List open tasks").skips_post(true);
    cmd.switch(["a", "all"])?.desc("Include finished tasks");
    cmd.action(list);

    let mut cmd = app.command(["done"])?;
    cmd.desc("Mark a task as finished").arg_name("number");
    cmd.action(done);

    let mut cmd = app.command(["clear"])?;
    cmd.desc("Remove finished tasks");
    cmd.switch(["y", "yes"])?.desc("Do not ask for confirmation");
    cmd.action(clear);

    app.pre(pre);
    app.post(|global, _, _, _| {
        log::debug!("Task file {} updated", task_file(global).display());
        Ok(())
    });
    Ok(app)
}

fn main() {
    env_logger::init();

    let mut app = match build_app() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    match app.run(std::env::args().skip(1)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Only reached when GANTRY_DEBUG asks for the full failure.
            eprintln!("{:?}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    }
}
