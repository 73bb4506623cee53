use std::cell::{Cell, RefCell};
use std::rc::Rc;

use clerk_core::lock::{FileLockProvider, LockProvider, MemoryLockProvider};
use clerk_core::prompt::ScriptedPrompter;
use clerk_core::{
    Application, BufferedOutput, ChoiceQuestion, CommandBuilder, CommandClass, CommandType,
    ConsoleError, Context, ExitStatus, Input, InputDefinition, OptionSpec, Output, Registry,
};
use serde_json::json;

thread_local! {
    static HANDLED: Cell<usize> = const { Cell::new(0) };
}

struct Steady;

impl CommandClass for Steady {
    const NAME: &'static str = "test:steady";
    const DESCRIPTION: &'static str = "Always works";

    fn create() -> Self {
        Steady
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        HANDLED.with(|handled| handled.set(handled.get() + 1));
        cx.info("steady");
        Ok(())
    }
}

struct Broken;

impl CommandClass for Broken {
    const NAME: &'static str = "test:broken";
    const DESCRIPTION: &'static str = "Always fails";

    fn create() -> Self {
        Broken
    }

    fn handle(&mut self, _cx: &mut Context<'_>) -> anyhow::Result<()> {
        anyhow::bail!("something broke")
    }
}

struct Exclusive;

impl CommandClass for Exclusive {
    const NAME: &'static str = "test:exclusive";
    const LOCKABLE: bool = true;

    fn create() -> Self {
        Exclusive
    }

    fn handle(&mut self, _cx: &mut Context<'_>) -> anyhow::Result<()> {
        HANDLED.with(|handled| handled.set(handled.get() + 1));
        Ok(())
    }
}

struct Friendly;

impl CommandClass for Friendly {
    const NAME: &'static str = "test:friendly";
    const MESSAGE_TIMESTAMP: bool = false;

    fn create() -> Self {
        Friendly
    }

    fn init(&self, definition: &mut InputDefinition) {
        definition
            .add_argument(clerk_core::ArgumentSpec::required("name"))
            .add_option(OptionSpec::value("age"));
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let name = cx.argument("name", "");
        cx.info(format!("Hello World, I am {}", name.as_str().unwrap_or_default()));
        let age = cx.option("age", json!(null));
        if !age.is_null() {
            cx.info(format!("I am {} years old.", age));
        }
        Ok(())
    }
}

fn application() -> Application {
    Application::new("Properties", "1.0")
        .with_prompter(Box::new(ScriptedPrompter::default()))
        .with_lock_provider(Box::new(MemoryLockProvider::new()))
        .with_commands(
            &[
                CommandType::of::<Steady>(),
                CommandType::of::<Broken>(),
                CommandType::of::<Exclusive>(),
                CommandType::of::<Friendly>(),
            ],
            true,
        )
}

#[test]
fn test_status_follows_handle_outcome() {
    let mut app = application();
    let mut output = BufferedOutput::new();

    let status = app.call("test:steady", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);

    let status = app.call("test:broken", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Failure);
    assert!(output.contents().contains("something broke"));
}

#[test]
fn test_held_lock_skips_handle_and_succeeds() {
    HANDLED.with(|handled| handled.set(0));
    let dir = tempfile::tempdir().unwrap();
    let mut holder = FileLockProvider::new(dir.path());
    let guard = holder.try_lock("test:exclusive").unwrap();
    assert!(guard.is_some());

    let mut app = application().with_lock_provider(Box::new(FileLockProvider::new(dir.path())));
    let mut output = BufferedOutput::new();
    let status = app.call("test:exclusive", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(HANDLED.with(Cell::get), 0);

    drop(guard);
    let status = app.call("test:exclusive", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(HANDLED.with(Cell::get), 1);
}

#[test]
fn test_builder_builds_independent_instances() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = calls.clone();
    let mut builder = CommandBuilder::new("test:closure", move |cx| {
        log.borrow_mut().push(cx.name().to_string());
        Ok(())
    });
    builder.purpose("Closure command");

    let mut app = Application::new("Properties", "1.0");
    let first = builder.build();
    let second = builder.build();
    app.add(Box::new(first));

    let mut other = Application::new("Other", "1.0");
    other.add(Box::new(second));

    let mut output = BufferedOutput::new();
    app.call("test:closure", Input::new(), &mut output).unwrap();
    other.call("test:closure", Input::new(), &mut output).unwrap();

    assert_eq!(*calls.borrow(), vec!["test:closure", "test:closure"]);
    assert_eq!(app.find("test:closure").unwrap().description, "Closure command");
    assert_eq!(other.find("test:closure").unwrap().description, "Closure command");
}

#[test]
fn test_choice_stops_after_max_attempts() {
    let prompter = ScriptedPrompter::new(["bad", "bad", "bad", "bad"]);
    let handle = prompter.clone();
    let mut app = Application::new("Properties", "1.0").with_prompter(Box::new(prompter));
    app.command("test:choice", |cx| {
        let question = ChoiceQuestion::new("Which color do you like?", ["Yellow", "Orange", "Blue"])
            .with_max_attempts(3);
        let picked = cx.choice(&question)?;
        cx.info(format!("You have selected \"{}\"", picked.join(",")));
        Ok(())
    })
    .without_timestamp();

    let mut output = BufferedOutput::new();
    let status = app.call("test:choice", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(handle.asked().len(), 3);
    assert_eq!(handle.remaining(), 1);
    assert_eq!(output.lines().last().unwrap(), "[INFO] You have selected \"Yellow\"");
}

#[test]
fn test_table_rows_and_mapper() {
    struct Candidate {
        position: u32,
        name: &'static str,
    }

    let mut app = Application::new("Properties", "1.0");
    app.command("test:flat", |cx| {
        cx.table(["Place", "Name"], &[json!({"position": 1, "name": "A"})])?;
        Ok(())
    });
    app.command("test:mapped", |cx| {
        let rows = vec![Candidate { position: 1, name: "A" }];
        cx.table_with(["Place", "Name"], rows, |row| {
            vec![json!(row.position), json!(row.name)]
        })?;
        Ok(())
    });

    let mut output = BufferedOutput::new();
    let status = app.call("test:flat", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Failure);
    assert!(output.contents().contains("Each row should be an array."));

    let mut output = BufferedOutput::new();
    let status = app.call("test:mapped", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(
        output.lines(),
        &[
            "+-------+------+",
            "| Place | Name |",
            "+-------+------+",
            "| 1     | A    |",
            "+-------+------+",
        ]
    );
}

#[test]
fn test_progress_bar_visits_lazy_sequence_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let mut app = Application::new("Properties", "1.0");
    app.command("test:progress", move |cx| {
        let log = log.clone();
        cx.with_progress_bar(
            (1..=10).map(|i| i * 100),
            move |_cx, value, index| {
                log.borrow_mut().push((index, value));
                Ok(())
            },
            0,
        )
    });

    let mut output = BufferedOutput::new();
    let status = app.call("test:progress", Input::new(), &mut output).unwrap();
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(output.progress_advances(), 10);

    let expected: Vec<(usize, i32)> = (0..10).map(|i| (i, (i as i32 + 1) * 100)).collect();
    assert_eq!(*seen.borrow(), expected);
}

#[test]
fn test_call_silently_suppresses_output() {
    let mut app = application();
    app.command("test:loud", |cx| {
        cx.call("test:friendly", Input::from_pairs([("name", json!("Jane")), ("--age", json!(18))]))?;
        Ok(())
    });
    app.command("test:quiet", |cx| {
        cx.call_silently("test:friendly", Input::from_pairs([("name", json!("Jane")), ("--age", json!(18))]))?;
        Ok(())
    });

    let mut output = BufferedOutput::new();
    app.call("test:loud", Input::new(), &mut output).unwrap();
    assert_eq!(
        output.lines(),
        &["[INFO] Hello World, I am Jane", "[INFO] I am 18 years old."]
    );

    let mut output = BufferedOutput::new();
    app.call("test:quiet", Input::new(), &mut output).unwrap();
    assert!(output.lines().is_empty());
    assert!(!output.is_quiet());
}

#[test]
fn test_unknown_command_is_reported_not_raised() {
    let mut app = application();
    let mut output = BufferedOutput::new();
    assert_eq!(app.run(["clerk", "test:missing"], &mut output), ExitStatus::Failure);

    let err = app.call("test:missing", Input::new(), &mut output).unwrap_err();
    assert!(matches!(err, ConsoleError::CommandNotFound(_)));

    let mut registry = Registry::new();
    registry.set_application(application());
    assert_eq!(
        registry.call_with("test:missing", Input::new(), false, &mut output),
        ExitStatus::Failure
    );
}

#[test]
fn test_date_range_option_from_command_line() {
    use clerk_core::date_range::{add_date_range_option, date_range_option, DateRangeNames};

    let mut app = Application::new("Properties", "1.0");
    app.command("test:report", |cx| {
        let (from, to) = date_range_option(cx, &DateRangeNames::default())?;
        cx.output().writeln(&format!("{:?} {:?}", from, to));
        Ok(())
    })
    .input(|definition| add_date_range_option(definition, &DateRangeNames::default()));

    let mut output = BufferedOutput::new();
    assert_eq!(app.run(["clerk", "test:report", "-m", "2024-03"], &mut output), ExitStatus::Success);
    assert_eq!(output.lines(), &["Some(2024-03-01) Some(2024-03-31)"]);

    let mut output = BufferedOutput::new();
    let status = app.run(
        ["clerk", "test:report", "--from-date", "2024-05-02", "--to-date", "2024-05-01"],
        &mut output,
    );
    assert_eq!(status, ExitStatus::Failure);
    assert!(output.contents().contains("To date should be greater than from date."));
}
