use std::{cell::RefCell, fs, rc::Rc};

use cukes::{
    cli,
    event::StepStatus,
    step::Collection,
    writer::{self, out::WritableString, Coloring, Stats},
    Cukes, Event, Isolation, Reporter, RunError, Writer,
};

#[derive(Debug, Default)]
struct Notebook {
    id: usize,
    pages: Vec<String>,
    values: Vec<i64>,
    result: Option<i64>,
}

/// Writes down every [`Event`] as a single line.
#[derive(Debug, Default)]
struct Journal(Vec<String>);

impl Writer for Journal {
    type Cli = cli::Empty;

    fn handle_event(&mut self, ev: &Event<'_>) {
        let line = match ev {
            Event::Started(p) => {
                format!("feature {}", p.name.as_deref().unwrap_or_default())
            }
            Event::Linted(_) => "linted".into(),
            Event::ParsingFailed(r) => format!("rejected: {r}"),
            Event::ScenarioStarted(name) => format!("scenario {name}"),
            Event::Step { step, background, status, logs } => format!(
                "{}{} {}{}",
                if *background { "background " } else { "" },
                match status {
                    StepStatus::Passed => "passed",
                    StepStatus::Skipped => "skipped",
                    StepStatus::Failed(_) => "failed",
                },
                step.text(),
                if logs.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", logs.join(", "))
                },
            ),
            Event::ScenarioFinished { name, passed, .. } => {
                format!("finished {name}: {passed}")
            }
            Event::Finished(summary) => {
                format!("summary: {} steps failed", summary.steps.failed)
            }
        };
        self.0.push(line);
    }
}

fn steps(contexts: Rc<RefCell<Vec<usize>>>) -> Collection<Notebook> {
    let mut steps = Collection::new();
    steps
        .given("^a calculator$", move |n: Isolation<Notebook>| {
            contexts.borrow_mut().push(n.borrow().id);
        })
        .unwrap()
        .given(r"^a value of (\d+)$", |n: Isolation<Notebook>, v: i64| {
            n.borrow_mut().values.push(v);
        })
        .unwrap()
        .when("^I press add$", |n: Isolation<Notebook>, r: Reporter| {
            let sum = n.borrow().values.iter().sum::<i64>();
            r.log(format!("sum is {sum}"));
            n.borrow_mut().result = Some(sum);
        })
        .unwrap()
        .then(r"^the result is (\d+)$", |n: Isolation<Notebook>, v: i64| {
            let result = n.borrow().result;
            if result == Some(v) {
                Ok(())
            } else {
                Err(format!("result is {result:?}"))
            }
        })
        .unwrap()
        .then(
            "^the display is( not)? blank$",
            |n: Isolation<Notebook>, not: bool| {
                assert_eq!(n.borrow().result.is_none(), !not);
            },
        )
        .unwrap()
        .given("^an empty notebook$", |n: Isolation<Notebook>| {
            assert!(n.borrow().pages.is_empty(), "notebook is reused");
        })
        .unwrap()
        .when("^I write$", |n: Isolation<Notebook>, text: String| {
            n.borrow_mut().pages.push(text);
        })
        .unwrap()
        .then("^the notebook reads$", |n: Isolation<Notebook>, text: String| {
            assert_eq!(n.borrow().pages.join("\n"), text);
        })
        .unwrap()
        .then(
            "^there is( not)? an empty page$",
            |n: Isolation<Notebook>, not: bool| {
                let empty = n.borrow().pages.is_empty();
                if empty == not {
                    Err(format!("pages: {:?}", n.borrow().pages))
                } else {
                    Ok(())
                }
            },
        )
        .unwrap();
    steps
}

fn executor(contexts: &Rc<RefCell<Vec<usize>>>) -> Cukes<Notebook, Journal> {
    let next_id = Rc::new(RefCell::new(0));
    Cukes::new(steps(Rc::clone(contexts)))
        .with_writer(Journal::default())
        .with_factory(move || {
            *next_id.borrow_mut() += 1;
            Notebook { id: *next_id.borrow(), ..Notebook::default() }
        })
}

#[test]
fn background_runs_once_per_scenario_with_fresh_context() {
    let contexts = Rc::default();
    let mut cukes = executor(&contexts);

    let report = cukes.run_path("tests/features/calculator.feature").unwrap();

    assert_eq!(*contexts.borrow(), [1, 2, 3]);
    assert_eq!(
        report.scenarios,
        Stats { passed: 2, skipped: 0, failed: 1 },
    );
    assert_eq!(report.steps, Stats { passed: 12, skipped: 1, failed: 1 });
    assert!(report.failed());
    assert_eq!(report.narrative[0], "In order to avoid silly mistakes");
}

#[test]
fn events_arrive_in_order() {
    let contexts = Rc::default();
    let mut cukes = executor(&contexts);

    _ = cukes.run_path("tests/features/calculator.feature").unwrap();

    assert_eq!(
        cukes.into_writer().0,
        [
            "feature Calculator",
            "scenario adding two numbers",
            "background passed a calculator",
            "passed a value of 40",
            "passed a value of 2",
            "passed I press add [sum is 42]",
            "passed the result is 42",
            "finished adding two numbers: true",
            "scenario adding nothing",
            "background passed a calculator",
            "passed I press add [sum is 0]",
            "passed the result is 0",
            "finished adding nothing: true",
            "scenario wrong sum",
            "background passed a calculator",
            "passed a value of 2",
            "passed a value of 2",
            "passed I press add [sum is 4]",
            "failed the result is 5",
            "skipped the display is not blank",
            "finished wrong sum: false",
            "summary: 1 steps failed",
        ],
    );
}

#[test]
fn text_blocks_reach_handlers() {
    let contexts = Rc::default();
    let mut cukes = executor(&contexts);

    let report = cukes.run_path("tests/features/notes.feature").unwrap();

    assert!(report.passed(), "{:?}", cukes.writer().0);
    assert_eq!(report.scenarios.passed, 2);
    assert_eq!(report.steps.passed, 6);
}

#[test]
fn runs_directory_of_features() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["calculator", "notes"] {
        fs::copy(
            format!("tests/features/{name}.feature"),
            dir.path().join(format!("{name}.feature")),
        )
        .unwrap();
    }
    fs::copy(
        "tests/features/rejected/outline.feature",
        dir.path().join("outline.FEATURE"),
    )
    .unwrap();
    fs::write(dir.path().join("readme.md"), "Not a feature.").unwrap();
    let contexts = Rc::default();
    let mut cukes = executor(&contexts);

    let summary = cukes.run_dir(dir.path()).unwrap();

    assert_eq!(summary.features, 3);
    assert_eq!(summary.parsing_errors, 1);
    assert_eq!(
        summary.scenarios,
        Stats { passed: 4, skipped: 0, failed: 1 },
    );
    assert_eq!(
        cukes
            .writer()
            .0
            .iter()
            .filter(|l| l.starts_with("feature ") || l.starts_with("rejected"))
            .map(|l| l.split(':').next().unwrap_or_default())
            .collect::<Vec<_>>(),
        ["feature Calculator", "feature Notes", "rejected"],
    );
}

#[test]
fn empty_directory_has_no_features() {
    let dir = tempfile::tempdir().unwrap();
    let contexts = Rc::default();

    let err = executor(&contexts).run_dir(dir.path()).unwrap_err();

    assert!(matches!(err, RunError::NoFeatures(_)), "{err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let contexts = Rc::default();

    let err = executor(&contexts)
        .run_path("tests/features/missing.feature")
        .unwrap_err();

    assert!(matches!(err, RunError::Io { .. }), "{err}");
}

#[test]
fn basic_writer_outputs_failures() {
    let contexts = Rc::default();
    let mut cukes = Cukes::new(steps(contexts)).with_writer(writer::Basic::new(
        WritableString::default(),
        Coloring::Never,
        0,
    ));

    _ = cukes.run_path("tests/features/calculator.feature").unwrap();
    let out = cukes.into_writer().into_inner().0;

    assert!(out.starts_with("Feature: Calculator\n"), "{out}");
    assert!(out.contains("  Scenario: wrong sum\n"), "{out}");
    assert!(out.contains("    ✔  > Given a calculator\n"), "{out}");
    assert!(out.contains("    ✘  Then the result is 5\n"), "{out}");
    assert!(out.contains("result is Some(4)"), "{out}");
    assert!(out.contains("    ?  And the display is not blank\n"), "{out}");
    assert!(
        out.ends_with(
            "[Summary]\n\
             1 feature\n\
             3 scenarios (2 passed, 1 failed)\n\
             14 steps (12 passed, 1 skipped, 1 failed)\n",
        ),
        "{out}",
    );
}

#[test]
#[should_panic(expected = "1 step failed, 0 parsing errors")]
fn run_and_exit_panics_on_failures() {
    let contexts = Rc::default();

    executor(&contexts).run_and_exit("tests/features");
}
