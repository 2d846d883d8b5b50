//! Credits and outcome runs against in-memory collaborators.

use std::cell::Cell;

use chum_core::classify::{FixedJitter, RandomJitter};
use chum_core::error::{ErrorCode, SourceError};
use chum_core::event::RawEvent;
use chum_core::identity::{PlayerDirectory, PlayerRecord};
use chum_core::outcome::Outcome;
use chum_core::pipeline::{render_data_module, run_credits, run_outcomes};
use chum_core::source::{EventLog, EventQuery};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct StaticLog {
    events: Vec<RawEvent>,
}

impl EventLog for StaticLog {
    fn fetch_events(&self, _query: &EventQuery) -> Result<Vec<RawEvent>, SourceError> {
        Ok(self.events.clone())
    }
}

struct FailingLog;

impl EventLog for FailingLog {
    fn fetch_events(&self, _query: &EventQuery) -> Result<Vec<RawEvent>, SourceError> {
        Err(SourceError::Request {
            url: "https://example.invalid/events".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

struct StaticDirectory {
    players: Vec<PlayerRecord>,
    calls: Cell<usize>,
}

impl PlayerDirectory for StaticDirectory {
    fn fetch_identities(&self, ids: &[String]) -> Result<Vec<PlayerRecord>, SourceError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self
            .players
            .iter()
            .filter(|player| ids.contains(&player.id))
            .cloned()
            .collect())
    }
}

fn events() -> Vec<RawEvent> {
    serde_json::from_value(serde_json::json!([
        {
            "id": "a-steeled", "type": 67, "season": 14, "day": 30,
            "description": "CONSUMERS ATTACK! Jim Barnes is STEELED by Wyatt Mason's Rock",
            "playerTags": ["jim", "wyatt"]
        },
        {
            "id": "i-steeled", "type": 186, "season": 14, "day": 30,
            "description": "Wyatt Mason's Rock of Fire was damaged",
            "playerTags": ["wyatt"],
            "metadata": {"parent": "a-steeled", "itemName": "Rock of Fire"}
        },
        {
            "id": "a-loss", "type": 67, "season": 14, "day": 10,
            "description": "CONSUMERS ATTACK JIM BARNES",
            "playerTags": ["jim"]
        },
        {
            "id": "s-loss", "type": 118, "season": 14, "day": 10,
            "description": "Jim Barnes lost stars",
            "playerTags": ["jim"],
            "metadata": {"parent": "a-loss", "before": 3.0, "after": 1.5}
        },
        {
            "id": "a-defended", "type": 67, "season": 15, "day": 2,
            "description": "A CONSUMER! Jessica Telephone DEFENDS Alyssa Harrell",
            "playerTags": ["alyssa", "jessica"]
        },
        {
            "id": "a-salmon", "type": 67, "season": 16, "day": 5,
            "description": "SALMON CANNONS FIRE! NaN escapes",
            "playerTags": ["nan"]
        },
        {
            "id": "a-chorby", "type": 67, "season": 15, "day": 8,
            "description": "CONSUMERS ATTACK CHORBY SOUL",
            "playerTags": ["chorby"]
        },
        {
            "id": "s-chorby", "type": 118, "season": 15, "day": 8,
            "description": "Chorby Soul lost stars",
            "playerTags": ["chorby"],
            "metadata": {"parent": "a-chorby", "before": 4.0, "after": 0.4}
        },
        {
            "id": "a-mystery", "type": 67, "season": 16, "day": 9,
            "description": "CONSUMERS STARE AT THE GHOST",
            "playerTags": ["ghost"]
        },
        {
            "id": "coin", "type": 29, "season": 16, "day": 9,
            "description": "The consumers are restless",
            "playerTags": []
        },
        {
            "id": "odd", "type": 4, "season": 16, "day": 9,
            "description": "Consumer-adjacent weather",
            "playerTags": []
        }
    ]))
    .expect("fixture events deserialize")
}

fn players() -> Vec<PlayerRecord> {
    serde_json::from_value(serde_json::json!([
        {"id": "jim", "name": "Jim Barnes", "permAttr": []},
        {"id": "wyatt", "name": "Wy-tt M-s-n", "permAttr": ["SCATTERED"],
         "state": {"unscatteredName": "Wyatt Mason"}},
        {"id": "alyssa", "name": "Alyssa Harrell", "permAttr": []},
        {"id": "jessica", "name": "Jessica Telephone", "permAttr": []},
        {"id": "nan", "name": "NaN", "permAttr": []},
        {"id": "chorby", "name": "Chorby Soul", "permAttr": []}
    ]))
    .expect("fixture players deserialize")
}

fn rows(lines: &[chum_core::classify::DisplayLine]) -> Vec<(String, String, String)> {
    lines
        .iter()
        .map(|line| {
            (
                line.target.clone(),
                line.rating.to_string(),
                line.comment.clone(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[test]
fn credits_run_merges_rates_and_sorts() {
    let log = StaticLog { events: events() };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let report = run_credits(&log, &directory, &mut FixedJitter(0.5), &EventQuery::default())
        .expect("credits run should succeed");

    assert_eq!(report.fragments, 11);
    assert_eq!(report.records, 6);
    assert_eq!(directory.calls.get(), 1);

    let expected = vec![
        (
            "'s ????".to_string(),
            "0/10".to_string(),
            String::new(),
        ),
        (
            "Jim Barnes".to_string(),
            "7.5/10".to_string(),
            String::new(),
        ),
        (
            "Jim Barnes".to_string(),
            "2.5/10".to_string(),
            "(Meal prevented by Wyatt Mason's Rock of Fire)".to_string(),
        ),
        (
            "Alyssa Harrell".to_string(),
            "0.0/10".to_string(),
            "(Meal prevented by Jessica Telephone)".to_string(),
        ),
        (
            "NaN".to_string(),
            "2.5/10".to_string(),
            "(Meal prevented by Salmon Cannons)".to_string(),
        ),
        (
            "Chorby Soul".to_string(),
            "10.0/10".to_string(),
            String::new(),
        ),
    ];
    assert_eq!(rows(&report.lines), expected);

    assert_eq!(report.diagnostics.len(), 2);
    assert_eq!(report.diagnostics.count(ErrorCode::UnrecognizedFragmentKind), 1);
    assert_eq!(report.diagnostics.count(ErrorCode::UnclassifiableRecord), 1);
}

#[test]
fn unknown_name_sorts_first_as_empty_key() {
    let log = StaticLog { events: events() };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let report = run_credits(&log, &directory, &mut FixedJitter(0.0), &EventQuery::default())
        .expect("credits run should succeed");

    let placeholder = report
        .lines
        .iter()
        .position(|line| line.target == "'s ????")
        .expect("placeholder line present");
    let first_named = report
        .lines
        .iter()
        .position(|line| line.target == "Alyssa Harrell")
        .expect("named line present");
    assert!(placeholder < first_named);
}

#[test]
fn nameless_item_fragment_keeps_stat_loss_rating() {
    let log = StaticLog {
        events: serde_json::from_value(serde_json::json!([
            {
                "id": "a-loss", "type": 67, "season": 14, "day": 10,
                "description": "CONSUMERS ATTACK JIM BARNES",
                "playerTags": ["jim"]
            },
            {
                "id": "s-loss", "type": 118, "season": 14, "day": 10,
                "description": "Jim Barnes lost stars",
                "playerTags": ["jim"],
                "metadata": {"parent": "a-loss", "before": 3.0, "after": 1.5}
            },
            {
                "id": "i-loss", "type": 186, "season": 14, "day": 10,
                "description": "An item broke",
                "playerTags": ["jim"],
                "metadata": {"parent": "a-loss"}
            }
        ]))
        .expect("fixture events deserialize"),
    };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let report = run_credits(&log, &directory, &mut FixedJitter(0.5), &EventQuery::default())
        .expect("credits run should succeed");

    assert_eq!(
        rows(&report.lines),
        vec![("Jim Barnes".to_string(), "7.5/10".to_string(), String::new())]
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn zero_baseline_line_is_kept_and_flagged() {
    let log = StaticLog {
        events: serde_json::from_value(serde_json::json!([
            {
                "id": "a-zero", "type": 67, "season": 14, "day": 3,
                "description": "CONSUMERS ATTACK JIM BARNES",
                "playerTags": ["jim"]
            },
            {
                "id": "s-zero", "type": 118, "season": 14, "day": 3,
                "description": "Jim Barnes lost stars",
                "playerTags": ["jim"],
                "metadata": {"parent": "a-zero", "before": 0.0, "after": 0.5}
            }
        ]))
        .expect("fixture events deserialize"),
    };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let report = run_credits(&log, &directory, &mut FixedJitter(0.0), &EventQuery::default())
        .expect("credits run should succeed");

    assert_eq!(
        rows(&report.lines),
        vec![("Jim Barnes".to_string(), "Infinity/10".to_string(), String::new())]
    );
    assert_eq!(report.diagnostics.count(ErrorCode::NonFiniteRating), 1);
    assert_eq!(report.diagnostics.count(ErrorCode::UnclassifiableRecord), 0);
}

#[test]
fn scattered_player_without_original_name_is_unnamed() {
    let log = StaticLog {
        events: serde_json::from_value(serde_json::json!([
            {
                "id": "a-ghost", "type": 67, "season": 16, "day": 1,
                "description": "CONSUMERS ATTACK",
                "playerTags": ["ghost"]
            },
            {
                "id": "s-ghost", "type": 118, "season": 16, "day": 1,
                "description": "lost stars",
                "playerTags": ["ghost"],
                "metadata": {"parent": "a-ghost", "before": 2.0, "after": 1.0}
            }
        ]))
        .expect("fixture events deserialize"),
    };
    let directory = StaticDirectory {
        players: serde_json::from_value(serde_json::json!([
            {"id": "ghost", "name": "G--st", "permAttr": ["SCATTERED"]}
        ]))
        .expect("fixture players deserialize"),
        calls: Cell::new(0),
    };

    let report = run_credits(&log, &directory, &mut FixedJitter(0.0), &EventQuery::default())
        .expect("credits run should succeed");

    assert_eq!(
        rows(&report.lines),
        vec![(String::new(), "7.5/10".to_string(), String::new())]
    );
}

#[test]
fn seeded_runs_are_reproducible() {
    let log = StaticLog { events: events() };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let first = run_credits(
        &log,
        &directory,
        &mut RandomJitter::seeded(11),
        &EventQuery::default(),
    )
    .expect("first run");
    let second = run_credits(
        &log,
        &directory,
        &mut RandomJitter::seeded(11),
        &EventQuery::default(),
    )
    .expect("second run");

    assert_eq!(first.lines, second.lines);
}

#[test]
fn fetch_failure_aborts_the_run() {
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };

    let err = run_credits(
        &FailingLog,
        &directory,
        &mut FixedJitter(0.0),
        &EventQuery::default(),
    )
    .expect_err("fetch failure must propagate");

    assert_eq!(err.error_code(), ErrorCode::RemoteFetchFailed);
    assert_eq!(directory.calls.get(), 0);
}

#[test]
fn rendered_module_matches_sorted_lines() {
    let log = StaticLog { events: events() };
    let directory = StaticDirectory {
        players: players(),
        calls: Cell::new(0),
    };
    let report = run_credits(&log, &directory, &mut FixedJitter(0.5), &EventQuery::default())
        .expect("credits run should succeed");

    let module = render_data_module(&report.lines, "data").expect("render module");
    let json = module
        .strip_prefix("const data = ")
        .and_then(|rest| rest.strip_suffix('\n'))
        .expect("module shape");
    let parsed: Vec<[String; 3]> = serde_json::from_str(json).expect("module holds triples");

    assert_eq!(parsed.len(), report.lines.len());
    assert_eq!(parsed[1][0], "Jim Barnes");
    assert_eq!(parsed[1][1], "7.5/10");
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[test]
fn outcome_run_counts_each_category() {
    let descriptions = [
        "X DEFENDS Y",
        "CHORBY SOUL eats",
        "A CONSUMER wrestled",
        "SALMON cannon fired",
        "ordinary eat",
    ];
    let events = descriptions
        .iter()
        .enumerate()
        .map(|(n, description)| RawEvent {
            id: format!("e{n}"),
            type_code: 67,
            season: 1,
            day: 3,
            description: (*description).to_string(),
            player_tags: Vec::new(),
            metadata: None,
        })
        .collect();

    let tally = run_outcomes(&StaticLog { events }, &EventQuery::default())
        .expect("outcome run should succeed");

    assert_eq!(tally.get(Outcome::Defended, 1), 1);
    assert_eq!(tally.get(Outcome::Chorby, 1), 1);
    assert_eq!(tally.get(Outcome::Wrestled, 1), 1);
    assert_eq!(tally.get(Outcome::Cannon, 1), 1);
    assert_eq!(tally.get(Outcome::Success, 1), 1);
}

#[test]
fn outcome_run_propagates_fetch_failure() {
    let err = run_outcomes(&FailingLog, &EventQuery::default()).expect_err("must fail");
    assert_eq!(err.error_code(), ErrorCode::RemoteFetchFailed);
}
