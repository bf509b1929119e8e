use std::fs;

use petri_core::{ColonyId, ColonyReport, ContestResult};
use petri_ranking::{MatchRecord, RankingError, ResultLog, Standings, LOG_FILE_NAME};

fn result(first: (&str, usize), second: (&str, usize), ticks: u64) -> ContestResult {
    let report = |colony, (name, population): (&str, usize)| ColonyReport {
        colony: ColonyId::new(colony),
        name: name.to_owned(),
        author: "petri".to_owned(),
        population,
        energy: population as f64 * 250.0,
    };
    ContestResult::new(vec![report(1, first), report(2, second)], ticks, true)
}

#[test]
fn missing_log_reads_as_empty() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let log = ResultLog::new(directory.path().join("never-created"));

    assert_eq!(log.load().expect("load"), Vec::new());
}

#[test]
fn appended_records_are_loaded_in_order() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let log = ResultLog::new(directory.path().join("results"));
    let first = MatchRecord::new(&result(("Tactics 2", 44), ("MOyy", 0), 230), 10);
    let second = MatchRecord::new(&result(("MO++", 3), ("MO--", 3), 10_000), 20);

    log.append(&first).expect("append first");
    log.append(&second).expect("append second");

    assert!(log.path().ends_with(LOG_FILE_NAME));
    let records = log.load().expect("load");
    assert_eq!(records, vec![first, second]);

    let standings = Standings::from_records(&records);
    assert_eq!(standings.entries()[0].name, "Tactics 2");
    assert_eq!(standings.contests(), 2);
}

#[test]
fn corrupt_lines_are_reported_with_their_position() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let log = ResultLog::new(directory.path());
    let record = MatchRecord::new(&result(("MOxx", 12), ("MOyy", 4), 600), 30);
    log.append(&record).expect("append");

    let mut contents = fs::read_to_string(log.path()).expect("read log");
    contents.push('\n');
    contents.push_str("{not json}\n");
    fs::write(log.path(), contents).expect("rewrite log");

    match log.load() {
        Err(RankingError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {other:?}"),
    }
}
