use std::io::{self, BufRead};

use anyhow::{bail, Result};
use storefront::journey::{journey_for, record_event, EventLog};
use storefront::model::Event;

fn main() -> Result<()> {
    let Some(user_id) = std::env::args().nth(1) else {
        bail!("usage: journey_replay <user-id> < events.jsonl");
    };

    let stdin = io::stdin();
    let mut log = EventLog::new();
    let mut skipped = 0usize;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(&line) {
            Ok(event) => log = record_event(log, event),
            Err(err) => {
                eprintln!("bad event json: {}", err);
                skipped += 1;
            }
        }
    }

    let graph = journey_for(&log, &user_id);
    eprintln!(
        "events={} skipped={} nodes={} edges={} digest={}",
        log.len(),
        skipped,
        graph.nodes.len(),
        graph.edges.len(),
        log.digest()?
    );
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
