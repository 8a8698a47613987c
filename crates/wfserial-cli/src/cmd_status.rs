use anyhow::Result;
use serde::Serialize;
use wfserial::v1::{Engine, Position, Storage};

use crate::to_json;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    graph_id: Option<&'a str>,
    graph_name: Option<&'a str>,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<&'a str>,
    path: &'a [String],
}

/// Describe the engine's current position. Within one `wf` process this is
/// always the restored start node; the other states show up for embedders
/// that keep an engine alive across answers.
fn report<S: Storage>(engine: &Engine<S>) -> StatusReport<'_> {
    let graph = engine.active_graph();
    let position = engine.current_traversal_state();
    let node = position.current_node();
    StatusReport {
        graph_id: graph.map(|g| g.id.as_str()),
        graph_name: graph.map(|g| g.name.as_str()),
        state: match position {
            Position::Empty => "empty",
            Position::ShowingNode(_) => "in-progress",
            Position::ShowingConclusion(_) => "concluded",
        },
        node_id: node.map(|n| n.id.as_str()),
        question: node.map(|n| n.description.as_str()),
        conclusion: position.conclusion(),
        path: engine.path(),
    }
}

pub fn run<S: Storage>(engine: &Engine<S>, json: bool, pretty: bool) -> Result<()> {
    let report = report(engine);
    if json {
        println!("{}", to_json(&report, pretty)?);
        return Ok(());
    }

    match (report.graph_name, report.graph_id) {
        (Some(name), Some(id)) => println!("Graph: {name} ({id})"),
        _ => {
            println!("No active graph.");
            return Ok(());
        }
    }
    if !report.path.is_empty() {
        println!("Path: {}", report.path.join(" > "));
    }
    match (report.question, report.conclusion) {
        (Some(question), _) => println!("Question: {question}"),
        (None, Some(conclusion)) => println!("Conclusion: {conclusion}"),
        (None, None) => println!("The start node does not exist."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_demo::add_demo;
    use wfserial::v1::{EngineConfig, MemoryStorage};

    #[test]
    fn test_report_empty() {
        let engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        let report = report(&engine);
        assert_eq!(report.state, "empty");
        assert!(report.graph_id.is_none());
    }

    #[test]
    fn test_report_in_progress_and_concluded() {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        add_demo(&mut engine);

        let r = report(&engine);
        assert_eq!(r.state, "in-progress");
        assert_eq!(r.node_id, Some("1"));
        assert_eq!(r.graph_id, Some("test"));

        engine.choose(true);
        engine.choose(false);
        let r = report(&engine);
        assert_eq!(r.state, "concluded");
        assert_eq!(r.conclusion, Some("stay inside"));
        assert_eq!(r.path.len(), 2);
        assert!(r.question.is_none());
    }

    #[test]
    fn test_report_json_shape() {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        add_demo(&mut engine);
        let json = to_json(&report(&engine), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["graphId"], "test");
        assert_eq!(value["state"], "in-progress");
        assert!(value.get("conclusion").is_none());
        assert_eq!(value["path"], serde_json::json!([]));
    }
}
