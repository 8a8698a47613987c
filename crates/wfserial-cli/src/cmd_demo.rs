use anyhow::Result;
use wfserial::v1::{Engine, Graph, Node, Storage};

pub const DEMO_GRAPH_ID: &str = "test";

/// The built-in weather sample: should I go out today?
pub fn demo_graph() -> Graph {
    Graph::new(DEMO_GRAPH_ID, "Weather decider", "1")
        .with_node(
            Node::question("1", "Is it raining outside today?", Some("2"), Some("3"))
                .with_position(200.0, 40.0),
        )
        .with_node(
            Node::question("2", "Do you have an umbrella?", Some("4"), Some("5"))
                .with_position(80.0, 160.0),
        )
        .with_node(
            Node::question("3", "Do you feel like going out?", Some("6"), Some("7"))
                .with_position(320.0, 160.0),
        )
        .with_node(
            Node::conclusion("4", "You can go out.", "go out with an umbrella")
                .with_position(20.0, 280.0),
        )
        .with_node(
            Node::conclusion("5", "Better stay home.", "stay inside").with_position(140.0, 280.0),
        )
        .with_node(
            Node::conclusion("6", "Off you go!", "enjoy the trip").with_position(260.0, 280.0),
        )
        .with_node(
            Node::conclusion("7", "Take a nap.", "rest at home").with_position(380.0, 280.0),
        )
}

/// Add the sample graph unless it is already stored.
pub fn add_demo<S: Storage>(engine: &mut Engine<S>) -> bool {
    if engine.graph(DEMO_GRAPH_ID).is_some() {
        return false;
    }
    engine.add_graph(demo_graph());
    true
}

pub fn run<S: Storage>(engine: &mut Engine<S>) -> Result<()> {
    if add_demo(engine) {
        eprintln!("Added sample graph {DEMO_GRAPH_ID:?}. Run `wf play` to try it.");
    } else {
        eprintln!("Sample graph {DEMO_GRAPH_ID:?} is already stored.");
    }
    Ok(())
}
