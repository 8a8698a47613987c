use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use wfserial::v1::{Engine, Status, Storage, Transition};

/// A parsed yes/no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Answer(bool),
    Quit,
}

fn parse_reply(input: &str) -> Option<Reply> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Reply::Answer(true)),
        "n" | "no" => Some(Reply::Answer(false)),
        "q" | "quit" => Some(Reply::Quit),
        _ => None,
    }
}

pub fn run<S: Storage>(engine: &mut Engine<S>, answers: Option<Vec<String>>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match answers {
        Some(answers) => play_scripted(engine, &answers, &mut out),
        None => play_interactive(engine, io::stdin().lock(), &mut out),
    }
}

/// Start a fresh run when the previous one already ended.
fn begin<S: Storage>(engine: &mut Engine<S>) -> Result<()> {
    if engine.active_graph().is_none() {
        bail!("no active graph; select one with `wf graph select <id>`");
    }
    if engine.status() == Status::Terminal {
        engine.reset();
    }
    if engine.status() == Status::Empty {
        bail!("the active graph's start node does not exist");
    }
    Ok(())
}

fn current_question<S: Storage>(engine: &Engine<S>) -> Option<String> {
    engine
        .current_traversal_state()
        .current_node()
        .map(|n| n.description.clone())
}

fn report<W: Write>(out: &mut W, transition: &Transition) -> Result<()> {
    if let Transition::Concluded { result, dangling } = transition {
        if *dangling {
            tracing::debug!("answer led to a missing node");
        }
        writeln!(out, "=> {result}")?;
    }
    Ok(())
}

fn play_scripted<S: Storage, W: Write>(
    engine: &mut Engine<S>,
    answers: &[String],
    out: &mut W,
) -> Result<()> {
    begin(engine)?;
    let mut replies = Vec::with_capacity(answers.len());
    for answer in answers {
        match parse_reply(answer) {
            Some(Reply::Answer(is_yes)) => replies.push(is_yes),
            _ => bail!("invalid answer {answer:?}; use y or n"),
        }
    }

    for (i, is_yes) in replies.into_iter().enumerate() {
        let Some(question) = current_question(engine) else {
            tracing::warn!(
                ignored = answers.len() - i,
                "run already concluded; ignoring remaining answers"
            );
            break;
        };
        writeln!(out, "{question} {}", if is_yes { "y" } else { "n" })?;
        let transition = engine.choose(is_yes);
        report(out, &transition)?;
    }

    if let Some(question) = current_question(engine) {
        writeln!(out, "{question} (awaiting answer)")?;
    }
    Ok(())
}

fn play_interactive<S: Storage, R: BufRead, W: Write>(
    engine: &mut Engine<S>,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    begin(engine)?;
    while let Some(question) = current_question(engine) {
        write!(out, "{question} [y/n] ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read answer")? == 0 {
            writeln!(out)?;
            break;
        }
        match parse_reply(&line) {
            Some(Reply::Answer(is_yes)) => {
                let transition = engine.choose(is_yes);
                report(out, &transition)?;
            }
            Some(Reply::Quit) => break,
            None => writeln!(out, "Please answer y or n (q to quit).")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_demo::add_demo;
    use std::io::Cursor;
    use wfserial::v1::{EngineConfig, Graph, MemoryStorage, Node};

    fn demo_engine() -> Engine<MemoryStorage> {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        add_demo(&mut engine);
        engine
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply("Y"), Some(Reply::Answer(true)));
        assert_eq!(parse_reply(" no\n"), Some(Reply::Answer(false)));
        assert_eq!(parse_reply("q"), Some(Reply::Quit));
        assert_eq!(parse_reply("maybe"), None);
    }

    #[test]
    fn test_scripted_run_to_conclusion() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        play_scripted(&mut engine, &["y".into(), "y".into()], &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Is it raining outside today? y"));
        assert!(text.contains("=> go out with an umbrella"));
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_scripted_partial_run() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        play_scripted(&mut engine, &["n".into()], &mut out).unwrap();
        assert!(output(out).contains("Do you feel like going out? (awaiting answer)"));
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_scripted_extra_answers_ignored() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        let answers: Vec<String> = ["n", "n", "y", "y"].iter().map(|s| s.to_string()).collect();
        play_scripted(&mut engine, &answers, &mut out).unwrap();
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].result, "rest at home");
    }

    #[test]
    fn test_scripted_rejects_bad_answer_before_playing() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        assert!(play_scripted(&mut engine, &["y".into(), "perhaps".into()], &mut out).is_err());
        assert!(engine.path().is_empty());
    }

    #[test]
    fn test_terminal_run_restarts() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        play_scripted(&mut engine, &["y".into(), "n".into()], &mut out).unwrap();
        play_scripted(&mut engine, &["n".into(), "y".into()], &mut out).unwrap();
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.history()[0].result, "enjoy the trip");
    }

    #[test]
    fn test_no_active_graph() {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        let mut out = Vec::new();
        let err = play_scripted(&mut engine, &[], &mut out).unwrap_err();
        assert!(err.to_string().contains("no active graph"));
    }

    #[test]
    fn test_unresolved_start_node() {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        engine.add_graph(Graph::new("g", "Broken", "9").with_node(Node::conclusion("1", "", "r")));
        let mut out = Vec::new();
        assert!(play_scripted(&mut engine, &[], &mut out).is_err());
    }

    #[test]
    fn test_interactive_run() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        let input = Cursor::new("maybe\nyes\nno\n");
        play_interactive(&mut engine, input, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Please answer y or n"));
        assert!(text.contains("=> stay inside"));
        assert_eq!(engine.history()[0].result, "stay inside");
    }

    #[test]
    fn test_interactive_quit_and_eof() {
        let mut engine = demo_engine();
        let mut out = Vec::new();
        play_interactive(&mut engine, Cursor::new("y\nq\n"), &mut out).unwrap();
        assert_eq!(engine.path(), ["Is it raining outside today?"]);

        let mut engine = demo_engine();
        play_interactive(&mut engine, Cursor::new(""), &mut out).unwrap();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_dangling_edge_concludes_undefined() {
        let mut engine = Engine::open(MemoryStorage::new(), EngineConfig::default());
        engine.add_graph(
            Graph::new("g", "Dangling", "1")
                .with_node(Node::question("1", "q?", None, Some("404"))),
        );
        let mut out = Vec::new();
        play_scripted(&mut engine, &["y".into()], &mut out).unwrap();
        assert!(output(out).contains("=> undefined conclusion"));
    }
}
