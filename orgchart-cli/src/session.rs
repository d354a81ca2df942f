use crate::config;
use crate::storage::FileStorage;
use crate::terminal::{PrintNavigator, TerminalRenderer, TokioTimer};
use anyhow::{Context, Result, bail};
use frontend::dataflow::Relay;
use frontend::{Navigator, Persistence, Renderer, Timer, ViewCoordinator, ViewEvent};
use shared::TreeNode;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

pub type TerminalCoordinator =
    ViewCoordinator<TerminalRenderer, FileStorage, PrintNavigator, TokioTimer>;

pub struct SessionOptions {
    pub hierarchy: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub state: PathBuf,
}

const HELP: &str = "\
Commands:
  toggle <id>   expand or collapse a node (t)
  open <id>     open the node's detail page (o)
  zoom-in       (+)
  zoom-out      (-)
  show          print the chart again (ls)
  quit          leave the session (q)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(ViewEvent),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Command::Show);
    };
    let arg = parts.next();

    let command = match (verb, arg) {
        ("toggle" | "t", Some(id)) => Command::Event(ViewEvent::ToggleRequested(id.to_string())),
        ("open" | "o", Some(id)) => Command::Event(ViewEvent::ActivateRequested(id.to_string())),
        ("zoom-in" | "+", None) => Command::Event(ViewEvent::ZoomInRequested),
        ("zoom-out" | "-", None) => Command::Event(ViewEvent::ZoomOutRequested),
        ("show" | "ls", None) => Command::Show,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        ("toggle" | "t" | "open" | "o", None) => bail!("'{}' needs a node id", verb),
        _ => bail!("Unknown command: {} (try 'help')", line.trim()),
    };
    Ok(command)
}

/// Indented outline of the materialized nodes, in hierarchy order.
///
/// `▸` marks a collapsed node with children, `▾` an open one, `•` a leaf.
pub fn render_tree<R, P, N, T>(coordinator: &ViewCoordinator<R, P, N, T>) -> String
where
    R: Renderer,
    P: Persistence,
    N: Navigator,
    T: Timer,
{
    let store = coordinator.store();
    let view = coordinator.materialized();
    let mut out = String::new();

    let mut stack: Vec<(&TreeNode, usize)> =
        store.roots().into_iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        if !view.contains(&node.id) {
            continue;
        }
        let children = store.children(&node.id);
        let marker = if children.is_empty() {
            "•"
        } else if children.iter().any(|child| view.contains(&child.id)) {
            "▾"
        } else {
            "▸"
        };
        out.push_str(&format!(
            "{}{} {} [{}]\n",
            "  ".repeat(depth),
            marker,
            node.label,
            node.id
        ));
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

pub fn open(options: &SessionOptions) -> Result<(TerminalCoordinator, Relay<ViewEvent>)> {
    let config = config::load_config(options.config.as_deref())?;
    let store = config::load_hierarchy(options.hierarchy.as_deref())?;
    let storage = FileStorage::new(&options.state);
    log::debug!("Expansion record at {}", storage.path().display());

    let (mut coordinator, relay) = ViewCoordinator::new(
        store,
        storage,
        Some(TerminalRenderer::new(config.view.base_zoom)),
        PrintNavigator::default(),
        TokioTimer,
        &config,
    );
    coordinator.initialize();
    Ok((coordinator, relay))
}

/// Queues one event behind anything already pending and runs the queue dry.
pub async fn dispatch<R, P, N, T>(
    coordinator: &mut ViewCoordinator<R, P, N, T>,
    relay: &Relay<ViewEvent>,
    event: ViewEvent,
) -> Result<()>
where
    R: Renderer,
    P: Persistence,
    N: Navigator,
    T: Timer,
{
    relay.try_send(event).context("Event queue closed")?;
    coordinator.process_pending().await;
    Ok(())
}

pub fn print_tree(options: &SessionOptions) -> Result<()> {
    let (coordinator, _relay) = open(options)?;
    print!("{}", render_tree(&coordinator));
    Ok(())
}

pub async fn run_interactive(options: &SessionOptions, keep_state: bool) -> Result<()> {
    let (mut coordinator, relay) = open(options)?;
    print!("{}", render_tree(&coordinator));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        match parse_command(&line) {
            Ok(Command::Event(event)) => {
                let redraw = matches!(event, ViewEvent::ToggleRequested(_));
                dispatch(&mut coordinator, &relay, event).await?;
                if redraw {
                    print!("{}", render_tree(&coordinator));
                }
            }
            Ok(Command::Show) => print!("{}", render_tree(&coordinator)),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    if !keep_state {
        coordinator.teardown();
    }
    Ok(())
}

pub fn check(options: &SessionOptions) -> Result<()> {
    let store = config::load_hierarchy(options.hierarchy.as_deref())?;
    let depth = store
        .iter()
        .filter_map(|node| store.depth(&node.id))
        .max()
        .unwrap_or(0);
    let leaves = store
        .iter()
        .filter(|node| !store.has_children(&node.id))
        .count();

    println!(
        "✅ Hierarchy OK: {} nodes, {} roots, {} leaves, depth {}",
        store.len(),
        store.roots().len(),
        leaves,
        depth
    );
    Ok(())
}
