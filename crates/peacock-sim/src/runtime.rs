use crate::command::{Command, CommandError, NodePath};
use crate::config::{Config, ItemConfig};
use crate::events::SimEvent;
use crate::stage::Stage;
use crate::timeline::Timeline;
use anyhow::Context;
use async_channel::Sender;
use peacock::{Menu, MenuError, MenuEvent, NodeId, Point, Size};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

pub type SimMenu = Menu<Stage, Timeline>;

/// Builds the configured button and item tree on a fresh stage.
pub fn build_menu(config: &Config) -> Result<SimMenu, MenuError> {
    let mut stage = Stage::new();
    let button = stage.add_view(config.button.label.clone(), Size::square(config.button.size));
    stage.anchor(button, Point::new(config.button.x, config.button.y));

    let mut menu = Menu::new(stage, button, config.style).with_animator(Timeline::new());
    let root = menu.root();
    add_items(&mut menu, root, &config.items)?;
    Ok(menu)
}

fn add_items(menu: &mut SimMenu, parent: NodeId, items: &[ItemConfig]) -> Result<(), MenuError> {
    for item in items {
        let view = menu
            .host_mut()
            .add_view(item.label.clone(), Size::square(item.size));
        let id = menu.add_item(parent, view)?;

        if item.start_angle.is_some() || item.end_angle.is_some() {
            let arc = menu.style().arc;
            menu.set_angle_range(
                id,
                item.start_angle.unwrap_or(arc.start_angle),
                item.end_angle.unwrap_or(arc.end_angle),
            )?;
        }
        if let Some(radius) = item.radius {
            menu.set_radius(id, radius)?;
        }
        add_items(menu, id, &item.items)?;
    }
    Ok(())
}

pub fn resolve(menu: &SimMenu, path: &NodePath) -> anyhow::Result<NodeId> {
    path.iter().try_fold(menu.root(), |node, &index| {
        menu.tree()
            .child(node, index)
            .with_context(|| format!("no node at path {path}"))
    })
}

/// Moves the timeline on by `dt` and feeds whatever it reports back into the menu.
/// Every event is delivered even if an earlier one fails; the failures are returned.
pub fn step(menu: &mut SimMenu, dt: Duration) -> Vec<MenuError> {
    let Some(timeline) = menu.animator_mut() else {
        return Vec::new();
    };
    let frame = timeline.advance(dt);
    for (view, transform) in frame.samples {
        menu.host_mut().apply(view, transform);
    }
    frame
        .events
        .into_iter()
        .filter_map(|(handle, event)| menu.on_animation_event(handle, event).err())
        .collect()
}

pub fn is_settled(menu: &SimMenu) -> bool {
    !menu.is_animating() && menu.animator().is_none_or(Timeline::is_idle)
}

pub fn dump(menu: &SimMenu) -> String {
    let mut out = String::new();
    dump_node(menu, menu.root(), 0, &mut out);
    out
}

fn dump_node(menu: &SimMenu, id: NodeId, depth: usize, out: &mut String) {
    let Ok(node) = menu.node(id) else {
        return;
    };
    let stage = menu.host();
    let label = stage.label(node.view).map(|l| l.as_str()).unwrap_or("?");
    let placement = match stage.frame(node.view) {
        Some(frame) => format!(
            "at {},{} {}x{}",
            frame.origin.x, frame.origin.y, frame.size.width, frame.size.height
        ),
        None if depth == 0 => "button".to_string(),
        None => "hidden".to_string(),
    };
    let transform = stage.transform(node.view);
    out.push_str(&format!(
        "{:indent$}{label} [{}] {placement} rot={:.0} alpha={:.2}\n",
        "",
        node.status(),
        transform.rotation,
        transform.alpha,
        indent = depth * 2
    ));
    for &child in node.children() {
        dump_node(menu, child, depth + 1, out);
    }
}

enum Flow {
    Continue,
    Wait,
    Quit,
}

fn execute(menu: &mut SimMenu, command: Command) -> anyhow::Result<Flow> {
    match command {
        Command::Toggle(path) => menu.toggle(resolve(menu, &path)?)?,
        Command::Open(path, transition) => menu.open(resolve(menu, &path)?, transition)?,
        Command::Close(path, transition) => menu.close(resolve(menu, &path)?, transition)?,
        Command::Cancel(path) => menu.cancel(resolve(menu, &path)?)?,
        Command::Angles(path, start, end) => {
            menu.set_angle_range(resolve(menu, &path)?, start, end)?
        }
        Command::Radius(path, radius) => menu.set_radius(resolve(menu, &path)?, radius)?,
        Command::Dump => print!("{}", dump(menu)),
        Command::Wait => return Ok(Flow::Wait),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn forward_lines<R: AsyncBufRead + Unpin>(reader: R, tx: Sender<SimEvent>) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(SimEvent::Command(command)).await.is_err() {
                        return;
                    }
                }
                Err(CommandError::Empty) => {}
                Err(e) => log::error!("Ignoring '{}': {}", line.trim(), e),
            },
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read command: {}", e);
                break;
            }
        }
    }
    let _ = tx.send(SimEvent::InputClosed).await;
}

/// Drives the configured menu from `script`, or stdin when no script is given,
/// until the input ends or `quit` is read.
pub async fn run(config: Config, script: Option<PathBuf>) -> anyhow::Result<()> {
    let mut menu = build_menu(&config)?;
    let menu_events = menu.subscribe();
    let (tx, rx) = async_channel::bounded(32);

    match script {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            tokio::spawn(forward_lines(BufReader::new(file), tx));
        }
        None => {
            tokio::spawn(forward_lines(BufReader::new(tokio::io::stdin()), tx));
        }
    }

    let frame = Duration::from_millis(config.frame_ms.max(1));
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut waiting = false;
    let mut input_closed = false;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for e in step(&mut menu, frame) {
                    log::error!("Failed to apply animation event: {}", e);
                }
            }
            event = rx.recv(), if !waiting && !input_closed => match event {
                Ok(SimEvent::Command(command)) => match execute(&mut menu, command) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Wait) => waiting = true,
                    Ok(Flow::Quit) => break,
                    Err(e) => log::error!("{:#}", e),
                },
                Ok(SimEvent::InputClosed) | Err(_) => input_closed = true,
            },
            Ok(event) = menu_events.recv() => println!("{}", describe(&menu, event)),
        }

        if is_settled(&menu) {
            waiting = false;
            if input_closed {
                break;
            }
        }
    }

    menu.teardown()?;
    while let Ok(event) = menu_events.try_recv() {
        println!("{}", describe(&menu, event));
    }
    Ok(())
}

fn describe(menu: &SimMenu, event: MenuEvent) -> String {
    let node = match event {
        MenuEvent::Opened(id) | MenuEvent::Closed(id) | MenuEvent::Selected(id) => id,
    };
    let label = menu
        .node(node)
        .ok()
        .and_then(|n| menu.host().label(n.view))
        .map_or_else(|| node.to_string(), |l| l.to_string());
    match event {
        MenuEvent::Opened(_) => format!("opened {label}"),
        MenuEvent::Closed(_) => format!("closed {label}"),
        MenuEvent::Selected(_) => format!("selected {label}"),
    }
}
