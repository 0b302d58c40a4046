#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a cellstage grid from an op script.
//!
//! Each positional argument is one authoring operation, for example:
//!
//! ```text
//! cellstage "resize 4x3" "cursor 2 1" "add enemy-spawner" start "tick 6" export
//! ```
//!
//! Operations flow through the pure authoring system into the stage's
//! `apply` entry point; every resulting event is printed on its own line.

mod layout;

use anyhow::{bail, Context, Result};
use cellstage_core::{
    CellCoord, CellStatus, Command, ComponentId, ComponentKind, Event, GridSize, WELCOME_BANNER,
};
use cellstage_grid::{apply, query, Stage};
use cellstage_system_authoring::{Authoring, AuthoringInput};
use clap::Parser;

use crate::layout::StageLayout;

#[derive(Debug, Parser)]
#[command(name = "cellstage", about = "Tile-based stage editor core")]
struct Cli {
    /// Initial number of grid columns.
    #[arg(long, default_value_t = 10)]
    width: u32,

    /// Initial number of grid rows.
    #[arg(long, default_value_t = 10)]
    height: u32,

    /// Encoded stage layout to replay before running any operation.
    #[arg(long)]
    import: Option<String>,

    /// Authoring operations executed in order.
    ops: Vec<String>,
}

/// Entry point for the cellstage command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    println!("{WELCOME_BANNER}");

    let size = GridSize::new(cli.width, cli.height).context("invalid initial grid dimensions")?;
    let mut stage = Stage::new(size);
    let mut authoring = Authoring::new();

    if let Some(encoded) = &cli.import {
        let imported = StageLayout::decode(encoded).context("failed to decode imported layout")?;
        let mut events = Vec::new();
        for command in imported.commands() {
            apply(&mut stage, command, &mut events);
        }
        report(&events, &mut authoring);
    }

    for op in &cli.ops {
        execute(op, &mut stage, &mut authoring)
            .with_context(|| format!("operation {op:?} failed"))?;
    }

    Ok(())
}

/// Parses and runs a single authoring operation.
fn execute(op: &str, stage: &mut Stage, authoring: &mut Authoring) -> Result<()> {
    let mut tokens = op.split_whitespace();
    let verb = tokens.next().context("empty operation")?;

    let mut commands = Vec::new();
    match verb {
        "resize" => {
            let dimensions = tokens.next().context("resize expects WxH")?;
            let (width, height) = parse_dimensions(dimensions)?;
            authoring.handle(
                &[],
                AuthoringInput {
                    resize: Some((width, height)),
                    ..AuthoringInput::default()
                },
                &mut commands,
            );
        }
        "cursor" => {
            let column = parse_number(tokens.next(), "cursor expects a column")?;
            let row = parse_number(tokens.next(), "cursor expects a row")?;
            authoring.handle(
                &[],
                AuthoringInput {
                    cursor: Some(CellCoord::new(column, row)),
                    ..AuthoringInput::default()
                },
                &mut commands,
            );
        }
        "status" => {
            let flags = tokens.next().context("status expects a flag list")?;
            authoring.handle(
                &[],
                AuthoringInput {
                    set_status: Some(parse_status(flags)?),
                    ..AuthoringInput::default()
                },
                &mut commands,
            );
        }
        "add" => {
            let kind = parse_kind(tokens.next().context("add expects a component kind")?)?;
            authoring.handle(
                &[],
                AuthoringInput {
                    add_component: Some(kind),
                    ..AuthoringInput::default()
                },
                &mut commands,
            );
        }
        "remove" => {
            let kind = parse_kind(tokens.next().context("remove expects a component kind")?)?;
            authoring.handle(
                &[],
                AuthoringInput {
                    remove_component: Some(kind),
                    ..AuthoringInput::default()
                },
                &mut commands,
            );
        }
        "remove-id" => {
            let id = parse_number(tokens.next(), "remove-id expects a component id")?;
            commands.push(Command::RemoveComponentById {
                cell: authoring.cursor(),
                component: ComponentId::new(id),
            });
        }
        "start" => commands.push(Command::Start),
        "tick" => {
            let count: u32 = match tokens.next() {
                Some(raw) => raw.parse().context("tick count must be a number")?,
                None => 1,
            };
            for _ in 0..count {
                commands.push(Command::Tick);
            }
        }
        "export" => {
            println!("{}", StageLayout::capture(stage).encode());
            return Ok(());
        }
        "show" => {
            show(stage);
            return Ok(());
        }
        other => bail!("unknown operation {other:?}"),
    }

    if tokens.next().is_some() {
        bail!("trailing arguments after {verb:?}");
    }

    let mut events = Vec::new();
    for command in commands {
        apply(stage, command, &mut events);
    }
    report(&events, authoring);
    Ok(())
}

/// Prints each event and re-syncs the authoring cursor cache.
fn report(events: &[Event], authoring: &mut Authoring) {
    for event in events {
        println!("{event:?}");
    }
    let mut scratch = Vec::new();
    authoring.handle(events, AuthoringInput::default(), &mut scratch);
    debug_assert!(scratch.is_empty(), "an empty input emits no commands");
}

/// Prints a one-line summary per authored cell plus cursor state.
fn show(stage: &Stage) {
    let view = query::stage_view(stage);
    println!(
        "grid {}x{}, cursor ({}, {})",
        view.size.width(),
        view.size.height(),
        view.cursor.column(),
        view.cursor.row()
    );
    for cell in &view.cells {
        if cell.status.is_empty() && cell.components.is_empty() && !cell.hovered {
            continue;
        }
        let kinds: Vec<String> = cell
            .components
            .iter()
            .map(|component| format!("{:?}#{}", component.kind, component.id.get()))
            .collect();
        println!(
            "({}, {}) cell#{} status={:?} hovered={} components=[{}]",
            cell.coord.column(),
            cell.coord.row(),
            cell.id.get(),
            cell.status,
            cell.hovered,
            kinds.join(", ")
        );
    }
}

fn parse_dimensions(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once('x')
        .with_context(|| format!("dimensions {value:?} are not of the form WxH"))?;
    Ok((
        width
            .parse()
            .with_context(|| format!("invalid width {width:?}"))?,
        height
            .parse()
            .with_context(|| format!("invalid height {height:?}"))?,
    ))
}

fn parse_number(token: Option<&str>, message: &'static str) -> Result<u32> {
    token
        .context(message)?
        .parse()
        .context(message)
}

fn parse_status(value: &str) -> Result<CellStatus> {
    match value {
        "none" => return Ok(CellStatus::empty()),
        "all" | "everything" => return Ok(CellStatus::all()),
        _ => {}
    }

    let mut status = CellStatus::empty();
    for flag in value.split(['+', ',']) {
        status |= match flag {
            "movable" => CellStatus::MOVABLE,
            "unit-placeable" => CellStatus::UNIT_PLACEABLE,
            other => bail!("unknown status flag {other:?}"),
        };
    }
    Ok(status)
}

fn parse_kind(value: &str) -> Result<ComponentKind> {
    match value {
        "enemy-spawner" => Ok(ComponentKind::EnemySpawner),
        other => bail!("unknown component kind {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_dimensions, parse_kind, parse_status};
    use cellstage_core::{CellStatus, ComponentKind};

    #[test]
    fn dimensions_parse_from_wxh() {
        assert_eq!(parse_dimensions("4x3").expect("valid"), (4, 3));
        assert!(parse_dimensions("4by3").is_err());
        assert!(parse_dimensions("x3").is_err());
    }

    #[test]
    fn status_flags_parse_individually_and_combined() {
        assert_eq!(parse_status("none").expect("valid"), CellStatus::empty());
        assert_eq!(parse_status("everything").expect("valid"), CellStatus::all());
        assert_eq!(
            parse_status("movable+unit-placeable").expect("valid"),
            CellStatus::all()
        );
        assert!(parse_status("flying").is_err());
    }

    #[test]
    fn component_kinds_parse_from_kebab_case() {
        assert_eq!(
            parse_kind("enemy-spawner").expect("valid"),
            ComponentKind::EnemySpawner
        );
        assert!(parse_kind("portal").is_err());
    }
}
