#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Rescue Grid levels over stdin.

mod input;
mod level;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use rescue_grid_core::{CellCoord, Event, ObstacleKind};
use rescue_grid_session::Session;
use rescue_grid_system_synergy::synergy;
use rescue_grid_world::{query, removal_methods_for};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::input::{Input, InputError, HELP};

/// Command-line arguments accepted by the Rescue Grid binary.
#[derive(Debug, Parser)]
#[command(name = "rescue-grid", about = "Plays a Rescue Grid level from the terminal")]
struct CliArgs {
    /// Level file in TOML format; the bundled demo level is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Overrides the level's weather seed.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Rescue Grid command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let level = level::load(args.level.as_deref(), args.seed)?;
    info!(
        width = level.width,
        height = level.height,
        survivors = level.survivors.len(),
        obstacles = level.obstacles.len(),
        "level loaded"
    );

    let mut session = Session::new(level).context("level configuration is invalid")?;
    session.subscribe(|event: &Event| println!("  {event:?}"));

    println!("{}", query::welcome_banner(session.world()));
    println!("{HELP}");
    run(&mut session)
}

fn run(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read from stdin")?;

        match input::parse(&line) {
            Ok(Input::Command(command)) => {
                if let Err(error) = session.submit(command) {
                    println!("rejected: {error}");
                }
            }
            Ok(Input::Wait(dt)) => {
                let ticks = session.advance(dt);
                println!("{ticks} ticks elapsed");
            }
            Ok(Input::Show) => show(session),
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => return Ok(()),
            Err(InputError::Empty) => {}
            Err(error) => println!("{error}"),
        }

        if query::status(session.world()).is_terminal() {
            show(session);
            return Ok(());
        }
    }
}

fn show(session: &Session) {
    let world = session.world();
    let (columns, rows) = query::dimensions(world);
    println!(
        "status {:?}, phase {:?}, turn {}, {} s left, planning {:?}, weather {:?}",
        query::status(world),
        query::phase(world),
        query::turn(world),
        query::time_remaining(world),
        query::planning_remaining(world),
        query::weather(world).map(|event| event.kind),
    );

    let rescue = query::rescue_point(world);
    let survivors = query::survivors(world);
    for row in 0..rows {
        let line: String = (0..columns)
            .map(|column| {
                let cell = CellCoord::new(column, row);
                if cell == rescue && survivors.iter().any(|survivor| survivor.cell == cell) {
                    return '@';
                }
                if let Some(survivor) = survivors.iter().find(|survivor| survivor.cell == cell) {
                    return char::from_digit(survivor.id.get() % 10, 10).unwrap_or('S');
                }
                if cell == rescue {
                    return '*';
                }
                query::obstacle_at(world, cell).map_or('.', |obstacle| glyph(obstacle.kind))
            })
            .collect();
        println!("  {line}");
    }

    for survivor in survivors {
        println!(
            "  survivor {} {:?} at ({}, {}) health {}/{} energy {}/{}{}",
            survivor.id.get(),
            survivor.role,
            survivor.cell.column(),
            survivor.cell.row(),
            survivor.health,
            survivor.max_health,
            survivor.energy,
            survivor.max_energy,
            if survivor.used { " (used)" } else { "" },
        );
    }
    for obstacle in query::obstacles(world) {
        let methods: Vec<_> = removal_methods_for(obstacle.kind)
            .iter()
            .map(|spec| spec.method)
            .collect();
        println!(
            "  obstacle {} {:?} at ({}, {}){} methods {:?}",
            obstacle.id.get(),
            obstacle.kind,
            obstacle.cell.column(),
            obstacle.cell.row(),
            if obstacle.locked { " locked" } else { "" },
            methods,
        );
    }
    let discovered = query::discovered_synergies(world);
    for id in query::available_synergies(world) {
        let combo = synergy(id);
        println!(
            "  synergy {:?} ({:?} + {:?}) unlocks {:?}{}",
            id,
            combo.roles[0],
            combo.roles[1],
            combo.effect,
            if discovered.contains(&id) { " (discovered)" } else { "" },
        );
    }
    println!("  inventory {:?}", query::inventory(world));
}

fn glyph(kind: ObstacleKind) -> char {
    match kind {
        ObstacleKind::Rock => 'R',
        ObstacleKind::Swamp => '~',
        ObstacleKind::Tree => 'T',
        ObstacleKind::Fire => 'F',
        ObstacleKind::WaterDam => 'D',
        ObstacleKind::Explosive => 'X',
        ObstacleKind::NarrowPassage => 'N',
        ObstacleKind::DeepWater => 'W',
        ObstacleKind::Bridge => '=',
        ObstacleKind::Ice => 'I',
        ObstacleKind::Fog => '?',
    }
}
