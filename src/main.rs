use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mapsnake::config::{KeyLayout, Options, Setup};
use mapsnake::game::SnakeGame;
use mapsnake::scores::{ScoreLedger, DEFAULT_SCORE_FILE};

/// Snake game that can be played on maps. Steer with the arrow keys, press
/// space to pause and q to quit.
#[derive(Parser)]
#[command(name = "mapsnake", version, about)]
struct Cli {
    /// End the game when the snake runs into the borders
    #[arg(short = 'b', long)]
    boundaries: bool,

    /// Let the snake turn straight back onto itself (and die)
    #[arg(short = 'c', long)]
    cross: bool,

    /// Playing field size as HEIGHTxWIDTH, ignored when a map is used
    #[arg(short = 'd', long, value_name = "20x25")]
    dimensions: Option<String>,

    /// Don't show which way the snake is heading
    #[arg(short = 'e', long)]
    no_direction: bool,

    /// Keys used to steer
    #[arg(short = 'l', long, value_enum, default_value_t = KeyLayout::Arrows)]
    layout: KeyLayout,

    /// Also place cherries (10 points, halve the snake) and ice cream (20 points, grow by 20)
    #[arg(short = 'm', long)]
    more_food_types: bool,

    /// Food on the screen at a time
    #[arg(short = 'n', long, default_value_t = 1)]
    number_of_food: usize,

    /// Milliseconds per step, lower is faster. Try 50 for a challenge
    #[arg(short = 's', long, default_value_t = 125)]
    speed: u64,

    /// High score file
    #[arg(long, default_value = DEFAULT_SCORE_FILE)]
    scores: PathBuf,

    /// Map file
    #[arg(default_value = "map")]
    map: PathBuf,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            boundaries: self.boundaries,
            cross: self.cross,
            dimensions: self.dimensions.clone(),
            no_direction: self.no_direction,
            layout: self.layout,
            more_food_types: self.more_food_types,
            number_of_food: self.number_of_food,
            speed: self.speed,
            map: self.map.clone(),
        }
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let (columns, rows) = crossterm::terminal::size().context("Failed to read terminal size")?;
    let setup = Setup::build(&cli.options(), (rows as i32, columns as i32))?;

    let mut game = SnakeGame::new(setup.clone())?;
    let report = game.run()?;
    info!("finished with {:?}", report);

    let mut ledger = ScoreLedger::load(&cli.scores);
    if report.counts_as_played() {
        ledger.record(&setup.fingerprint, report.score);
        ledger.save(&cli.scores).context("Failed to save high scores")?;
    }

    report.print(&setup, &ledger);
    Ok(())
}
