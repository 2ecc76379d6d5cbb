use std::{env, error::Error};

use qmaze::{maze::TextMaze, sim::SimConfig, viz::App};

/// Train on the built-in maze, or on an ASCII map given as the first argument
fn main() -> Result<(), Box<dyn Error>> {
    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Debug);

    let maze = match env::args().nth(1) {
        Some(path) => TextMaze::load(path)?,
        None => TextMaze::demo(),
    };
    let mut sim = SimConfig::default().build(&maze)?;

    let stats = {
        let mut app = App::new()?;
        sim.run(&mut app)?
    };

    println!(
        "Finished after {} episodes ({} reached the goal) and {} steps",
        stats.episodes,
        stats.goals,
        sim.controller().total_steps()
    );
    match sim.controller().best_path() {
        Some(best) => println!("Best path: {} cells", best.len()),
        None => println!("No path to the goal was found"),
    }

    Ok(())
}
