use std::{collections::HashSet, error::Error, fs, path::Path};

use qmaze::{
    controller::{ControllerConfig, Mode},
    maze::TextMaze,
    sim::SimConfig,
};

const TRAINING_EPISODES: u32 = 300;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/out");
    fs::create_dir_all(path)?;

    let maze = TextMaze::demo();
    let config = SimConfig {
        controller: ControllerConfig {
            training_episodes: TRAINING_EPISODES,
            ..Default::default()
        },
        seed: Some(0),
        ..Default::default()
    };
    let mut sim = config.build(&maze)?;
    let ctl = sim.controller_mut();

    let mut wtr = csv::Writer::from_path(path.join("episodes.csv"))?;
    wtr.write_record(["episode", "steps", "reached_goal", "epsilon"])?;

    while ctl.mode() == Mode::Training {
        if let Some(summary) = ctl.tick().finished {
            wtr.write_record(&[
                summary.episode.to_string(),
                summary.steps.to_string(),
                summary.reached_goal().to_string(),
                format!("{:.4}", summary.epsilon),
            ])?;
        }
    }
    wtr.flush()?;

    println!(
        "Trained for {TRAINING_EPISODES} episodes, {} steps",
        ctl.total_steps()
    );

    let env = ctl.env().clone();
    let route = ctl
        .agent_mut()
        .best_rollout(env.start(), env.goal(), |p| env.is_valid(p), 1000);
    if route.last() != Some(&env.goal()) {
        println!("The greedy policy does not reach the goal yet");
        return Ok(());
    }

    println!("Greedy route, {} moves:", route.len() - 1);
    let on_route = route.iter().copied().collect::<HashSet<_>>();
    for (y, row) in maze.to_string().lines().enumerate() {
        let line = row
            .chars()
            .enumerate()
            .map(|(x, c)| match c {
                '.' if on_route.contains(&(x as i32, y as i32)) => '*',
                c => c,
            })
            .collect::<String>();
        println!("{line}");
    }

    Ok(())
}
