//! Creature Course CLI - Evolve creatures across an obstacle field from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use creature_course::{CourseConfig, ObstacleCourse};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Evolve creatures through an obstacle course.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to course configuration file");
        eprintln!("  generations  Number of generations to run (default: 50)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let generations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(50);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: CourseConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Creature Course");
    println!("===============");
    println!("Field: {}x{}", config.width, config.height);
    println!("Obstacles: {}", config.obstacles.len());
    println!("Population: {}", config.population_size);
    println!("Max steps: {}", config.max_steps);
    println!("Generations: {}", generations);
    println!();

    let mut course = ObstacleCourse::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    });

    // Resume from a previous run's best creature
    let best_path = config_path.with_extension("best.json");
    if course.load_best(&best_path) {
        println!("Resumed best creature (fitness {:.4})", course.best_fitness());
        println!();
    }

    println!("Running...");
    let start = Instant::now();

    for i in 0..generations {
        let ticks = course.run_generation();

        if (i + 1) % (generations / 10).max(1) == 0
            && let Some(summary) = course.history().last()
        {
            println!(
                "  Generation {}/{}: best={:.4}, avg={:.4}, goal={}, dead={}, ticks={}",
                i + 1,
                generations,
                summary.best_fitness,
                summary.avg_fitness,
                summary.reached_goal,
                summary.dead,
                ticks
            );
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("Best fitness: {:.4}", course.best_fitness());
    println!(
        "Time: {:.2}s ({:.1} generations/s)",
        elapsed.as_secs_f32(),
        generations as f32 / elapsed.as_secs_f32()
    );

    match course.save_best(&best_path) {
        Ok(true) => println!("Saved best creature to {}", best_path.display()),
        Ok(false) => println!("No best creature to save"),
        Err(e) => {
            eprintln!("Error saving best creature: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    match serde_json::to_string_pretty(&CourseConfig::default()) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error encoding example config: {}", e);
            std::process::exit(1);
        }
    }
}
