//! Fluke Player: answer a template's prompts on the terminal and print the story.
//!
//! Usage: fluke_play <file.fluke> [--config <path>] [--seed <n>] [--no-shuffle] [--save <path>]

use fluke_engine::config::Settings;
use fluke_engine::core::player::{PlayerError, PlayerSession};
use fluke_engine::core::substitution::SubstitutionError;
use fluke_engine::store::FlukeStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut fluke_path = None;
    let mut config_path = None;
    let mut seed = None;
    let mut no_shuffle = false;
    let mut save_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse::<u64>() {
                    Ok(n) => seed = Some(n),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--save" if i + 1 < args.len() => {
                i += 1;
                save_path = Some(PathBuf::from(&args[i]));
            }
            "--no-shuffle" => no_shuffle = true,
            arg if !arg.starts_with("--") && fluke_path.is_none() => {
                fluke_path = Some(PathBuf::from(arg));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(fluke_path) = fluke_path else {
        print_usage();
        process::exit(1);
    };

    let mut settings = match config_path {
        Some(ref path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };
    if seed.is_some() {
        settings.seed = seed;
    }
    if no_shuffle {
        settings.shuffle_prompts = false;
    }

    // A bare name is looked up in the configured fluke directory.
    let (store, name) = match (fluke_path.parent(), fluke_path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            (FlukeStore::new(parent), name.to_string_lossy().to_string())
        }
        (_, Some(name)) => (
            FlukeStore::from_settings(&settings),
            name.to_string_lossy().to_string(),
        ),
        _ => {
            eprintln!("ERROR: '{}' is not a file", fluke_path.display());
            process::exit(1);
        }
    };

    let template = match store.load(&name) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut session = PlayerSession::from_settings(template, &settings);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let prompts: Vec<_> = session
        .prompts()
        .map(|(index, prompt)| (index, prompt.to_string()))
        .collect();
    for (index, prompt) in &prompts {
        match ask(&mut lines, prompt) {
            Some(answer) => {
                if let Err(e) = session.answer(*index, answer) {
                    eprintln!("ERROR: {}", e);
                    process::exit(1);
                }
            }
            None => process::exit(1),
        }
    }

    let story = loop {
        match session.play() {
            Ok(story) => break story.clone(),
            Err(PlayerError::Substitution(SubstitutionError::InputEmpty(index))) => {
                let prompt = session
                    .template()
                    .inputs()
                    .get(&index)
                    .cloned()
                    .unwrap_or_default();
                println!("Please answer every prompt.");
                match ask(&mut lines, &prompt) {
                    Some(answer) => {
                        if let Err(e) = session.answer(index, answer) {
                            eprintln!("ERROR: {}", e);
                            process::exit(1);
                        }
                    }
                    None => process::exit(1),
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    };

    println!("\n{}\n", story.render());

    if let Some(path) = save_path {
        if let Err(e) = FlukeStore::save_story(&story, &path) {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
        println!("Saved to {}", path.display());
    }
}

/// Ask until a non-blank line arrives. `None` on end of input.
fn ask<B: BufRead>(lines: &mut io::Lines<B>, prompt: &str) -> Option<String> {
    loop {
        print!("{}: ", prompt);
        let _ = io::stdout().flush();
        match lines.next() {
            Some(Ok(line)) if !line.trim().is_empty() => return Some(line),
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                eprintln!("ERROR: {}", e);
                return None;
            }
            None => {
                eprintln!("\nInput ended before every prompt was answered.");
                return None;
            }
        }
    }
}

fn print_usage() {
    println!("Fluke Player: fill in a story template");
    println!();
    println!("Usage: fluke_play <file.fluke> [options]");
    println!();
    println!("Options:");
    println!("  --config <path>  RON settings file");
    println!("  --seed <n>       Seed for the prompt order");
    println!("  --no-shuffle     Ask prompts in index order");
    println!("  --save <path>    Also write the finished story to a text file");
    println!();
    println!("A bare file name is looked up in the configured fluke directory.");
}
