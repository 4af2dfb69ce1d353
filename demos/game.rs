//! Interactive point mover.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example game -- points.txt config.toml
//! ```
//!
//! Without a points file, a few hundred random points are generated.

use std::{
    error::Error,
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

use pointree::prelude::*;
use rand::Rng;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let points_path = args.next();
    let config = match args.next() {
        Some(path) => TreeConfig::load(path)?,
        None => TreeConfig::default(),
    };

    let tree = SharedOctree::<f32>::new(config)?;
    match points_path {
        Some(path) => {
            let report = tree.load_points(BufReader::new(File::open(path)?))?;
            println!(
                "Loaded {} points ({} duplicates, {} out of bounds)",
                report.inserted, report.duplicates, report.rejected
            );
        }
        None => {
            let mut rnd = rand::thread_rng();
            let half = config.bounds.half_size;
            for _ in 0..300 {
                let p = Point::new(
                    rnd.gen_range(-half..=half),
                    rnd.gen_range(-half..=half),
                    rnd.gen_range(-half..=half),
                ) + config.bounds.center;
                tree.insert(p)?;
            }
            println!("Generated {} random points", tree.len());
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut selected = loop {
        prompt("Select a point (x y z): ")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        match pointree::load::parse_point::<f32>(&line?) {
            Some(p) if tree.find(&p).is_some() => break p,
            Some(p) => println!("{p} is not in the tree"),
            None => println!("Expected three numbers"),
        }
    };

    loop {
        println!("\nCurrent point: {selected}");
        prompt("Command (w,a,s,d,e,f move, n nearest, r range, p print, q quit): ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim() {
            "q" => break,
            "n" => match tree.read().nearest_other(&selected) {
                Some((p, distance)) => println!("Nearest neighbour: {p} at distance {distance:.2}"),
                None => println!("No other points"),
            },
            "r" => {
                let step = config.step;
                let found = tree.range_query(
                    selected - Point::splat(step * 2.0),
                    selected + Point::splat(step * 2.0),
                )?;
                println!("{} points within {:.2} on each axis", found.len(), step * 2.0);
                for p in found {
                    println!("  {p}");
                }
            }
            "p" => print!("{}", *tree.read()),
            command => match command.parse::<Direction>() {
                Ok(direction) => match tree.move_by_direction(selected, direction) {
                    Ok(MoveOutcome::Moved(p)) => selected = p,
                    Ok(MoveOutcome::Blocked(p)) => println!("Collision with {p}, staying put"),
                    Err(TreeError::OutOfTreeBounds(_)) => println!("Can't go out of the bounds"),
                    Err(err) => println!("{err}"),
                },
                Err(err) => println!("{err}"),
            },
        }
    }

    let snapshot = tree.export_structure();
    println!(
        "Final tree: {} points in {} nodes",
        snapshot.count,
        snapshot.node_count()
    );
    Ok(())
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{text}");
    io::stdout().flush()
}
