mod args;
mod recognizer;

use std::error::Error;
use std::fs::File;
use std::path::Path;

use args::Args;
use clap::Parser;
use log::{debug, LevelFilter};
use network::{Guess, Network, NetworkDescriptor};
use raster::PixelBuffer;
use recognizer::{RecognizeError, Recognizer};
use simplelog::{Config, WriteLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let descriptor = NetworkDescriptor::from_file(&args.network)?;
    let network = Network::from_descriptor(descriptor)?;
    debug!(
        "loaded network: {} layers, {} inputs, {} classes, {} edges",
        network.num_layers(),
        network.input_len(),
        network.output_len(),
        network.edge_count()
    );

    let drawing = load_drawing(&args.image)?;
    debug!("loaded {}x{} drawing", drawing.width(), drawing.height());

    let mut recognizer = Recognizer::new(&network);
    match recognizer.recognize(&drawing) {
        Ok(recognition) => {
            if args.preview {
                print_preview(&recognition.normalized);
            }
            report(&recognition.guesses);
        }
        Err(RecognizeError::NoLegibleInput) => {
            println!("I can't see a digit there. Try darker, bolder strokes.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )
        .unwrap();
    }

    Ok(args)
}

/// Read the drawing as grayscale and flip it to ink intensities: white
/// paper becomes 0, full ink becomes 1.
fn load_drawing(path: &Path) -> Result<PixelBuffer, Box<dyn Error>> {
    let gray = image::open(path)?.to_luma8();

    let mut buffer = PixelBuffer::new(gray.width() as usize, gray.height() as usize);
    for (x, y, pixel) in gray.enumerate_pixels() {
        buffer.set(
            x as usize,
            y as usize,
            1.0 - f32::from(pixel.0[0]) / 255.0,
        );
    }

    Ok(buffer)
}

fn report(guesses: &[Guess]) {
    let top = match guesses.first() {
        Some(top) => top,
        None => return,
    };

    if top.confidence > 0.93 {
        println!("That's a {}!", top.class_value);
    } else if top.confidence > 0.8 {
        println!("I'm pretty sure that's a {}.", top.class_value);
    } else if top.confidence > 0.5 {
        println!("That looks like a {} to me.", top.class_value);
    } else if top.confidence > 0.4 {
        println!(
            "If I really had to guess, I would say it might be a {}.",
            top.class_value
        );
    } else {
        println!("I can't quite read that one.");
    }

    if let Some(second) = guesses.get(1) {
        if second.confidence > 0.4 {
            println!("Though it could also be a {}.", second.class_value);
        }
    }

    println!();
    for guess in guesses {
        println!("  {}", guess);
    }
}

/// Render the canonical grid as ASCII art, darkest ink first.
fn print_preview(buffer: &PixelBuffer) {
    const SHADES: [char; 5] = [' ', '.', ':', 'o', '@'];

    println!("+{}+", "-".repeat(buffer.width()));
    for y in 0..buffer.height() {
        let row: String = (0..buffer.width())
            .map(|x| {
                let value = buffer.get(x, y).clamp(0.0, 1.0);
                SHADES[(value * (SHADES.len() - 1) as f32).round() as usize]
            })
            .collect();
        println!("|{}|", row);
    }
    println!("+{}+", "-".repeat(buffer.width()));
}
