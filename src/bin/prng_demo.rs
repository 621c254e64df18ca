use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use guarded_csprng::driver::{DisplaySurface, Driver, DriverConfig, DriverEvent};
use guarded_csprng::logging;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Terminal stand-in for a text view: one cell is one "pixel"
struct TerminalSurface {
    text: String,
    columns: Option<f32>,
}

impl TerminalSurface {
    fn from_env() -> Self {
        let columns = env::var("COLUMNS").ok().and_then(|c| c.trim().parse::<f32>().ok());
        TerminalSurface { text: String::new(), columns }
    }
}

impl DisplaySurface for TerminalSurface {
    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn viewport_width_px(&self) -> Option<f32> {
        self.columns
    }

    fn char_width_px(&self) -> Option<f32> {
        Some(1.0)
    }

    fn set_text(&mut self, text: String) {
        println!("{}", text);
        self.text = text;
    }
}

fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("logger unavailable: {}", e);
    }

    let config = match DriverConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut driver = match Driver::with_shared(TerminalSurface::from_env(), config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Type text to display it, :reseed to seed from it, :generate for bytes.");
    println!("Enter :quit to exit.");
    prompt();

    let (lines_tx, lines) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                let outcome = match line.trim() {
                    ":quit" => break,
                    ":reseed" => driver.trigger_reseed(),
                    ":generate" => driver.trigger_generate(),
                    _ => {
                        if let Some(surface) = driver.surface_mut() {
                            surface.text = line.clone();
                        }
                        Ok(())
                    }
                };
                if let Err(e) = outcome {
                    eprintln!("{}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let events = driver.pump();
        report(&events);
        if !events.is_empty() {
            prompt();
        }
    }

    report(&driver.wait(SHUTDOWN_GRACE));
    ExitCode::SUCCESS
}

fn report(events: &[DriverEvent]) {
    for event in events {
        match event {
            DriverEvent::Reseeded { consumed } => println!("(reseeded with {} bytes)", consumed),
            DriverEvent::Failed(e) => eprintln!("background task failed: {}", e),
            DriverEvent::Rendered { .. } | DriverEvent::Discarded { .. } => {}
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
