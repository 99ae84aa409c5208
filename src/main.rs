//! # magic-menu Entry Point
//!
//! Runs a demonstration of the menu engine.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive demo
//! magic-menu
//!
//! # Debug logging to a specific file
//! magic-menu -v --log-file /tmp/magic-menu.log
//!
//! # Numbered line input, no highlight color
//! magic-menu --line-input --no-color
//! ```
//!
//! ## Key Bindings
//!
//! - `Up` / `Down` - Move the selection (wraps around)
//! - `Enter` - Select the highlighted item
//! - `1`-`9` - Select an item directly
//! - `Ctrl+C` / `Ctrl+D` - Cancel (picks the last item); in line input
//!   Ctrl+C takes effect once the pending line read returns

use magic_menu::config::Config;
use magic_menu::logging;
use magic_menu::menu::{
    ansi, confirm, select_option, InterruptFlag, Menu, MenuFlow, MenuRenderer,
    NavigationController,
};
use magic_menu::progress::{self, ProgressBar, SpinnerOptions};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::disable_raw_mode;
use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Entries in the scrolling list demo.
const LONG_LIST_LEN: usize = 60;

/// magic-menu - interactive terminal menus with spinners and progress bars
#[derive(Parser, Debug)]
#[command(name = "magic-menu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Flicker-free interactive terminal menus", long_about = None)]
struct Args {
    /// Read settings from this file instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Use numbered line input even on a terminal
    #[arg(long)]
    line_input: bool,

    /// Do not highlight the selected item with color
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&args, &config);

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.write_all(ansi::SHOW_CURSOR.as_bytes());
        let _ = stdout.flush();

        original_hook(panic_info);
    }));

    let interrupts = InterruptFlag::install().unwrap_or_else(|e| {
        log::warn!("Ctrl+C outside raw mode will end the process: {e}");
        InterruptFlag::new()
    });

    let result = run_demo(&config, &interrupts);
    if let Err(e) = &result {
        log::error!("exiting with error: {e:#}");
    }
    result
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::load(),
    };

    if args.line_input {
        config.line_input = true;
    }
    if args.no_color {
        config.color = false;
    }
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    Ok(config)
}

/// Logging is best effort: without a writable log file the demo still runs.
fn init_logging(args: &Args, config: &Config) {
    let path = match args.log_file.clone().or_else(|| config.log_file.clone()) {
        Some(path) => path,
        None => match Config::default_log_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Logging disabled: {e:#}");
                return;
            }
        },
    };

    if let Err(e) = logging::init(&path, logging::parse_level(&config.log_level)) {
        eprintln!("Logging disabled: {e:#}");
    }
}

/// Menu controller on the real terminal, cancelled by Ctrl+C.
fn controller(
    config: &Config,
    interrupts: &InterruptFlag,
) -> NavigationController<MenuRenderer<io::Stdout>> {
    NavigationController::from_config(config).with_interrupts(interrupts.clone())
}

fn run_demo(config: &Config, interrupts: &InterruptFlag) -> Result<()> {
    let mut nav = controller(config, interrupts);

    let mut menu = Menu::new("Magic Menu Demo")
        .item("Browse a long list", || {
            demo_long_list(config, interrupts)?;
            wait_for_enter()
        })
        .item("Run a task with a spinner", || {
            demo_spinner(config)?;
            wait_for_enter()
        })
        .item("Show a progress bar", || {
            demo_progress()?;
            wait_for_enter()
        })
        .item("Ask for confirmation", || {
            demo_confirm(config, interrupts)?;
            wait_for_enter()
        })
        .back("Exit");

    menu.run(&mut nav)?;
    println!("Goodbye!");
    Ok(())
}

fn demo_long_list(config: &Config, interrupts: &InterruptFlag) -> Result<()> {
    let entries: Vec<String> = (1..=LONG_LIST_LEN)
        .map(|n| format!("List entry number {n:02}"))
        .collect();
    let labels: Vec<&str> = entries.iter().map(String::as_str).collect();

    let mut nav = controller(config, interrupts);
    match select_option(&mut nav, "Long List", &labels)? {
        Some(index) => println!("\nYou picked: {}", entries[index]),
        None => println!("\nNothing picked."),
    }
    Ok(())
}

fn demo_spinner(config: &Config) -> Result<()> {
    println!();
    progress::timed("Simulated work", || {
        progress::with_spinner(
            "Crunching numbers...",
            SpinnerOptions::from(config),
            || {
                thread::sleep(Duration::from_secs(2));
                Ok(())
            },
        )
    })
}

fn demo_progress() -> Result<()> {
    println!();
    let mut bar = ProgressBar::stdout(40, "Processing");
    for _ in 0..40 {
        thread::sleep(Duration::from_millis(50));
        bar.update(1);
    }
    bar.finish();
    Ok(())
}

fn demo_confirm(config: &Config, interrupts: &InterruptFlag) -> Result<()> {
    let mut nav = controller(config, interrupts);
    if confirm(&mut nav, "Do you want to continue?")? {
        println!("\nConfirmed.");
    } else {
        println!("\nDeclined.");
    }
    Ok(())
}

fn wait_for_enter() -> Result<MenuFlow> {
    print!("\nPress Enter to continue...");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(MenuFlow::Continue)
}
