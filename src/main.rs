use clap::Parser;
use color_eyre::Result;
use organizer::{Clock, Config, Profile, SystemClock, cli::{Cli, Commands}, views};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path)?,
        None => Config::load_with_profile(profile)?,
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let today = SystemClock.today();

    // The demo works on its own files and never touches the configured calendar
    if let Some(Commands::Demo { dir }) = &cli.command {
        organizer::cli::handle_demo(dir, today)?;
        return Ok(());
    }

    let calendar_path = config.get_reminders_path();
    let mut calendar = organizer::cli::load_calendar(&calendar_path)?;

    // Dispatch to appropriate command handler
    let modified = match cli.command.unwrap_or(Commands::Week) {
        Commands::Add(args) => {
            organizer::cli::handle_add(&mut calendar, args, today)?;
            true
        }
        Commands::AddInteractive => {
            organizer::cli::handle_add_interactive(&mut calendar, today)?;
            true
        }
        Commands::Remove { title } => {
            organizer::cli::handle_remove(&mut calendar, &title)?;
            true
        }
        Commands::Done { title } => {
            organizer::cli::handle_done(&mut calendar, &title, today)?;
            true
        }
        Commands::Week => {
            views::display_weekly_calendar(&calendar, today);
            false
        }
        Commands::Day { date } => {
            organizer::cli::handle_day(&calendar, date, today)?;
            false
        }
        Commands::Watch => {
            organizer::cli::handle_watch(&mut calendar, &config)?;
            false
        }
        Commands::Demo { .. } => false,
    };

    if modified {
        calendar.save_reminders_to_file(&calendar_path)?;
        log::info!("Saved calendar to {}", calendar_path.display());
    }

    Ok(())
}
