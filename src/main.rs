mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use threestyle::{
    app::{App, Control},
    app_dirs::AppDirs,
    auth::{Credential, SharedSecretGate},
    catalog::{Catalog, Violation},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{Action, PracticeEvent, Runner, TerminalEvents},
    seed,
    session::{SessionConfig, SessionPhase},
    store::{ResultLogger, SqliteResultStore},
};

use crate::ui::PracticeView;

const TICK_RATE_MS: u64 = 50;
const PASSWORD_ENV: &str = "THREESTYLE_PASSWORD";

/// timed 3-style commutator practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Drill 3-style commutators in a random order and direction, judge each attempt, and track which pairs need the most practice."
)]
pub struct Cli {
    /// number of pairs to practise in a session
    #[clap(short = 'n', long)]
    number_of_pairs: Option<usize>,

    /// practise every pair in the catalog
    #[clap(short = 'a', long)]
    all: bool,

    /// go straight to the next pair after each verdict
    #[clap(long)]
    no_pause: bool,

    /// CSV file with `pair,alg` columns (defaults to the built-in corner list)
    #[clap(long)]
    seed: Option<PathBuf>,

    /// pairs to leave out of practice, comma separated
    #[clap(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// password allowing results to be logged (or set THREESTYLE_PASSWORD)
    #[clap(long)]
    password: Option<String>,

    /// do not log results
    #[clap(long)]
    no_record: bool,

    /// print pairs ordered by practice priority and exit
    #[clap(long)]
    ranking: bool,

    /// validate the seed list and exit
    #[clap(long)]
    check: bool,

    /// delete every recorded result (needs the password) and exit
    #[clap(long)]
    clear_history: bool,

    /// persist the given options as defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(n) = self.number_of_pairs {
            config.item_count = n;
        }
        if self.no_pause {
            config.pause_between_trials = false;
        }
        if let Some(path) = &self.seed {
            config.seed_path = Some(path.clone());
        }
        if self.no_record {
            config.record_results = false;
        }
        config
    }

    fn credential(&self) -> Option<Credential> {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .and_then(|pw| Credential::from_input(&pw))
    }
}

fn load_catalog(config: &Config) -> Result<(Catalog, Vec<Violation>), Box<dyn Error>> {
    let data = match &config.seed_path {
        Some(path) => seed::load_seed_file(path)?,
        None => seed::default_seed()?,
    };
    for row in &data.rejected_rows {
        eprintln!("skipped seed row: {row}");
    }
    Ok(Catalog::from_items(data.items))
}

fn build_logger(config: &Config, cli: &Cli) -> ResultLogger<SqliteResultStore> {
    if !config.record_results {
        return ResultLogger::new(None, None);
    }
    let store = match AppDirs::db_path().map(SqliteResultStore::open) {
        Some(Ok(store)) => Some(store),
        Some(Err(err)) => {
            log::warn!("result logging disabled: {err}");
            None
        }
        None => None,
    };
    let gate = SharedSecretGate::new(config.auth_secret.clone(), config.password_hash.clone());
    let credential = gate.admit(cli.credential());
    let logger = ResultLogger::new(store, credential);
    if !logger.is_enabled() {
        log::info!("results will not be recorded this run");
    }
    logger
}

fn print_ranking(app: &App<SqliteResultStore>) {
    println!("{:<6} {:>5} {:>10}", "pair", "dnf", "mean (s)");
    for stat in app.priorities() {
        let mean = stat
            .last_three_mean_ms
            .map(|ms| format!("{:.3}", ms / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:>5} {:>10}",
            stat.pair_id, stat.last_three_dnf_count, mean
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
    }

    let (mut catalog, violations) = load_catalog(&config)?;
    for pair in &cli.skip {
        catalog.toggle_skip(pair)?;
    }

    if cli.check {
        for violation in &violations {
            println!("{violation}");
        }
        println!("{} pairs, {} invalid", catalog.count(), violations.len());
        return Ok(());
    }

    let item_count = if cli.all {
        catalog.practicable_items().len()
    } else {
        config.item_count.min(catalog.practicable_items().len())
    };
    let session_config = SessionConfig {
        item_count,
        pause_between_trials: config.pause_between_trials,
    };
    let mut logger = build_logger(&config, &cli);
    if cli.clear_history {
        if logger.clear_history()? {
            println!("result history cleared");
        } else {
            println!("history left untouched: no store or password not accepted");
        }
        return Ok(());
    }
    let mut app = App::new(catalog, violations, logger, session_config);

    if cli.ranking {
        print_ranking(&app);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.new_session();
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<SqliteResultStore>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        TerminalEvents::spawn(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(PracticeView(app), f.area()))?;

    loop {
        match runner.step() {
            PracticeEvent::Tick => {
                // only the timer moves between events
                if app.session.phase() == SessionPhase::Running {
                    terminal.draw(|f| f.render_widget(PracticeView(app), f.area()))?;
                }
            }
            PracticeEvent::Resize => {
                terminal.draw(|f| f.render_widget(PracticeView(app), f.area()))?;
            }
            PracticeEvent::Key(key) => {
                if let Some(action) = Action::from_key(key) {
                    if app.handle(action) == Control::Quit {
                        break;
                    }
                }
                terminal.draw(|f| f.render_widget(PracticeView(app), f.area()))?;
            }
        }
    }

    Ok(())
}
