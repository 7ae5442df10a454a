use std::{
    io,
    sync::{Arc, Mutex},
    thread::sleep,
    time::Duration,
};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ctg_lib::diagnostics::reporter::{Report, Reporter};
use ctg_lib::source::HttpSource;
use ctg_lib::{PlayState, StreamController};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::{self, CliError};
use crate::logging::LogBuffer;
use crate::{controls, logging, ui};

const HEADLESS_REPORT_INTERVAL: Duration = Duration::from_millis(500);

fn http_source(args: &ArgMatches) -> Result<HttpSource, CliError> {
    let url = cli::args::api_url(args);
    let timeout = cli::args::request_timeout(args)?;
    let source = HttpSource::with_timeout(&url, timeout);
    info!("using CTG service at {}", source.base_url());
    Ok(source)
}

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, CliError> {
    match args.subcommand() {
        Some(("export", sub)) => return cli::export::run(sub, &http_source(sub)?),
        Some(("flags", sub)) => {
            return cli::flags::run(sub.get_flag("pretty"), &http_source(sub)?)
        }
        _ => {}
    }

    info!("Starting CTG monitor");
    let settings = cli::args::controller_settings(args)?;
    let seek = cli::args::seek_target(args)?;
    let source = Arc::new(http_source(args)?);
    let mut controller = StreamController::new(source, settings);

    if let Err(err) = controller.load_timeline() {
        warn!(
            "continuing with a {:.0}s timeline: {}",
            controller.total_duration(),
            err
        );
    }

    match seek {
        Some(target) => controller.jump(target)?,
        None => controller.start()?,
    }

    if args.get_flag("quiet") {
        run_headless(&mut controller)
    } else {
        run_tui(&mut controller, &log_buffer)
    }
}

/// Stream without a terminal UI, printing a line whenever the report changes.
fn run_headless(controller: &mut StreamController) -> Result<i32, CliError> {
    let callback: Arc<Mutex<dyn FnMut(Report) + Send>> =
        Arc::new(Mutex::new(|report: Report| {
            println!("{}", controls::report_line(&report));
        }));
    let reporter = Reporter::new(
        controller.session_handle(),
        callback,
        HEADLESS_REPORT_INTERVAL,
    );
    reporter.start();

    let state = loop {
        let state = controller.wait_while_streaming(Duration::from_secs(1));
        if state != PlayState::Streaming {
            break state;
        }
    };
    reporter.stop();

    if state == PlayState::Finished {
        return Ok(0);
    }
    let reason = controller
        .snapshot()
        .last_error
        .unwrap_or_else(|| format!("stream stopped while {:?}", state));
    eprintln!("stream interrupted: {}", reason);
    Ok(1)
}

fn run_tui(controller: &mut StreamController, log_buffer: &LogBuffer) -> Result<i32, CliError> {
    let _raw_mode = RawModeGuard::enable()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // UI / input loop. Stays up after the stream finishes so it can be reset.
    loop {
        let snapshot = controller.snapshot();
        let status = controls::status_text(&snapshot);
        let log_lines = logging::snapshot(log_buffer);
        ui::draw_status(
            &mut terminal,
            &ui::View {
                status: &status,
                snapshot: &snapshot,
                log_lines: &log_lines,
            },
        );

        if !controls::handle_key_event(controller) {
            break;
        }

        sleep(Duration::from_millis(50));
    }

    controller.pause();

    // Restore the terminal state before exiting.
    let _ = terminal.show_cursor();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show);

    Ok(0)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
