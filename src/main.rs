//! VetCheck - terminal host for the animal health check page.
//!
//! Loads a page description (the bundled demo page unless a path is given),
//! wires the interaction controller to system capabilities and runs the
//! render/input loop, advancing the controller clock every frame.

use std::io;
use std::panic;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use vetcheck::application::{
    Capabilities, Clipboard, InteractionConfig, InteractionController, PageEvent,
};
use vetcheck::domain::{Page, Viewport};
use vetcheck::infrastructure::{
    ConfigLoader, FilePreferenceStore, HtmlPrintSink, LogAnalytics, PageRepository, SystemClipboard,
};
use vetcheck::presentation::{body_height, render_ui, InputHandler, PageView};

const LOG_FILE: &str = "vetcheck.log";
const CONFIG_FILE: &str = "vetcheck.json";
const PREFERENCES_FILE: &str = ".vetcheck_preferences.json";
const REPORT_FILE: &str = "animal_health_report.html";
const FRAME: Duration = Duration::from_millis(16);
const WHEEL_STEP: f64 = 3.0;

/// Entry point for the VetCheck terminal page.
///
/// # Errors
///
/// Returns an error if logging, configuration or the page cannot be set up,
/// or if the terminal interface fails during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_logging();
    install_panic_hook();
    let config = ConfigLoader::load(Some(Path::new(CONFIG_FILE)))?;
    let page = match std::env::args().nth(1) {
        Some(path) => PageRepository::load_page(Path::new(&path))?,
        None => PageRepository::demo_page()?,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, page, config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file through a background writer; the terminal belongs to the UI.
///
/// The returned guard flushes pending lines when dropped.
fn init_logging() -> WorkerGuard {
    let filter = EnvFilter::try_from_env("VETCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("vetcheck=info"));
    let appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();
    guard
}

/// Panic reports go to the log instead of stderr, which would tear the
/// alternate screen. The frame loop recovers from the panic itself.
fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_default();
        error!(location = %location, "{panic_info}");
    }));
}

fn capabilities() -> Capabilities {
    Capabilities {
        analytics: Some(Box::new(LogAnalytics)),
        clipboard: SystemClipboard::connect().map(|clipboard| Box::new(clipboard) as Box<dyn Clipboard>),
        preferences: Some(Box::new(FilePreferenceStore::new(PREFERENCES_FILE))),
        background_update: None,
        print: Some(Box::new(HtmlPrintSink::new(REPORT_FILE))),
    }
}

/// Main event loop.
///
/// Every frame fires due timers, redraws, and handles at most one input
/// event. A panic during a frame is contained and shown as an error toast.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    page: Page,
    config: InteractionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = Instant::now();
    let now = || clock.elapsed().as_millis() as u64;

    let size = terminal.size()?;
    let height = body_height(Rect::new(0, 0, size.width, size.height));
    let mut controller = InteractionController::new(
        page,
        config,
        capabilities(),
        Viewport::new(0.0, f64::from(height)),
    )?;
    let mut view = PageView::new(controller.page());
    controller.start(now());

    let mut loaded = false;
    loop {
        let frame_start = now();
        let frame = controller.guarded(frame_start, |controller| {
            run_frame(terminal, controller, &mut view, &mut loaded, &now)
        });
        if let Some(Err(err)) = frame {
            return Err(err.into());
        }

        if view.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}

fn run_frame<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut InteractionController,
    view: &mut PageView,
    loaded: &mut bool,
    now: &impl Fn() -> u64,
) -> io::Result<()> {
    controller.advance(now());
    terminal.draw(|f| render_ui(f, controller, view))?;

    if !*loaded {
        *loaded = true;
        let elapsed_ms = now();
        controller.handle(PageEvent::WindowLoaded { elapsed_ms }, elapsed_ms);
    }

    if event::poll(poll_timeout(controller, now()))? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                InputHandler::handle_key_event(view, controller, key.code, key.modifiers, now());
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => view.scroll_by(controller, WHEEL_STEP, now()),
                MouseEventKind::ScrollUp => view.scroll_by(controller, -WHEEL_STEP, now()),
                _ => {}
            },
            Event::Resize(width, height) => {
                let height = body_height(Rect::new(0, 0, width, height));
                view.resize(controller, f64::from(height), now());
            }
            _ => {}
        }
    }
    Ok(())
}

/// Waits no longer than one frame, and no longer than the next due timer.
fn poll_timeout(controller: &InteractionController, now: u64) -> Duration {
    controller
        .next_timer_due()
        .map_or(FRAME, |due| Duration::from_millis(due.saturating_sub(now)).min(FRAME))
}
