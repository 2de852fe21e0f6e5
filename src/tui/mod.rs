pub mod browser;
pub mod widgets;

use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{prelude::*, Terminal};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::app::App;
use crate::clipboard::Clipboard;
use crate::magnifier;
use browser::{BrowserAction, FileBrowser};
use widgets::{
    anchor_overlay, swatch_rows, FittedView, ImageCanvas, MagnifierWidget, PaletteWidget,
    SelectionPanel,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SIDE_PANEL_WIDTH: u16 = 16;
const HINTS: &str = " o open   p pick   arrows nudge   enter confirm   1-8 swatch   esc cancel   q quit";

type Tty = Terminal<CrosstermBackend<Stdout>>;

/// Put the terminal into raw mode and enter the alternate screen with
/// mouse capture on.
fn setup_terminal() -> Result<Tty> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Tty) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the interactive picker until the user quits. The terminal is
/// restored even when the loop fails.
pub fn run<C: Clipboard>(app: &mut App<C>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app);
    cleanup_terminal(&mut terminal)?;
    result
}

/// One blocking poll/read loop. Everything runs synchronously inside the
/// handler of its triggering event; a frame is drawn only after an event
/// actually changed visible state.
fn event_loop<C: Clipboard>(terminal: &mut Tty, app: &mut App<C>) -> Result<()> {
    let mut screen = Screen::new();
    let mut dirty = true;
    while !app.should_quit() {
        if dirty {
            terminal.draw(|frame| screen.render(frame, app))?;
            dirty = false;
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let mut changed = screen.handle_event(app, event::read()?);
        // Drain queued events (mouse moves arrive in bursts) and redraw once.
        while !app.should_quit() && event::poll(Duration::ZERO)? {
            changed |= screen.handle_event(app, event::read()?);
        }
        dirty = changed;
    }
    Ok(())
}

/// Per-frame view state: the fitted image mapping and the swatch hit rects
/// from the last render, plus the file browser modal when open.
struct Screen {
    view: Option<FittedView>,
    swatches: Vec<Rect>,
    browser: Option<FileBrowser>,
}

impl Screen {
    fn new() -> Self {
        Self {
            view: None,
            swatches: Vec::new(),
            browser: None,
        }
    }

    fn render<C: Clipboard>(&mut self, frame: &mut Frame, app: &App<C>) {
        self.view = None;
        self.swatches.clear();

        let frame_area = frame.area();
        let [main, hint_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame_area);
        let [canvas_area, side_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(SIDE_PANEL_WIDTH)])
                .areas(main);

        self.render_canvas(frame, app, canvas_area);
        self.render_side(frame, app, side_area);
        self.render_overlay(frame, app, frame_area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                HINTS,
                Style::default().fg(Color::DarkGray),
            ))),
            hint_area,
        );
        frame.render_widget(Paragraph::new(app.status()), status_area);

        if let Some(browser) = &mut self.browser {
            browser.render(frame);
        }
    }

    fn render_canvas<C: Clipboard>(&mut self, frame: &mut Frame, app: &App<C>, area: Rect) {
        let title = app
            .image()
            .and_then(|image| image.path().file_name())
            .map(|name| format!(" {} ", name.to_string_lossy()))
            .unwrap_or_else(|| String::from(" pipette "));
        let block = Block::bordered().title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match app.image() {
            Some(image) => {
                if let Some(view) = FittedView::fit(image.width(), image.height(), inner) {
                    frame.render_widget(ImageCanvas::new(image.display(), view), inner);
                    self.view = Some(view);
                }
            }
            None => {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        "no image loaded -- press o to browse",
                        Style::default().fg(Color::DarkGray),
                    )))
                    .centered(),
                    inner,
                );
            }
        }
    }

    fn render_side<C: Clipboard>(&mut self, frame: &mut Frame, app: &App<C>, area: Rect) {
        let [selection_area, palette_area] =
            Layout::vertical([Constraint::Length(4), Constraint::Min(3)]).areas(area);
        frame.render_widget(SelectionPanel::new(app.selection()), selection_area);
        frame.render_widget(PaletteWidget::new(app.palette()), palette_area);
        self.swatches = swatch_rows(palette_area, app.palette().len());
    }

    fn render_overlay<C: Clipboard>(&self, frame: &mut Frame, app: &App<C>, frame_area: Rect) {
        let Some((x, y, color)) = app.hover_sample() else {
            return;
        };
        let (Some(view), Some(image)) = (self.view, app.image()) else {
            return;
        };
        let Some((col, row)) = view.pixel_to_cell(x, y) else {
            return;
        };
        let patch = magnifier::magnify(image.display(), x, y);
        let overlay = anchor_overlay((col, row), MagnifierWidget::CELL_SIZE, frame_area);
        frame.render_widget(Clear, overlay);
        frame.render_widget(MagnifierWidget::new(&patch, color), overlay);
    }

    fn handle_event<C: Clipboard>(&mut self, app: &mut App<C>, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(app, key),
            Event::Mouse(mouse) => self.handle_mouse(app, mouse),
            Event::Resize(_, _) => true,
            _ => false,
        }
    }

    fn handle_key<C: Clipboard>(&mut self, app: &mut App<C>, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.quit();
            return true;
        }
        if let Some(browser) = &mut self.browser {
            let action = browser.handle_key(key);
            return self.on_browser_action(app, action);
        }
        match key.code {
            KeyCode::Char('q') => {
                app.quit();
                true
            }
            KeyCode::Char('o') => {
                self.browser = Some(FileBrowser::open(start_dir(app)));
                true
            }
            KeyCode::Char('p') => {
                app.arm_picker();
                true
            }
            KeyCode::Esc => {
                app.cancel_picker();
                true
            }
            KeyCode::Enter => {
                app.confirm();
                true
            }
            KeyCode::Up => {
                app.nudge(0, -1);
                true
            }
            KeyCode::Down => {
                app.nudge(0, 1);
                true
            }
            KeyCode::Left => {
                app.nudge(-1, 0);
                true
            }
            KeyCode::Right => {
                app.nudge(1, 0);
                true
            }
            KeyCode::Char(c @ '1'..='8') => {
                app.select_swatch(c as usize - '1' as usize);
                true
            }
            _ => false,
        }
    }

    fn handle_mouse<C: Clipboard>(&mut self, app: &mut App<C>, mouse: MouseEvent) -> bool {
        if let Some(browser) = &mut self.browser {
            let action = browser.handle_mouse(mouse);
            return self.on_browser_action(app, action);
        }
        match mouse.kind {
            MouseEventKind::Moved => {
                if let Some((x, y)) = self.pixel_under(mouse.column, mouse.row) {
                    app.pointer_moved(x, y);
                    return app.sampler().is_armed();
                }
                false
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let position = Position::new(mouse.column, mouse.row);
                if let Some(idx) = self.swatches.iter().position(|rect| rect.contains(position)) {
                    app.select_swatch(idx);
                    return true;
                }
                if let Some((x, y)) = self.pixel_under(mouse.column, mouse.row) {
                    app.click(x, y);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn on_browser_action<C: Clipboard>(&mut self, app: &mut App<C>, action: BrowserAction) -> bool {
        match action {
            BrowserAction::Pick(path) => {
                self.browser = None;
                app.load_image(&path);
                true
            }
            BrowserAction::Close => {
                self.browser = None;
                true
            }
            BrowserAction::Handled => true,
            BrowserAction::Ignored => false,
        }
    }

    fn pixel_under(&self, col: u16, row: u16) -> Option<(u32, u32)> {
        self.view?.cell_to_pixel(col, row)
    }
}

fn start_dir<C: Clipboard>(app: &App<C>) -> PathBuf {
    app.image()
        .and_then(|image| image.path().parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
