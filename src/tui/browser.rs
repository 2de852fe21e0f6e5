use std::io;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph};

/// Extensions offered by the browser, matching what the decoder handles.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "gif"];

/// What a browser event amounted to, for the event loop to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    /// An image file was chosen.
    Pick(PathBuf),
    /// The modal should close without picking.
    Close,
    /// Consumed by the browser; redraw.
    Handled,
    /// Not a browser key; no redraw needed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryKind {
    Parent,
    Dir,
    File,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

/// Modal directory listing: directories first, then image files, both
/// sorted by name. Enter or click descends into directories and picks
/// files; Esc closes.
pub struct FileBrowser {
    dir: PathBuf,
    entries: Vec<Entry>,
    state: ListState,
    note: Option<String>,
    modal_area: Rect,
    list_area: Rect,
}

impl FileBrowser {
    pub fn open(dir: PathBuf) -> Self {
        let mut browser = Self {
            dir,
            entries: Vec::new(),
            state: ListState::default(),
            note: None,
            modal_area: Rect::default(),
            list_area: Rect::default(),
        };
        browser.refresh();
        browser
    }

    fn refresh(&mut self) {
        self.note = None;
        let mut entries = match read_entries(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.note = Some(format!("cannot read directory: {err}"));
                Vec::new()
            }
        };
        if let Some(parent) = self.dir.parent() {
            entries.insert(
                0,
                Entry {
                    name: String::from(".."),
                    path: parent.to_path_buf(),
                    kind: EntryKind::Parent,
                },
            );
        }
        if entries.is_empty() && self.note.is_none() {
            self.note = Some(String::from("no image files here"));
        }
        self.entries = entries;
        self.state = ListState::default();
        if !self.entries.is_empty() {
            self.state.select(Some(0));
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as i32;
        let next = (current + delta).clamp(0, self.entries.len() as i32 - 1);
        self.state.select(Some(next as usize));
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.refresh();
    }

    fn ascend(&mut self) {
        if let Some(parent) = self.dir.parent() {
            self.change_dir(parent.to_path_buf());
        }
    }

    fn activate_selected(&mut self) -> BrowserAction {
        let Some(entry) = self.state.selected().and_then(|i| self.entries.get(i)) else {
            return BrowserAction::Handled;
        };
        match entry.kind {
            EntryKind::Parent | EntryKind::Dir => {
                let dir = entry.path.clone();
                self.change_dir(dir);
                BrowserAction::Handled
            }
            EntryKind::File => BrowserAction::Pick(entry.path.clone()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> BrowserAction {
        match key.code {
            KeyCode::Esc => BrowserAction::Close,
            KeyCode::Up => {
                self.move_selection(-1);
                BrowserAction::Handled
            }
            KeyCode::Down => {
                self.move_selection(1);
                BrowserAction::Handled
            }
            KeyCode::Left | KeyCode::Backspace => {
                self.ascend();
                BrowserAction::Handled
            }
            KeyCode::Enter => self.activate_selected(),
            _ => BrowserAction::Ignored,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> BrowserAction {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.move_selection(-1);
                BrowserAction::Handled
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(1);
                BrowserAction::Handled
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let position = Position::new(mouse.column, mouse.row);
                if !self.modal_area.contains(position) {
                    return BrowserAction::Close;
                }
                if self.list_area.contains(position) {
                    let idx = self.state.offset() + usize::from(mouse.row - self.list_area.y);
                    if idx < self.entries.len() {
                        self.state.select(Some(idx));
                        return self.activate_selected();
                    }
                }
                BrowserAction::Handled
            }
            _ => BrowserAction::Ignored,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = modal_area(frame.area());
        self.modal_area = area;
        frame.render_widget(Clear, area);

        let block = Block::bordered().title(format!(" {} ", self.dir.display()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let list_area = match &self.note {
            Some(_) if inner.height > 1 => Rect {
                height: inner.height - 1,
                ..inner
            },
            _ => inner,
        };
        self.list_area = list_area;

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let line = match entry.kind {
                    EntryKind::Parent => Line::from(Span::styled(
                        "../",
                        Style::default().fg(Color::DarkGray),
                    )),
                    EntryKind::Dir => Line::from(Span::styled(
                        format!("{}/", entry.name),
                        Style::default().fg(Color::Cyan),
                    )),
                    EntryKind::File => Line::from(entry.name.clone()),
                };
                ListItem::new(line)
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, list_area, &mut self.state);

        if let Some(note) = &self.note {
            let note_area = Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(note.clone(), Style::default().fg(Color::Red))),
                note_area,
            );
        }
    }
}

fn modal_area(frame: Rect) -> Rect {
    let width = frame.width.saturating_sub(6).clamp(24, 70).min(frame.width);
    let height = frame.height.saturating_sub(4).clamp(8, 18).min(frame.height);
    let x = frame.x + frame.width.saturating_sub(width) / 2;
    let y = frame.y + frame.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            dirs.push(Entry {
                name,
                path,
                kind: EntryKind::Dir,
            });
        } else if is_image_file(&path) {
            files.push(Entry {
                name,
                path,
                kind: EntryKind::File,
            });
        }
    }
    dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    dirs.extend(files);
    Ok(dirs)
}
