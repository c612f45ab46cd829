use std::io::Write;

use chrono::Local;
use taskdeck_core::{ProgressPatch, Renderer, StatusStyle, TaskListView, TaskRowView};

const BAR_WIDTH: usize = 20;

/// Line-oriented renderer for a plain terminal.
///
/// Keeps a mirror of the rendered rows so a progress patch can reprint a
/// single row instead of the whole list.
pub struct TerminalRenderer<W: Write> {
    out: W,
    rows: Vec<TaskRowView>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
        }
    }

    /// Hands a URL to the user; a terminal cannot open it by itself.
    pub fn open_external(&mut self, url: &str) {
        let _ = writeln!(self.out, "raw log: {url}");
        let _ = self.out.flush();
    }

    pub fn print_help(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn write_row(&mut self, index: usize) {
        if let Some(row) = self.rows.get(index) {
            let _ = writeln!(self.out, "{}", format_row(row));
            if let Some(error) = &row.error {
                let _ = writeln!(self.out, "      error: {error}");
            }
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_list(&mut self, list: &TaskListView) {
        self.rows = list.rows().to_vec();
        match list {
            TaskListView::Loading => {
                let _ = writeln!(self.out, "Loading tasks…");
            }
            TaskListView::Empty => {
                let _ = writeln!(self.out, "No tasks yet.");
            }
            TaskListView::Error(message) => {
                let _ = writeln!(self.out, "Failed to load tasks: {message}");
            }
            TaskListView::Tasks(_) => {
                let _ = writeln!(self.out, "== Tasks ({}) ==", self.rows.len());
                for index in 0..self.rows.len() {
                    self.write_row(index);
                }
            }
        }
        let _ = self.out.flush();
    }

    fn patch_task(&mut self, task_id: &str, patch: &ProgressPatch) {
        let Some(index) = self.rows.iter().position(|row| row.task_id == task_id) else {
            return;
        };
        let row = &mut self.rows[index];
        row.percent = patch.percent;
        row.speed.clone_from(&patch.speed);
        row.eta.clone_from(&patch.eta);
        self.write_row(index);
        let _ = self.out.flush();
    }

    fn set_status(&mut self, text: &str) {
        let _ = writeln!(self.out, "[{}] {text}", Local::now().format("%H:%M:%S"));
        let _ = self.out.flush();
    }

    fn set_log_title(&mut self, title: &str) {
        let _ = writeln!(self.out, "--- {title} ---");
    }

    fn replace_log(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn append_log(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    // Terminal output always follows the newest line.
    fn scroll_log_to_bottom(&mut self) {}

    fn close_log(&mut self) {
        let _ = writeln!(self.out, "--- log closed ---");
        let _ = self.out.flush();
    }
}

fn format_row(row: &TaskRowView) -> String {
    format!(
        "{marker} {id:<10} {name:<24} {status:<10} [{bar}] {percent:>5.1}%  {speed:>10}  eta {eta}",
        marker = style_marker(row.status_style),
        id = row.task_id,
        name = row.name,
        status = row.status_label,
        bar = progress_bar(row.percent),
        percent = row.percent,
        speed = row.speed,
        eta = row.eta,
    )
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn style_marker(style: StatusStyle) -> char {
    match style {
        StatusStyle::Plain => ' ',
        StatusStyle::Running => '>',
        StatusStyle::Paused => '|',
        StatusStyle::Completed => '+',
        StatusStyle::Failed => '!',
    }
}
