use crate::view_model::{ProgressPatch, TaskListView, ViewChange};

/// Rendering substrate. The core only ever talks to the screen through this.
pub trait Renderer {
    /// Swap the whole task list in one go.
    fn render_list(&mut self, list: &TaskListView);
    /// Update progress bar width and the speed/eta/percent labels of one row.
    fn patch_task(&mut self, task_id: &str, patch: &ProgressPatch);
    fn set_status(&mut self, text: &str);
    fn set_log_title(&mut self, title: &str);
    fn replace_log(&mut self, text: &str);
    fn append_log(&mut self, text: &str);
    fn scroll_log_to_bottom(&mut self);
    fn close_log(&mut self);
}

pub fn apply_view_changes(renderer: &mut dyn Renderer, changes: &[ViewChange]) {
    for change in changes {
        match change {
            ViewChange::ReplaceList(list) => renderer.render_list(list),
            ViewChange::PatchTask { task_id, patch } => renderer.patch_task(task_id, patch),
            ViewChange::Status(text) => renderer.set_status(text),
            ViewChange::LogTitle(title) => renderer.set_log_title(title),
            ViewChange::ReplaceLog(text) => renderer.replace_log(text),
            ViewChange::AppendLog(text) => renderer.append_log(text),
            ViewChange::ScrollLogToBottom => renderer.scroll_log_to_bottom(),
            ViewChange::CloseLog => renderer.close_log(),
        }
    }
}
