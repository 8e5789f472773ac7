use std::sync::Arc;

use winit::window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

impl CursorStyle {
    /// Write the cursor into egui's frame output, so egui-winit owns the window cursor
    /// and restores it when the pointer re-enters the window. A cursor egui asked for
    /// itself (over a widget) wins over the default.
    pub fn apply_to(self, output: &mut egui::PlatformOutput) {
        if self == CursorStyle::Pointer {
            output.cursor_icon = egui::CursorIcon::PointingHand;
        }
    }
}

/// Side effects the viewer has on its host: the loading indicator and the cursor.
pub trait HostUi {
    fn set_loading_percent(&mut self, percent: u8);
    fn clear_loading(&mut self);
    fn set_cursor(&mut self, cursor: CursorStyle);
}

/// Present from startup until the load finishes either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingIndicator {
    /// `None` until the first progress value arrives (unknown total).
    pub percent: Option<u8>,
}

/// Window-backed shell. Each frame the app draws `loading()` with egui and
/// hands `cursor()` to egui-winit.
pub struct WindowShell {
    window: Arc<Window>,
    loading: Option<LoadingIndicator>,
    cursor: CursorStyle,
}

impl WindowShell {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            loading: Some(LoadingIndicator { percent: None }),
            cursor: CursorStyle::Default,
        }
    }

    pub fn loading(&self) -> Option<LoadingIndicator> {
        self.loading
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }
}

impl HostUi for WindowShell {
    fn set_loading_percent(&mut self, percent: u8) {
        self.loading = Some(LoadingIndicator {
            percent: Some(percent.min(100)),
        });
        self.window.request_redraw();
    }

    fn clear_loading(&mut self) {
        self.loading = None;
        self.window.request_redraw();
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.window.request_redraw();
        }
    }
}

/// Records every call; used when there is no window (tests, headless runs).
#[derive(Debug, Clone, Default)]
pub struct HeadlessShell {
    pub loading: Option<LoadingIndicator>,
    pub cursor: CursorStyle,
    pub cursor_changes: usize,
    pub percent_history: Vec<u8>,
    pub clear_count: usize,
}

impl HeadlessShell {
    /// Starts with the indicator shown, like the window shell.
    pub fn new() -> Self {
        Self {
            loading: Some(LoadingIndicator { percent: None }),
            ..Default::default()
        }
    }
}

impl HostUi for HeadlessShell {
    fn set_loading_percent(&mut self, percent: u8) {
        self.loading = Some(LoadingIndicator {
            percent: Some(percent),
        });
        self.percent_history.push(percent);
    }

    fn clear_loading(&mut self) {
        self.loading = None;
        self.clear_count += 1;
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.cursor_changes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_style_is_sent_every_frame() {
        let mut output = egui::PlatformOutput::default();
        CursorStyle::Pointer.apply_to(&mut output);
        assert_eq!(output.cursor_icon, egui::CursorIcon::PointingHand);

        // a fresh frame output starts from egui's default again
        let mut next = egui::PlatformOutput::default();
        CursorStyle::Pointer.apply_to(&mut next);
        assert_eq!(next.cursor_icon, egui::CursorIcon::PointingHand);
    }

    #[test]
    fn default_style_leaves_egui_cursor_alone() {
        let mut output = egui::PlatformOutput::default();
        output.cursor_icon = egui::CursorIcon::Text;
        CursorStyle::Default.apply_to(&mut output);
        assert_eq!(output.cursor_icon, egui::CursorIcon::Text);
    }

    #[test]
    fn headless_shell_counts_transitions_only() {
        let mut shell = HeadlessShell::new();
        shell.set_cursor(CursorStyle::Pointer);
        shell.set_cursor(CursorStyle::Pointer);
        shell.set_cursor(CursorStyle::Default);
        assert_eq!(shell.cursor_changes, 2);
        assert!(shell.loading.is_some());
    }
}
