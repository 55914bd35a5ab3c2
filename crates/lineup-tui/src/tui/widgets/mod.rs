// TUI widget modules for each panel.

pub mod compare;
pub mod dialog;
pub mod help;
pub mod pitch;
pub mod players;
pub mod side_info;
pub mod status_bar;
