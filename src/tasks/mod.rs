pub mod commands;
pub mod console;
pub mod view;

pub use console::TaskConsole;
pub use view::TaskListView;
