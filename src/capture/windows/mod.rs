//! Windows capture support
//!
//! gdigrab captures any top-level window by title, so window sources only
//! need the list of visible titles.

pub mod window_list;

pub use window_list::list_windows;
