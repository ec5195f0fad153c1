//! Building blocks shared by rule fixes

pub mod indent;
pub mod rename;

pub use indent::{break_before, construct_indent, indent_in, indent_width, make_indent, owner_indent};
pub use rename::{rename_edits, unique_name};
