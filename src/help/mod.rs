//! Command introspection behind the `help` command: a registry snapshot of
//! every cog, the detail/index renderers, and the category picker state.

pub mod picker;
pub mod registry;
pub mod render;

pub use picker::{CategoryListing, CategoryPicker, Selection};
pub use registry::{attach_meta, Access, Category, CommandMeta, Registry};
pub use render::{render_command, CommandView};
