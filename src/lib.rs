/*
 * Helpers for a logging library's optional Win32 window sink: creating the host
 * form and its docked rich text box, finding controls by name, and two
 * below-the-API RichEdit operations: reading text including hidden runs, and
 * turning the selection into a link that carries an invisible payload.
 *
 * The rich-text algorithms are written against the `RichTextSurface` trait and
 * compile and test on every platform. The Win32 implementation is only built on
 * Windows; elsewhere the native constructors report `UnsupportedPlatform`.
 */
pub mod control_tree;
#[cfg(target_os = "windows")]
pub(crate) mod controls;
pub mod error;
pub mod hidden_text;
pub mod link_writer;
#[cfg_attr(not(any(target_os = "windows", test)), allow(dead_code))]
pub(crate) mod native_memory;
#[cfg(not(target_os = "windows"))]
pub(crate) mod platform_stub;
#[cfg(target_os = "windows")]
pub(crate) mod platform_windows;
#[cfg(not(target_os = "windows"))]
pub(crate) use platform_stub as platform;
#[cfg(target_os = "windows")]
pub(crate) use platform_windows as platform;
pub mod rich_text;
pub(crate) mod rtf_markup;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

pub use control_tree::{
    ControlEntry, ControlKind, ControlNode, find_control, find_control_of_kind,
    find_control_where,
};
pub use error::{PlatformError, Result as PlatformResult};
pub use hidden_text::get_text_with_hidden_text;
pub use link_writer::change_selection_to_link;
pub use platform::{
    FORM_ICON_RESOURCE_ID, Form, NativeHandle, NativeRichEdit, create_form, create_rich_text_box,
};
pub use rich_text::RichTextSurface;
pub use types::{
    DEFAULT_FORM_TITLE, FormConfig, FormattingEffect, FrameStyle, HiddenTextAccess,
    LINK_PAYLOAD_SEPARATOR, LinkStrategy, LinkTarget, SelectionRange, ShowState,
    SurfaceCapabilities,
};
