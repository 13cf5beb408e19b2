/*
 * Windows implementation of the native entry points: forms are real top-level
 * windows and rich text boxes are `MSFTEDIT_CLASS` controls.
 */
pub use crate::controls::richedit_handler::{NativeRichEdit, create_rich_text_box};
pub use crate::window_common::{FORM_ICON_RESOURCE_ID, Form, NativeHandle, create_form};
