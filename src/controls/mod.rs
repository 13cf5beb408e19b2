/*
 * Win32 control handlers. Each handler owns the native creation and messaging
 * for one control class.
 */
pub(crate) mod richedit_handler;
