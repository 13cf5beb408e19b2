/*
 * Non-Windows stand-in for the native entry points. There is no RichEdit
 * control to host, so every constructor reports `UnsupportedPlatform`. The
 * types exist so code written against this crate compiles on every target.
 */
use crate::control_tree::{ControlEntry, ControlKind, find_control, find_control_of_kind};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::rich_text::RichTextSurface;
use crate::types::{FormConfig, FormattingEffect, SelectionRange, SurfaceCapabilities};

pub type NativeHandle = ();

pub const FORM_ICON_RESOURCE_ID: u16 = 1;

fn unsupported(what: &str) -> PlatformError {
    PlatformError::UnsupportedPlatform(format!(
        "{what} requires a native Win32 RichEdit control"
    ))
}

#[derive(Debug)]
pub struct Form {
    controls: ControlEntry<NativeHandle>,
}

impl Form {
    pub fn controls(&self) -> &ControlEntry<NativeHandle> {
        &self.controls
    }

    pub fn find_control(&self, name: &str) -> Option<&ControlEntry<NativeHandle>> {
        find_control(&self.controls, name)
    }

    pub fn find_rich_text_box(&self, name: &str) -> Option<&ControlEntry<NativeHandle>> {
        find_control_of_kind(&self.controls, name, ControlKind::RichTextBox)
    }
}

pub fn create_form(config: &FormConfig) -> PlatformResult<Form> {
    log::warn!("Platform: form '{}' requested on a non-Windows target", config.name);
    Err(unsupported("create_form"))
}

pub fn create_rich_text_box(_form: &mut Form, name: &str) -> PlatformResult<NativeRichEdit> {
    Err(unsupported(&format!("rich text box '{name}'")))
}

#[derive(Debug, Clone)]
pub struct NativeRichEdit {
    capabilities: SurfaceCapabilities,
}

impl NativeRichEdit {
    pub fn with_capabilities(mut self, capabilities: SurfaceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

impl RichTextSurface for NativeRichEdit {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    fn text(&self) -> PlatformResult<String> {
        Err(unsupported("WM_GETTEXT"))
    }

    fn selection(&self) -> PlatformResult<SelectionRange> {
        Err(unsupported("EM_EXGETSEL"))
    }

    fn select(&mut self, _range: SelectionRange) -> PlatformResult<()> {
        Err(unsupported("EM_EXSETSEL"))
    }

    fn replace_selection_rtf(&mut self, _rtf: &str) -> PlatformResult<()> {
        Err(unsupported("EM_STREAMIN"))
    }

    fn query_text_length(&self) -> PlatformResult<usize> {
        Err(unsupported("EM_GETTEXTLENGTHEX"))
    }

    fn fetch_text(&self, _buffer: &mut [u16]) -> PlatformResult<usize> {
        Err(unsupported("EM_GETTEXTEX"))
    }

    fn set_selection_format(&mut self, _effect: FormattingEffect) -> PlatformResult<()> {
        Err(unsupported("EM_SETCHARFORMAT"))
    }
}
