use crate::control_tree::{ControlEntry, ControlKind};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::native_memory::{NativeAllocator, NativeRecord};
use crate::rich_text::RichTextSurface;
use crate::types::{FormattingEffect, SelectionRange, SurfaceCapabilities};
use crate::window_common::{Form, client_size, module_instance, read_window_text};

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::OnceLock;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Com::{CoTaskMemAlloc, CoTaskMemFree};
use windows::Win32::System::LibraryLoader::LoadLibraryW;
use windows::Win32::UI::Controls::RichEdit::{
    CFE_EFFECTS, CFM_MASK, CHARFORMATW, CHARRANGE, EDITSTREAM, EM_EXGETSEL, EM_EXSETSEL,
    EM_GETTEXTEX, EM_GETTEXTLENGTHEX, EM_SETCHARFORMAT, EM_STREAMIN, GETTEXTEX, GETTEXTLENGTHEX,
    MSFTEDIT_CLASS, SCF_SELECTION, SF_RTF, SFF_SELECTION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, ES_AUTOVSCROLL, ES_MULTILINE, ES_NOHIDESEL, ES_READONLY, HMENU,
    SendMessageW, WINDOW_EX_STYLE, WINDOW_STYLE, WS_CHILD, WS_VISIBLE, WS_VSCROLL,
};
use windows::core::{HSTRING, w};

// Text queries are always pinned to UTF-16, never the ANSI codepage.
const UNICODE_CODEPAGE: u32 = 1200;

static RICH_EDIT_LIBRARY: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/*
 * MSFTEDIT_CLASS is registered by Msftedit.dll. The library is loaded once per
 * process and stays loaded; a failed load means the platform has no RichEdit.
 */
fn ensure_rich_edit_library() -> PlatformResult<()> {
    RICH_EDIT_LIBRARY
        .get_or_init(|| {
            unsafe { LoadLibraryW(w!("Msftedit.dll")) }
                .map(|module| log::debug!("Platform: Msftedit.dll loaded at {module:?}"))
                .map_err(|err| format!("Msftedit.dll could not be loaded: {err}"))
        })
        .clone()
        .map_err(PlatformError::UnsupportedPlatform)
}

// Format records cross the message boundary in COM task memory.
struct CoTaskMemAllocator;

impl NativeAllocator for CoTaskMemAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        NonNull::new(unsafe { CoTaskMemAlloc(size) } as *mut u8)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        unsafe { CoTaskMemFree(Some(ptr.as_ptr() as *const c_void)) };
    }
}

/// A live `MSFTEDIT_CLASS` control driven through RichEdit messages.
#[derive(Debug, Clone)]
pub struct NativeRichEdit {
    hwnd: HWND,
    capabilities: SurfaceCapabilities,
}

impl NativeRichEdit {
    /// Wraps an existing RichEdit 4.1+ control.
    pub fn from_hwnd(hwnd: HWND) -> Self {
        Self {
            hwnd,
            capabilities: SurfaceCapabilities::NATIVE_RICH_EDIT,
        }
    }

    pub fn with_capabilities(mut self, capabilities: SurfaceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        unsafe { SendMessageW(self.hwnd, msg, Some(WPARAM(wparam)), Some(LPARAM(lparam))).0 }
    }
}

fn to_char_position(value: usize) -> PlatformResult<i32> {
    i32::try_from(value).map_err(|_| {
        PlatformError::OperationFailed(format!("character position {value} exceeds RichEdit range"))
    })
}

struct RtfStreamContext<'a> {
    data: &'a [u8],
    position: usize,
}

unsafe extern "system" fn rtf_stream_callback(
    cookie: usize,
    buffer: *mut u8,
    requested_bytes: i32,
    written_bytes: *mut i32,
) -> u32 {
    if cookie == 0 || buffer.is_null() || written_bytes.is_null() || requested_bytes < 0 {
        return 1;
    }

    let context = unsafe { &mut *(cookie as *mut RtfStreamContext<'_>) };
    let remaining = &context.data[context.position..];
    let copy_len = remaining.len().min(requested_bytes as usize);
    unsafe {
        std::ptr::copy_nonoverlapping(remaining.as_ptr(), buffer, copy_len);
        *written_bytes = copy_len as i32;
    }
    context.position += copy_len;
    0
}

impl RichTextSurface for NativeRichEdit {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    fn text(&self) -> PlatformResult<String> {
        read_window_text(self.hwnd)
    }

    fn selection(&self) -> PlatformResult<SelectionRange> {
        let mut range = CHARRANGE::default();
        self.send(EM_EXGETSEL, 0, &mut range as *mut CHARRANGE as isize);
        let start = usize::try_from(range.cpMin).map_err(|_| {
            PlatformError::OperationFailed(format!("EM_EXGETSEL returned cpMin {}", range.cpMin))
        })?;
        let end = usize::try_from(range.cpMax).unwrap_or(start).max(start);
        Ok(SelectionRange::new(start, end - start))
    }

    fn select(&mut self, range: SelectionRange) -> PlatformResult<()> {
        let mut char_range = CHARRANGE {
            cpMin: to_char_position(range.start)?,
            cpMax: to_char_position(range.end())?,
        };
        self.send(EM_EXSETSEL, 0, &mut char_range as *mut CHARRANGE as isize);
        Ok(())
    }

    fn replace_selection_rtf(&mut self, rtf: &str) -> PlatformResult<()> {
        let mut context = RtfStreamContext {
            data: rtf.as_bytes(),
            position: 0,
        };
        let mut edit_stream = EDITSTREAM {
            dwCookie: &mut context as *mut RtfStreamContext<'_> as usize,
            dwError: 0,
            pfnCallback: Some(rtf_stream_callback),
        };

        self.send(
            EM_STREAMIN,
            (SF_RTF as usize) | (SFF_SELECTION as usize),
            &mut edit_stream as *mut EDITSTREAM as isize,
        );

        if edit_stream.dwError != 0 {
            return Err(PlatformError::OperationFailed(format!(
                "EM_STREAMIN into selection failed with error code {}",
                edit_stream.dwError
            )));
        }
        Ok(())
    }

    fn query_text_length(&self) -> PlatformResult<usize> {
        let mut request = GETTEXTLENGTHEX {
            codepage: UNICODE_CODEPAGE,
            ..Default::default()
        };
        let length = self.send(
            EM_GETTEXTLENGTHEX,
            &mut request as *mut GETTEXTLENGTHEX as usize,
            0,
        );
        usize::try_from(length).map_err(|_| {
            PlatformError::UnsupportedPlatform(format!("EM_GETTEXTLENGTHEX returned {length}"))
        })
    }

    fn fetch_text(&self, buffer: &mut [u16]) -> PlatformResult<usize> {
        let byte_count = buffer
            .len()
            .checked_mul(std::mem::size_of::<u16>())
            .and_then(|bytes| u32::try_from(bytes).ok())
            .ok_or_else(|| {
                PlatformError::ResourceExhausted(format!(
                    "text buffer of {} code units is too large for EM_GETTEXTEX",
                    buffer.len()
                ))
            })?;
        let mut request = GETTEXTEX {
            cb: byte_count,
            codepage: UNICODE_CODEPAGE,
            ..Default::default()
        };
        let copied = self.send(
            EM_GETTEXTEX,
            &mut request as *mut GETTEXTEX as usize,
            buffer.as_mut_ptr() as isize,
        );
        usize::try_from(copied).map_err(|_| {
            PlatformError::UnsupportedPlatform(format!("EM_GETTEXTEX returned {copied}"))
        })
    }

    fn set_selection_format(&mut self, effect: FormattingEffect) -> PlatformResult<()> {
        let record = NativeRecord::new(
            &CoTaskMemAllocator,
            CHARFORMATW {
                cbSize: std::mem::size_of::<CHARFORMATW>() as u32,
                dwMask: CFM_MASK(effect.mask),
                dwEffects: CFE_EFFECTS(effect.effects),
                ..Default::default()
            },
        )?;

        let result = self.send(
            EM_SETCHARFORMAT,
            SCF_SELECTION as usize,
            record.as_mut_ptr() as isize,
        );
        if result == 0 {
            return Err(PlatformError::UnsupportedPlatform(format!(
                "EM_SETCHARFORMAT rejected mask {:#x} on {:?}",
                effect.mask, self.hwnd
            )));
        }
        Ok(())
    }
}

const DEFAULT_RICH_EDIT_WIDTH: i32 = 10;
const DEFAULT_RICH_EDIT_HEIGHT: i32 = 10;

/*
 * Creates a rich text box docked to fill `form` and registers it in the form's
 * control tree under `name`.
 */
pub fn create_rich_text_box(form: &mut Form, name: &str) -> PlatformResult<NativeRichEdit> {
    if form.find_control(name).is_some() {
        return Err(PlatformError::OperationFailed(format!(
            "Control '{name}' already exists in form '{}'",
            form.name()
        )));
    }
    ensure_rich_edit_library()?;

    let hwnd_parent = form.hwnd();
    let (width, height) = client_size(hwnd_parent).unwrap_or((
        DEFAULT_RICH_EDIT_WIDTH,
        DEFAULT_RICH_EDIT_HEIGHT,
    ));
    let control_id = form.allocate_control_id();

    let hwnd_richedit = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            MSFTEDIT_CLASS,
            &HSTRING::new(),
            WS_CHILD
                | WS_VISIBLE
                | WS_VSCROLL
                | WINDOW_STYLE(ES_READONLY as u32)
                | WINDOW_STYLE(ES_MULTILINE as u32)
                | WINDOW_STYLE(ES_AUTOVSCROLL as u32)
                | WINDOW_STYLE(ES_NOHIDESEL as u32),
            0,
            0,
            width,
            height,
            Some(hwnd_parent),
            Some(HMENU(control_id as isize as *mut c_void)),
            Some(module_instance()?),
            None,
        )
    }
    .map_err(|err| {
        PlatformError::WindowCreationFailed(format!(
            "RichEdit '{name}' could not be created in form '{}': {err}",
            form.name()
        ))
    })?;

    form.register_control(ControlEntry::new(
        name,
        ControlKind::RichTextBox,
        hwnd_richedit,
    ));
    Ok(NativeRichEdit::from_hwnd(hwnd_richedit))
}
