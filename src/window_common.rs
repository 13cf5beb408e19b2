/*
 * Win32 host window ("form") for the log viewer: window class registration,
 * native window creation, the icon lookup, and the small window procedure that
 * keeps the docked rich text box filling the client area.
 *
 * A `Form` also mirrors the controls created inside it as a `ControlEntry`
 * tree so they can be found again by name.
 */
use crate::control_tree::{
    ControlEntry, ControlKind, ControlNode, find_control, find_control_of_kind,
};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{FormConfig, FrameStyle, ShowState};

use std::ffi::c_void;
use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
    Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{
        CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, GW_CHILD,
        GetClassInfoExW, GetClientRect, GetWindow, GetWindowTextLengthW, GetWindowTextW, HICON,
        IDC_ARROW, IDI_APPLICATION, LoadCursorW, LoadIconW, RegisterClassExW, SET_WINDOW_POS_FLAGS,
        SHOW_WINDOW_CMD, SW_SHOW, SW_SHOWMINIMIZED, SWP_NOACTIVATE, SWP_NOZORDER, SetWindowPos,
        ShowWindow, WINDOW_EX_STYLE, WM_SIZE, WNDCLASSEXW, WS_CLIPCHILDREN, WS_EX_TOOLWINDOW,
        WS_OVERLAPPEDWINDOW,
    },
    core::{HSTRING, PCWSTR, w},
};

pub type NativeHandle = HWND;

const FORM_CLASS_NAME: PCWSTR = w!("RichLogForms_FormClass");
/// Icon resource looked up in the executable before falling back to the stock icon.
pub const FORM_ICON_RESOURCE_ID: u16 = 1;
// Child control IDs handed to CreateWindowExW via the HMENU slot.
const FIRST_CONTROL_ID: i32 = 1000;

#[derive(Debug)]
pub struct Form {
    hwnd: HWND,
    controls: ControlEntry<HWND>,
    next_control_id: i32,
}

impl Form {
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn name(&self) -> &str {
        self.controls.name()
    }

    pub fn controls(&self) -> &ControlEntry<HWND> {
        &self.controls
    }

    pub fn find_control(&self, name: &str) -> Option<&ControlEntry<HWND>> {
        find_control(&self.controls, name)
    }

    pub fn find_rich_text_box(&self, name: &str) -> Option<&ControlEntry<HWND>> {
        find_control_of_kind(&self.controls, name, ControlKind::RichTextBox)
    }

    pub fn show(&self, state: ShowState) {
        apply_show_state(self.hwnd, state);
    }

    pub(crate) fn allocate_control_id(&mut self) -> i32 {
        let id = self.next_control_id;
        self.next_control_id += 1;
        id
    }

    pub(crate) fn register_control(&mut self, entry: ControlEntry<HWND>) {
        log::debug!(
            "Form '{}': registered control {:?}",
            self.name(),
            entry.handle()
        );
        self.controls.add_child(entry);
    }
}

pub(crate) fn module_instance() -> PlatformResult<HINSTANCE> {
    let module = unsafe { GetModuleHandleW(PCWSTR::null())? };
    Ok(HINSTANCE(module.0))
}

/*
 * Loads the viewer icon from the module's resources, falling back to the stock
 * application icon when the executable does not embed one.
 */
pub(crate) fn load_form_icon(h_instance: HINSTANCE) -> HICON {
    let resource = PCWSTR(FORM_ICON_RESOURCE_ID as usize as *const u16);
    match unsafe { LoadIconW(Some(h_instance), resource) } {
        Ok(icon) => icon,
        Err(err) => {
            log::debug!(
                "Platform: icon resource {FORM_ICON_RESOURCE_ID} not found ({err}), using stock icon."
            );
            unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default()
        }
    }
}

fn register_form_class(h_instance: HINSTANCE) -> PlatformResult<()> {
    unsafe {
        let mut wc_test = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(h_instance), FORM_CLASS_NAME, &mut wc_test).is_ok() {
            log::trace!("Platform: form window class already registered.");
            return Ok(());
        }

        let icon = load_form_icon(h_instance);
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(form_wnd_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: h_instance,
            hIcon: icon,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: FORM_CLASS_NAME,
            hIconSm: icon,
        };

        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("Platform: RegisterClassExW failed: {error:?}");
            Err(PlatformError::InitializationFailed(format!(
                "RegisterClassExW failed: {error:?}"
            )))
        } else {
            log::debug!("Platform: form window class registered.");
            Ok(())
        }
    }
}

fn extended_style(frame: FrameStyle) -> WINDOW_EX_STYLE {
    match frame {
        FrameStyle::Standard => WINDOW_EX_STYLE(0),
        FrameStyle::SizableToolWindow => WS_EX_TOOLWINDOW,
    }
}

fn show_command(state: ShowState) -> Option<SHOW_WINDOW_CMD> {
    match state {
        ShowState::Hidden => None,
        ShowState::Normal => Some(SW_SHOW),
        ShowState::Minimized => Some(SW_SHOWMINIMIZED),
    }
}

fn apply_show_state(hwnd: HWND, state: ShowState) {
    if let Some(cmd) = show_command(state) {
        log::debug!("Platform: showing form {hwnd:?} as {state:?}");
        unsafe { _ = ShowWindow(hwnd, cmd) };
    }
}

/*
 * Creates a top-level form as described by `config`. The window is owned by the
 * caller's message loop from here on; this crate never destroys it.
 */
pub fn create_form(config: &FormConfig) -> PlatformResult<Form> {
    let h_instance = module_instance()?;
    register_form_class(h_instance)?;

    let width = config.explicit_width().unwrap_or(CW_USEDEFAULT);
    let height = config.explicit_height().unwrap_or(CW_USEDEFAULT);
    log::debug!(
        "Platform: creating form '{}' ({width}x{height}, {:?})",
        config.name,
        config.frame_style()
    );

    let hwnd = unsafe {
        CreateWindowExW(
            extended_style(config.frame_style()),
            FORM_CLASS_NAME,
            &HSTRING::from(config.title.as_str()),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            width,
            height,
            None,
            None,
            Some(h_instance),
            None,
        )
    }
    .map_err(|err| {
        PlatformError::WindowCreationFailed(format!(
            "CreateWindowExW for form '{}' failed: {err}",
            config.name
        ))
    })?;

    apply_show_state(hwnd, config.show_state());

    Ok(Form {
        hwnd,
        controls: ControlEntry::new(config.name.clone(), ControlKind::Form, hwnd),
        next_control_id: FIRST_CONTROL_ID,
    })
}

unsafe extern "system" fn form_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_SIZE {
        fill_client_with_first_child(hwnd);
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

pub(crate) fn client_size(hwnd: HWND) -> PlatformResult<(i32, i32)> {
    let mut rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut rect)? };
    Ok((rect.right - rect.left, rect.bottom - rect.top))
}

// The rich text box is docked to fill the form.
fn fill_client_with_first_child(hwnd: HWND) {
    let Ok((width, height)) = client_size(hwnd) else {
        return;
    };
    if let Ok(child) = unsafe { GetWindow(hwnd, GW_CHILD) }
        && !child.is_invalid()
    {
        let flags: SET_WINDOW_POS_FLAGS = SWP_NOZORDER | SWP_NOACTIVATE;
        if let Err(err) = unsafe { SetWindowPos(child, None, 0, 0, width, height, flags) } {
            log::warn!("Platform: resizing docked child {child:?} failed: {err:?}");
        }
    }
}

/*
 * Reads the control text through the window-text accessor. RichEdit ends
 * paragraphs with a bare `\r`, so every line break (`\r`, `\r\n`) comes back
 * as `\n`. Hidden runs are omitted by RichEdit here; see `hidden_text` for the
 * full read.
 */
pub(crate) fn read_window_text(hwnd: HWND) -> PlatformResult<String> {
    read_window_text_with(
        || unsafe { GetWindowTextLengthW(hwnd) },
        |buf| unsafe { GetWindowTextW(hwnd, buf) },
    )
}

fn read_window_text_with<FLen, FGet>(get_len: FLen, get_text: FGet) -> PlatformResult<String>
where
    FLen: FnOnce() -> i32,
    FGet: FnOnce(&mut [u16]) -> i32,
{
    let len = usize::try_from(get_len()).map_err(|_| {
        PlatformError::OperationFailed("GetWindowTextLengthW reported a negative length".into())
    })?;

    let mut buffer = vec![0u16; len + 1];
    let copied = usize::try_from(get_text(&mut buffer)).map_err(|_| {
        PlatformError::OperationFailed("GetWindowTextW reported a negative length".into())
    })?;
    buffer.truncate(copied.min(len));

    let text = String::from_utf16_lossy(&buffer);
    Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
}
