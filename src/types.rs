/*
 * Platform-agnostic value types shared by the rich-text helpers and the Win32
 * layer. Nothing in here touches native APIs, so these compile and test on
 * every target.
 */

/// A selection inside a rich text surface, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn caret(position: usize) -> Self {
        Self {
            start: position,
            length: 0,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Character formatting bits applied to the current selection.
///
/// `mask` names the attributes being changed, `effects` carries their new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingEffect {
    pub mask: u32,
    pub effects: u32,
}

impl FormattingEffect {
    /// Link effect: the RichEdit protocol uses 0x20 for both CFM_LINK and CFE_LINK.
    pub const LINK: FormattingEffect = FormattingEffect {
        mask: 0x0000_0020,
        effects: 0x0000_0020,
    };

    pub const fn new(mask: u32, effects: u32) -> Self {
        Self { mask, effects }
    }

    pub fn sets(&self, bit: u32) -> bool {
        self.mask & bit != 0 && self.effects & bit != 0
    }
}

/// How a surface turns a selection into a hyperlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStrategy {
    /// The control renders `HYPERLINK` field markup itself.
    NativeFieldLinks,
    /// Hidden text plus an explicit link character format.
    ManualFormatting,
}

/// Whether the surface's plain text accessor reports text formatted as hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenTextAccess {
    AccessorIncludesHidden,
    AccessorSuppressesHidden,
}

/// Host capabilities, resolved once when a surface is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub links: LinkStrategy,
    pub hidden_text: HiddenTextAccess,
}

impl SurfaceCapabilities {
    /// What a RichEdit 4.1+ (`MSFTEDIT_CLASS`) control offers.
    pub const NATIVE_RICH_EDIT: SurfaceCapabilities = SurfaceCapabilities {
        links: LinkStrategy::NativeFieldLinks,
        hidden_text: HiddenTextAccess::AccessorSuppressesHidden,
    };

    /// Classic rich edit controls: no field links, accessor already returns hidden text.
    pub const CLASSIC_RICH_EDIT: SurfaceCapabilities = SurfaceCapabilities {
        links: LinkStrategy::ManualFormatting,
        hidden_text: HiddenTextAccess::AccessorIncludesHidden,
    };
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self::NATIVE_RICH_EDIT
    }
}

/// Separator between the visible text of a link and its hidden payload.
pub const LINK_PAYLOAD_SEPARATOR: char = '#';

/*
 * The text a click handler receives for a link written by
 * `change_selection_to_link`, split back into its two halves. The split happens
 * at the last separator so visible text may itself contain '#'.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget<'a> {
    pub visible: &'a str,
    pub payload: Option<&'a str>,
}

impl<'a> LinkTarget<'a> {
    pub fn parse(link_text: &'a str) -> Self {
        match link_text.rfind(LINK_PAYLOAD_SEPARATOR) {
            Some(idx) => Self {
                visible: &link_text[..idx],
                payload: Some(&link_text[idx + LINK_PAYLOAD_SEPARATOR.len_utf8()..]),
            },
            None => Self {
                visible: link_text,
                payload: None,
            },
        }
    }
}

/// How a newly created form is first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Hidden,
    Normal,
    Minimized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    Standard,
    SizableToolWindow,
}

pub const DEFAULT_FORM_TITLE: &str = "Log Viewer";

/*
 * Describes the host window the log viewer lives in. Non-positive sizes keep
 * the system default for that dimension.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub name: String,
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub show: bool,
    pub show_minimized: bool,
    pub tool_window: bool,
}

impl FormConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn show_state(&self) -> ShowState {
        match (self.show, self.show_minimized) {
            (false, _) => ShowState::Hidden,
            (true, true) => ShowState::Minimized,
            (true, false) => ShowState::Normal,
        }
    }

    pub fn frame_style(&self) -> FrameStyle {
        if self.tool_window {
            FrameStyle::SizableToolWindow
        } else {
            FrameStyle::Standard
        }
    }

    pub fn explicit_width(&self) -> Option<i32> {
        (self.width > 0).then_some(self.width)
    }

    pub fn explicit_height(&self) -> Option<i32> {
        (self.height > 0).then_some(self.height)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: DEFAULT_FORM_TITLE.to_string(),
            width: 0,
            height: 0,
            show: true,
            show_minimized: false,
            tool_window: false,
        }
    }
}
