/*
 * The rich text surface seam. The Win32 implementation sends RichEdit messages
 * to a live control; tests drive the same algorithms through an in-memory fake.
 *
 * Precondition for every method: the caller is on the thread that owns the
 * native control. Nothing here checks that.
 */
use crate::error::Result as PlatformResult;
use crate::types::{FormattingEffect, SelectionRange, SurfaceCapabilities};

pub trait RichTextSurface {
    /// Capabilities resolved when the surface was constructed.
    fn capabilities(&self) -> SurfaceCapabilities;

    /// The control's regular plain-text accessor. May omit hidden text,
    /// see `SurfaceCapabilities::hidden_text`.
    fn text(&self) -> PlatformResult<String>;

    fn selection(&self) -> PlatformResult<SelectionRange>;

    fn select(&mut self, range: SelectionRange) -> PlatformResult<()>;

    /// Replaces the current selection with an RTF fragment. The selection
    /// collapses to the end of the inserted content.
    fn replace_selection_rtf(&mut self, rtf: &str) -> PlatformResult<()>;

    /// Length of the full content in UTF-16 code units, hidden text included.
    fn query_text_length(&self) -> PlatformResult<usize>;

    /// Copies the full content, hidden text included, into `buffer` and
    /// returns the number of code units written (terminator excluded).
    fn fetch_text(&self, buffer: &mut [u16]) -> PlatformResult<usize>;

    /// Applies `effect` to whatever is currently selected.
    fn set_selection_format(&mut self, effect: FormattingEffect) -> PlatformResult<()>;
}
