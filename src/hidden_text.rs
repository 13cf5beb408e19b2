/*
 * Reads a rich text surface's full content, including runs formatted as hidden.
 *
 * When the surface's plain accessor already reports hidden text the accessor
 * value is returned untouched. Otherwise the text is pulled through the native
 * two-phase exchange: ask for the UTF-16 length, fetch into a buffer one unit
 * larger, and keep exactly what the control reports having written.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::rich_text::RichTextSurface;
use crate::types::HiddenTextAccess;

pub fn get_text_with_hidden_text<S>(surface: &S) -> PlatformResult<String>
where
    S: RichTextSurface + ?Sized,
{
    match surface.capabilities().hidden_text {
        HiddenTextAccess::AccessorIncludesHidden => surface.text(),
        HiddenTextAccess::AccessorSuppressesHidden => read_text_with_hidden_with(
            || surface.query_text_length(),
            |buffer| surface.fetch_text(buffer),
        ),
    }
}

// Two-phase read with injected native calls, kept separate so it can be unit tested.
pub(crate) fn read_text_with_hidden_with<FLen, FGet>(
    query_len: FLen,
    fetch: FGet,
) -> PlatformResult<String>
where
    FLen: FnOnce() -> PlatformResult<usize>,
    FGet: FnOnce(&mut [u16]) -> PlatformResult<usize>,
{
    let expected = query_len()?;
    let capacity = expected.checked_add(1).ok_or_else(|| {
        PlatformError::ResourceExhausted(format!(
            "text length {expected} leaves no room for a terminator"
        ))
    })?;

    let mut buffer = vec![0u16; capacity];
    let actual = fetch(&mut buffer)?;
    if actual > expected {
        log::error!(
            "read_text_with_hidden: control wrote {actual} code units after announcing {expected}"
        );
        return Err(PlatformError::ResourceExhausted(format!(
            "rich text fetch returned {actual} code units, expected at most {expected}"
        )));
    }

    let text = &mut buffer[..actual];
    for unit in text.iter_mut() {
        if *unit == u16::from(b'\r') {
            *unit = u16::from(b'\n');
        }
    }
    log::trace!("read_text_with_hidden: read {actual} of {expected} announced code units");
    Ok(String::from_utf16_lossy(text))
}
