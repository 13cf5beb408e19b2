/*
 * Turns the current selection of a rich text surface into a hyperlink whose
 * visible text is followed by an invisible `#payload`. A click handler receives
 * `visible#payload` and recovers the payload with `LinkTarget::parse`.
 *
 * Surfaces that render HYPERLINK fields get a single field fragment. Others get
 * the text with the payload wrapped in hidden formatting, after which the full
 * run is re-selected and given the link effect. `EM_SETCHARFORMAT` only acts on
 * the current selection, so the re-select must come first.
 *
 * Field links leave the caret after the inserted link, manual links leave the
 * link span selected. Calling this again right away therefore inserts a second
 * link at the caret or replaces the first one; it never reformats in place.
 */
use crate::error::Result as PlatformResult;
use crate::rich_text::RichTextSurface;
use crate::rtf_markup::{hidden_payload_link, hyperlink_field};
use crate::types::{FormattingEffect, LinkStrategy, SelectionRange};

pub fn change_selection_to_link<S>(
    surface: &mut S,
    visible_text: &str,
    hidden_payload: &str,
) -> PlatformResult<()>
where
    S: RichTextSurface + ?Sized,
{
    match surface.capabilities().links {
        LinkStrategy::NativeFieldLinks => {
            let rtf = hyperlink_field(visible_text, hidden_payload);
            log::trace!("change_selection_to_link: streaming HYPERLINK field");
            surface.replace_selection_rtf(&rtf)
        }
        LinkStrategy::ManualFormatting => {
            let selection_start = surface.selection()?.start;
            let markup = hidden_payload_link(visible_text, hidden_payload);
            surface.replace_selection_rtf(&markup.rtf)?;

            let link_span = SelectionRange::new(selection_start, markup.span_units);
            surface.select(link_span)?;
            surface
                .set_selection_format(FormattingEffect::LINK)
                .inspect_err(|err| {
                    log::warn!(
                        "change_selection_to_link: link format on {link_span:?} failed: {err}"
                    );
                })
        }
    }
}
