/*
 * Composes the small RTF fragments the link writer streams into a RichEdit
 * selection. All caller text is escaped here; the emitted markup is pure ASCII,
 * so it survives an ANSI stream regardless of the system codepage.
 */
use crate::types::LINK_PAYLOAD_SEPARATOR;

use std::fmt::Write as _;

const RTF_HEADER: &str = r"{\rtf1\ansi";

/// Escaped text plus the number of code units the control will store for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscapedRun {
    pub markup: String,
    pub rendered_units: usize,
}

/// Hidden-payload fragment and the length of the span it occupies once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkMarkup {
    pub rtf: String,
    pub span_units: usize,
}

pub(crate) fn escape_text(text: &str) -> EscapedRun {
    escape_with(text, false)
}

/*
 * Field instructions are parsed twice: once as RTF, then again by the field
 * parser, which treats `\` as its own escape character. Backslashes and quotes
 * therefore get a second level of escaping, and line breaks become `\uN?`
 * because a `\par` would end the instruction.
 */
fn escape_field_argument(text: &str) -> String {
    escape_with(text, true).markup
}

fn escape_with(text: &str, in_field_instruction: bool) -> EscapedRun {
    let mut markup = String::with_capacity(text.len() + 8);
    let mut rendered_units = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_field_instruction => markup.push_str(r"\\\\"),
            '\\' => markup.push_str(r"\\"),
            '{' => markup.push_str(r"\{"),
            '}' => markup.push_str(r"\}"),
            '"' if in_field_instruction => markup.push_str(r#"\\""#),
            '\t' if in_field_instruction => markup.push_str(r"\u9?"),
            '\t' => markup.push_str(r"\tab "),
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                markup.push_str(if in_field_instruction {
                    r"\u13?"
                } else {
                    r"\par "
                });
            }
            c if c.is_ascii() && !c.is_ascii_control() => markup.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(markup, r"\u{}?", *unit as i16);
                }
                rendered_units += c.len_utf16() - 1;
            }
        }
        rendered_units += 1;
    }

    EscapedRun {
        markup,
        rendered_units,
    }
}

/// `HYPERLINK` field whose instruction carries `visible#payload` and whose result shows `visible`.
pub(crate) fn hyperlink_field(visible: &str, payload: &str) -> String {
    let shown = escape_text(visible);
    let target = escape_field_argument(&format!("{visible}{LINK_PAYLOAD_SEPARATOR}{payload}"));
    format!(
        r#"{RTF_HEADER}{{\field{{\*\fldinst{{HYPERLINK "{target}" }}}}{{\fldrslt{{{}}}}}}}}}"#,
        shown.markup
    )
}

/// `visible` followed by `#payload` wrapped in a hidden-text toggle.
pub(crate) fn hidden_payload_link(visible: &str, payload: &str) -> LinkMarkup {
    let shown = escape_text(visible);
    let hidden = escape_text(payload);
    LinkMarkup {
        rtf: format!(
            r"{RTF_HEADER} {}\v {LINK_PAYLOAD_SEPARATOR}{}\v0}}",
            shown.markup, hidden.markup
        ),
        span_units: shown.rendered_units + 1 + hidden.rendered_units,
    }
}
