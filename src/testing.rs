/*
 * In-memory stand-in for a RichEdit control. It stores one record per UTF-16
 * code unit (hidden / link / field target) and understands the RTF subset the
 * link writer produces, so the surface algorithms can be exercised without a
 * native window.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::native_memory::{CountingAllocator, NativeRecord};
use crate::rich_text::RichTextSurface;
use crate::types::{FormattingEffect, HiddenTextAccess, SelectionRange, SurfaceCapabilities};

use std::cell::Cell;
use std::rc::Rc;

const CR: u16 = b'\r' as u16;
const LF: u16 = b'\n' as u16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredUnit {
    pub unit: u16,
    pub hidden: bool,
    pub link: bool,
    pub field_target: Option<Rc<String>>,
}

// Mirrors the head of CHARFORMAT2W; enough for the allocator to see a realistic size.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct FakeCharFormat {
    cb_size: u32,
    mask: u32,
    effects: u32,
    unused: [u32; 24],
}

#[derive(Debug)]
pub(crate) struct FakeRichEdit {
    capabilities: SurfaceCapabilities,
    units: Vec<StoredUnit>,
    selection: SelectionRange,
    allocator: CountingAllocator,
    fail_format: bool,
    fetch_overreport: usize,
    native_fetches: Cell<usize>,
    format_calls: usize,
}

impl FakeRichEdit {
    pub(crate) fn new(capabilities: SurfaceCapabilities) -> Self {
        Self {
            capabilities,
            units: Vec::new(),
            selection: SelectionRange::default(),
            allocator: CountingAllocator::default(),
            fail_format: false,
            fetch_overreport: 0,
            native_fetches: Cell::new(0),
            format_calls: 0,
        }
    }

    /// Replaces the whole content and leaves the caret at the end.
    pub(crate) fn load_rtf(&mut self, rtf: &str) {
        self.units = parse_rtf(rtf);
        self.selection = SelectionRange::caret(self.units.len());
    }

    pub(crate) fn fail_format_calls(&mut self) {
        self.fail_format = true;
    }

    pub(crate) fn overreport_fetch_by(&mut self, extra: usize) {
        self.fetch_overreport = extra;
    }

    pub(crate) fn native_fetch_count(&self) -> usize {
        self.native_fetches.get()
    }

    pub(crate) fn format_call_count(&self) -> usize {
        self.format_calls
    }

    pub(crate) fn allocator(&self) -> &CountingAllocator {
        &self.allocator
    }

    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }

    pub(crate) fn full_text_in(&self, range: SelectionRange) -> String {
        decode(self.units[range.start..range.end()].iter().map(|u| u.unit))
    }

    pub(crate) fn visible_text_in(&self, range: SelectionRange) -> String {
        decode(
            self.units[range.start..range.end()]
                .iter()
                .filter(|u| !u.hidden)
                .map(|u| u.unit),
        )
    }

    pub(crate) fn is_link_across(&self, range: SelectionRange) -> bool {
        !range.is_empty() && self.units[range.start..range.end()].iter().all(|u| u.link)
    }

    pub(crate) fn is_hidden_across(&self, range: SelectionRange) -> bool {
        self.units[range.start..range.end()].iter().all(|u| u.hidden)
    }

    /*
     * What a link-click notification would report for the unit at `position`:
     * the field instruction target for field links, otherwise the whole
     * contiguous link-formatted run including its hidden part.
     */
    pub(crate) fn link_text_at(&self, position: usize) -> Option<String> {
        let unit = self.units.get(position)?;
        if !unit.link {
            return None;
        }
        if let Some(target) = &unit.field_target {
            return Some(target.as_ref().clone());
        }
        let start = self.units[..position]
            .iter()
            .rposition(|u| !u.link)
            .map_or(0, |idx| idx + 1);
        let end = self.units[position..]
            .iter()
            .position(|u| !u.link)
            .map_or(self.units.len(), |idx| position + idx);
        Some(decode(self.units[start..end].iter().map(|u| u.unit)))
    }
}

impl RichTextSurface for FakeRichEdit {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    fn text(&self) -> PlatformResult<String> {
        let include_hidden = matches!(
            self.capabilities.hidden_text,
            HiddenTextAccess::AccessorIncludesHidden
        );
        Ok(decode(
            self.units
                .iter()
                .filter(|u| include_hidden || !u.hidden)
                .map(|u| if u.unit == CR { LF } else { u.unit }),
        ))
    }

    fn selection(&self) -> PlatformResult<SelectionRange> {
        Ok(self.selection)
    }

    fn select(&mut self, range: SelectionRange) -> PlatformResult<()> {
        let start = range.start.min(self.units.len());
        let end = range.end().min(self.units.len());
        self.selection = SelectionRange::new(start, end - start);
        Ok(())
    }

    fn replace_selection_rtf(&mut self, rtf: &str) -> PlatformResult<()> {
        let inserted = parse_rtf(rtf);
        let start = self.selection.start;
        let inserted_len = inserted.len();
        self.units.splice(start..self.selection.end(), inserted);
        self.selection = SelectionRange::caret(start + inserted_len);
        Ok(())
    }

    fn query_text_length(&self) -> PlatformResult<usize> {
        Ok(self.units.len())
    }

    fn fetch_text(&self, buffer: &mut [u16]) -> PlatformResult<usize> {
        self.native_fetches.set(self.native_fetches.get() + 1);
        let written = self.units.len().min(buffer.len().saturating_sub(1));
        for (slot, stored) in buffer.iter_mut().zip(&self.units[..written]) {
            *slot = stored.unit;
        }
        if let Some(terminator) = buffer.get_mut(written) {
            *terminator = 0;
        }
        Ok(written + self.fetch_overreport)
    }

    fn set_selection_format(&mut self, effect: FormattingEffect) -> PlatformResult<()> {
        let record = NativeRecord::new(
            &self.allocator,
            FakeCharFormat {
                cb_size: std::mem::size_of::<FakeCharFormat>() as u32,
                mask: effect.mask,
                effects: effect.effects,
                unused: [0; 24],
            },
        )?;
        self.format_calls += 1;
        if self.fail_format {
            return Err(PlatformError::UnsupportedPlatform(
                "EM_SETCHARFORMAT returned 0".into(),
            ));
        }

        let format = record.read();
        if format.mask & FormattingEffect::LINK.mask != 0 {
            let link = format.effects & FormattingEffect::LINK.effects != 0;
            let range = self.selection;
            for stored in &mut self.units[range.start..range.end()] {
                stored.link = link;
            }
        }
        Ok(())
    }
}

fn decode(units: impl Iterator<Item = u16>) -> String {
    String::from_utf16_lossy(&units.collect::<Vec<_>>())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Text,
    FieldInstruction,
    FieldResult,
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    hidden: bool,
    destination: Destination,
}

struct RtfReader {
    units: Vec<StoredUnit>,
    instruction: Vec<u16>,
    field_target: Option<Rc<String>>,
    stack: Vec<GroupState>,
    current: GroupState,
}

impl RtfReader {
    fn emit(&mut self, unit: u16) {
        match self.current.destination {
            Destination::FieldInstruction => self.instruction.push(unit),
            Destination::Text => self.units.push(StoredUnit {
                unit,
                hidden: self.current.hidden,
                link: false,
                field_target: None,
            }),
            Destination::FieldResult => self.units.push(StoredUnit {
                unit,
                hidden: self.current.hidden,
                link: true,
                field_target: self.field_target.clone(),
            }),
        }
    }

    fn control_word(&mut self, word: &str, param: Option<i32>) {
        match word {
            "fldinst" => {
                self.current.destination = Destination::FieldInstruction;
                self.instruction.clear();
            }
            "fldrslt" => {
                self.current.destination = Destination::FieldResult;
                self.field_target =
                    hyperlink_target(&String::from_utf16_lossy(&self.instruction)).map(Rc::new);
            }
            "v" => self.current.hidden = param != Some(0),
            "par" => self.emit(CR),
            "tab" => self.emit(b'\t' as u16),
            "line" => self.emit(0x0B),
            "u" => self.emit(param.unwrap_or(0) as i16 as u16),
            _ => {}
        }
    }
}

fn parse_rtf(rtf: &str) -> Vec<StoredUnit> {
    let chars: Vec<char> = rtf.chars().collect();
    let mut reader = RtfReader {
        units: Vec::new(),
        instruction: Vec::new(),
        field_target: None,
        stack: Vec::new(),
        current: GroupState {
            hidden: false,
            destination: Destination::Text,
        },
    };

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' => {
                reader.stack.push(reader.current);
                i += 1;
            }
            '}' => {
                if let Some(state) = reader.stack.pop() {
                    reader.current = state;
                }
                i += 1;
            }
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                if next.is_ascii_alphabetic() {
                    let word_start = i;
                    while chars.get(i).is_some_and(|c| c.is_ascii_alphabetic()) {
                        i += 1;
                    }
                    let word: String = chars[word_start..i].iter().collect();
                    let param_start = i;
                    if chars.get(i) == Some(&'-') {
                        i += 1;
                    }
                    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                        i += 1;
                    }
                    let param = chars[param_start..i]
                        .iter()
                        .collect::<String>()
                        .parse::<i32>()
                        .ok();
                    if chars.get(i) == Some(&' ') {
                        i += 1;
                    }
                    reader.control_word(&word, param);
                    // \uN is followed by a one-character fallback.
                    if word == "u" && i < chars.len() {
                        i += 1;
                    }
                } else {
                    if matches!(next, '\\' | '{' | '}') {
                        reader.emit(next as u16);
                    }
                    i += 1;
                }
            }
            '\r' | '\n' => i += 1,
            c => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    reader.emit(*unit);
                }
                i += 1;
            }
        }
    }
    reader.units
}

// `HYPERLINK "target"` with `\"` as the field-level quote escape.
fn hyperlink_target(instruction: &str) -> Option<String> {
    let rest = instruction.trim().strip_prefix("HYPERLINK")?.trim_start();
    let mut chars = rest.strip_prefix('"')?.chars();
    let mut target = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => target.push(chars.next()?),
            '"' => return Some(target),
            other => target.push(other),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_tracks_hidden_toggles() {
        let mut fake = FakeRichEdit::new(SurfaceCapabilities::NATIVE_RICH_EDIT);
        fake.load_rtf(r"{\rtf1\ansi ab\v cd\v0 e}");

        let all = SelectionRange::new(0, fake.len());
        assert_eq!(fake.full_text_in(all), "abcde");
        assert_eq!(fake.visible_text_in(all), "abe");
        assert!(fake.is_hidden_across(SelectionRange::new(2, 2)));
    }

    #[test]
    fn reader_resolves_field_targets() {
        let mut fake = FakeRichEdit::new(SurfaceCapabilities::NATIVE_RICH_EDIT);
        fake.load_rtf(
            r##"{\rtf1\ansi{\field{\*\fldinst{HYPERLINK "a \\"b\\"#c" }}{\fldrslt{x\u233?}}}}"##,
        );

        assert_eq!(fake.full_text_in(SelectionRange::new(0, 2)), "xé");
        assert_eq!(fake.link_text_at(0).as_deref(), Some(r##"a "b"#c"##));
    }
}
