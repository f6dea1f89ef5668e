use scraper::ElementRef;

use super::text::text_of;

/// Detail blocks that follow `label` inside a notes list.
///
/// Scans the element children of `block` for the first one whose text is
/// `label` (`<dt>Throws:</dt>`), then collects the contiguous run of `<dd>`
/// siblings after it. Missing container or label yields an empty list.
pub fn extract_notes<'a>(block: Option<ElementRef<'a>>, label: &str) -> Vec<ElementRef<'a>> {
    let Some(block) = block else {
        return Vec::new();
    };
    let children: Vec<ElementRef<'a>> = block.children().filter_map(ElementRef::wrap).collect();
    let Some(idx) = children.iter().position(|c| text_of(*c).trim() == label) else {
        return Vec::new();
    };
    children[idx + 1..]
        .iter()
        .take_while(|c| c.value().name() == "dd")
        .copied()
        .collect()
}

/// First detail block for `label`, if any.
pub fn first_note<'a>(block: Option<ElementRef<'a>>, label: &str) -> Option<ElementRef<'a>> {
    extract_notes(block, label).into_iter().next()
}
