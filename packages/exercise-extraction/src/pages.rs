//! Page-boundary markers.
//!
//! Ingestion embeds `--- PAGE <n> ---` sentinels in the text it hands over.
//! They are never needed for extraction itself; they only let records
//! report which pages an exercise spans.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

use crate::types::candidate::LineSpan;

lazy_static! {
    static ref PAGE_MARKER: Regex = Regex::new(r"-{3}[ \t]*PAGE[ \t]+(\d+)[ \t]*-{3}").unwrap();
    static ref TRAILING_MARKER: Regex =
        Regex::new(r"-{3}[ \t]*PAGE[ \t]+\d+[ \t]*-{3}\s*$").unwrap();
}

/// Replace every page marker with a single space.
pub fn strip_page_markers(text: &str) -> Cow<'_, str> {
    PAGE_MARKER.replace_all(text, " ")
}

/// `text` without trailing whitespace or trailing page markers.
///
/// A marker right after an exercise body announces the next page; it is
/// not part of the exercise.
pub fn trim_trailing_markers(text: &str) -> &str {
    let mut rest = text.trim_end();
    while let Some(marker) = TRAILING_MARKER.find(rest) {
        rest = rest[..marker.start()].trim_end();
    }
    rest
}

/// Maps source lines to the page announced by the nearest preceding marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex {
    /// (1-based line of the marker, page number), ascending by line
    markers: Vec<(usize, u32)>,
}

impl PageIndex {
    /// Scan `text` for page markers.
    pub fn build(text: &str) -> Self {
        let markers = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let caps = PAGE_MARKER.captures_iter(line).last()?;
                let page: u32 = caps.get(1)?.as_str().parse().ok()?;
                Some((i + 1, page))
            })
            .collect();

        Self { markers }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Page containing `line`, if any marker precedes it.
    pub fn page_at(&self, line: usize) -> Option<u32> {
        let idx = self.markers.partition_point(|(marker_line, _)| *marker_line <= line);
        idx.checked_sub(1).map(|i| self.markers[i].1)
    }

    /// Sorted, distinct pages touched by a span.
    pub fn pages_for(&self, span: LineSpan) -> Vec<u32> {
        let mut pages: Vec<u32> = self.page_at(span.start_line).into_iter().collect();
        pages.extend(
            self.markers
                .iter()
                .filter(|(line, _)| *line > span.start_line && *line <= span.end_line)
                .map(|(_, page)| *page),
        );
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}
