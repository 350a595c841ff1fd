//! Incremental filters over streamed model output.
//!
//! A filter consumes fragments one at a time and produces output as soon as
//! it can be decided; [`filter_stream`] runs one over a fragment stream.

pub mod codeblock;
pub mod think;

pub use codeblock::{extract_complete, CodeBlockExtractor, CodeBlockResult};
pub use think::{strip_complete, ThinkStripper};

use crate::error::Result;
use futures_util::stream::{self, Stream, StreamExt};

pub trait FragmentFilter {
    type Output;

    /// Feeds the next fragment; returns whatever output it settles.
    fn push(&mut self, fragment: &str) -> Option<Self::Output>;

    /// Called once at the end of input to release anything still held back.
    fn finish(&mut self) -> Option<Self::Output>;

    /// A finished filter wants no more input.
    fn is_done(&self) -> bool {
        false
    }
}

/// Runs `filter` over `source`.
///
/// Fragments are pulled one at a time. An error from the source is forwarded
/// and ends the stream without flushing the filter; once the filter reports
/// it is done the source is dropped without being read further.
pub fn filter_stream<S, F>(source: S, filter: F) -> impl Stream<Item = Result<F::Output>>
where
    S: Stream<Item = Result<String>> + Unpin,
    F: FragmentFilter,
{
    stream::unfold(Some((source, filter)), |state| async move {
        let (mut source, mut filter) = state?;
        loop {
            if filter.is_done() {
                return None;
            }
            match source.next().await {
                Some(Ok(fragment)) => {
                    if let Some(output) = filter.push(&fragment) {
                        return Some((Ok(output), Some((source, filter))));
                    }
                }
                Some(Err(e)) => return Some((Err(e), None)),
                None => return filter.finish().map(|output| (Ok(output), None)),
            }
        }
    })
}

/// `Some(text)` unless `text` is empty.
pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
