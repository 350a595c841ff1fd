//! Response post-processing: think stripping, code-block extraction, then
//! output. Streamed and complete responses go through the same stages.

use crate::error::Result;
use crate::filters::{extract_complete, filter_stream, strip_complete};
use crate::filters::{CodeBlockExtractor, ThinkStripper};
use crate::output::Sink;
use crate::providers::FragmentStream;
use futures_util::StreamExt;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct Stages {
    pub strip_thinking: bool,
    pub code_block: bool,
}

/// Emits a streamed response as it arrives. Returns the emitted text.
///
/// The sink is finished even when the stream fails, so the terminal is left
/// in a clean state before the error propagates.
pub async fn run_stream<W: Write>(
    source: FragmentStream,
    stages: Stages,
    sink: &mut Sink<W>,
) -> Result<String> {
    let mut stream = source;
    if stages.strip_thinking {
        stream = filter_stream(stream, ThinkStripper::new()).boxed();
    }
    if stages.code_block {
        let mut logged = false;
        stream = filter_stream(stream, CodeBlockExtractor::new())
            .map(move |block| {
                block.map(|block| {
                    if !logged {
                        tracing::debug!(language = %block.language, "extracted code block");
                        logged = true;
                    }
                    block.text
                })
            })
            .boxed();
    }

    let mut emitted = String::new();
    let mut result: Result<()> = Ok(());
    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(fragment) => {
                if let Err(e) = sink.write(&fragment) {
                    result = Err(e.into());
                    break;
                }
                emitted.push_str(&fragment);
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    sink.finish()?;
    result.map(|()| emitted)
}

/// Emits a complete response. Returns the emitted text.
pub fn run_complete<W: Write>(
    response: String,
    stages: Stages,
    sink: &mut Sink<W>,
) -> Result<String> {
    let response = if stages.strip_thinking {
        strip_complete(&response)
    } else {
        response
    };

    let text = if stages.code_block {
        let block = extract_complete(&response);
        tracing::debug!(language = %block.language, "extracted code block");
        block.text
    } else {
        response
    };

    sink.write(&text)?;
    sink.finish()?;
    Ok(text)
}
