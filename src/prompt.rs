use crate::error::{Error, Result};
use std::io::{self, IsTerminal, Read};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

const CODE_BLOCK_SYSTEM_PROMPT: &str = "You are a helpful assistant. If the user has asked for \
    something written, put it in a single code block (```type\\n...\\n```), otherwise just provide \
    the answer.";

pub fn system_prompt(code_block: bool) -> &'static str {
    if code_block {
        CODE_BLOCK_SYSTEM_PROMPT
    } else {
        DEFAULT_SYSTEM_PROMPT
    }
}

/// Reads all of stdin unless it is an interactive terminal.
pub fn read_stdin() -> Result<Option<String>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut input = String::new();
    stdin.read_to_string(&mut input)?;
    Ok(Some(input))
}

/// Piped input first, then the argument words after a newline.
pub fn build_user_prompt(stdin: Option<&str>, args: &[String]) -> Result<String> {
    let args = args.join(" ");
    let stdin = stdin.filter(|s| !s.trim().is_empty());

    let prompt = match (stdin, args.trim().is_empty()) {
        (Some(piped), true) => piped.to_string(),
        (Some(piped), false) => format!("{piped}\n{args}"),
        (None, false) => args,
        (None, true) => return Err(Error::NoInput),
    };
    Ok(prompt)
}
