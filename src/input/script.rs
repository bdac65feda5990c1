//! Scripted input traces.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! down 30      # key 30 goes down
//! wait 500     # hold for 500 ms
//! up 30
//! reset        # drop all held state
//! ```

use crate::error::{KeyActionError, Result};
use crate::input::raw::RawInputEvent;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Raw(RawInputEvent),
    Wait(Duration),
    Reset,
}

/// Parse a trace; `origin` only labels errors.
pub fn parse_script(text: &str, origin: &Path) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("");
        let arg = words.next();
        let fail =
            |what: &str| KeyActionError::parse(origin, format!("line {}: {}", index + 1, what));

        let number = |arg: Option<&str>| -> Result<u64> {
            arg.ok_or_else(|| fail("missing argument"))?
                .parse::<u64>()
                .map_err(|_| fail("argument is not a number"))
        };

        let step = match verb {
            "down" => ScriptStep::Raw(RawInputEvent::Down(to_code(number(arg)?, &fail)?)),
            "up" => ScriptStep::Raw(RawInputEvent::Up(to_code(number(arg)?, &fail)?)),
            "wait" => ScriptStep::Wait(Duration::from_millis(number(arg)?)),
            "reset" => ScriptStep::Reset,
            other => return Err(fail(&format!("unknown step '{}'", other))),
        };
        if words.next().is_some() {
            return Err(fail("trailing input"));
        }
        steps.push(step);
    }
    Ok(steps)
}

fn to_code(value: u64, fail: &dyn Fn(&str) -> KeyActionError) -> Result<u32> {
    u32::try_from(value).map_err(|_| fail("code out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_comments() {
        let text = "# hold E\ndown 18\nwait 250 # quarter second\n\nup 18\nreset\n";
        let steps = parse_script(text, Path::new("trace.txt")).unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Raw(RawInputEvent::Down(18)),
                ScriptStep::Wait(Duration::from_millis(250)),
                ScriptStep::Raw(RawInputEvent::Up(18)),
                ScriptStep::Reset,
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_script("down 1\njump 2\n", Path::new("trace.txt")).unwrap_err();
        assert!(err.to_string().contains("line 2: unknown step 'jump'"));

        let err = parse_script("wait\n", Path::new("trace.txt")).unwrap_err();
        assert!(err.to_string().contains("line 1: missing argument"));

        let err = parse_script("up 1 2\n", Path::new("trace.txt")).unwrap_err();
        assert!(err.to_string().contains("trailing input"));
    }
}
