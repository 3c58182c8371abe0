//! Line-oriented commands used by the headless binary to drive a carousel.
//!
//! ```text
//! loaded 7 300     # item at index 7 rendered 300px wide
//! down 1 500       # pointer 1 pressed at client x 500
//! move 1 380
//! up 1
//! swipe right
//! wait 1500        # let pending fetches land
//! ```

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

use crate::events::{ItemRef, PointerEvent, PointerEventKind, SliderInput};
use crate::gesture::SwipeDirection;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Input(SliderInput),
    Wait(Duration),
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("down", [id, x]) => pointer(PointerEventKind::Down, id, x)?,
        ("move", [id, x]) => pointer(PointerEventKind::Move, id, x)?,
        ("up", [id]) => pointer(PointerEventKind::Up, id, "0")?,
        ("cancel", [id]) => pointer(PointerEventKind::Cancel, id, "0")?,
        ("leave", [id]) => pointer(PointerEventKind::Leave, id, "0")?,
        ("swipe", [dir]) => ScriptCommand::Input(SliderInput::Swipe(direction(dir)?)),
        ("loaded", [index, width]) => ScriptCommand::Input(SliderInput::ItemLoaded {
            item: ItemRef::Index(index.parse().context("item index")?),
            width: number(width)?,
        }),
        ("resize", [width]) => ScriptCommand::Input(SliderInput::Resize(number(width)?)),
        ("settled", []) => ScriptCommand::Input(SliderInput::Settled),
        ("wait", [ms]) => ScriptCommand::Wait(Duration::from_millis(
            ms.parse().context("wait duration in ms")?,
        )),
        _ => bail!("unrecognised command: {line}"),
    };
    Ok(Some(command))
}

fn pointer(kind: PointerEventKind, id: &str, x: &str) -> Result<ScriptCommand> {
    Ok(ScriptCommand::Input(SliderInput::Pointer(PointerEvent {
        kind,
        pointer: id.parse().context("pointer id")?,
        client_x: number(x)?,
    })))
}

fn number(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("not a number: {raw}"))?;
    if !value.is_finite() {
        return Err(anyhow!("not a finite number: {raw}"));
    }
    Ok(value)
}

fn direction(raw: &str) -> Result<SwipeDirection> {
    match raw {
        "left" => Ok(SwipeDirection::Left),
        "right" => Ok(SwipeDirection::Right),
        other => bail!("swipe direction must be left or right, got {other}"),
    }
}
