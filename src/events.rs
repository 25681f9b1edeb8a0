use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Pointer-sensitive areas that pause autoplay while hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverRegion {
    Viewport,
    IndicatorStrip,
    NextButton,
    PreviousButton,
}

impl HoverRegion {
    pub const ALL: [Self; 4] = [
        Self::Viewport,
        Self::IndicatorStrip,
        Self::NextButton,
        Self::PreviousButton,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::IndicatorStrip => "indicators",
            Self::NextButton => "next-button",
            Self::PreviousButton => "prev-button",
        }
    }
}

impl fmt::Display for HoverRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound stimulus for the controller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselCommand {
    Next,
    Previous,
    Jump(usize),
    PointerEnter(HoverRegion),
    PointerLeave(HoverRegion),
    TransitionStarted { index: usize, property: String },
    TransitionEnded { index: usize, property: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    Next,
    Previous,
    Jump,
    Autoplay,
}

/// Emitted every time the controller moves to another slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideChange {
    pub from: usize,
    pub to: usize,
    pub cause: ChangeCause,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown hover region `{0}`")]
    UnknownRegion(String),
    #[error("`{0}` needs a slide index")]
    MissingIndex(&'static str),
    #[error("invalid slide index `{0}`")]
    BadIndex(String),
}

impl FromStr for HoverRegion {
    type Err = ParseCommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "viewport" | "slider" => Ok(Self::Viewport),
            "indicators" | "indicator-strip" => Ok(Self::IndicatorStrip),
            "next" | "next-button" => Ok(Self::NextButton),
            "prev" | "previous" | "prev-button" | "previous-button" => {
                Ok(Self::PreviousButton)
            }
            other => Err(ParseCommandError::UnknownRegion(other.to_string())),
        }
    }
}

fn parse_index(word: Option<&str>, verb: &'static str) -> Result<usize, ParseCommandError> {
    let raw = word.ok_or(ParseCommandError::MissingIndex(verb))?;
    raw.parse()
        .map_err(|_| ParseCommandError::BadIndex(raw.to_string()))
}

impl FromStr for CarouselCommand {
    type Err = ParseCommandError;

    /// Parses the line protocol read by the interactive binary, e.g. `next`,
    /// `jump 2`, `enter viewport` or `end 1 opacity`. A bare number jumps.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseCommandError::Empty)?;
        let lowered = verb.to_ascii_lowercase();
        match lowered.as_str() {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "j" | "jump" => Ok(Self::Jump(parse_index(words.next(), "jump")?)),
            "enter" | "leave" => {
                let region: HoverRegion = words
                    .next()
                    .ok_or_else(|| ParseCommandError::UnknownRegion(String::new()))?
                    .parse()?;
                if lowered == "enter" {
                    Ok(Self::PointerEnter(region))
                } else {
                    Ok(Self::PointerLeave(region))
                }
            }
            "start" | "end" => {
                let index = parse_index(words.next(), "start/end")?;
                let property = words.next().unwrap_or("opacity").to_string();
                if lowered == "start" {
                    Ok(Self::TransitionStarted { index, property })
                } else {
                    Ok(Self::TransitionEnded { index, property })
                }
            }
            other => match other.parse::<usize>() {
                Ok(index) => Ok(Self::Jump(index)),
                Err(_) => Err(ParseCommandError::UnknownCommand(verb.to_string())),
            },
        }
    }
}
