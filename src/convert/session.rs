use crate::convert::input::InputKind;
use crate::error::Error;
use derive_more::Display;
use log::debug;
use std::path::Path;

/// Where a conversion request is in the pipeline. States only ever move
/// forward, skipping the stages an input does not need; `Failed` can be
/// reached from any state that is not already terminal.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionState {
    #[default]
    Idle,
    Reading,
    Extracting,
    Rendering,
    Paginating,
    Embedding,
    Done,
    Failed,
}

impl ConversionState {
    fn rank(self) -> u8 {
        match self {
            ConversionState::Idle => 0,
            ConversionState::Reading => 1,
            ConversionState::Extracting => 2,
            ConversionState::Rendering => 3,
            ConversionState::Paginating => 4,
            ConversionState::Embedding => 5,
            ConversionState::Done => 6,
            ConversionState::Failed => 7,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ConversionState::Done | ConversionState::Failed)
    }

    pub fn can_advance_to(self, next: ConversionState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == ConversionState::Failed || next.rank() > self.rank()
    }

    /// How far through a conversion this state is, from 0 to 1
    pub fn progress(self) -> f32 {
        match self {
            ConversionState::Idle => 0.0,
            ConversionState::Reading => 0.1,
            ConversionState::Extracting => 0.3,
            ConversionState::Rendering => 0.5,
            ConversionState::Paginating => 0.7,
            ConversionState::Embedding => 0.85,
            ConversionState::Done | ConversionState::Failed => 1.0,
        }
    }

    /// A short description of the state, suitable for a progress display
    pub fn label(self) -> &'static str {
        match self {
            ConversionState::Idle => "waiting for input",
            ConversionState::Reading => "reading input",
            ConversionState::Extracting => "extracting document",
            ConversionState::Rendering => "rendering HTML",
            ConversionState::Paginating => "splitting into pages",
            ConversionState::Embedding => "building PDF",
            ConversionState::Done => "done",
            ConversionState::Failed => "failed",
        }
    }
}

/// The file a session converts
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub name: String,
    pub kind: InputKind,
    pub bytes: Vec<u8>,
}

/// Everything belonging to a single conversion request: the selected input,
/// the state of the conversion, and the PDF it produced
#[derive(Debug, Default)]
pub struct Session {
    input: Option<Input>,
    output: Option<Vec<u8>>,
    state: ConversionState,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Start a session for an in-memory file. `name` is used to work out what
    /// kind of file it is.
    pub fn with_input<S: ToString>(name: S, bytes: Vec<u8>) -> Result<Session, Error> {
        let mut session = Session::new();
        session.select(name, bytes)?;
        Ok(session)
    }

    /// Start a session for a file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Session, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Session::with_input(path.display(), bytes)
    }

    /// Select the file to convert. Only possible before a conversion has started.
    pub fn select<S: ToString>(&mut self, name: S, bytes: Vec<u8>) -> Result<InputKind, Error> {
        if self.state != ConversionState::Idle {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: ConversionState::Idle,
            });
        }

        let name = name.to_string();
        let kind = InputKind::detect(&name, &bytes)?;
        debug!("selected {name} as {kind}");
        self.input = Some(Input { name, kind, bytes });
        Ok(kind)
    }

    pub fn input(&self) -> Option<&Input> {
        self.input.as_ref()
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// The generated PDF, once the conversion is done
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.output.take()
    }

    pub(crate) fn set_output(&mut self, pdf: Vec<u8>) {
        self.output = Some(pdf);
    }

    /// Move the conversion on to `next`, rejecting anything that would go
    /// backwards, re-enter a state, or leave a terminal state
    pub fn advance(&mut self, next: ConversionState) -> Result<(), Error> {
        if !self.state.can_advance_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!("conversion {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Throw the session away and get a fresh one, ready for a new input
    #[must_use]
    pub fn reset(self) -> Session {
        Session::new()
    }
}
