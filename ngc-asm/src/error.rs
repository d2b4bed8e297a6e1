use std::fmt;

/// Bit-flag error kinds, mirroring the CLI's exit code scheme.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ErrorKind {
    Failure = 1,
    Args = 2,
    File = 4,
    Syntax = 8,
}

/// An assembler error carrying its kind, message, and (for `Syntax`) the
/// offending source line number. `line == 0` means no specific line applies.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, line: usize, message: impl Into<String>) -> Error {
        Error {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Failure, 0, message)
    }

    pub fn file(message: impl Into<String>) -> Error {
        Error::new(ErrorKind::File, 0, message)
    }

    pub fn syntax(line: usize, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Syntax, line, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<pest::error::Error<crate::parser::Rule>> for Error {
    fn from(err: pest::error::Error<crate::parser::Rule>) -> Error {
        Error::new(ErrorKind::Syntax, 0, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
