use std::{error, fmt, result};

/// Short form to compose Error values.
///
/// Here are a few possible ways:
///
/// ```ignore
/// use crate::Error;
/// err_at!(InvalidFormat, msg: "bad token {:?}", tok)
/// ```
///
/// ```ignore
/// use crate::Error;
/// err_at!(IOError, fd.read(&mut buf))
/// ```
///
/// ```ignore
/// use crate::Error;
/// err_at!(IOError, fd.read(&mut buf), "while reading {:?}", loc)
/// ```
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, mostly the `file:line` where the
/// error originated, followed by a human readable message.
#[derive(Clone, PartialEq)]
pub enum Error {
    Fatal(String, String),
    IOError(String, String),
    InvalidFile(String, String),
    InvalidFormat(String, String),
    InvalidDate(String, String),
    KeyNotFound(String, String),
    UnsortedIndex(String, String),
    FailConvert(String, String),
    ThreadFail(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, m) => write!(f, "{} Fatal: {}", p, m),
            IOError(p, m) => write!(f, "{} IOError: {}", p, m),
            InvalidFile(p, m) => write!(f, "{} InvalidFile: {}", p, m),
            InvalidFormat(p, m) => write!(f, "{} InvalidFormat: {}", p, m),
            InvalidDate(p, m) => write!(f, "{} InvalidDate: {}", p, m),
            KeyNotFound(p, m) => write!(f, "{} KeyNotFound: {}", p, m),
            UnsortedIndex(p, m) => write!(f, "{} UnsortedIndex: {}", p, m),
            FailConvert(p, m) => write!(f, "{} FailConvert: {}", p, m),
            ThreadFail(p, m) => write!(f, "{} ThreadFail: {}", p, m),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
