//! Module implement common utility functions and types.

use std::{fmt, fs, io, result};

use crate::{err_at, Error, Result};

pub mod files;
pub mod thread;

pub use thread::Runner;

/// Account kind, the third column of the accounts dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    User = 0,
    Organization = 1,
    Bot = 2,
}

impl Kind {
    /// Parse the textual form, `User`/`Organization`/`Bot`.
    pub fn from_text(tok: &[u8]) -> Option<Kind> {
        match tok {
            b"User" => Some(Kind::User),
            b"Organization" => Some(Kind::Organization),
            b"Bot" => Some(Kind::Bot),
            _ => None,
        }
    }

    /// Parse the single byte tag of the binary form.
    pub fn from_tag(tag: u8) -> Result<Kind> {
        match tag {
            0 => Ok(Kind::User),
            1 => Ok(Kind::Organization),
            2 => Ok(Kind::Bot),
            tag => err_at!(InvalidFormat, msg: "account kind tag {}", tag),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Kind::User => write!(f, "User"),
            Kind::Organization => write!(f, "Organization"),
            Kind::Bot => write!(f, "Bot"),
        }
    }
}

/// Return whether the token is a non-negative decimal integer.
pub fn check_int(tok: &[u8]) -> bool {
    !tok.is_empty() && tok.iter().all(|b| b.is_ascii_digit())
}

/// Parse a non-negative decimal integer out of the token.
pub fn parse_int(tok: &[u8]) -> Result<i32> {
    if !check_int(tok) {
        return err_at!(InvalidFormat, msg: "not an integer {:?}", to_debug(tok));
    }
    let mut val: i64 = 0;
    for b in tok.iter() {
        val = val * 10 + i64::from(b - b'0');
        if val > i64::from(i32::MAX) {
            return err_at!(FailConvert, msg: "integer overflow {:?}", to_debug(tok));
        }
    }
    Ok(val as i32)
}

/// Parse a boolean token, `True` or `False`.
pub fn parse_bool(tok: &[u8]) -> Option<bool> {
    match tok {
        b"True" => Some(true),
        b"False" => Some(false),
        _ => None,
    }
}

/// Check whether the token is a well formed id-list, `[id, id, ...]`,
/// and return the number of ids it holds.
pub fn check_id_list(tok: &[u8]) -> Option<usize> {
    if tok.len() < 2 || tok[0] != b'[' || tok[tok.len() - 1] != b']' {
        return None;
    }

    let body = &tok[1..tok.len() - 1];
    if body.is_empty() {
        return Some(0);
    }

    let mut count = 0;
    for item in body.split(|b| *b == b',') {
        let item = match count {
            0 => item,
            // every id but the first is preceded by exactly one space.
            _ if item.first() == Some(&b' ') => &item[1..],
            _ => return None,
        };
        if !check_int(item) {
            return None;
        }
        count += 1;
    }

    Some(count)
}

/// Parse an id-list token into a vector of ids.
pub fn parse_id_list(tok: &[u8]) -> Result<Vec<i32>> {
    match check_id_list(tok) {
        Some(0) => Ok(vec![]),
        Some(n) => {
            let mut ids = Vec::with_capacity(n);
            for item in tok[1..tok.len() - 1].split(|b| *b == b',') {
                let item = if item.first() == Some(&b' ') { &item[1..] } else { item };
                ids.push(parse_int(item)?);
            }
            Ok(ids)
        }
        None => err_at!(InvalidFormat, msg: "not an id-list {:?}", to_debug(tok)),
    }
}

/// Lenient variant of [parse_id_list], for trusted input. Malformed
/// items parse as zero instead of failing.
pub fn unsafe_parse_id_list(tok: &[u8]) -> Vec<i32> {
    if tok.len() <= 2 {
        return vec![];
    }

    tok[1..tok.len() - 1]
        .split(|b| *b == b',')
        .map(|item| {
            let mut val: i32 = 0;
            for b in item.iter().skip_while(|b| **b == b' ') {
                match b {
                    b'0'..=b'9' => val = val.wrapping_mul(10) + i32::from(b - b'0'),
                    _ => break,
                }
            }
            val
        })
        .collect()
}

/// Binary search the sorted slice for `key`.
pub fn contained_in_sorted(ids: &[i32], key: i32) -> bool {
    ids.binary_search(&key).is_ok()
}

/// Decode a big-endian i32 from the head of the buffer.
pub fn be_i32(buf: &[u8]) -> Result<i32> {
    if buf.len() < 4 {
        return err_at!(FailConvert, msg: "short buffer {}/4", buf.len());
    }
    Ok(i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Decode a big-endian u64 from the head of the buffer.
pub fn be_u64(buf: &[u8]) -> Result<u64> {
    if buf.len() < 8 {
        return err_at!(FailConvert, msg: "short buffer {}/8", buf.len());
    }
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&buf[..8]);
    Ok(u64::from_be_bytes(bytes))
}

/// Decode a big-endian f64 from the head of the buffer.
pub fn be_f64(buf: &[u8]) -> Result<f64> {
    Ok(f64::from_bits(be_u64(buf)?))
}

fn to_debug(tok: &[u8]) -> String {
    String::from_utf8_lossy(tok).into_owned()
}

/// Line reader over a buffered file. The internal buffer grows to fit
/// arbitrarily long lines; trailing `\r\n` is stripped.
pub struct LineReader {
    read: io::BufReader<fs::File>,
    line: String,
}

impl LineReader {
    pub fn new(fd: fs::File) -> LineReader {
        LineReader {
            read: io::BufReader::new(fd),
            line: String::default(),
        }
    }

    /// Return the next line, without its line terminator, or None at
    /// end of file.
    pub fn next_line(&mut self) -> Result<Option<&str>> {
        use std::io::BufRead;

        self.line.clear();
        match err_at!(IOError, self.read.read_line(&mut self.line))? {
            0 => Ok(None),
            _ => {
                while self.line.ends_with('\n') || self.line.ends_with('\r') {
                    self.line.pop();
                }
                Ok(Some(self.line.as_str()))
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
