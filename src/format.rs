//! Module `format` implement runtime record descriptors.
//!
//! A [Format] describes a tuple type: the ordered list of field kinds
//! plus the pairings between variable-length fields and the length
//! members that size them. The same descriptor drives CSV-style
//! textual parsing, validation, compact binary (de)serialisation and
//! the on-demand [lazy][crate::lazy::Lazy] reader, so adding a record
//! type to the catalog never needs new parse or write code.

use std::io;

use crate::{
    date::Date,
    err_at,
    util::{self, Kind},
    Error, Result,
};

/// The kind of a single record field.
///
/// Kinds ending in `Bin` have a fixed binary width; `Str`, `StrNull`
/// and `BinIntList` are variable length and take their byte width
/// from a paired length member when read in binary mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Kind,
    Int,
    Str,
    StrNull,
    IntList,
    Date,
    DateTime,
    BinBool,
    BinKind,
    BinInt,
    BinDouble,
    BinIntList,
    BinDateTime,
}

impl FieldType {
    /// Fixed width, in bytes, of the field's binary form. Zero for
    /// variable-length kinds.
    pub fn width(&self) -> usize {
        match self {
            FieldType::BinBool | FieldType::BinKind => 1,
            FieldType::BinInt | FieldType::BinDateTime => 4,
            FieldType::BinDouble => 8,
            _ => 0,
        }
    }

    /// Width of one element of a variable-length kind.
    pub fn elem_width(&self) -> usize {
        match self {
            FieldType::BinIntList => 4,
            FieldType::Str | FieldType::StrNull => 1,
            _ => 0,
        }
    }

    fn is_binary(&self) -> bool {
        match self {
            FieldType::BinBool
            | FieldType::BinKind
            | FieldType::BinInt
            | FieldType::BinDouble
            | FieldType::BinIntList
            | FieldType::BinDateTime
            | FieldType::Str
            | FieldType::StrNull => true,
            _ => false,
        }
    }
}

/// A single field value. Records are `Vec<Value>`, addressed by field
/// position.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Null string, also the placeholder for unparsed fields.
    Nil,
    Bool(bool),
    Kind(Kind),
    Int(i32),
    Double(f64),
    Str(String),
    IntList(Vec<i32>),
    Date(Date),
}

/// A parsed or to-be-written record.
pub type Record = Vec<Value>;

impl Value {
    pub fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(val) => Ok(*val),
            val => err_at!(Fatal, msg: "not an int {:?}", val),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(val) => Ok(*val),
            val => err_at!(Fatal, msg: "not a bool {:?}", val),
        }
    }

    pub fn as_kind(&self) -> Result<Kind> {
        match self {
            Value::Kind(val) => Ok(*val),
            val => err_at!(Fatal, msg: "not a kind {:?}", val),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(val) => Ok(*val),
            val => err_at!(Fatal, msg: "not a double {:?}", val),
        }
    }

    pub fn as_date(&self) -> Result<Date> {
        match self {
            Value::Date(val) => Ok(*val),
            val => err_at!(Fatal, msg: "not a date {:?}", val),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(val) => Ok(val.as_str()),
            val => err_at!(Fatal, msg: "not a string {:?}", val),
        }
    }

    /// Nullable string accessor, `Nil` maps to None.
    pub fn opt_str(&self) -> Option<&str> {
        match self {
            Value::Str(val) => Some(val.as_str()),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Result<&[i32]> {
        match self {
            Value::IntList(val) => Ok(val.as_slice()),
            val => err_at!(Fatal, msg: "not an id-list {:?}", val),
        }
    }

    // byte length of a variable-length value, for pairing checks.
    fn var_len(&self) -> usize {
        match self {
            Value::Str(val) => val.len(),
            Value::IntList(val) => val.len(),
            Value::Nil => 0,
            _ => 0,
        }
    }
}

/// Pairing between a variable-length field and the member that holds
/// its length.
#[derive(Clone, Copy, Debug)]
pub struct LenPair {
    /// Field position of the list/string member.
    pub list: usize,
    /// Field position of its length member, if the record carries one.
    /// Required, and required to precede `list`, in binary formats.
    pub length: Option<usize>,
}

/// Runtime descriptor of a tuple type. Immutable once built, cheap to
/// clone.
#[derive(Clone)]
pub struct Format {
    fields: Vec<FieldType>,
    pairs: Vec<LenPair>,
    separator: Option<u8>,
}

impl Format {
    /// Create a descriptor. `separator: None` makes the format binary,
    /// in which case every variable-length field must be paired with a
    /// length member declared before it.
    pub fn new(
        fields: Vec<FieldType>,
        pairs: Vec<LenPair>,
        separator: Option<u8>,
    ) -> Result<Format> {
        for (i, pair) in pairs.iter().enumerate() {
            if i > 0 && pair.list <= pairs[i - 1].list {
                return err_at!(Fatal, msg: "pairs not ordered by list member");
            }
            if pair.list >= fields.len() {
                return err_at!(Fatal, msg: "pair list member {} out of bounds", pair.list);
            }
            if let Some(length) = pair.length {
                if length >= fields.len() {
                    return err_at!(Fatal, msg: "pair length member {} out of bounds", length);
                }
            }
        }

        let val = Format { fields, pairs, separator };
        if val.is_binary() {
            val.check_binary_specs()?;
        }
        Ok(val)
    }

    // A binary format needs a computable width for every field: either
    // the kind fixes one, or a preceding length member sizes it.
    fn check_binary_specs(&self) -> Result<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if !field.is_binary() {
                return err_at!(Fatal, msg: "{:?} has no binary form", field);
            }
            if field.width() == 0 {
                match self.length_member_of(i) {
                    Some(length) if length < i => (),
                    _ => return err_at!(
                        Fatal, msg: "field {} needs a preceding length member", i
                    ),
                }
                if field.elem_width() == 0 {
                    return err_at!(Fatal, msg: "field {} has no element width", i);
                }
            }
        }
        Ok(())
    }

    pub fn is_binary(&self) -> bool {
        self.separator.is_none()
    }

    /// Number of fields in the record.
    pub fn members(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, i: usize) -> FieldType {
        self.fields[i]
    }

    /// The length member paired with field `list`, if any.
    pub fn length_member_of(&self, list: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.list == list)
            .and_then(|pair| pair.length)
    }

    /// A record of the right arity, every field `Nil`.
    pub fn new_record(&self) -> Record {
        vec![Value::Nil; self.fields.len()]
    }

    /// Whether the input parses cleanly under this descriptor.
    pub fn check(&self, input: &[u8]) -> bool {
        self.read(input).is_ok()
    }

    /// Parse and validate the input into a fresh record. Fails
    /// atomically: on the first invalid token nothing is returned.
    pub fn read(&self, input: &[u8]) -> Result<Record> {
        match self.separator {
            Some(sep) => self.read_text(input, sep, true),
            None => self.read_binary(input),
        }
    }

    /// Parse without validation, for trusted input. List lengths are
    /// taken as parsed, without cross-checking paired length members.
    pub fn unsafe_read(&self, input: &[u8]) -> Result<Record> {
        match self.separator {
            Some(sep) => self.read_text(input, sep, false),
            None => self.read_binary(input),
        }
    }

    fn read_text(&self, input: &[u8], sep: u8, validate: bool) -> Result<Record> {
        let toks: Vec<&[u8]> = input.split(|b| *b == sep).collect();
        if toks.len() != self.fields.len() {
            return err_at!(
                InvalidFormat, msg: "token count {}/{}", toks.len(), self.fields.len()
            );
        }

        let mut rec = Vec::with_capacity(self.fields.len());
        for (field, tok) in self.fields.iter().zip(toks.iter()) {
            let value = if validate {
                read_text_member(*field, tok)?
            } else {
                unsafe_read_text_member(*field, tok)?
            };
            rec.push(value);
        }

        if validate {
            for pair in self.pairs.iter() {
                if let Some(length) = pair.length {
                    let want = rec[length].as_int()?;
                    let got = rec[pair.list].var_len();
                    if want < 0 || got != want as usize {
                        return err_at!(
                            InvalidFormat, msg: "list length {}/{}", got, want
                        );
                    }
                }
            }
        }

        Ok(rec)
    }

    fn read_binary(&self, input: &[u8]) -> Result<Record> {
        let mut rec: Record = Vec::with_capacity(self.fields.len());
        let mut fpos = 0;

        for (i, field) in self.fields.iter().enumerate() {
            let width = match field.width() {
                0 => {
                    // the length member is parsed already, by construction.
                    let length = self.length_member_of(i).unwrap();
                    let n = rec[length].as_int()?;
                    if n < 0 {
                        return err_at!(InvalidFormat, msg: "negative length {}", n);
                    }
                    (n as usize) * field.elem_width()
                }
                n => n,
            };
            if fpos + width > input.len() {
                return err_at!(
                    InvalidFormat, msg: "record truncated at field {} {}/{}",
                    i, fpos + width, input.len()
                );
            }
            rec.push(read_binary_member(*field, &input[fpos..fpos + width])?);
            fpos += width;
        }

        Ok(rec)
    }

    /// Serialise the record: binary formats write fixed-width
    /// big-endian fields, textual formats write separator-joined
    /// tokens.
    pub fn write<W>(&self, rec: &[Value], out: &mut W) -> Result<()>
    where
        W: io::Write,
    {
        match self.separator {
            None => {
                let mut buf = vec![];
                for (field, value) in self.fields.iter().zip(rec.iter()) {
                    write_binary_member(*field, value, &mut buf)?;
                }
                err_at!(IOError, out.write_all(&buf))
            }
            Some(sep) => {
                for (i, (field, value)) in self.fields.iter().zip(rec.iter()).enumerate() {
                    if i > 0 {
                        err_at!(IOError, out.write_all(&[sep]))?;
                    }
                    let tok = write_text_member(*field, value)?;
                    err_at!(IOError, out.write_all(tok.as_bytes()))?;
                }
                Ok(())
            }
        }
    }
}

fn read_text_member(field: FieldType, tok: &[u8]) -> Result<Value> {
    let value = match field {
        FieldType::Int => Value::Int(util::parse_int(tok)?),
        FieldType::Str if tok.is_empty() => {
            return err_at!(InvalidFormat, msg: "empty string field")
        }
        FieldType::Str => Value::Str(to_utf8(tok)?),
        FieldType::StrNull if tok.is_empty() => Value::Nil,
        FieldType::StrNull => Value::Str(to_utf8(tok)?),
        FieldType::IntList => Value::IntList(util::parse_id_list(tok)?),
        FieldType::Kind => match Kind::from_text(tok) {
            Some(kind) => Value::Kind(kind),
            None => return err_at!(InvalidFormat, msg: "bad account kind"),
        },
        FieldType::Bool => match util::parse_bool(tok) {
            Some(val) => Value::Bool(val),
            None => return err_at!(InvalidFormat, msg: "bad boolean"),
        },
        FieldType::Date => Value::Date(Date::from_text(tok, false)?),
        FieldType::DateTime => Value::Date(Date::from_text(tok, true)?),
        field => return err_at!(Fatal, msg: "{:?} in textual format", field),
    };
    Ok(value)
}

fn unsafe_read_text_member(field: FieldType, tok: &[u8]) -> Result<Value> {
    let value = match field {
        FieldType::Int => Value::Int(atoi(tok)),
        FieldType::Str | FieldType::StrNull if tok.is_empty() => Value::Nil,
        FieldType::Str | FieldType::StrNull => Value::Str(to_utf8(tok)?),
        FieldType::IntList => Value::IntList(util::unsafe_parse_id_list(tok)),
        FieldType::Kind => Value::Kind(Kind::from_text(tok).unwrap_or(Kind::User)),
        FieldType::Bool => Value::Bool(util::parse_bool(tok).unwrap_or(false)),
        FieldType::DateTime if tok.len() >= 19 => Value::Date(Date::unsafe_from_text(tok)),
        FieldType::Date | FieldType::DateTime => {
            Value::Date(Date::from_text(tok, false).unwrap_or_else(|_| Date::new(0, 0, 0, 0, 0, 0)))
        }
        field => return err_at!(Fatal, msg: "{:?} in textual format", field),
    };
    Ok(value)
}

/// Decode one binary field out of its exact byte slice.
pub fn read_binary_member(field: FieldType, buf: &[u8]) -> Result<Value> {
    match field.width() {
        0 => (),
        n if buf.len() >= n => (),
        n => return err_at!(FailConvert, msg: "short buffer {}/{}", buf.len(), n),
    }
    let value = match field {
        FieldType::BinBool => Value::Bool(buf[0] != 0),
        FieldType::BinKind => Value::Kind(Kind::from_tag(buf[0])?),
        FieldType::BinInt => Value::Int(util::be_i32(buf)?),
        FieldType::BinDouble => Value::Double(util::be_f64(buf)?),
        FieldType::BinDateTime => Value::Date(Date::unpack(util::be_i32(buf)? as u32)),
        FieldType::Str | FieldType::StrNull if buf.is_empty() => Value::Nil,
        FieldType::Str | FieldType::StrNull => Value::Str(to_utf8(buf)?),
        FieldType::BinIntList => {
            let mut ids = Vec::with_capacity(buf.len() / 4);
            for chunk in buf.chunks(4) {
                ids.push(util::be_i32(chunk)?);
            }
            Value::IntList(ids)
        }
        field => return err_at!(Fatal, msg: "{:?} has no binary form", field),
    };
    Ok(value)
}

/// Encode one binary field, big-endian, appending to `buf`.
pub fn write_binary_member(field: FieldType, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    match field {
        FieldType::BinBool => buf.push(value.as_bool()? as u8),
        FieldType::BinKind => buf.push(value.as_kind()? as u8),
        FieldType::BinInt => buf.extend_from_slice(&value.as_int()?.to_be_bytes()),
        FieldType::BinDouble => {
            buf.extend_from_slice(&value.as_double()?.to_bits().to_be_bytes())
        }
        FieldType::BinDateTime => {
            buf.extend_from_slice(&value.as_date()?.pack().to_be_bytes())
        }
        FieldType::Str | FieldType::StrNull => {
            if let Some(s) = value.opt_str() {
                buf.extend_from_slice(s.as_bytes());
            }
        }
        FieldType::BinIntList => {
            for id in value.as_ids()?.iter() {
                buf.extend_from_slice(&id.to_be_bytes());
            }
        }
        field => return err_at!(Fatal, msg: "{:?} has no binary form", field),
    }
    Ok(())
}

fn write_text_member(field: FieldType, value: &Value) -> Result<String> {
    let tok = match field {
        FieldType::Int => value.as_int()?.to_string(),
        FieldType::Str | FieldType::StrNull => value.opt_str().unwrap_or("").to_string(),
        FieldType::IntList => {
            let ids: Vec<String> = value.as_ids()?.iter().map(|id| id.to_string()).collect();
            format!("[{}]", ids.join(", "))
        }
        FieldType::Kind => value.as_kind()?.to_string(),
        FieldType::Bool => match value.as_bool()? {
            true => "True".to_string(),
            false => "False".to_string(),
        },
        FieldType::Date => value.as_date()?.to_date_text(),
        FieldType::DateTime => value.as_date()?.to_string(),
        field => return err_at!(Fatal, msg: "{:?} in textual format", field),
    };
    Ok(tok)
}

// atoi shaped parse: leading digits, zero when none.
fn atoi(tok: &[u8]) -> i32 {
    let mut val: i32 = 0;
    for b in tok.iter() {
        match b {
            b'0'..=b'9' => val = val.wrapping_mul(10) + i32::from(b - b'0'),
            _ => break,
        }
    }
    val
}

fn to_utf8(buf: &[u8]) -> Result<String> {
    err_at!(FailConvert, std::str::from_utf8(buf)).map(|s| s.to_string())
}

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;
