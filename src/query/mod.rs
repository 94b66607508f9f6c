//! Module `query` implement the analytic query surface.
//!
//! A query file holds one query per line, `<id> <arg>..` with a space
//! between arguments. Argument tuples are parsed through per-id
//! [Format] descriptors, the same machinery that parses CSV rows.
//! Queries run over the [Catalog] primitives on a fixed worker pool;
//! the query on input line `n` writes its rows to
//! `command<n>_output.txt` under the catalog directory.

use std::{ffi, io, io::Write};

use crate::{
    catalog::{files, Catalog},
    err_at,
    format::{FieldType, Format, Record},
    task,
    util::{files as osfiles, LineReader},
    Error, Result,
};

mod solver;

/// One parsed query. Id 0 is the no-op empty line; id -1 marks an
/// unparsable line, which the executor skips.
pub struct Query {
    pub id: i32,
    pub args: Record,
}

/// The argument descriptor of a query id, None for ids outside 1..=10.
pub fn arg_format(id: i32) -> Option<Format> {
    let fields = match id {
        1..=4 => vec![],
        5 => vec![FieldType::Int, FieldType::Date, FieldType::Date],
        6 => vec![FieldType::Int, FieldType::Str],
        7 => vec![FieldType::Date],
        8 => vec![FieldType::Int, FieldType::Date],
        9 | 10 => vec![FieldType::Int],
        _ => return None,
    };
    Some(Format::new(fields, vec![], Some(b' ')).expect("query argument schema"))
}

/// Parse one query line. Never fails: bad lines come back with id -1.
pub fn parse(line: &str) -> Query {
    if line.is_empty() {
        return Query { id: 0, args: vec![] };
    }

    let (id_tok, rest) = match line.find(' ') {
        Some(at) => (&line[..at], &line[at + 1..]),
        None => (line, ""),
    };
    let id: i32 = id_tok.parse().unwrap_or(0);

    match arg_format(id) {
        // parameterless ids ignore anything after the id token.
        Some(format) if format.members() == 0 => Query { id, args: vec![] },
        Some(format) => match format.read(rest.as_bytes()) {
            Ok(args) => Query { id, args },
            Err(_) => Query { id: -1, args: vec![] },
        },
        None => Query { id: -1, args: vec![] },
    }
}

/// Execute one query against the catalog, writing rows to `out`.
pub fn execute<W>(catalog: &Catalog, query: &Query, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    match query.id {
        0 => Ok(()),
        1 => solver::query_one(catalog, out),
        2 => err_at!(IOError, write!(out, "{:.2}\n", catalog.to_q2())),
        3 => err_at!(IOError, write!(out, "{}\n", catalog.to_q3())),
        4 => err_at!(IOError, write!(out, "{:.2}\n", catalog.to_q4())),
        5 => {
            let n = query.args[0].as_int()?;
            let start = query.args[1].as_date()?;
            let end = query.args[2].as_date()?;
            solver::query_five(catalog, n, start, end, out)
        }
        6 => solver::query_six(catalog, query.args[0].as_int()?, query.args[1].as_str()?, out),
        7 => solver::query_seven(catalog, query.args[0].as_date()?, out),
        8 => solver::query_eight(catalog, query.args[0].as_int()?, query.args[1].as_date()?, out),
        9 => solver::query_nine(catalog, query.args[0].as_int()?, out),
        10 => solver::query_ten(catalog, query.args[0].as_int()?, out),
        id => err_at!(Fatal, msg: "unsupported query id {}", id),
    }
}

/// Read a queries file and execute every line over `workers` pool
/// threads. The query on (1-based) line `n` writes to
/// `command<n>_output.txt`; invalid lines produce no file.
pub fn run_file(catalog: &Catalog, loc: &ffi::OsStr, workers: usize) -> Result<()> {
    let mut rd = LineReader::new(osfiles::open_file_r(loc)?);
    let mut queries = vec![];
    while let Some(line) = rd.next_line()? {
        queries.push(parse(line));
    }

    let dir = catalog.as_config().dir.clone();
    task::execute_tasks(&queries, workers, |i, query| {
        if query.id < 0 {
            return Ok(());
        }
        let loc = files::query_output_loc(&dir, i + 1);
        let mut out = io::BufWriter::new(osfiles::create_file_rw(&loc)?);
        execute(catalog, query, &mut out)?;
        err_at!(IOError, out.flush())
    })
}
