//! Trace Loading.
//!
//! Two formats are understood, told apart by the first meaningful line:
//!
//! * **PC CSV**: a header such as `#,PC` followed by `index,pc` rows. Every row
//!   is a 4-byte instruction fetch.
//! * **Reference list**: one reference per line, `<i|r|w> <addr> [size]`,
//!   separated by whitespace or commas. `#` starts a comment. The size
//!   defaults to 4 bytes and may not exceed 4 KiB.
//!
//! Addresses are decimal or `0x`-prefixed hexadecimal.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::common::constants::{DEFAULT_REF_SIZE, INSTRUCTION_SIZE, MAX_REF_SIZE};
use crate::common::{Addr, Command};

/// Kind of a traced reference; decides the entry point and the command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Instruction fetch, served by `il1`.
    Fetch,
    /// Data read, served by `dl1`.
    Load,
    /// Data write, served by `dl1`.
    Store,
}

impl RefKind {
    /// Command presented to the cache.
    pub fn command(self) -> Command {
        match self {
            RefKind::Fetch | RefKind::Load => Command::Read,
            RefKind::Store => Command::Write,
        }
    }

    /// Entry point of the standard hierarchy serving this kind.
    pub fn entry(self) -> &'static str {
        match self {
            RefKind::Fetch => "il1",
            RefKind::Load | RefKind::Store => "dl1",
        }
    }
}

/// One traced reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRef {
    pub kind: RefKind,
    pub addr: Addr,
    pub size: u64,
}

/// Failure to read or parse a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceError {
    /// The file could not be opened or read.
    Io(String),
    /// A line could not be parsed (1-based line number).
    Parse { line: usize, message: String },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(msg) => write!(f, "cannot read trace: {}", msg),
            TraceError::Parse { line, message } => write!(f, "trace line {}: {}", line, message),
        }
    }
}

impl std::error::Error for TraceError {}

/// Reads a trace file.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceRef>, TraceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TraceError::Io(format!("{}: {}", path.display(), e)))?;
    let refs = parse_trace(BufReader::new(file))?;
    debug!("loaded {} references from {}", refs.len(), path.display());
    Ok(refs)
}

/// Parses a trace from any buffered reader.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRef>, TraceError> {
    let mut refs = Vec::new();
    let mut pc_column: Option<usize> = None;
    let mut format_known = false;

    for (i, line) in reader.lines().enumerate() {
        let lineno = i + 1;
        let line = line.map_err(|e| TraceError::Io(e.to_string()))?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if !format_known {
            format_known = true;
            if let Some(column) = pc_header_column(text) {
                pc_column = Some(column);
                continue;
            }
        }

        match pc_column {
            Some(column) => refs.push(parse_pc_row(text, column, lineno)?),
            None => {
                if text.starts_with('#') {
                    continue;
                }
                refs.push(parse_ref_line(text, lineno)?);
            }
        }
    }
    Ok(refs)
}

/// Column holding the PC if `header` is a PC CSV header.
fn pc_header_column(header: &str) -> Option<usize> {
    if !header.contains(',') {
        return None;
    }
    header
        .split(',')
        .position(|col| col.trim().eq_ignore_ascii_case("pc"))
}

fn parse_pc_row(text: &str, column: usize, line: usize) -> Result<TraceRef, TraceError> {
    let field = text.split(',').nth(column).ok_or_else(|| TraceError::Parse {
        line,
        message: format!("missing PC column {}", column),
    })?;
    Ok(TraceRef {
        kind: RefKind::Fetch,
        addr: parse_number(field, line)?,
        size: INSTRUCTION_SIZE,
    })
}

fn parse_ref_line(text: &str, line: usize) -> Result<TraceRef, TraceError> {
    let body = text.split('#').next().unwrap_or_default();
    let mut fields = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty());

    let kind = match fields.next().map(|k| k.to_ascii_lowercase()).as_deref() {
        Some("i") | Some("f") => RefKind::Fetch,
        Some("r") | Some("l") => RefKind::Load,
        Some("w") | Some("s") => RefKind::Store,
        other => {
            return Err(TraceError::Parse {
                line,
                message: format!("unknown reference kind `{}`", other.unwrap_or("")),
            });
        }
    };
    let addr = match fields.next() {
        Some(field) => parse_number(field, line)?,
        None => {
            return Err(TraceError::Parse {
                line,
                message: "missing address".to_string(),
            });
        }
    };
    let size = match fields.next() {
        Some(field) => parse_number(field, line)?,
        None => DEFAULT_REF_SIZE,
    };
    if size > MAX_REF_SIZE {
        return Err(TraceError::Parse {
            line,
            message: format!("reference size {} exceeds {} bytes", size, MAX_REF_SIZE),
        });
    }
    if let Some(extra) = fields.next() {
        return Err(TraceError::Parse {
            line,
            message: format!("unexpected field `{}`", extra),
        });
    }
    Ok(TraceRef { kind, addr, size })
}

fn parse_number(field: &str, line: usize) -> Result<u64, TraceError> {
    let field = field.trim();
    let parsed = match field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => field.parse(),
    };
    parsed.map_err(|_| TraceError::Parse {
        line,
        message: format!("bad number `{}`", field),
    })
}
