// ============================================================
// Layer 4 — NPY Array Codec
// ============================================================
// Reads and writes 2-D integer arrays in NumPy's .npy format,
// which is how the shard files are stored.
//
// File layout:
//   \x93NUMPY            6-byte magic
//   major, minor         1 byte each (1.0, 2.0 or 3.0)
//   header_len           u16 LE (v1) or u32 LE (v2, v3)
//   header               Python dict literal, e.g.
//                        {'descr': '<i8', 'fortran_order': False, 'shape': (100, 54), }
//                        space-padded and '\n'-terminated so the
//                        data starts on a 64-byte boundary
//   data                 rows * cols values, C order
//
// Only integer dtypes are accepted (i1 u1 i2 u2 i4 u4 i8 u8, any
// byte order). Everything is widened to i64 in memory.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

#[derive(thiserror::Error, Debug)]
pub enum NpyError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not an .npy file (bad magic)")]
    BadMagic,
    #[error("unsupported .npy version {0}.{1}")]
    Version(u8, u8),
    #[error("malformed header: {0}")]
    Header(String),
    #[error("unsupported dtype '{0}'")]
    Dtype(String),
    #[error("fortran-ordered arrays are not supported")]
    FortranOrder,
    #[error("expected a 2-D array, got shape {0:?}")]
    Rank(Vec<usize>),
    #[error("data length mismatch: expected {expected} bytes, found {found}")]
    Length { expected: usize, found: usize },
    #[error("value {0} does not fit in i64")]
    Overflow(u64),
}

/// A dense row-major matrix of integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl IntMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<i64>) -> Result<Self, NpyError> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| NpyError::Header("shape overflows".into()))?;
        if expected != data.len() {
            return Err(NpyError::Length { expected, found: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Stack equal-length rows. All rows must have `cols` entries.
    pub fn from_rows<T: Copy + Into<i64>>(rows: &[Vec<T>], cols: usize) -> Result<Self, NpyError> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(NpyError::Length { expected: cols, found: row.len() });
            }
            data.extend(row.iter().map(|&v| v.into()));
        }
        Self::new(rows.len(), cols, data)
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> {
        // chunks_exact(0) panics; an n x 0 matrix has empty rows
        let cols = self.cols.max(1);
        let n    = if self.cols == 0 { 0 } else { self.rows };
        self.data.chunks_exact(cols).take(n)
    }
}

// ─── Reading ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Dtype {
    signed:     bool,
    size:       usize,
    big_endian: bool,
}

pub fn read_npy(path: impl AsRef<Path>) -> Result<IntMatrix, NpyError> {
    let bytes = fs::read(path.as_ref())?;
    parse_npy(&bytes)
}

pub fn parse_npy(bytes: &[u8]) -> Result<IntMatrix, NpyError> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(NpyError::BadMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(NpyError::Header("truncated preamble".into()));
            }
            (u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize, 12)
        }
        _ => return Err(NpyError::Version(major, minor)),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(NpyError::Header("truncated header".into()));
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|e| NpyError::Header(e.to_string()))?;

    let dtype = parse_descr(field(header, "descr")?)?;
    if field(header, "fortran_order")?.starts_with("True") {
        return Err(NpyError::FortranOrder);
    }
    let shape = parse_shape(field(header, "shape")?)?;
    if shape.len() != 2 {
        return Err(NpyError::Rank(shape));
    }
    let (rows, cols) = (shape[0], shape[1]);

    let payload  = &bytes[data_start..];
    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(dtype.size))
        .ok_or_else(|| NpyError::Header("shape overflows".into()))?;
    if payload.len() != expected {
        return Err(NpyError::Length { expected, found: payload.len() });
    }

    let data = payload
        .chunks_exact(dtype.size)
        .map(|chunk| decode_value(chunk, dtype))
        .collect::<Result<Vec<i64>, NpyError>>()?;

    IntMatrix::new(rows, cols, data)
}

/// Text following `'key':` in the header dict, leading spaces removed
fn field<'a>(header: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let pat   = format!("'{key}':");
    let start = header
        .find(&pat)
        .ok_or_else(|| NpyError::Header(format!("missing '{key}'")))?;
    Ok(header[start + pat.len()..].trim_start())
}

fn parse_descr(rest: &str) -> Result<Dtype, NpyError> {
    let quoted = rest
        .strip_prefix('\'')
        .ok_or_else(|| NpyError::Header("descr is not a string".into()))?;
    let end = quoted
        .find('\'')
        .ok_or_else(|| NpyError::Header("unterminated descr".into()))?;
    let descr = &quoted[..end];

    let mut chars = descr.chars();
    let big_endian = match chars.next() {
        Some('<') | Some('|') => false,
        Some('>')             => true,
        Some('=')             => cfg!(target_endian = "big"),
        _ => return Err(NpyError::Dtype(descr.to_string())),
    };
    let signed = match chars.next() {
        Some('i') => true,
        Some('u') => false,
        _ => return Err(NpyError::Dtype(descr.to_string())),
    };
    let size = match chars.as_str() {
        "1" => 1,
        "2" => 2,
        "4" => 4,
        "8" => 8,
        _ => return Err(NpyError::Dtype(descr.to_string())),
    };

    Ok(Dtype { signed, size, big_endian })
}

fn parse_shape(rest: &str) -> Result<Vec<usize>, NpyError> {
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.find(')').map(|end| &r[..end]))
        .ok_or_else(|| NpyError::Header("shape is not a tuple".into()))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| NpyError::Header(format!("bad shape entry '{s}'")))
        })
        .collect()
}

fn decode_value(chunk: &[u8], dtype: Dtype) -> Result<i64, NpyError> {
    let mut buf = [0u8; 8];
    if dtype.big_endian {
        buf[8 - dtype.size..].copy_from_slice(chunk);
        buf.reverse();
    } else {
        buf[..dtype.size].copy_from_slice(chunk);
    }

    // Sign-extend from the stored width
    if dtype.signed && chunk_is_negative(&buf, dtype.size) {
        for b in &mut buf[dtype.size..] {
            *b = 0xFF;
        }
    }

    let raw = u64::from_le_bytes(buf);
    if dtype.signed {
        Ok(raw as i64)
    } else if raw > i64::MAX as u64 {
        Err(NpyError::Overflow(raw))
    } else {
        Ok(raw as i64)
    }
}

fn chunk_is_negative(le: &[u8; 8], size: usize) -> bool {
    le[size - 1] & 0x80 != 0
}

// ─── Writing ──────────────────────────────────────────────────────────────────

/// Write `m` as a version 1.0 array, creating parent directories.
/// Values that all fit in a byte are stored as `|u1`, anything else
/// as `<i8`.
pub fn write_npy(path: impl AsRef<Path>, m: &IntMatrix) -> Result<(), NpyError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes_only = m.data.iter().all(|v| (0..=u8::MAX as i64).contains(v));
    let descr      = if bytes_only { "|u1" } else { "<i8" };

    let mut header = format!(
        "{{'descr': '{descr}', 'fortran_order': False, 'shape': ({}, {}), }}",
        m.rows, m.cols
    );
    // Preamble is 10 bytes; pad so the data starts on an ALIGN boundary
    let unpadded = 10 + header.len() + 1;
    let padding  = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut w = BufWriter::new(fs::File::create(path)?);
    w.write_all(MAGIC)?;
    w.write_all(&[1, 0])?;
    w.write_all(&(header.len() as u16).to_le_bytes())?;
    w.write_all(header.as_bytes())?;
    if bytes_only {
        let packed: Vec<u8> = m.data.iter().map(|&v| v as u8).collect();
        w.write_all(&packed)?;
    } else {
        for v in &m.data {
            w.write_all(&v.to_le_bytes())?;
        }
    }
    w.flush()?;
    Ok(())
}
