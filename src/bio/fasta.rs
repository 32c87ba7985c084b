use crate::bio::sequence::Sequence;
use crate::{MetadatasetError, Result};
use flate2::read::MultiGzDecoder;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::space1,
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;

/// Residues per line in written FASTA files
pub const LINE_WIDTH: usize = 60;

static UNSAFE_FILENAME_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_filename_chars() -> &'static Regex {
    UNSAFE_FILENAME_CHARS.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9._-]+").expect("file name pattern is a valid regex")
    })
}

/// Make a string safe for use in a file name. Runs of unsafe characters
/// collapse to a single `_`.
pub fn sanitize_id(s: &str) -> String {
    unsafe_filename_chars().replace_all(s, "_").into_owned()
}

/// Parse a FASTA header line (trailing newline already stripped)
fn parse_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = tag(">")(input)?;
    let (input, id) = take_till(|c: char| c.is_whitespace())(input)?;
    let (input, description) = opt(preceded(space1, rest))(input)?;
    Ok((input, (id, description)))
}

fn header_to_record(line: &str, sequence: Vec<u8>) -> Result<Sequence> {
    let (_, (id, description)) = parse_header(line)
        .map_err(|e| MetadatasetError::Parse(format!("Invalid FASTA header {:?}: {:?}", line, e)))?;

    let mut record = Sequence::new(id.to_string(), sequence);
    if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
        record = record.with_description(desc.to_string());
    }
    Ok(record)
}

pub fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Streaming FASTA reader over plain or gzip-compressed input.
///
/// Records are produced one at a time; nothing but the current record is
/// held in memory. After the first error the reader is exhausted, so a
/// corrupt file stops at the point of failure.
pub struct FastaReader {
    reader: Box<dyn BufRead>,
    line: Vec<u8>,
    line_no: usize,
    pending_header: Option<String>,
    finished: bool,
}

impl FastaReader {
    /// Open a FASTA file, decompressing when the name ends in `.gz`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let reader: Box<dyn BufRead> = if is_gzipped(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self::from_boxed(reader))
    }

    pub fn from_reader<R: BufRead + 'static>(reader: R) -> Self {
        Self::from_boxed(Box::new(reader))
    }

    fn from_boxed(reader: Box<dyn BufRead>) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(256),
            line_no: 0,
            pending_header: None,
            finished: false,
        }
    }

    /// Read one line into the internal buffer. Returns false at EOF.
    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_until(b'\n', &mut self.line)?;
        if n == 0 {
            return Ok(false);
        }
        self.line_no += 1;
        while matches!(self.line.last(), Some(b'\n') | Some(b'\r')) {
            self.line.pop();
        }
        Ok(true)
    }

    pub fn read_next(&mut self) -> Result<Option<Sequence>> {
        if self.finished {
            return Ok(None);
        }

        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                if !self.next_line()? {
                    self.finished = true;
                    return Ok(None);
                }
                if self.line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                if self.line[0] == b'>' {
                    break String::from_utf8_lossy(&self.line).into_owned();
                }
                return Err(MetadatasetError::Parse(format!(
                    "line {}: expected a '>' header before sequence data",
                    self.line_no
                )));
            },
        };

        let mut sequence = Vec::new();
        loop {
            if !self.next_line()? {
                self.finished = true;
                break;
            }
            if self.line.first() == Some(&b'>') {
                self.pending_header = Some(String::from_utf8_lossy(&self.line).into_owned());
                break;
            }
            sequence.extend(self.line.iter().copied().filter(|c| !c.is_ascii_whitespace()));
        }

        header_to_record(&header, sequence).map(Some)
    }
}

impl Iterator for FastaReader {
    type Item = Result<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                self.pending_header = None;
                Some(Err(e))
            }
        }
    }
}

/// Write a single record to its own FASTA file
pub fn write_record<P: AsRef<Path>>(path: P, record: &Sequence) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_record_to_writer(&mut writer, record)?;
    writer.flush()?;
    Ok(())
}

pub fn write_record_to_writer<W: Write>(writer: &mut W, record: &Sequence) -> Result<()> {
    writeln!(writer, "{}", record.header())?;
    for chunk in record.sequence.chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
