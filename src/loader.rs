//! Chunked readers for the location and connection files.
//!
//! Both files are headerless and line-oriented; line `i` (1-based) describes
//! user `i`:
//!
//! ```text
//! locations.txt            connections.txt
//! 40.4168,-3.7038          2, 3, 17
//! 41.3874,2.1686           1
//! ...                      (empty line: no connections)
//! ```
//!
//! Records are parsed `chunk_size` at a time and handed to a
//! [`GraphBuilder`], so only one chunk of parsed records is alive at once.
//! Malformed lines and tokens are counted in the builder's
//! [`IngestStats`](crate::store::IngestStats) and skipped.

use crate::config::LoadConfig;
use crate::error::{Error, Result};
use crate::store::{EdgeRecord, GraphBuilder, GraphStore, IngestStats, LocationRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reads input files into a [`GraphBuilder`].
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoadConfig,
}

/// One input line, keyed by its 1-based line number.
enum Line {
    Record(u64, StringRecord),
    Malformed(u64),
}

impl Loader {
    /// Create a loader.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load both files and finalize the graph.
    ///
    /// The node count is `max_nodes` if configured, otherwise the number of
    /// lines in the location file.
    pub fn load(
        &self,
        locations: impl AsRef<Path>,
        connections: impl AsRef<Path>,
    ) -> Result<(GraphStore, IngestStats)> {
        let start = Instant::now();
        let locations = locations.as_ref();
        let connections = connections.as_ref();

        let node_count = match self.config.max_nodes {
            Some(n) => n,
            None => count_lines(BufReader::new(File::open(locations)?))?,
        };
        if node_count == 0 {
            return Err(Error::InvalidState(
                "node count is zero: empty location file and no max_nodes",
            ));
        }
        info!(node_count, path = %locations.display(), "preparing graph storage");

        let mut builder = GraphBuilder::new(node_count)?;
        self.read_locations(File::open(locations)?, &mut builder)?;
        self.read_connections(File::open(connections)?, &mut builder)?;

        let (graph, stats) = builder.finish();
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            invalid_locations = stats.invalid_locations,
            invalid_edges = stats.invalid_edges(),
            "data loaded"
        );
        Ok((graph, stats))
    }

    /// Read `lat,long` lines into `builder`.
    pub fn read_locations<R: Read>(&self, reader: R, builder: &mut GraphBuilder) -> Result<()> {
        let limit = builder.node_count() as u64;
        let mut chunk: Vec<LocationRecord> = Vec::with_capacity(self.chunk_size());
        let mut lines = 0u64;

        for line in self.lines(reader) {
            match line? {
                Line::Record(id, _) | Line::Malformed(id) if id > limit => break,
                Line::Record(id, record) => match parse_location(&record) {
                    Some((lat, long)) => chunk.push(LocationRecord { id, lat, long }),
                    None => builder.reject_location(),
                },
                Line::Malformed(_) => builder.reject_location(),
            }
            lines += 1;
            if chunk.len() == self.chunk_size() {
                builder.extend_locations(chunk.drain(..));
                debug!(lines, "location chunk ingested");
            }
        }
        builder.extend_locations(chunk);

        info!(
            lines,
            invalid = builder.stats().invalid_locations,
            "locations read"
        );
        Ok(())
    }

    /// Read comma-separated neighbor-id lines into `builder`.
    pub fn read_connections<R: Read>(&self, reader: R, builder: &mut GraphBuilder) -> Result<()> {
        let limit = builder.node_count() as u64;
        let mut chunk: Vec<EdgeRecord> = Vec::with_capacity(self.chunk_size());
        let mut lines = 0u64;

        for line in self.lines(reader) {
            match line? {
                Line::Record(id, _) | Line::Malformed(id) if id > limit => break,
                Line::Record(id, record) => {
                    let (neighbors, bad) = parse_connections(&record);
                    builder.reject_connections(bad);
                    chunk.push(EdgeRecord { id, neighbors });
                }
                Line::Malformed(_) => builder.reject_connections(1),
            }
            lines += 1;
            if chunk.len() == self.chunk_size() {
                builder.extend_edges(chunk.drain(..));
                debug!(lines, "connection chunk ingested");
            }
        }
        builder.extend_edges(chunk);

        info!(
            lines,
            invalid = builder.stats().invalid_edges(),
            "connections read"
        );
        Ok(())
    }

    fn chunk_size(&self) -> usize {
        self.config.chunk_size.max(1)
    }

    /// Numbers lines itself and parses each one on its own, so a blank or
    /// malformed line never shifts or swallows the lines after it.
    fn lines<R: Read>(&self, reader: R) -> impl Iterator<Item = Result<Line>> {
        let mut fields = ReaderBuilder::new();
        fields
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .delimiter(self.config.delimiter)
            .buffer_capacity(LINE_BUFFER);

        BufReader::new(reader)
            .split(b'\n')
            .enumerate()
            .map(move |(i, bytes)| {
                let mut bytes = bytes?;
                if bytes.last() == Some(&b'\r') {
                    let _ = bytes.pop();
                }
                parse_line(&fields, i as u64 + 1, &bytes)
            })
    }
}

/// Initial per-line field buffer; longer lines grow it.
const LINE_BUFFER: usize = 256;

/// Splits one line into fields. A blank line is an empty record.
fn parse_line(fields: &ReaderBuilder, line: u64, bytes: &[u8]) -> Result<Line> {
    let mut record = StringRecord::new();
    match fields.from_reader(bytes).read_record(&mut record) {
        Ok(_) => Ok(Line::Record(line, record)),
        Err(err) => match err.into_kind() {
            csv::ErrorKind::Io(e) => Err(Error::Io(e)),
            csv::ErrorKind::Utf8 { .. } => {
                warn!(line, "skipping line with invalid UTF-8");
                Ok(Line::Malformed(line))
            }
            other => Err(Error::Parse {
                line,
                message: format!("{other:?}"),
            }),
        },
    }
}

fn parse_location(record: &StringRecord) -> Option<(f64, f64)> {
    if record.len() != 2 {
        return None;
    }
    let lat = record[0].parse().ok()?;
    let long = record[1].parse().ok()?;
    Some((lat, long))
}

/// Returns the parsed ids and the number of tokens that failed to parse.
fn parse_connections(record: &StringRecord) -> (Vec<u64>, u64) {
    let mut ids = Vec::with_capacity(record.len());
    let mut bad = 0;
    for field in record.iter().filter(|f| !f.is_empty()) {
        match field.parse() {
            Ok(id) => ids.push(id),
            Err(_) => bad += 1,
        }
    }
    (ids, bad)
}

/// Number of lines in `reader`.
pub fn count_lines<R: BufRead>(reader: R) -> Result<usize> {
    let mut n = 0;
    for line in reader.split(b'\n') {
        let _ = line?;
        n += 1;
    }
    Ok(n)
}
