//! The batch processor: reads `<operation> <int> <int>` token triples from an
//! input stream, applies each operation, and appends one decimal result per
//! line to an output sink, in input order. A record that cannot be processed
//! is reported to the injected [`BatchObserver`] and skipped; only
//! stream-level I/O failures end the run.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ops::{DivisionByZero, Op, UnknownOperation};

/// Fixed path the command line front end writes batch results to.
pub const OUTPUT_FILE: &str = "output.txt";

/// One parsed unit of work: an operation and its two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub op: Op,
    pub lhs: i32,
    pub rhs: i32,
}

impl Record {
    /// Apply the record's operation to its operands.
    pub fn apply(&self) -> Result<i32, DivisionByZero> {
        self.op.apply(self.lhs, self.rhs)
    }
}

/// Why a single record was skipped. None of these end the run.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
    #[error("operand \"{token}\" is not an integer")]
    InvalidOperand {
        token: String,
        source: std::num::ParseIntError,
    },
    #[error("input ended in the middle of a record")]
    TruncatedRecord,
    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZero),
}

/// A failure that ends the batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("unable to open input file {}", .path.display())]
    InputUnopenable { path: PathBuf, source: io::Error },
    #[error("unable to create output file {}", .path.display())]
    OutputUnopenable { path: PathBuf, source: io::Error },
    #[error("unable to read records from the input")]
    Read(#[source] io::Error),
    #[error("unable to write a result to the output")]
    Write(#[source] io::Error),
}

/// Receives progress narration from a batch run.
///
/// Every method has a no-op default, so implementations override only the
/// events they care about. Narration is observational; it never affects what
/// the run writes to the sink.
pub trait BatchObserver {
    /// A triple has been tokenized: the not-yet-dispatched operation name and
    /// both operands.
    fn on_record(&mut self, name: &str, lhs: i32, rhs: i32) {
        let _ = (name, lhs, rhs);
    }

    /// A result has been appended to the sink.
    fn on_result(&mut self, result: i32) {
        let _ = result;
    }

    /// A record has been skipped.
    fn on_skipped(&mut self, error: &RecordError) {
        let _ = error;
    }
}

/// Observer that ignores every event.
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Observer that narrates every event to a writer, one line each.
pub struct Narrator<W> {
    out: W,
}

impl Narrator<io::Stderr> {
    /// A narrator on the diagnostic stream; this is what the binary injects.
    pub fn stderr() -> Self {
        Narrator::new(io::stderr())
    }
}

impl<W: Write> Narrator<W> {
    pub fn new(out: W) -> Self {
        Narrator { out }
    }

    /// Hand the writer back, e.g. to inspect captured narration.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BatchObserver for Narrator<W> {
    // Narration writes are best-effort; a failed write never ends the run.
    fn on_record(&mut self, name: &str, lhs: i32, rhs: i32) {
        let _ = writeln!(self.out, "Processing: {name} {lhs} {rhs}");
    }

    fn on_result(&mut self, result: i32) {
        let _ = writeln!(self.out, "Result: {result}");
    }

    fn on_skipped(&mut self, error: &RecordError) {
        let _ = writeln!(self.out, "Skipped: {error}");
    }
}

/// End-of-run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Results appended to the sink.
    pub written: usize,
    /// Records reported and dropped.
    pub skipped: usize,
}

impl BatchSummary {
    /// Total records the run attempted.
    pub fn records(&self) -> usize {
        self.written + self.skipped
    }
}

/// Process every record from `input`, appending one result line per
/// successful record to `output`.
///
/// Records are whitespace-separated token triples; physical line breaks carry
/// no meaning. The sink is flushed before returning. Narration fires for
/// every fully tokenized triple before its name is dispatched, so unknown
/// operations are narrated too.
pub fn process(
    mut input: impl Read,
    mut output: impl Write,
    observer: &mut impl BatchObserver,
) -> Result<BatchSummary, BatchError> {
    let mut text = String::new();
    input.read_to_string(&mut text).map_err(BatchError::Read)?;

    let mut summary = BatchSummary::default();
    let mut tokens = text.split_whitespace();
    while let Some(name) = tokens.next() {
        let (lhs, rhs) = match read_operands(&mut tokens) {
            Ok(operands) => operands,
            Err(error) => {
                observer.on_skipped(&error);
                summary.skipped += 1;
                continue;
            }
        };
        observer.on_record(name, lhs, rhs);

        let record = match name.parse::<Op>() {
            Ok(op) => Record { op, lhs, rhs },
            Err(unknown) => {
                observer.on_skipped(&unknown.into());
                summary.skipped += 1;
                continue;
            }
        };
        match record.apply() {
            Ok(result) => {
                writeln!(output, "{result}").map_err(BatchError::Write)?;
                observer.on_result(result);
                summary.written += 1;
            }
            Err(division) => {
                observer.on_skipped(&division.into());
                summary.skipped += 1;
            }
        }
    }
    output.flush().map_err(BatchError::Write)?;

    Ok(summary)
}

/// Process a batch between files: open `input`, create or truncate `output`,
/// and run [`process`] over them.
///
/// The input is opened first, so an unopenable input leaves the output file
/// untouched. Both files are closed when the run returns.
pub fn process_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    observer: &mut impl BatchObserver,
) -> Result<BatchSummary, BatchError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let reader = File::open(input).map_err(|source| BatchError::InputUnopenable {
        path: input.to_path_buf(),
        source,
    })?;
    let writer = File::create(output).map_err(|source| BatchError::OutputUnopenable {
        path: output.to_path_buf(),
        source,
    })?;
    process(BufReader::new(reader), BufWriter::new(writer), observer)
}

/// Take and parse the two operand tokens that follow an operation name.
/// Both tokens come off the stream before either is parsed: a malformed
/// triple is consumed whole, leaving the stream aligned on the next name.
fn read_operands<'t>(
    tokens: &mut impl Iterator<Item = &'t str>,
) -> Result<(i32, i32), RecordError> {
    let lhs = tokens.next().ok_or(RecordError::TruncatedRecord)?;
    let rhs = tokens.next().ok_or(RecordError::TruncatedRecord)?;
    Ok((parse_operand(lhs)?, parse_operand(rhs)?))
}

fn parse_operand(token: &str) -> Result<i32, RecordError> {
    token.parse().map_err(|source| RecordError::InvalidOperand {
        token: token.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Observer that records every event for later inspection.
    #[derive(Default)]
    struct Recording {
        events: Vec<String>,
    }

    impl BatchObserver for Recording {
        fn on_record(&mut self, name: &str, lhs: i32, rhs: i32) {
            self.events.push(format!("record {name} {lhs} {rhs}"));
        }

        fn on_result(&mut self, result: i32) {
            self.events.push(format!("result {result}"));
        }

        fn on_skipped(&mut self, error: &RecordError) {
            self.events.push(format!("skipped {error}"));
        }
    }

    fn run(input: &str) -> (String, BatchSummary, Vec<String>) {
        let mut observer = Recording::default();
        let mut sink = Vec::new();
        let summary = process(input.as_bytes(), &mut sink, &mut observer).unwrap();
        (String::from_utf8(sink).unwrap(), summary, observer.events)
    }

    #[test]
    fn results_come_out_in_input_order() {
        let (out, summary, _) = run("add 3 3 subtract 10 4 multiply 2 5 divide 9 3");
        assert_eq!(out, "6\n6\n10\n3\n");
        assert_eq!(summary, BatchSummary { written: 4, skipped: 0 });
    }

    #[test]
    fn unknown_operation_skips_only_that_record() {
        let (out, summary, events) = run("add 3 3\nfoo 1 2\nmultiply 2 5\n");
        assert_eq!(out, "6\n10\n");
        assert_eq!(summary, BatchSummary { written: 2, skipped: 1 });
        assert_eq!(
            events,
            vec![
                "record add 3 3",
                "result 6",
                "record foo 1 2",
                "skipped unknown operation \"foo\"",
                "record multiply 2 5",
                "result 10",
            ],
        );
    }

    #[test]
    fn empty_input_is_an_empty_run() {
        let (out, summary, events) = run("");
        assert_eq!(out, "");
        assert_eq!(summary.records(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn line_breaks_are_insignificant() {
        let (out, summary, _) = run("add\n3\n3\nmultiply 2 5");
        assert_eq!(out, "6\n10\n");
        assert_eq!(summary.written, 2);
    }

    #[test]
    fn malformed_operand_skips_the_triple_and_continues() {
        let (out, summary, events) = run("add three 3 multiply 2 5");
        assert_eq!(out, "10\n");
        assert_eq!(summary, BatchSummary { written: 1, skipped: 1 });
        assert_eq!(events[0], "skipped operand \"three\" is not an integer");
    }

    #[test]
    fn bad_triple_leaves_the_stream_aligned_on_the_next_name() {
        let (out, summary, events) = run("add 1 2 subtract nine 9 multiply 2 5");
        assert_eq!(out, "3\n10\n");
        assert_eq!(summary, BatchSummary { written: 2, skipped: 1 });
        assert_eq!(
            events,
            vec![
                "record add 1 2",
                "result 3",
                "skipped operand \"nine\" is not an integer",
                "record multiply 2 5",
                "result 10",
            ],
        );
    }

    #[test]
    fn malformed_second_operand_consumes_the_whole_triple() {
        let (out, summary, _) = run("subtract 9 x add 1 2");
        assert_eq!(out, "3\n");
        assert_eq!(summary, BatchSummary { written: 1, skipped: 1 });
    }

    #[test]
    fn operand_overflow_is_a_malformed_operand() {
        let (out, summary, _) = run("add 2147483648 0");
        assert_eq!(out, "");
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn signed_operands_parse() {
        let (out, _, _) = run("add +3 -5");
        assert_eq!(out, "-2\n");
    }

    #[test]
    fn trailing_partial_triple_is_reported() {
        let (out, summary, events) = run("add 3 3 subtract 4");
        assert_eq!(out, "6\n");
        assert_eq!(summary, BatchSummary { written: 1, skipped: 1 });
        assert_eq!(
            events.last().unwrap(),
            "skipped input ended in the middle of a record",
        );
    }

    #[test]
    fn divide_by_zero_is_narrated_and_skipped() {
        let (out, summary, events) = run("divide 5 0");
        assert_eq!(out, "");
        assert_eq!(summary, BatchSummary { written: 0, skipped: 1 });
        assert_eq!(
            events,
            vec!["record divide 5 0", "skipped division by zero"],
        );
    }

    #[test]
    fn results_wrap_like_the_operations() {
        let (out, _, _) = run("add 2147483647 1");
        assert_eq!(out, "-2147483648\n");
    }

    #[test]
    fn silent_observer_still_counts() {
        let mut sink = Vec::new();
        let summary = process(
            "add 1 1 bogus 1 1".as_bytes(),
            &mut sink,
            &mut SilentObserver,
        )
        .unwrap();
        assert_eq!(summary, BatchSummary { written: 1, skipped: 1 });
    }

    #[test]
    fn narrator_writes_one_line_per_event() {
        let mut narrator = Narrator::new(Vec::new());
        process("add 3 3\ndivide 5 0\n".as_bytes(), io::sink(), &mut narrator).unwrap();
        let narration = String::from_utf8(narrator.into_inner()).unwrap();
        assert_eq!(
            narration,
            "Processing: add 3 3\n\
             Result: 6\n\
             Processing: divide 5 0\n\
             Skipped: division by zero\n",
        );
    }

    #[test]
    fn record_apply_uses_its_operation() {
        let record = Record { op: Op::Subtract, lhs: 10, rhs: 4 };
        assert_eq!(record.apply(), Ok(6));
    }
}
