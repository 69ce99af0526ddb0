//! Incremental reader for record files.
//!
//! Accepts either a single top-level JSON array or a flat sequence of JSON
//! values (newline-delimited or simply concatenated). Values are parsed one
//! at a time so memory stays bounded by the largest single record.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};

use crate::error::{Error, Result};

enum State<R: BufRead> {
    /// Layout not detected yet.
    Pending(R),
    /// Inside a top-level array; `after_element` is true once an element
    /// has been read and a `,` or `]` is due.
    Array {
        reader: PushBack<R>,
        after_element: bool,
    },
    Sequence(StreamDeserializer<'static, IoRead<R>, Value>),
    Done,
}

/// Lazy, finite sequence of parsed records. Stops at end of input or after
/// yielding the first parse error.
pub struct RecordStream<R: BufRead> {
    state: State<R>,
    position: usize,
}

impl RecordStream<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::Config(format!("File not found: {}", path.display())),
            _ => Error::Config(format!("Failed to open {}: {}", path.display(), e)),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            state: State::Pending(reader),
            position: 0,
        }
    }

    fn fail(&mut self, source: serde_json::Error) -> Option<Result<Value>> {
        self.state = State::Done;
        Some(Err(Error::RecordStream {
            position: self.position,
            source,
        }))
    }

    fn yielded(&mut self, value: Value) -> Option<Result<Value>> {
        self.position += 1;
        Some(Ok(value))
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,
                State::Pending(mut reader) => match skip_whitespace(&mut reader) {
                    Ok(None) => return None,
                    Ok(Some(b'[')) => {
                        reader.consume(1);
                        self.state = State::Array {
                            reader: PushBack::new(reader),
                            after_element: false,
                        };
                    }
                    Ok(Some(_)) => {
                        let stream = serde_json::Deserializer::from_reader(reader).into_iter();
                        self.state = State::Sequence(stream);
                    }
                    Err(e) => return self.fail(serde_json::Error::io(e)),
                },
                State::Sequence(mut stream) => {
                    let item = stream.next();
                    self.state = State::Sequence(stream);
                    return match item {
                        None => {
                            self.state = State::Done;
                            None
                        }
                        Some(Ok(value)) => self.yielded(value),
                        Some(Err(e)) => self.fail(e),
                    };
                }
                State::Array {
                    mut reader,
                    after_element,
                } => {
                    let next = match skip_whitespace(&mut reader) {
                        Ok(next) => next,
                        Err(e) => return self.fail(serde_json::Error::io(e)),
                    };
                    match (next, after_element) {
                        (None, _) => {
                            let msg = "unterminated top-level array";
                            return self.fail(serde_json::Error::custom(msg));
                        }
                        (Some(b']'), _) => return None,
                        (Some(b','), true) => reader.consume(1),
                        (Some(_), false) => {}
                        (Some(other), true) => {
                            let msg = format!("expected `,` or `]`, found `{}`", char::from(other));
                            return self.fail(serde_json::Error::custom(msg));
                        }
                    }
                    let parsed = {
                        let mut de = serde_json::Deserializer::from_reader(&mut reader);
                        Value::deserialize(&mut de)
                    };
                    // A number only ends once the byte after it has been read.
                    if matches!(parsed, Ok(Value::Number(_))) {
                        reader.unread_last();
                    }
                    self.state = State::Array {
                        reader,
                        after_element: true,
                    };
                    return match parsed {
                        Ok(value) => self.yielded(value),
                        Err(e) => self.fail(e),
                    };
                }
            }
        }
    }
}

/// Buffered reader that can hand back the last byte it gave out.
///
/// Each array element gets its own short-lived deserializer, and whatever
/// that deserializer read past the element would otherwise be lost.
struct PushBack<R> {
    inner: R,
    pending: Option<u8>,
    last: Option<u8>,
}

impl<R: BufRead> PushBack<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            pending: None,
            last: None,
        }
    }

    fn unread_last(&mut self) {
        if let Some(byte) = self.last.take() {
            self.pending = Some(byte);
        }
    }
}

impl<R: BufRead> Read for PushBack<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        self.last = n.checked_sub(1).map(|i| buf[i]);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for PushBack<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.pending {
            Some(ref byte) => Ok(std::slice::from_ref(byte)),
            None => self.inner.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        if amt == 0 {
            return;
        }
        if self.pending.take().is_some() {
            self.inner.consume(amt - 1);
        } else {
            self.inner.consume(amt);
        }
    }
}

/// Consumes whitespace and returns the next byte without consuming it.
fn skip_whitespace<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        let (skipped, found) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            match buf.iter().position(|b| !b.is_ascii_whitespace()) {
                Some(offset) => (offset, Some(buf[offset])),
                None => (buf.len(), None),
            }
        };
        reader.consume(skipped);
        if found.is_some() {
            return Ok(found);
        }
    }
}
