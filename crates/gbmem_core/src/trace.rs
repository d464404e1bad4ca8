//! Binary recording of memory accesses and control-flow edges.
//!
//! Each event is one opcode byte followed by a packed little-endian payload:
//!
//! | opcode | payload |
//! |---|---|
//! | 0 (edge) | source u32, target u32, kind u8 |
//! | 1 (read) | pc u32, address u32, value u32, size u8 |
//! | 2 (write) | pc u32, address u32, value u32, size u8 |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use thiserror::Error;

const INITIAL_CAPACITY: usize = 1 << 19;

const OPCODE_EDGE: u8 = 0;
const OPCODE_READ: u8 = 1;
const OPCODE_WRITE: u8 = 2;

const EDGE_PAYLOAD: usize = 9;
const MEMORY_PAYLOAD: usize = 13;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum EdgeKind {
    Branch = 0,
    Call = 1,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemoryEvent {
    pub pc: u32,
    pub address: u32,
    pub value: u32,
    pub size: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TraceEvent {
    Edge {
        source: u32,
        target: u32,
        kind: EdgeKind,
    },
    Read(MemoryEvent),
    Write(MemoryEvent),
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum TraceError {
    #[error("trace ends mid-event at byte {offset}")]
    UnexpectedEof { offset: usize },
    #[error("unknown trace opcode {opcode:#04x} at byte {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
    #[error("unknown edge kind {kind} at byte {offset}")]
    UnknownEdgeKind { kind: u8, offset: usize },
}

/// In-memory trace buffer. Recording calls are no-ops until [`start`].
///
/// [`start`]: TraceRecorder::start
#[derive(Debug, Default)]
pub struct TraceRecorder {
    enabled: bool,
    buffer: Vec<u8>,
}

impl TraceRecorder {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Begin a fresh trace. Returns `false` if one is already running.
    pub fn start(&mut self) -> bool {
        if self.enabled {
            return false;
        }
        self.buffer.clear();
        self.buffer.reserve(INITIAL_CAPACITY);
        self.enabled = true;
        true
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Stop tracing and hand back the recorded bytes.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        self.enabled = false;
        std::mem::take(&mut self.buffer)
    }

    /// Write the trace to `path`, then stop and clear the recorder.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !self.enabled {
            bail!("cannot save trace to {}: tracing is not running", path.display());
        }
        fs::write(path, &self.buffer)
            .with_context(|| format!("failed to write trace to {}", path.display()))?;
        log::info!("Saved {} trace bytes to {}", self.buffer.len(), path.display());

        self.buffer.clear();
        self.enabled = false;
        Ok(())
    }

    pub fn add_read(&mut self, pc: u32, address: u32, value: u32, size: u8) {
        self.push_memory(OPCODE_READ, pc, address, value, size);
    }

    pub fn add_write(&mut self, pc: u32, address: u32, value: u32, size: u8) {
        self.push_memory(OPCODE_WRITE, pc, address, value, size);
    }

    pub fn add_edge(&mut self, source: u32, target: u32, kind: EdgeKind) {
        if !self.enabled {
            return;
        }
        self.buffer.push(OPCODE_EDGE);
        self.buffer.extend_from_slice(&source.to_le_bytes());
        self.buffer.extend_from_slice(&target.to_le_bytes());
        self.buffer.push(kind as u8);
    }

    fn push_memory(&mut self, opcode: u8, pc: u32, address: u32, value: u32, size: u8) {
        if !self.enabled {
            return;
        }
        self.buffer.push(opcode);
        self.buffer.extend_from_slice(&pc.to_le_bytes());
        self.buffer.extend_from_slice(&address.to_le_bytes());
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self.buffer.push(size);
    }
}

/// Parse a recorded trace back into events.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events = Vec::new();
    let mut offset = 0;

    while let Some(&opcode) = bytes.get(offset) {
        let payload_len = match opcode {
            OPCODE_EDGE => EDGE_PAYLOAD,
            OPCODE_READ | OPCODE_WRITE => MEMORY_PAYLOAD,
            _ => return Err(TraceError::UnknownOpcode { opcode, offset }),
        };
        let payload = bytes
            .get(offset + 1..offset + 1 + payload_len)
            .ok_or(TraceError::UnexpectedEof { offset })?;
        let word = |at: usize| {
            u32::from_le_bytes([payload[at], payload[at + 1], payload[at + 2], payload[at + 3]])
        };

        let event = match opcode {
            OPCODE_EDGE => {
                let kind = match payload[8] {
                    0 => EdgeKind::Branch,
                    1 => EdgeKind::Call,
                    kind => return Err(TraceError::UnknownEdgeKind { kind, offset }),
                };
                TraceEvent::Edge {
                    source: word(0),
                    target: word(4),
                    kind,
                }
            }
            _ => {
                let access = MemoryEvent {
                    pc: word(0),
                    address: word(4),
                    value: word(8),
                    size: payload[12],
                };
                if opcode == OPCODE_READ {
                    TraceEvent::Read(access)
                } else {
                    TraceEvent::Write(access)
                }
            }
        };
        events.push(event);
        offset += 1 + payload_len;
    }

    Ok(events)
}

/// Control-flow statistics of a recorded trace.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TraceSummary {
    pub event_count: usize,
    pub reads: usize,
    pub writes: usize,
    /// Distinct `(source, target, kind)` edges.
    pub edges: BTreeSet<(u32, u32, EdgeKind)>,
    /// Hit count per basic block, keyed by the edge target that enters it.
    pub basic_blocks: BTreeMap<u32, usize>,
    /// Targets of call edges.
    pub functions: BTreeSet<u32>,
}

impl TraceSummary {
    pub fn from_events(events: &[TraceEvent]) -> Self {
        let mut summary = Self::default();
        for event in events {
            summary.event_count += 1;
            match *event {
                TraceEvent::Edge {
                    source,
                    target,
                    kind,
                } => {
                    if kind == EdgeKind::Call {
                        summary.functions.insert(target);
                    }
                    summary.edges.insert((source, target, kind));
                    *summary.basic_blocks.entry(target).or_default() += 1;
                }
                TraceEvent::Read(_) => summary.reads += 1,
                TraceEvent::Write(_) => summary.writes += 1,
            }
        }
        summary
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TraceError> {
        decode_events(bytes).map(|events| Self::from_events(&events))
    }

    /// Decode and summarize a trace file written by [`TraceRecorder::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("failed to read trace {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("malformed trace {}", path.display()))
    }
}

impl fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event count         : {}", self.event_count)?;
        writeln!(f, "Memory reads/writes : {}/{}", self.reads, self.writes)?;
        writeln!(f, "Unique edges        : {}", self.edges.len())?;
        writeln!(f, "Unique basic blocks : {}", self.basic_blocks.len())?;
        writeln!(f, "Functions called    : {}", self.functions.len())
    }
}
