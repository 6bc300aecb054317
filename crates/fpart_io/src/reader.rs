//! Problem file reader.
//!
//! Header and pair sections are plain whitespace-separated integers; the net
//! section is line-oriented because each net line carries a variable number
//! of sinks. Every parse failure reports the one-based line number.

use crate::error::ReadError;
use fpart_model::{DeviceId, FixedPair, NodeId, PartitionInstance, SignalNet};
use std::path::Path;

/// Reads and validates a partitioning problem from a file.
pub fn read_instance(path: &Path) -> Result<PartitionInstance, ReadError> {
    let content = std::fs::read_to_string(path)?;
    parse_instance(&content)
}

/// Parses and validates a partitioning problem from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn parse_instance(content: &str) -> Result<PartitionInstance, ReadError> {
    let mut tokens = Tokens::new(content);

    let num_devices = tokens.next_u32("device count")?;
    let num_channels = tokens.next_u32("channel count")?;
    let capacity = tokens.next_u32("capacity")?;
    let num_nodes = tokens.next_u32("node count")?;
    let num_nets = tokens.next_u32("net count")?;
    let num_pairs = tokens.next_u32("fixed pair count")?;

    let mut channels = Vec::with_capacity(num_channels as usize);
    for _ in 0..num_channels {
        let a = tokens.next_u32("channel device id")?;
        let b = tokens.next_u32("channel device id")?;
        channels.push((DeviceId::from_raw(a), DeviceId::from_raw(b)));
    }

    let mut nets = Vec::with_capacity(num_nets as usize);
    for _ in 0..num_nets {
        let (line, items) = tokens.next_line("net line")?;
        let mut items = items.iter();
        let source = match items.next() {
            Some(tok) => parse_u32(line, "net source node id", tok)?,
            None => {
                return Err(ReadError::Malformed {
                    line,
                    expected: "net source node id",
                    found: "(empty line)".to_string(),
                })
            }
        };
        let mut sinks = Vec::new();
        for tok in items {
            sinks.push(NodeId::from_raw(parse_u32(line, "net sink node id", tok)?));
        }
        nets.push(SignalNet {
            source: NodeId::from_raw(source),
            sinks,
        });
    }

    let mut fixed_pairs = Vec::with_capacity(num_pairs as usize);
    for _ in 0..num_pairs {
        let node = tokens.next_u32("fixed pair node id")?;
        let device = tokens.next_u32("fixed pair device id")?;
        fixed_pairs.push(FixedPair {
            node: NodeId::from_raw(node),
            device: DeviceId::from_raw(device),
        });
    }

    PartitionInstance::new(num_devices, capacity, num_nodes, &channels, &nets, fixed_pairs)
        .map_err(Into::into)
}

fn parse_u32(line: usize, expected: &'static str, token: &str) -> Result<u32, ReadError> {
    token.parse().map_err(|_| ReadError::Malformed {
        line,
        expected,
        found: token.to_string(),
    })
}

/// A cursor over the input's whitespace tokens that can also hand out whole
/// lines for the net section.
struct Tokens<'a> {
    /// One entry per input line: (one-based number, tokens).
    lines: Vec<(usize, Vec<&'a str>)>,
    line: usize,
    tok: usize,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.split_whitespace().collect()))
            .collect();
        Self {
            lines,
            line: 0,
            tok: 0,
        }
    }

    /// Returns the next token, crossing line boundaries freely.
    fn next_token(&mut self, expected: &'static str) -> Result<(usize, &'a str), ReadError> {
        loop {
            let Some((number, tokens)) = self.lines.get(self.line) else {
                return Err(ReadError::UnexpectedEof { expected });
            };
            if self.tok < tokens.len() {
                let token = tokens[self.tok];
                self.tok += 1;
                return Ok((*number, token));
            }
            self.line += 1;
            self.tok = 0;
        }
    }

    fn next_u32(&mut self, expected: &'static str) -> Result<u32, ReadError> {
        let (line, token) = self.next_token(expected)?;
        parse_u32(line, expected, token)
    }

    /// Returns the next whole line. A partially consumed line is abandoned
    /// first, so a section that ends mid-line does not bleed into the next.
    fn next_line(&mut self, expected: &'static str) -> Result<(usize, Vec<&'a str>), ReadError> {
        if self.tok > 0 {
            self.line += 1;
            self.tok = 0;
        }
        let Some((number, tokens)) = self.lines.get(self.line) else {
            return Err(ReadError::UnexpectedEof { expected });
        };
        self.line += 1;
        Ok((*number, tokens.clone()))
    }
}
