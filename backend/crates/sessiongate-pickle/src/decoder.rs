//! Opcode interpreter.
//!
//! Decoding happens in two phases. The interpreter executes opcodes against
//! an operand stack, a mark stack and a memo, all of which hold ids into a
//! node arena. Containers are mutable arena nodes, so a container memoized
//! before it is filled is seen filled when fetched back with `GET`, exactly
//! as the format intends. At `STOP` the single remaining node is materialized
//! into an owned [`DecodedValue`] tree under the node, depth and byte budgets.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use num_bigint::BigInt;

use crate::error::{DecodeError, DecodeResult, LimitKind};
use crate::limits::DecodeLimits;
use crate::opcodes::Opcode;
use crate::reader::Reader;
use crate::value::DecodedValue;

type NodeId = usize;

#[derive(Debug)]
enum Node {
    Scalar(DecodedValue),
    List(Vec<NodeId>),
    Tuple(Vec<NodeId>),
    Dict(Vec<(NodeId, NodeId)>),
    Set { items: Vec<NodeId>, frozen: bool },
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(value) => value.kind(),
            Node::List(_) => "list",
            Node::Tuple(_) => "tuple",
            Node::Dict(_) => "dict",
            Node::Set { frozen: true, .. } => "frozenset",
            Node::Set { frozen: false, .. } => "set",
        }
    }
}

/// Decode a pickle stream with the default [`DecodeLimits`].
pub fn decode(bytes: &[u8]) -> DecodeResult<DecodedValue> {
    decode_with_limits(bytes, &DecodeLimits::default())
}

/// Decode a pickle stream under explicit resource ceilings.
///
/// Bytes after `STOP` are ignored.
pub fn decode_with_limits(bytes: &[u8], limits: &DecodeLimits) -> DecodeResult<DecodedValue> {
    Machine::new(bytes, limits).run()
}

struct Machine<'a> {
    reader: Reader<'a>,
    limits: &'a DecodeLimits,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    marks: Vec<usize>,
    memo: Vec<NodeId>,
    opcodes: usize,
    // offset of the opcode being executed
    offset: usize,
}

impl<'a> Machine<'a> {
    fn new(bytes: &'a [u8], limits: &'a DecodeLimits) -> Self {
        Self {
            reader: Reader::new(bytes),
            limits,
            nodes: Vec::new(),
            stack: Vec::new(),
            marks: Vec::new(),
            memo: Vec::new(),
            opcodes: 0,
            offset: 0,
        }
    }

    fn run(mut self) -> DecodeResult<DecodedValue> {
        loop {
            if self.reader.is_empty() {
                return Err(DecodeError::Truncated {
                    offset: self.reader.position(),
                    context: "input ended before STOP",
                });
            }

            self.offset = self.reader.position();
            self.opcodes += 1;
            if self.opcodes > self.limits.max_opcodes {
                return Err(DecodeError::limit(LimitKind::Opcodes, self.limits.max_opcodes));
            }

            let byte = self.reader.u8("opcode")?;
            let op = match Opcode::from_byte(byte) {
                Some(op) if op.is_data() => op,
                known => {
                    return Err(DecodeError::UnsupportedOpcode {
                        opcode: byte,
                        name: known.map(Opcode::name).unwrap_or("unknown"),
                        offset: self.offset,
                    })
                },
            };

            if op == Opcode::Stop {
                return self.finish();
            }
            self.execute(op, byte)?;
        }
    }

    fn execute(&mut self, op: Opcode, byte: u8) -> DecodeResult<()> {
        match op {
            Opcode::Proto => {
                self.reader.u8("PROTO operand")?;
            },
            Opcode::Frame => {
                self.reader.u64_le("FRAME operand")?;
            },

            Opcode::None => self.push_scalar(DecodedValue::None),
            Opcode::NewTrue => self.push_scalar(DecodedValue::Bool(true)),
            Opcode::NewFalse => self.push_scalar(DecodedValue::Bool(false)),
            Opcode::Int => {
                let line = self.read_line("INT operand")?;
                let value = match line {
                    b"00" => DecodedValue::Bool(false),
                    b"01" => DecodedValue::Bool(true),
                    digits => DecodedValue::Integer(self.parse_int(digits)?),
                };
                self.push_scalar(value);
            },
            Opcode::BinInt => {
                let value = self.reader.i32_le("BININT operand")?;
                self.push_scalar(DecodedValue::Integer(BigInt::from(value)));
            },
            Opcode::BinInt1 => {
                let value = self.reader.u8("BININT1 operand")?;
                self.push_scalar(DecodedValue::Integer(BigInt::from(value)));
            },
            Opcode::BinInt2 => {
                let value = self.reader.u16_le("BININT2 operand")?;
                self.push_scalar(DecodedValue::Integer(BigInt::from(value)));
            },
            Opcode::Long => {
                let line = self.read_line("LONG operand")?;
                let digits = line.strip_suffix(b"L").unwrap_or(line);
                let value = self.parse_int(digits)?;
                self.push_scalar(DecodedValue::Integer(value));
            },
            Opcode::Long1 => {
                let len = self.reader.u8("LONG1 length")?;
                let body = self.read_sized(u64::from(len), "LONG1 body")?;
                self.push_scalar(DecodedValue::Integer(BigInt::from_signed_bytes_le(body)));
            },
            Opcode::Long4 => {
                let len = self.read_signed_len("LONG4 length")?;
                let body = self.read_sized(len, "LONG4 body")?;
                self.push_scalar(DecodedValue::Integer(BigInt::from_signed_bytes_le(body)));
            },
            Opcode::Float => {
                let line = self.read_line("FLOAT operand")?;
                let value = std::str::from_utf8(line)
                    .ok()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .ok_or_else(|| self.malformed("FLOAT operand is not a number"))?;
                self.push_scalar(DecodedValue::Float(value));
            },
            Opcode::BinFloat => {
                let value = self.reader.f64_be("BINFLOAT operand")?;
                self.push_scalar(DecodedValue::Float(value));
            },

            Opcode::BinString => {
                let len = self.read_signed_len("BINSTRING length")?;
                let body = self.read_sized(len, "BINSTRING body")?;
                self.push_scalar(DecodedValue::Bytes(body.to_vec()));
            },
            Opcode::ShortBinString => {
                let len = self.reader.u8("SHORT_BINSTRING length")?;
                let body = self.read_sized(u64::from(len), "SHORT_BINSTRING body")?;
                self.push_scalar(DecodedValue::Bytes(body.to_vec()));
            },
            Opcode::Unicode => {
                let line = self.read_line("UNICODE operand")?;
                let text = decode_raw_unicode_escape(line)
                    .ok_or_else(|| self.malformed("UNICODE operand has an invalid escape"))?;
                self.push_scalar(DecodedValue::Text(text));
            },
            Opcode::BinUnicode => {
                let len = self.reader.u32_le("BINUNICODE length")?;
                self.push_text(u64::from(len), "BINUNICODE body")?;
            },
            Opcode::ShortBinUnicode => {
                let len = self.reader.u8("SHORT_BINUNICODE length")?;
                self.push_text(u64::from(len), "SHORT_BINUNICODE body")?;
            },
            Opcode::BinUnicode8 => {
                let len = self.reader.u64_le("BINUNICODE8 length")?;
                self.push_text(len, "BINUNICODE8 body")?;
            },
            Opcode::BinBytes => {
                let len = self.reader.u32_le("BINBYTES length")?;
                self.push_bytes(u64::from(len), "BINBYTES body")?;
            },
            Opcode::ShortBinBytes => {
                let len = self.reader.u8("SHORT_BINBYTES length")?;
                self.push_bytes(u64::from(len), "SHORT_BINBYTES body")?;
            },
            Opcode::BinBytes8 => {
                let len = self.reader.u64_le("BINBYTES8 length")?;
                self.push_bytes(len, "BINBYTES8 body")?;
            },
            Opcode::ByteArray8 => {
                let len = self.reader.u64_le("BYTEARRAY8 length")?;
                self.push_bytes(len, "BYTEARRAY8 body")?;
            },

            Opcode::Mark => self.marks.push(self.stack.len()),
            Opcode::EmptyList => self.push_node(Node::List(Vec::new())),
            Opcode::EmptyDict => self.push_node(Node::Dict(Vec::new())),
            Opcode::EmptyTuple => self.push_node(Node::Tuple(Vec::new())),
            Opcode::EmptySet => self.push_node(Node::Set {
                items: Vec::new(),
                frozen: false,
            }),
            Opcode::Append => {
                let item = self.pop()?;
                let target = self.top()?;
                self.extend_list(target, vec![item])?;
            },
            Opcode::Appends => {
                let items = self.pop_mark()?;
                let target = self.top()?;
                self.extend_list(target, items)?;
            },
            Opcode::SetItem => {
                let value = self.pop()?;
                let key = self.pop()?;
                let target = self.top()?;
                self.extend_dict(target, vec![(key, value)])?;
            },
            Opcode::SetItems => {
                let items = self.pop_mark()?;
                let pairs = self.pairs(items)?;
                let target = self.top()?;
                self.extend_dict(target, pairs)?;
            },
            Opcode::AddItems => {
                let items = self.pop_mark()?;
                let target = self.top()?;
                self.extend_set(target, items)?;
            },
            Opcode::List => {
                let items = self.pop_mark()?;
                self.limits.check_collection_len(items.len())?;
                self.push_node(Node::List(items));
            },
            Opcode::Dict => {
                let items = self.pop_mark()?;
                let pairs = self.pairs(items)?;
                self.limits.check_collection_len(pairs.len())?;
                self.push_node(Node::Dict(pairs));
            },
            Opcode::Tuple => {
                let items = self.pop_mark()?;
                self.limits.check_collection_len(items.len())?;
                self.push_node(Node::Tuple(items));
            },
            Opcode::Tuple1 | Opcode::Tuple2 | Opcode::Tuple3 => {
                let arity = match op {
                    Opcode::Tuple1 => 1,
                    Opcode::Tuple2 => 2,
                    _ => 3,
                };
                let items = self.pop_n(arity)?;
                self.push_node(Node::Tuple(items));
            },
            Opcode::FrozenSet => {
                let items = self.pop_mark()?;
                self.limits.check_collection_len(items.len())?;
                self.push_node(Node::Set { items, frozen: true });
            },

            Opcode::Pop => {
                if self.stack.len() > self.floor() {
                    self.stack.pop();
                } else if self.marks.pop().is_none() {
                    return Err(self.malformed("POP on an empty stack"));
                }
            },
            Opcode::PopMark => {
                self.pop_mark()?;
            },
            Opcode::Dup => {
                let top = self.top()?;
                self.stack.push(top);
            },

            Opcode::Put => {
                let index = self.read_index("PUT operand")?;
                self.memo_store(index)?;
            },
            Opcode::BinPut => {
                let index = self.reader.u8("BINPUT operand")?;
                self.memo_store(usize::from(index))?;
            },
            Opcode::LongBinPut => {
                let index = self.reader.u32_le("LONG_BINPUT operand")?;
                self.memo_store(index as usize)?;
            },
            Opcode::Memoize => {
                self.memo_store(self.memo.len())?;
            },
            Opcode::Get => {
                let index = self.read_index("GET operand")?;
                self.memo_fetch(index)?;
            },
            Opcode::BinGet => {
                let index = self.reader.u8("BINGET operand")?;
                self.memo_fetch(usize::from(index))?;
            },
            Opcode::LongBinGet => {
                let index = self.reader.u32_le("LONG_BINGET operand")?;
                self.memo_fetch(index as usize)?;
            },

            // Filtered out by `run`; refused again here so no code opcode can
            // ever fall through to execution.
            _ => {
                return Err(DecodeError::UnsupportedOpcode {
                    opcode: byte,
                    name: op.name(),
                    offset: self.offset,
                })
            },
        }
        Ok(())
    }

    fn finish(self) -> DecodeResult<DecodedValue> {
        if !self.marks.is_empty() {
            return Err(self.malformed(format!("STOP with {} unclosed MARK(s)", self.marks.len())));
        }
        let root = match self.stack.as_slice() {
            [root] => *root,
            other => {
                return Err(self.malformed(format!("STOP with {} values on the stack", other.len())))
            },
        };

        log::trace!(
            "pickle decoded: {} opcodes, {} nodes, {} memo slots",
            self.opcodes,
            self.nodes.len(),
            self.memo.len()
        );

        let mut materializer = Materializer::new(&self.nodes, self.limits, self.offset);
        let value = materializer.build(root, 1)?;
        log::trace!("pickle materialized: {} key comparisons", materializer.key_comparisons);
        Ok(value)
    }

    // -- stack helpers ----------------------------------------------------

    /// Lowest stack index the current frame may touch.
    fn floor(&self) -> usize {
        self.marks.last().copied().unwrap_or(0)
    }

    fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.stack.push(self.nodes.len() - 1);
    }

    fn push_scalar(&mut self, value: DecodedValue) {
        self.push_node(Node::Scalar(value));
    }

    fn push_text(&mut self, len: u64, context: &'static str) -> DecodeResult<()> {
        let body = self.read_sized(len, context)?;
        let text = std::str::from_utf8(body)
            .map_err(|e| self.malformed(format!("{context} is not valid UTF-8: {e}")))?;
        self.push_scalar(DecodedValue::Text(text.to_string()));
        Ok(())
    }

    fn push_bytes(&mut self, len: u64, context: &'static str) -> DecodeResult<()> {
        let body = self.read_sized(len, context)?;
        self.push_scalar(DecodedValue::Bytes(body.to_vec()));
        Ok(())
    }

    fn pop(&mut self) -> DecodeResult<NodeId> {
        if self.stack.len() > self.floor() {
            if let Some(id) = self.stack.pop() {
                return Ok(id);
            }
        }
        Err(self.malformed("stack underflow"))
    }

    fn top(&self) -> DecodeResult<NodeId> {
        match self.stack.last() {
            Some(id) if self.stack.len() > self.floor() => Ok(*id),
            _ => Err(self.malformed("stack underflow")),
        }
    }

    fn pop_n(&mut self, count: usize) -> DecodeResult<Vec<NodeId>> {
        if self.stack.len() < self.floor() + count {
            return Err(self.malformed("stack underflow"));
        }
        let at = self.stack.len() - count;
        Ok(self.stack.split_off(at))
    }

    fn pop_mark(&mut self) -> DecodeResult<Vec<NodeId>> {
        let mark = self
            .marks
            .pop()
            .ok_or_else(|| self.malformed("collection closed without a MARK"))?;
        Ok(self.stack.split_off(mark))
    }

    fn pairs(&self, items: Vec<NodeId>) -> DecodeResult<Vec<(NodeId, NodeId)>> {
        if items.len() % 2 != 0 {
            return Err(self.malformed("odd number of items for a dict"));
        }
        Ok(items.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
    }

    // -- container mutation -----------------------------------------------

    fn extend_list(&mut self, target: NodeId, items: Vec<NodeId>) -> DecodeResult<()> {
        let offset = self.offset;
        let max = self.limits.max_collection_len;
        match &mut self.nodes[target] {
            Node::List(list) => {
                if list.len() + items.len() > max {
                    return Err(DecodeError::limit(LimitKind::CollectionLen, max));
                }
                list.extend(items);
                Ok(())
            },
            other => Err(DecodeError::malformed(
                offset,
                format!("cannot append to a {}", other.kind()),
            )),
        }
    }

    fn extend_dict(&mut self, target: NodeId, pairs: Vec<(NodeId, NodeId)>) -> DecodeResult<()> {
        let offset = self.offset;
        let max = self.limits.max_collection_len;
        match &mut self.nodes[target] {
            Node::Dict(entries) => {
                if entries.len() + pairs.len() > max {
                    return Err(DecodeError::limit(LimitKind::CollectionLen, max));
                }
                entries.extend(pairs);
                Ok(())
            },
            other => Err(DecodeError::malformed(
                offset,
                format!("cannot set items on a {}", other.kind()),
            )),
        }
    }

    fn extend_set(&mut self, target: NodeId, items: Vec<NodeId>) -> DecodeResult<()> {
        let offset = self.offset;
        let max = self.limits.max_collection_len;
        match &mut self.nodes[target] {
            Node::Set {
                items: set,
                frozen: false,
            } => {
                if set.len() + items.len() > max {
                    return Err(DecodeError::limit(LimitKind::CollectionLen, max));
                }
                set.extend(items);
                Ok(())
            },
            other => Err(DecodeError::malformed(
                offset,
                format!("cannot add items to a {}", other.kind()),
            )),
        }
    }

    // -- memo -------------------------------------------------------------

    fn memo_store(&mut self, index: usize) -> DecodeResult<()> {
        let id = self.top()?;
        if index != self.memo.len() {
            return Err(self.malformed(format!(
                "memo index {index} out of sequence (next is {})",
                self.memo.len()
            )));
        }
        if self.memo.len() >= self.limits.max_memo_len {
            return Err(DecodeError::limit(LimitKind::MemoLen, self.limits.max_memo_len));
        }
        self.memo.push(id);
        Ok(())
    }

    fn memo_fetch(&mut self, index: usize) -> DecodeResult<()> {
        let id = *self
            .memo
            .get(index)
            .ok_or_else(|| self.malformed(format!("memo index {index} is not assigned")))?;
        self.stack.push(id);
        Ok(())
    }

    // -- operands ---------------------------------------------------------

    fn read_sized(&mut self, len: u64, context: &'static str) -> DecodeResult<&'a [u8]> {
        let len = self.limits.check_string_len(len)?;
        self.reader.take(len, context)
    }

    fn read_signed_len(&mut self, context: &'static str) -> DecodeResult<u64> {
        let len = self.reader.i32_le(context)?;
        u64::try_from(len).map_err(|_| self.malformed(format!("{context} is negative")))
    }

    fn read_line(&mut self, context: &'static str) -> DecodeResult<&'a [u8]> {
        self.reader.line(self.limits.max_string_len, context)
    }

    fn read_index(&mut self, context: &'static str) -> DecodeResult<usize> {
        let line = self.read_line(context)?;
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .ok_or_else(|| self.malformed(format!("{context} is not a memo index")))
    }

    fn parse_int(&self, digits: &[u8]) -> DecodeResult<BigInt> {
        let text = std::str::from_utf8(digits)
            .map_err(|_| self.malformed("integer operand is not ASCII"))?
            .trim();
        text.parse::<BigInt>()
            .map_err(|_| self.malformed(format!("integer operand {text:?} is not a number")))
    }

    fn malformed(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::malformed(self.offset, reason)
    }
}

/// Turns the arena into an owned tree, charging every produced value
/// against the node, depth and byte budgets.
struct Materializer<'m> {
    nodes: &'m [Node],
    limits: &'m DecodeLimits,
    offset: usize,
    nodes_left: usize,
    bytes_left: usize,
    visiting: Vec<bool>,
    hash_state: RandomState,
    key_comparisons: usize,
}

impl<'m> Materializer<'m> {
    fn new(nodes: &'m [Node], limits: &'m DecodeLimits, offset: usize) -> Self {
        Self {
            nodes,
            limits,
            offset,
            nodes_left: limits.max_nodes,
            bytes_left: limits.max_total_bytes,
            visiting: vec![false; nodes.len()],
            hash_state: RandomState::new(),
            key_comparisons: 0,
        }
    }

    fn build(&mut self, id: NodeId, depth: usize) -> DecodeResult<DecodedValue> {
        if depth > self.limits.max_depth {
            return Err(DecodeError::limit(LimitKind::Depth, self.limits.max_depth));
        }
        if self.nodes_left == 0 {
            return Err(DecodeError::limit(LimitKind::Nodes, self.limits.max_nodes));
        }
        self.nodes_left -= 1;

        let nodes = self.nodes;
        match &nodes[id] {
            Node::Scalar(value) => {
                let len = value.payload_len();
                if len > self.bytes_left {
                    return Err(DecodeError::limit(
                        LimitKind::TotalBytes,
                        self.limits.max_total_bytes,
                    ));
                }
                self.bytes_left -= len;
                Ok(value.clone())
            },
            Node::List(items) | Node::Tuple(items) | Node::Set { items, .. } => {
                self.enter(id)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.build(*item, depth + 1)?);
                }
                self.visiting[id] = false;
                Ok(DecodedValue::Sequence(out))
            },
            Node::Dict(pairs) => {
                self.enter(id)?;
                let mut entries: Vec<(DecodedValue, DecodedValue)> = Vec::with_capacity(pairs.len());
                // key fingerprint -> positions in `entries` sharing it
                let mut index: HashMap<u64, Vec<usize>> = HashMap::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.build(*key, depth + 1)?;
                    let value = self.build(*value, depth + 1)?;
                    let slot = index.entry(self.fingerprint(&key)).or_default();
                    let mut existing = None;
                    for &pos in slot.iter() {
                        self.key_comparisons += 1;
                        if entries[pos].0 == key {
                            existing = Some(pos);
                            break;
                        }
                    }
                    // Later assignments win, first insertion keeps its position.
                    match existing {
                        Some(pos) => entries[pos].1 = value,
                        None => {
                            slot.push(entries.len());
                            entries.push((key, value));
                        },
                    }
                }
                self.visiting[id] = false;
                Ok(DecodedValue::Mapping(entries))
            },
        }
    }

    /// Hash consistent with `DecodedValue`'s equality: equal keys always
    /// share a fingerprint.
    fn fingerprint(&self, value: &DecodedValue) -> u64 {
        let mut hasher = self.hash_state.build_hasher();
        hash_value(value, &mut hasher);
        hasher.finish()
    }

    fn enter(&mut self, id: NodeId) -> DecodeResult<()> {
        if self.visiting[id] {
            return Err(DecodeError::malformed(
                self.offset,
                "recursive structure cannot be represented",
            ));
        }
        self.visiting[id] = true;
        Ok(())
    }
}

fn hash_value<H: Hasher>(value: &DecodedValue, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        DecodedValue::None => {},
        DecodedValue::Bool(b) => b.hash(state),
        DecodedValue::Integer(i) => i.hash(state),
        // 0.0 == -0.0, so both hash as +0.0. NaN equals nothing and may hash anywhere.
        DecodedValue::Float(f) => {
            let f = if *f == 0.0 { 0.0 } else { *f };
            f.to_bits().hash(state)
        },
        DecodedValue::Text(s) => s.hash(state),
        DecodedValue::Bytes(b) => b.hash(state),
        DecodedValue::Sequence(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        },
        DecodedValue::Mapping(entries) => {
            entries.len().hash(state);
            for (k, v) in entries {
                hash_value(k, state);
                hash_value(v, state);
            }
        },
    }
}

/// Decode the `raw-unicode-escape` codec used by the protocol-0 `UNICODE`
/// opcode: Latin-1 bytes with `\uXXXX` and `\UXXXXXXXX` escapes.
fn decode_raw_unicode_escape(bytes: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let width = match (bytes[i], bytes.get(i + 1)) {
            (b'\\', Some(b'u')) => 4,
            (b'\\', Some(b'U')) => 8,
            (byte, _) => {
                out.push(char::from(byte));
                i += 1;
                continue;
            },
        };
        let hex = bytes.get(i + 2..i + 2 + width)?;
        if !hex.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        let code = u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?;
        out.push(char::from_u32(code)?);
        i += 2 + width;
    }
    Some(out)
}
