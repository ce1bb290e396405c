//! Opcode table for the pickle format (protocols 0 through 5).
//!
//! Every opcode the format defines is listed so that diagnostics can name
//! what was refused. [`Opcode::is_data`] is the security boundary: only data
//! opcodes are ever executed by the decoder.

/// A pickle opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Framing
    Proto,
    Frame,
    Stop,

    // Scalars
    None,
    NewTrue,
    NewFalse,
    Int,
    BinInt,
    BinInt1,
    BinInt2,
    Long,
    Long1,
    Long4,
    Float,
    BinFloat,

    // Text and bytes
    String,
    BinString,
    ShortBinString,
    Unicode,
    BinUnicode,
    ShortBinUnicode,
    BinUnicode8,
    BinBytes,
    ShortBinBytes,
    BinBytes8,
    ByteArray8,

    // Collections
    Mark,
    EmptyList,
    EmptyDict,
    EmptyTuple,
    EmptySet,
    Append,
    Appends,
    SetItem,
    SetItems,
    AddItems,
    List,
    Dict,
    Tuple,
    Tuple1,
    Tuple2,
    Tuple3,
    FrozenSet,

    // Stack manipulation
    Pop,
    PopMark,
    Dup,

    // Memo
    Put,
    BinPut,
    LongBinPut,
    Memoize,
    Get,
    BinGet,
    LongBinGet,

    // Code references and object construction (never executed)
    Global,
    StackGlobal,
    Reduce,
    Build,
    Inst,
    Obj,
    NewObj,
    NewObjEx,
    Ext1,
    Ext2,
    Ext4,
    PersId,
    BinPersId,
    NextBuffer,
    ReadOnlyBuffer,
}

impl Opcode {
    /// Map a byte to its opcode, `None` for bytes the format does not define.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0x80 => Opcode::Proto,
            0x95 => Opcode::Frame,
            b'.' => Opcode::Stop,
            b'N' => Opcode::None,
            0x88 => Opcode::NewTrue,
            0x89 => Opcode::NewFalse,
            b'I' => Opcode::Int,
            b'J' => Opcode::BinInt,
            b'K' => Opcode::BinInt1,
            b'M' => Opcode::BinInt2,
            b'L' => Opcode::Long,
            0x8a => Opcode::Long1,
            0x8b => Opcode::Long4,
            b'F' => Opcode::Float,
            b'G' => Opcode::BinFloat,
            b'S' => Opcode::String,
            b'T' => Opcode::BinString,
            b'U' => Opcode::ShortBinString,
            b'V' => Opcode::Unicode,
            b'X' => Opcode::BinUnicode,
            0x8c => Opcode::ShortBinUnicode,
            0x8d => Opcode::BinUnicode8,
            b'B' => Opcode::BinBytes,
            b'C' => Opcode::ShortBinBytes,
            0x8e => Opcode::BinBytes8,
            0x96 => Opcode::ByteArray8,
            b'(' => Opcode::Mark,
            b']' => Opcode::EmptyList,
            b'}' => Opcode::EmptyDict,
            b')' => Opcode::EmptyTuple,
            0x8f => Opcode::EmptySet,
            b'a' => Opcode::Append,
            b'e' => Opcode::Appends,
            b's' => Opcode::SetItem,
            b'u' => Opcode::SetItems,
            0x90 => Opcode::AddItems,
            b'l' => Opcode::List,
            b'd' => Opcode::Dict,
            b't' => Opcode::Tuple,
            0x85 => Opcode::Tuple1,
            0x86 => Opcode::Tuple2,
            0x87 => Opcode::Tuple3,
            0x91 => Opcode::FrozenSet,
            b'0' => Opcode::Pop,
            b'1' => Opcode::PopMark,
            b'2' => Opcode::Dup,
            b'p' => Opcode::Put,
            b'q' => Opcode::BinPut,
            b'r' => Opcode::LongBinPut,
            0x94 => Opcode::Memoize,
            b'g' => Opcode::Get,
            b'h' => Opcode::BinGet,
            b'j' => Opcode::LongBinGet,
            b'c' => Opcode::Global,
            0x93 => Opcode::StackGlobal,
            b'R' => Opcode::Reduce,
            b'b' => Opcode::Build,
            b'i' => Opcode::Inst,
            b'o' => Opcode::Obj,
            0x81 => Opcode::NewObj,
            0x92 => Opcode::NewObjEx,
            0x82 => Opcode::Ext1,
            0x83 => Opcode::Ext2,
            0x84 => Opcode::Ext4,
            b'P' => Opcode::PersId,
            b'Q' => Opcode::BinPersId,
            0x97 => Opcode::NextBuffer,
            0x98 => Opcode::ReadOnlyBuffer,
            _ => return None,
        };
        Some(op)
    }

    /// Whether the opcode only moves data around.
    ///
    /// `false` for every opcode that resolves a name, calls something,
    /// reaches outside the stream (persistent ids, out-of-band buffers), and
    /// for the quoted protocol-0 `STRING`, which the decoder does not parse.
    pub fn is_data(self) -> bool {
        !matches!(
            self,
            Opcode::Global
                | Opcode::StackGlobal
                | Opcode::Reduce
                | Opcode::Build
                | Opcode::Inst
                | Opcode::Obj
                | Opcode::NewObj
                | Opcode::NewObjEx
                | Opcode::Ext1
                | Opcode::Ext2
                | Opcode::Ext4
                | Opcode::PersId
                | Opcode::BinPersId
                | Opcode::NextBuffer
                | Opcode::ReadOnlyBuffer
                | Opcode::String
        )
    }

    /// Upper-case mnemonic as used by the format's own disassembler.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Proto => "PROTO",
            Opcode::Frame => "FRAME",
            Opcode::Stop => "STOP",
            Opcode::None => "NONE",
            Opcode::NewTrue => "NEWTRUE",
            Opcode::NewFalse => "NEWFALSE",
            Opcode::Int => "INT",
            Opcode::BinInt => "BININT",
            Opcode::BinInt1 => "BININT1",
            Opcode::BinInt2 => "BININT2",
            Opcode::Long => "LONG",
            Opcode::Long1 => "LONG1",
            Opcode::Long4 => "LONG4",
            Opcode::Float => "FLOAT",
            Opcode::BinFloat => "BINFLOAT",
            Opcode::String => "STRING",
            Opcode::BinString => "BINSTRING",
            Opcode::ShortBinString => "SHORT_BINSTRING",
            Opcode::Unicode => "UNICODE",
            Opcode::BinUnicode => "BINUNICODE",
            Opcode::ShortBinUnicode => "SHORT_BINUNICODE",
            Opcode::BinUnicode8 => "BINUNICODE8",
            Opcode::BinBytes => "BINBYTES",
            Opcode::ShortBinBytes => "SHORT_BINBYTES",
            Opcode::BinBytes8 => "BINBYTES8",
            Opcode::ByteArray8 => "BYTEARRAY8",
            Opcode::Mark => "MARK",
            Opcode::EmptyList => "EMPTY_LIST",
            Opcode::EmptyDict => "EMPTY_DICT",
            Opcode::EmptyTuple => "EMPTY_TUPLE",
            Opcode::EmptySet => "EMPTY_SET",
            Opcode::Append => "APPEND",
            Opcode::Appends => "APPENDS",
            Opcode::SetItem => "SETITEM",
            Opcode::SetItems => "SETITEMS",
            Opcode::AddItems => "ADDITEMS",
            Opcode::List => "LIST",
            Opcode::Dict => "DICT",
            Opcode::Tuple => "TUPLE",
            Opcode::Tuple1 => "TUPLE1",
            Opcode::Tuple2 => "TUPLE2",
            Opcode::Tuple3 => "TUPLE3",
            Opcode::FrozenSet => "FROZENSET",
            Opcode::Pop => "POP",
            Opcode::PopMark => "POP_MARK",
            Opcode::Dup => "DUP",
            Opcode::Put => "PUT",
            Opcode::BinPut => "BINPUT",
            Opcode::LongBinPut => "LONG_BINPUT",
            Opcode::Memoize => "MEMOIZE",
            Opcode::Get => "GET",
            Opcode::BinGet => "BINGET",
            Opcode::LongBinGet => "LONG_BINGET",
            Opcode::Global => "GLOBAL",
            Opcode::StackGlobal => "STACK_GLOBAL",
            Opcode::Reduce => "REDUCE",
            Opcode::Build => "BUILD",
            Opcode::Inst => "INST",
            Opcode::Obj => "OBJ",
            Opcode::NewObj => "NEWOBJ",
            Opcode::NewObjEx => "NEWOBJ_EX",
            Opcode::Ext1 => "EXT1",
            Opcode::Ext2 => "EXT2",
            Opcode::Ext4 => "EXT4",
            Opcode::PersId => "PERSID",
            Opcode::BinPersId => "BINPERSID",
            Opcode::NextBuffer => "NEXT_BUFFER",
            Opcode::ReadOnlyBuffer => "READONLY_BUFFER",
        }
    }
}

/// Bytes of the opcodes that are refused regardless of position.
pub const REFUSED_OPCODES: &[u8] = &[
    b'c', 0x93, b'R', b'b', b'i', b'o', 0x81, 0x92, 0x82, 0x83, 0x84, b'P', b'Q', 0x97, 0x98,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_opcodes_are_not_data() {
        for byte in REFUSED_OPCODES {
            let op = Opcode::from_byte(*byte).expect("refused opcode must be known");
            assert!(!op.is_data(), "{} must not be a data opcode", op.name());
        }
    }

    #[test]
    fn test_every_defined_byte_roundtrips_through_name() {
        let defined = (0u8..=255).filter_map(Opcode::from_byte).count();
        // 68 opcodes in protocols 0-5
        assert_eq!(defined, 68);
        assert_eq!(Opcode::from_byte(0x94).map(Opcode::name), Some("MEMOIZE"));
        assert_eq!(Opcode::from_byte(b'z'), None);
    }
}
