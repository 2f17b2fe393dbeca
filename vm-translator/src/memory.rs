//! Mapping from stack-machine segments to Hack RAM access strategies.

use crate::parser::Segment;

/// How a segment's slots are addressed in RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAccess {
    /// Immediate value, no memory cell.
    Constant,
    /// Base-pointer indirection through the named register.
    Indirect(&'static str),
    /// Fixed RAM address (temp, pointer).
    Direct,
    /// Per-file symbol `File.index`, placed by the assembler.
    Static,
}

pub fn segment_access(segment: Segment) -> SegmentAccess {
    match segment {
        Segment::Constant => SegmentAccess::Constant,
        Segment::Local => SegmentAccess::Indirect("LCL"),
        Segment::Argument => SegmentAccess::Indirect("ARG"),
        Segment::This => SegmentAccess::Indirect("THIS"),
        Segment::That => SegmentAccess::Indirect("THAT"),
        Segment::Pointer | Segment::Temp => SegmentAccess::Direct,
        Segment::Static => SegmentAccess::Static,
    }
}

/// temp i lives at RAM[5+i] (R5-R12).
#[inline]
pub fn temp_address(index: u16) -> u16 {
    5 + index
}

/// pointer 0 aliases THIS (RAM[3]), pointer 1 aliases THAT (RAM[4]).
#[inline]
pub fn pointer_symbol(index: u16) -> &'static str {
    if index == 0 { "THIS" } else { "THAT" }
}
