/*!
  This module is responsible for decoding the fields of binary instructions.

  Every instruction word has the layout below. Which of the operand fields are meaningful
  is decided by the opcode's `Shape`, never by the extractors in this module.

  ```text
    [C:8][B:8][A:8][OpCode:8]
    [   D:16 ][A:8][OpCode:8]
    [      E:24   ][OpCode:8]
  ```
*/

use super::opcode::OpcodeDescriptor;

// If you change this you must also change every extractor below.
pub type Word = u32;

const BYTE_MASK: Word = 0xFF;
const D_MASK: Word = 0xFFFF;
const E_MASK: Word = 0xFF_FFFF;

/// The largest positive value of the 24 bit `E` field when it is read as signed.
pub const MAX_SIGNED_E: i32 = (1 << 23) - 1;
/// The smallest negative value of the 24 bit `E` field when it is read as signed.
pub const MIN_SIGNED_E: i32 = -(1 << 23);

/// The opcode byte, bits [0, 7]. This is a dispatch key, not a sequential opcode index.
#[inline]
pub fn opcode(word: Word) -> u8 {
  (word & BYTE_MASK) as u8
}

/// Bits [8, 15].
#[inline]
pub fn field_a(word: Word) -> u8 {
  ((word >> 8) & BYTE_MASK) as u8
}

/// Bits [16, 23].
#[inline]
pub fn field_b(word: Word) -> u8 {
  ((word >> 16) & BYTE_MASK) as u8
}

/// Bits [24, 31].
#[inline]
pub fn field_c(word: Word) -> u8 {
  ((word >> 24) & BYTE_MASK) as u8
}

/// Bits [16, 31], unsigned.
#[inline]
pub fn field_d(word: Word) -> u16 {
  ((word >> 16) & D_MASK) as u16
}

/**
  Bits [16, 31] read as a two's complement 16 bit integer. Values above 32767 have 65536
  subtracted from them.
*/
#[inline]
pub fn field_signed_d(word: Word) -> i16 {
  let d = field_d(word) as i32;
  let signed = if d > i16::MAX as i32 { d - 0x1_0000 } else { d };
  signed as i16
}

/// Bits [8, 31]. Whether the value is a counter or an offset is up to the opcode.
#[inline]
pub fn field_e(word: Word) -> u32 {
  (word >> 8) & E_MASK
}

/// Bits [8, 31] read as a two's complement 24 bit integer.
#[inline]
pub fn field_signed_e(word: Word) -> i32 {
  let e = field_e(word) as i32;
  if e > MAX_SIGNED_E { e - (1 << 24) } else { e }
}

/// Returns the size in WORDS of an instruction with the given descriptor.
pub fn instruction_size(descriptor: &OpcodeDescriptor) -> usize {
  match descriptor.has_aux {
    true  => 2, // Instruction word plus auxiliary word
    false => 1
  }
}
