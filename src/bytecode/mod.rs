/*!

  Instructions are 32 bit words. The low byte of every word is the opcode; the remaining 24
  bits hold operands whose layout is given by the opcode's shape:

    Opcode:  8 bits
    A, B, C: 8 bits each
    D, sD:  16 bits, overlapping B and C
    E:      24 bits, overlapping A, B and C

  Some opcodes are always followed by one auxiliary word carrying data that does not fit in
  the operand fields, for example a constant index or an import path. The auxiliary word has
  no opcode of its own and must be skipped by anything walking a stream of words.

  The opcode byte is a dispatch key rather than the opcode's position in the canonical list.
  See the `opcode` module for the permutation between the two.

*/

mod binary;
mod instruction;
mod opcode;
pub mod assembly;

pub use binary::{
  opcode as decode_opcode, field_a, field_b, field_c, field_d, field_signed_d, field_e,
  field_signed_e, instruction_size, Word, MAX_SIGNED_E, MIN_SIGNED_E
};
pub use instruction::{Instruction, Operands};
pub use opcode::{
  descriptor_for, dispatch_key, dispatch_table, opcode_at_index, DispatchTable, Opcode,
  OpcodeDescriptor, Shape, DISPATCH_MULTIPLIER, DISPATCH_TABLE_SIZE, OPCODE_COUNT
};

#[cfg(test)]
pub(crate) use binary::tests::{pack_abc, pack_ad, pack_e};
