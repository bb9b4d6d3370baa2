/*!
  Decoding tables for a register-based virtual machine's instruction encoding: the opcode set
  and the shape of each opcode, the field codec for 32 bit instruction words, type tags,
  builtin function ids, and a disassembler built on top of them.

  Nothing here executes instructions or produces bytecode. All tables are built once and are
  read-only afterwards, so every function can be called from any thread.

  ```
  use regvm_bytecode::{decode_opcode, descriptor_for, Instruction, Opcode};

  let word = Opcode::Move.dispatch_key() as u32 | (1 << 8) | (2 << 16);
  let descriptor = descriptor_for(decode_opcode(word)).unwrap();
  assert_eq!(descriptor.name, "MOVE");

  let instruction = Instruction::decode(word, None).unwrap();
  assert_eq!(instruction.to_string(), "MOVE 1, 2");
  ```
*/

pub mod builtins;
pub mod bytecode;
pub mod disassembler;
pub mod error;
pub mod tags;

pub use builtins::{builtin_id, builtin_name};
pub use bytecode::{
  decode_opcode, descriptor_for, field_a, field_b, field_c, field_d, field_e, field_signed_d,
  field_signed_e, Instruction, Opcode, OpcodeDescriptor, Operands, Shape, Word
};
pub use disassembler::{disassemble, render_table, Annotation, Line};
pub use error::DecodeError;
pub use tags::{type_name, CaptureType, ConstantTag, ProtoFlags, TypeTag};
