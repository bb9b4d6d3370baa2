use std::fmt::{Display, Formatter};

use super::binary::{
  field_a, field_b, field_c, field_d, field_e, field_signed_d, field_signed_e, instruction_size,
  opcode, Word
};
use super::opcode::{descriptor_for, Opcode, OpcodeDescriptor, Shape};
use crate::error::{DecodeError, Result};

/// Holds the decoded operand fields of an instruction. There is one variant per `Shape`, so
/// fields that the opcode's shape does not name are never extracted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operands {
  /// [Reserved:24][OpCode:8]
  None,
  /// [Reserved:16][A:8][OpCode:8]
  A { a: u8 },
  /// [Reserved:8][B:8][A:8][OpCode:8]
  AB { a: u8, b: u8 },
  /// [C:8][B:8][A:8][OpCode:8]
  ABC { a: u8, b: u8, c: u8 },
  /// [D:16][A:8][OpCode:8]
  AD { a: u8, d: u16 },
  /// [sD:16][A:8][OpCode:8]
  AsD { a: u8, sd: i16 },
  /// [C:8][Reserved:8][A:8][OpCode:8]
  AC { a: u8, c: u8 },
  /// [E:24][OpCode:8], kept unsigned. See `Instruction::signed_e`.
  E { e: u32 },
}

impl Operands {
  /// Extracts exactly the fields `shape` names.
  pub fn extract(shape: Shape, word: Word) -> Operands {
    match shape {
      Shape::None => Operands::None,
      Shape::A    => Operands::A   { a: field_a(word) },
      Shape::AB   => Operands::AB  { a: field_a(word), b: field_b(word) },
      Shape::ABC  => Operands::ABC { a: field_a(word), b: field_b(word), c: field_c(word) },
      Shape::AD   => Operands::AD  { a: field_a(word), d: field_d(word) },
      Shape::AsD  => Operands::AsD { a: field_a(word), sd: field_signed_d(word) },
      Shape::AC   => Operands::AC  { a: field_a(word), c: field_c(word) },
      Shape::E    => Operands::E   { e: field_e(word) },
    }
  }

  pub fn a(&self) -> Option<u8> {
    match *self {
      | Operands::A { a }
      | Operands::AB { a, .. }
      | Operands::ABC { a, .. }
      | Operands::AD { a, .. }
      | Operands::AsD { a, .. }
      | Operands::AC { a, .. } => Some(a),
      Operands::None | Operands::E { .. } => None,
    }
  }
}

/**
  A single decoded instruction: the word it came from, its descriptor, its operands, and its
  auxiliary word if the opcode has one.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub word       : Word,
  pub descriptor : &'static OpcodeDescriptor,
  pub operands   : Operands,
  pub aux        : Option<Word>,
}

impl Instruction {

  /**
    Decodes `word`. `aux` must be the word following `word` in the stream when the opcode has
    an auxiliary word and is ignored otherwise. Fails with `UnknownOpcode` if the opcode byte
    has no descriptor and with `MissingAux` if an auxiliary word is needed but not given.
  */
  pub fn decode(word: Word, aux: Option<Word>) -> Result<Instruction> {
    let descriptor = descriptor_for(opcode(word))?;

    let aux = match (descriptor.has_aux, aux) {
      (true, Some(aux)) => Some(aux),
      (true, None)      => return Err(DecodeError::MissingAux { opcode: descriptor.opcode }),
      (false, _)        => None,
    };

    Ok(Instruction {
      word,
      descriptor,
      operands: Operands::extract(descriptor.shape, word),
      aux
    })
  }

  pub fn opcode(&self) -> Opcode {
    self.descriptor.opcode
  }

  /// Number of words the instruction occupies in the stream.
  pub fn size(&self) -> usize {
    instruction_size(self.descriptor)
  }

  /// The `E` field read as a signed offset. `None` if the shape has no `E` field.
  pub fn signed_e(&self) -> Option<i32> {
    match self.operands {
      Operands::E { .. } => Some(field_signed_e(self.word)),
      _ => None
    }
  }

  /// The jump offset relative to the next instruction, if this is a jump.
  pub fn jump_offset(&self) -> Option<i32> {
    if !self.opcode().is_jump() {
      return None;
    }
    match self.operands {
      Operands::AsD { sd, .. } => Some(sd as i32),
      Operands::E { .. } => self.signed_e(),
      _ => None
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let name = self.descriptor.name;

    match self.operands {
      Operands::None => write!(f, "{}", name)?,
      Operands::A { a } => write!(f, "{} {}", name, a)?,
      Operands::AB { a, b } => write!(f, "{} {}, {}", name, a, b)?,
      Operands::ABC { a, b, c } => write!(f, "{} {}, {}, {}", name, a, b, c)?,
      Operands::AD { a, d } => write!(f, "{} {}, {}", name, a, d)?,
      Operands::AsD { a, sd } => {
        match self.opcode().uses_a() {
          true  => write!(f, "{} {}, {}", name, a, sd)?,
          false => write!(f, "{} {}", name, sd)?,
        }
      }
      Operands::AC { a, c } => write!(f, "{} {}, {}", name, a, c)?,
      Operands::E { e } => {
        match self.opcode() {
          // Jump offsets are signed, hit counters are not.
          Opcode::JumpX => write!(f, "{} {}", name, field_signed_e(self.word))?,
          _ => write!(f, "{} {}", name, e)?,
        }
      }
    }

    if let Some(aux) = self.aux {
      write!(f, " [0x{:08X}]", aux)?;
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{pack_abc, pack_ad, pack_e};

  fn key(opcode: Opcode) -> u8 {
    opcode.dispatch_key()
  }

  #[test]
  fn decode_abc(){
    let word = pack_abc(key(Opcode::Add), 1, 2, 3);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.opcode(), Opcode::Add);
    assert_eq!(instruction.operands, Operands::ABC { a: 1, b: 2, c: 3 });
    assert_eq!(instruction.aux, None);
    assert_eq!(instruction.size(), 1);
    assert_eq!(instruction.to_string(), "ADD 1, 2, 3");
  }

  #[test]
  fn decode_reads_only_shape_fields(){
    // LOADNIL only has A; garbage in B and C must not leak into the operands.
    let word = pack_abc(key(Opcode::LoadNil), 7, 0xEE, 0xFF);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.operands, Operands::A { a: 7 });
    assert_eq!(instruction.to_string(), "LOADNIL 7");

    let word = pack_abc(key(Opcode::GetGlobal), 4, 0xEE, 9);
    let instruction = Instruction::decode(word, Some(0x1234)).unwrap();
    assert_eq!(instruction.operands, Operands::AC { a: 4, c: 9 });
    assert_eq!(instruction.to_string(), "GETGLOBAL 4, 9 [0x00001234]");
  }

  #[test]
  fn decode_signed_d(){
    let word = pack_ad(key(Opcode::LoadN), 0, -5);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.operands, Operands::AsD { a: 0, sd: -5 });
    assert_eq!(instruction.to_string(), "LOADN 0, -5");
    assert_eq!(instruction.jump_offset(), None);

    let word = pack_ad(key(Opcode::Jump), 0, -3);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.to_string(), "JUMP -3");
    assert_eq!(instruction.jump_offset(), Some(-3));
  }

  #[test]
  fn decode_e(){
    let word = pack_e(key(Opcode::JumpX), -100_000);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.signed_e(), Some(-100_000));
    assert_eq!(instruction.jump_offset(), Some(-100_000));
    assert_eq!(instruction.to_string(), "JUMPX -100000");

    let word = pack_e(key(Opcode::Coverage), 0x7F_FFFF);
    let instruction = Instruction::decode(word, None).unwrap();
    assert_eq!(instruction.operands, Operands::E { e: 0x7F_FFFF });
    assert_eq!(instruction.jump_offset(), None);
    assert_eq!(instruction.to_string(), "COVERAGE 8388607");
  }

  #[test]
  fn aux_handling(){
    let word = pack_ad(key(Opcode::GetImport), 2, 5);
    assert_eq!(
      Instruction::decode(word, None),
      Err(DecodeError::MissingAux { opcode: Opcode::GetImport })
    );

    let instruction = Instruction::decode(word, Some(0x4010_0000)).unwrap();
    assert_eq!(instruction.aux, Some(0x4010_0000));
    assert_eq!(instruction.size(), 2);

    // An aux word offered to an opcode without one is dropped.
    let word = pack_abc(key(Opcode::Move), 1, 2, 0);
    let instruction = Instruction::decode(word, Some(99)).unwrap();
    assert_eq!(instruction.aux, None);
  }

  #[test]
  fn unknown_opcode(){
    // Sequential index 83 is the count sentinel; its key is unassigned.
    let sentinel_key = (83 * 227 % 256) as u8;
    assert_eq!(
      Instruction::decode(sentinel_key as Word, None),
      Err(DecodeError::UnknownOpcode(sentinel_key))
    );
  }
}
