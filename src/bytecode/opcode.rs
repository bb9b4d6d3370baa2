/*!
  Opcodes of the virtual machine and the dispatch table used to look them up.

  The opcode byte in an encoded instruction is not the opcode's position in the list below.
  Each opcode's sequential index `i` is scrambled into a dispatch key `(i * 227) mod 256`, and
  it is the dispatch key that appears in the low byte of the instruction word. Since 227 is
  odd it is coprime with 256, so the scrambling is a bijection over byte values and the
  dispatch table never has two opcodes competing for a slot.
*/

use lazy_static::lazy_static;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{
  Display as StrumDisplay, EnumCount as StrumEnumCount, EnumIter, EnumString, IntoStaticStr
};
use tracing::debug;

use crate::error::{DecodeError, Result};

/// Multiplier of the dispatch permutation.
pub const DISPATCH_MULTIPLIER: u8 = 227;

/// Number of slots in the dispatch table, one per possible opcode byte.
pub const DISPATCH_TABLE_SIZE: usize = 256;

/**
  The operand fields encoded in an instruction word. Fields not named by the shape are
  meaningless for the opcode and must not be read.
*/
#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Shape {
  /// [Reserved:24][OpCode:8]
  #[strum(to_string = "none")]
  None,
  /// [Reserved:16][A:8][OpCode:8]
  A,
  /// [Reserved:8][B:8][A:8][OpCode:8]
  AB,
  /// [C:8][B:8][A:8][OpCode:8]
  ABC,
  /// [D:16][A:8][OpCode:8]
  AD,
  /// [sD:16][A:8][OpCode:8], D is signed
  AsD,
  /// [C:8][Reserved:8][A:8][OpCode:8]
  AC,
  /// [E:24][OpCode:8]
  E,
}

/**
  Opcodes of the virtual machine in their canonical order. The discriminant is the sequential
  index, so the order the opcodes are listed below is significant: it determines the dispatch
  key of every opcode. Order-dependencies:
      ```
      Opcode::dispatch_key()
      DispatchTable::build()
      ```
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, StrumEnumCount, TryFromPrimitive,
  IntoPrimitive, Clone, Copy, Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
  Nop,
  Break,

  // Loads //
  LoadNil,          // A
  LoadB,            // A B C
  LoadN,            // A sD
  LoadK,            // A D
  Move,             // A B
  GetGlobal,        // A C aux
  SetGlobal,        // A C aux
  GetUpval,         // A B
  SetUpval,         // A B
  CloseUpvals,      // A
  GetImport,        // A D aux

  // Tables //
  GetTable,
  SetTable,
  GetTableKs,
  SetTableKs,
  GetTableN,
  SetTableN,

  // Calls //
  NewClosure,
  NameCall,
  Call,
  Return,
  // Opcode 23

  // Jumps //
  Jump,
  JumpBack,
  JumpIf,
  JumpIfNot,
  JumpIfEq,
  JumpIfLe,
  JumpIfLt,
  JumpIfNotEq,
  JumpIfNotLe,
  JumpIfNotLt,
  // Opcode 33

  // Arithmetic //
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Pow,
  AddK,
  SubK,
  MulK,
  DivK,
  ModK,
  PowK,
  And,
  Or,
  AndK,
  OrK,
  Concat,
  Not,
  Minus,
  Length,
  // Opcode 53

  NewTable,
  DupTable,
  SetList,

  // Loops //
  ForNPrep,
  ForNLoop,
  ForGLoop,
  #[strum(to_string = "FORGPREP_INEXT")]
  ForGPrepINext,
  FastCall3,
  #[strum(to_string = "FORGPREP_NEXT")]
  ForGPrepNext,
  NativeCall,
  GetVarArgs,
  DupClosure,
  PrepVarArgs,
  LoadKX,
  JumpX,            // E, signed
  FastCall,
  Coverage,         // E, unsigned hit counter
  Capture,
  SubRK,
  DivRK,
  FastCall1,
  FastCall2,
  FastCall2K,
  ForGPrep,
  JumpXEqKNil,
  JumpXEqKB,
  JumpXEqKN,
  JumpXEqKS,
  IDiv,
  IDivK,
  // Opcode 83
}

/// Number of opcodes. Acts as the list's terminal sentinel and is never dispatchable.
pub const OPCODE_COUNT: usize = Opcode::COUNT;

/// The dispatch key of the opcode with the given sequential index.
#[inline]
pub fn dispatch_key(index: u8) -> u8 {
  index.wrapping_mul(DISPATCH_MULTIPLIER)
}

impl Opcode {
  /// The sequential index of the opcode in the canonical list.
  pub fn index(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The byte that encodes this opcode in an instruction word.
  pub fn dispatch_key(&self) -> u8 {
    dispatch_key(self.index())
  }

  pub fn name(&self) -> &'static str {
    self.into()
  }

  pub fn shape(&self) -> Shape {
    use Opcode::*;

    match self {
      Nop | Break | NativeCall => Shape::None,

      LoadNil | CloseUpvals | PrepVarArgs | LoadKX => Shape::A,

      Move | GetUpval | SetUpval | Return | Not | Minus | Length | NewTable | GetVarArgs
      | Capture => Shape::AB,

      LoadB | GetTable | SetTable | GetTableKs | SetTableKs | GetTableN | SetTableN | NameCall
      | Call | Add | Sub | Mul | Div | Mod | Pow | AddK | SubK | MulK | DivK | ModK | PowK
      | And | Or | AndK | OrK | Concat | SetList | FastCall3 | SubRK | DivRK | FastCall1
      | FastCall2 | FastCall2K | IDiv | IDivK => Shape::ABC,

      LoadK | GetImport | NewClosure | DupTable | DupClosure => Shape::AD,

      // JUMP and JUMPBACK leave A unused.
      LoadN | Jump | JumpBack | JumpIf | JumpIfNot | JumpIfEq | JumpIfLe | JumpIfLt
      | JumpIfNotEq | JumpIfNotLe | JumpIfNotLt | ForNPrep | ForNLoop | ForGLoop
      | ForGPrepINext | ForGPrepNext | ForGPrep | JumpXEqKNil | JumpXEqKB | JumpXEqKN
      | JumpXEqKS => Shape::AsD,

      GetGlobal | SetGlobal | FastCall => Shape::AC,

      JumpX | Coverage => Shape::E,
    }
  }

  /// Whether the opcode is always immediately followed by one auxiliary word.
  pub fn has_aux(&self) -> bool {
    use Opcode::*;

    matches!(
      self,
      GetGlobal | SetGlobal | GetImport | GetTableKs | SetTableKs | NameCall | JumpIfEq
      | JumpIfLe | JumpIfLt | JumpIfNotEq | JumpIfNotLe | JumpIfNotLt | NewTable | SetList
      | ForGLoop | FastCall3 | LoadKX | FastCall2 | FastCall2K | JumpXEqKNil | JumpXEqKB
      | JumpXEqKN | JumpXEqKS
    )
  }

  /// Fast-call opcodes carry a builtin id in operand A.
  pub fn is_fastcall(&self) -> bool {
    use Opcode::*;
    matches!(self, FastCall | FastCall1 | FastCall2 | FastCall2K | FastCall3)
  }

  /// Opcodes whose signed offset is relative to the following instruction.
  pub fn is_jump(&self) -> bool {
    use Opcode::*;

    matches!(
      self,
      Jump | JumpBack | JumpIf | JumpIfNot | JumpIfEq | JumpIfLe | JumpIfLt | JumpIfNotEq
      | JumpIfNotLe | JumpIfNotLt | ForNPrep | ForNLoop | ForGLoop | ForGPrepINext
      | ForGPrepNext | ForGPrep | JumpXEqKNil | JumpXEqKB | JumpXEqKN | JumpXEqKS | JumpX
    )
  }

  /// Whether operand A is meaningful. `false` only for the unconditional sD jumps.
  pub fn uses_a(&self) -> bool {
    !matches!(self, Opcode::Jump | Opcode::JumpBack)
  }

  pub fn descriptor(&self) -> OpcodeDescriptor {
    OpcodeDescriptor {
      opcode  : *self,
      name    : self.name(),
      shape   : self.shape(),
      has_aux : self.has_aux(),
    }
  }
}

/// Immutable description of an opcode's encoding.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct OpcodeDescriptor {
  pub opcode  : Opcode,
  pub name    : &'static str,
  pub shape   : Shape,
  pub has_aux : bool,
}

/**
  Maps opcode bytes to descriptors. Slots are assigned by dispatch key, so the table can be
  indexed directly with the low byte of an instruction word. Slots without a descriptor are
  unknown opcodes.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DispatchTable {
  slots: [Option<OpcodeDescriptor>; DISPATCH_TABLE_SIZE]
}

impl DispatchTable {

  /// Builds the table from the canonical opcode list.
  pub fn build() -> DispatchTable {
    let mut slots = [None; DISPATCH_TABLE_SIZE];

    for opcode in Opcode::iter() {
      let key = opcode.dispatch_key() as usize;
      debug_assert!(slots[key].is_none(), "dispatch key collision at {}", key);
      slots[key] = Some(opcode.descriptor());
    }

    DispatchTable { slots }
  }

  pub fn get(&self, opcode_byte: u8) -> Result<&OpcodeDescriptor> {
    match &self.slots[opcode_byte as usize] {
      Some(descriptor) => Ok(descriptor),
      None => {
        debug!(opcode_byte, "no descriptor for dispatch key");
        Err(DecodeError::UnknownOpcode(opcode_byte))
      }
    }
  }

  /// Iterates over `(dispatch key, descriptor)` pairs in key order.
  pub fn iter(&self) -> impl Iterator<Item = (u8, &OpcodeDescriptor)> {
    self.slots
        .iter()
        .enumerate()
        .filter_map(|(key, slot)| slot.as_ref().map(|d| (key as u8, d)))
  }

  /// Number of assigned slots.
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

lazy_static! {
  static ref DISPATCH_TABLE: DispatchTable = DispatchTable::build();
}

/// The process-wide dispatch table.
pub fn dispatch_table() -> &'static DispatchTable {
  &DISPATCH_TABLE
}

/// Looks up the descriptor for an opcode byte taken from an instruction word.
pub fn descriptor_for(opcode_byte: u8) -> Result<&'static OpcodeDescriptor> {
  DISPATCH_TABLE.get(opcode_byte)
}

/// Maps a sequential index back to its opcode.
pub fn opcode_at_index(index: u8) -> Option<Opcode> {
  Opcode::try_from(index).ok()
}
