//! Decode errors. All of them are deterministic consequences of the input data.

use thiserror::Error;

use crate::bytecode::Opcode;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
  /// The dispatch key has no descriptor.
  #[error("unknown opcode 0x{0:02X}")]
  UnknownOpcode(u8),

  /// The base component of a type tag is not a known type.
  #[error("unrepresentable type tag {0}")]
  UnrepresentableType(u16),

  /// An opcode that is always followed by an auxiliary word was decoded without one.
  #[error("{opcode} requires an auxiliary word")]
  MissingAux { opcode: Opcode },

  /// The stream ends between an instruction and its auxiliary word.
  #[error("instruction at pc {pc} is truncated")]
  Truncated { pc: usize },

  /// Attaches the stream position to an error raised while decoding a single instruction.
  #[error("at pc {pc}: {source}")]
  At {
    pc: usize,
    #[source]
    source: Box<DecodeError>
  },
}

impl DecodeError {
  pub fn at(self, pc: usize) -> DecodeError {
    match self {
      // Already positioned.
      DecodeError::At { .. } | DecodeError::Truncated { .. } => self,
      other => DecodeError::At { pc, source: Box::new(other) }
    }
  }

  /// The underlying error with any stream position removed.
  pub fn root(&self) -> &DecodeError {
    match self {
      DecodeError::At { source, .. } => source.root(),
      other => other
    }
  }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
