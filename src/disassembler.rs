//! Walks a stream of instruction words, pairing each instruction with its auxiliary word, and
//! renders the result as a table.

use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use prettytable::{format as TableFormat, row, Table};
use tracing::{debug, trace};

use crate::builtins::builtin_name;
use crate::bytecode::{Instruction, Word};
use crate::error::{DecodeError, Result};

/// Extra information about an instruction that depends on more than its own word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Annotation {
  /// Absolute pc a jump lands on. May lie outside the stream if the stream is corrupt.
  JumpTarget(i64),
  /// Name of the builtin a fast-call invokes.
  Builtin(&'static str),
}

impl Display for Annotation {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Annotation::JumpTarget(pc) => write!(f, "to {}", pc),
      Annotation::Builtin(name)  => write!(f, "{}", name),
    }
  }
}

/// One decoded instruction and its position in the stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Line {
  pub pc          : usize,
  pub instruction : Instruction,
  pub annotation  : Option<Annotation>,
}

impl Display for Line {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:>4}: {}", self.pc, self.instruction)?;
    if let Some(annotation) = self.annotation {
      write!(f, " ; {}", annotation)?;
    }
    Ok(())
  }
}

fn annotate(pc: usize, instruction: &Instruction) -> Option<Annotation> {
  let opcode = instruction.opcode();

  if opcode.is_fastcall() {
    let id = instruction.operands.a()? as u32;
    return Some(Annotation::Builtin(builtin_name(id)));
  }

  // Offsets are relative to the instruction after this one, auxiliary word excluded.
  instruction
    .jump_offset()
    .map(|offset| Annotation::JumpTarget(pc as i64 + 1 + offset as i64))
}

/**
  Decodes every instruction in `words`. An unknown opcode aborts the whole stream, since
  without its descriptor there is no telling whether the next word is an instruction or
  auxiliary data.
*/
pub fn disassemble(words: &[Word]) -> Result<Vec<Line>> {
  debug!(words = words.len(), "disassembling");

  let mut lines = Vec::new();
  let mut pc = 0;

  while pc < words.len() {
    let word = words[pc];
    let aux  = words.get(pc + 1).copied();

    let instruction = match Instruction::decode(word, aux) {
      Ok(instruction) => instruction,
      Err(DecodeError::MissingAux { .. }) => return Err(DecodeError::Truncated { pc }),
      Err(e) => return Err(e.at(pc)),
    };
    trace!(pc, %instruction);

    lines.push(Line {
      pc,
      instruction,
      annotation: annotate(pc, &instruction)
    });
    pc += instruction.size();
  }

  Ok(lines)
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// Lays out disassembled lines as a table with one row per instruction.
pub fn render_table(lines: &[Line]) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"PC", ubl->"Word", ubl->"Instruction", ubl->"Note"]);

  for line in lines {
    let note = match line.annotation {
      Some(annotation) => annotation.to_string(),
      None => String::new()
    };
    table.add_row(row![
      r->line.pc,
      format!("{:08X}", line.instruction.word),
      line.instruction,
      note
    ]);
  }
  table
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{pack_abc, pack_ad, pack_e, Opcode, Operands};

  fn key(opcode: Opcode) -> u8 {
    opcode.dispatch_key()
  }

  fn sample() -> Vec<Word> {
    vec![
      pack_abc(key(Opcode::PrepVarArgs), 0, 0, 0),        // 0
      pack_ad(key(Opcode::GetImport), 1, 0),              // 1
      0x4000_0000,                                        // 2, aux
      pack_abc(key(Opcode::FastCall1), 2, 1, 2),          // 3
      pack_ad(key(Opcode::JumpIfNot), 1, 2),              // 4
      pack_abc(key(Opcode::Call), 1, 2, 1),               // 5
      pack_ad(key(Opcode::Jump), 0, -7),                  // 6
      pack_e(key(Opcode::JumpX), 1),                      // 7
      pack_abc(key(Opcode::Return), 0, 1, 0),             // 8
    ]
  }

  #[test]
  fn walks_stream_and_pairs_aux(){
    let lines = disassemble(&sample()).unwrap();
    let pcs: Vec<usize> = lines.iter().map(|line| line.pc).collect();
    assert_eq!(pcs, vec![0, 1, 3, 4, 5, 6, 7, 8]);

    assert_eq!(lines[1].instruction.opcode(), Opcode::GetImport);
    assert_eq!(lines[1].instruction.aux, Some(0x4000_0000));
    assert_eq!(lines[1].instruction.operands, Operands::AD { a: 1, d: 0 });
  }

  #[test]
  fn annotations(){
    let lines = disassemble(&sample()).unwrap();
    assert_eq!(lines[2].annotation, Some(Annotation::Builtin("math.abs")));
    assert_eq!(lines[3].annotation, Some(Annotation::JumpTarget(7)));
    assert_eq!(lines[4].annotation, None);
    assert_eq!(lines[5].annotation, Some(Annotation::JumpTarget(0)));
    assert_eq!(lines[6].annotation, Some(Annotation::JumpTarget(9)));

    assert_eq!(lines[2].to_string(), "   3: FASTCALL1 2, 1, 2 ; math.abs");
    assert_eq!(lines[5].to_string(), "   6: JUMP -7 ; to 0");
  }

  #[test]
  fn unknown_opcode_aborts(){
    let mut words = sample();
    // The sentinel's dispatch key is never assigned.
    words[4] = ((83 * 227) % 256) as Word;
    let error = disassemble(&words).unwrap_err();
    assert_eq!(error.root(), &DecodeError::UnknownOpcode(153));
    match error {
      DecodeError::At { pc, .. } => assert_eq!(pc, 4),
      other => panic!("unexpected error {:?}", other),
    }
  }

  #[test]
  fn truncated_aux(){
    let words = vec![
      pack_abc(key(Opcode::Nop), 0, 0, 0),
      pack_ad(key(Opcode::LoadKX), 3, 0),
    ];
    assert_eq!(disassemble(&words), Err(DecodeError::Truncated { pc: 1 }));
  }

  #[test]
  fn empty_stream(){
    assert_eq!(disassemble(&[]), Ok(vec![]));
  }

  #[test]
  fn table_has_row_per_line(){
    let lines = disassemble(&sample()).unwrap();
    let table = render_table(&lines);
    assert_eq!(table.len(), lines.len());
    let text = table.to_string();
    assert!(text.contains("GETIMPORT 1, 0 [0x40000000]"));
    assert!(text.contains("math.abs"));
  }
}
