/*!
  Ids of the standard library functions that may be invoked through a fast-call instruction.

  Ids are sparse. Zero means no builtin, and a few ids inside the assigned range are compiler
  specialisations with no source spelling of their own, so they are absent here too. A
  `BiMap` keeps the id to name mapping invertible.
*/

use bimap::BiMap;
use lazy_static::lazy_static;

/// Returned for ids with no builtin.
pub const NO_BUILTIN: &str = "none";

/// Largest builtin id known to this decoder.
pub const MAX_BUILTIN_ID: u8 = 88;

const BUILTINS: &[(u8, &str)] = &[
  (1, "assert"),

  (2, "math.abs"),
  (3, "math.acos"),
  (4, "math.asin"),
  (5, "math.atan2"),
  (6, "math.atan"),
  (7, "math.ceil"),
  (8, "math.cosh"),
  (9, "math.cos"),
  (10, "math.deg"),
  (11, "math.exp"),
  (12, "math.floor"),
  (13, "math.fmod"),
  (14, "math.frexp"),
  (15, "math.ldexp"),
  (16, "math.log10"),
  (17, "math.log"),
  (18, "math.max"),
  (19, "math.min"),
  (20, "math.modf"),
  (21, "math.pow"),
  (22, "math.rad"),
  (23, "math.sinh"),
  (24, "math.sin"),
  (25, "math.sqrt"),
  (26, "math.tanh"),
  (27, "math.tan"),

  (28, "bit32.arshift"),
  (29, "bit32.band"),
  (30, "bit32.bnot"),
  (31, "bit32.bor"),
  (32, "bit32.bxor"),
  (33, "bit32.btest"),
  (34, "bit32.extract"),
  (35, "bit32.lrotate"),
  (36, "bit32.lshift"),
  (37, "bit32.replace"),
  (38, "bit32.rrotate"),
  (39, "bit32.rshift"),

  (40, "type"),

  (41, "string.byte"),
  (42, "string.char"),
  (43, "string.len"),

  (44, "typeof"),

  (45, "string.sub"),

  (46, "math.clamp"),
  (47, "math.sign"),
  (48, "math.round"),

  (49, "rawset"),
  (50, "rawget"),
  (51, "rawequal"),

  (52, "table.insert"),
  (53, "table.unpack"),

  (54, "vector.create"),

  (55, "bit32.countlz"),
  (56, "bit32.countrz"),

  // 57: select with a vararg argument, spelled `select` in source.
  (58, "rawlen"),
  // 59: bit32.extract with a constant field width.

  (60, "getmetatable"),
  (61, "setmetatable"),
  (62, "tonumber"),
  (63, "tostring"),

  (64, "bit32.byteswap"),

  (65, "buffer.readi8"),
  (66, "buffer.readu8"),
  (67, "buffer.writeu8"),
  (68, "buffer.readi16"),
  (69, "buffer.readu16"),
  (70, "buffer.writeu16"),
  (71, "buffer.readi32"),
  (72, "buffer.readu32"),
  (73, "buffer.writeu32"),
  (74, "buffer.readf32"),
  (75, "buffer.writef32"),
  (76, "buffer.readf64"),
  (77, "buffer.writef64"),

  (78, "vector.magnitude"),
  (79, "vector.normalize"),
  (80, "vector.cross"),
  (81, "vector.dot"),
  (82, "vector.floor"),
  (83, "vector.ceil"),
  (84, "vector.abs"),
  (85, "vector.sign"),
  (86, "vector.clamp"),
  (87, "vector.min"),
  (88, "vector.max"),
];

lazy_static! {
  static ref BUILTIN_NAMES: BiMap<u32, String> =
    BUILTINS.iter().map(|&(id, name)| (id as u32, name.to_string())).collect();
}

/// The qualified source name of builtin `id`, or `"none"` if no builtin has that id.
pub fn builtin_name(id: u32) -> &'static str {
  match BUILTIN_NAMES.get_by_left(&id) {
    Some(name) => name.as_str(),
    None => NO_BUILTIN
  }
}

/// The id of the builtin with the given qualified name.
pub fn builtin_id(name: &str) -> Option<u32> {
  BUILTIN_NAMES.get_by_right(name).copied()
}

/// Iterates over all assigned `(id, name)` pairs in id order.
pub fn builtins() -> impl Iterator<Item = (u32, &'static str)> {
  BUILTINS.iter().map(|&(id, name)| (id as u32, name))
}
