/*!
  Fixed enumerations of the bytecode format. The numeric values are part of the wire contract
  and must not be changed.
*/

use std::ops::RangeInclusive;

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, IntoStaticStr};

use crate::error::{DecodeError, Result};

// region Version bounds

pub const BYTECODE_VERSION_MIN: u8 = 3;
pub const BYTECODE_VERSION_MAX: u8 = 6;
pub const TYPE_VERSION_MIN: u8 = 1;
pub const TYPE_VERSION_MAX: u8 = 3;

/// Instruction format versions this decoder accepts.
pub fn bytecode_versions() -> RangeInclusive<u8> {
  BYTECODE_VERSION_MIN..=BYTECODE_VERSION_MAX
}

/// Type encoding versions this decoder accepts.
pub fn type_versions() -> RangeInclusive<u8> {
  TYPE_VERSION_MIN..=TYPE_VERSION_MAX
}

// endregion

/// Kinds of entries in a function's constant table.
#[derive(
  StrumDisplay, IntoStaticStr, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone, Copy, Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum ConstantTag {
  Nil     = 0,
  Boolean = 1,
  Number  = 2,
  String  = 3,
  Import  = 4,
  Table   = 5,
  Closure = 6,
  Vector  = 7,
}

/// How a closure captures each of its upvalues.
#[derive(
  StrumDisplay, IntoStaticStr, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone, Copy, Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum CaptureType {
  #[strum(to_string = "VAL")]
  Value = 0,
  #[strum(to_string = "REF")]
  Reference = 1,
  #[strum(to_string = "UPVAL")]
  Upvalue = 2,
}

bitflags! {
  /// Proto-level flags.
  #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
  pub struct ProtoFlags: u8 {
    /// The whole module was compiled to native code.
    const NATIVE_MODULE   = 1 << 0;
    /// Not worth compiling to native code.
    const NATIVE_COLD     = 1 << 1;
    /// Compiled to native code on request.
    const NATIVE_FUNCTION = 1 << 2;
  }
}

// region Type tags

/**
  A value-type tag. Bit 7 marks the type as optional and is independent of the base type in
  the low bits. Tags are stored as `u16` because `INVALID` lies outside the byte range.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct TypeTag(pub u16);

impl TypeTag {
  pub const NIL      : TypeTag = TypeTag(0);
  pub const BOOLEAN  : TypeTag = TypeTag(1);
  pub const NUMBER   : TypeTag = TypeTag(2);
  pub const STRING   : TypeTag = TypeTag(3);
  pub const TABLE    : TypeTag = TypeTag(4);
  pub const FUNCTION : TypeTag = TypeTag(5);
  pub const THREAD   : TypeTag = TypeTag(6);
  pub const USERDATA : TypeTag = TypeTag(7);
  pub const VECTOR   : TypeTag = TypeTag(8);
  pub const BUFFER   : TypeTag = TypeTag(9);
  pub const ANY      : TypeTag = TypeTag(15);

  pub const TAGGED_USERDATA_BASE : TypeTag = TypeTag(64);
  pub const TAGGED_USERDATA_END  : TypeTag = TypeTag(64 + 32);

  pub const OPTIONAL_BIT : u16 = 1 << 7;
  pub const INVALID      : TypeTag = TypeTag(256);

  /// The tag with the optional bit cleared.
  pub fn base(&self) -> TypeTag {
    TypeTag(self.0 & !TypeTag::OPTIONAL_BIT)
  }

  pub fn is_optional(&self) -> bool {
    self.0 & TypeTag::OPTIONAL_BIT != 0
  }

  pub fn optional(&self) -> TypeTag {
    TypeTag(self.0 | TypeTag::OPTIONAL_BIT)
  }

  /// Whether the base type lies in the reserved tagged-userdata subrange.
  pub fn is_tagged_userdata(&self) -> bool {
    let base = self.base().0;
    base >= TypeTag::TAGGED_USERDATA_BASE.0 && base < TypeTag::TAGGED_USERDATA_END.0
  }

  /// Index of a tagged userdata type within its subrange.
  pub fn tagged_userdata_index(&self) -> Option<u16> {
    match self.is_tagged_userdata() {
      true  => Some(self.base().0 - TypeTag::TAGGED_USERDATA_BASE.0),
      false => None
    }
  }

  /// Name of the base type, ignoring the optional bit.
  pub fn base_name(&self) -> Option<&'static str> {
    let name = match self.base() {
      TypeTag::NIL      => "nil",
      TypeTag::BOOLEAN  => "boolean",
      TypeTag::NUMBER   => "number",
      TypeTag::STRING   => "string",
      TypeTag::TABLE    => "table",
      TypeTag::FUNCTION => "function",
      TypeTag::THREAD   => "thread",
      TypeTag::USERDATA => "userdata",
      TypeTag::VECTOR   => "vector",
      TypeTag::BUFFER   => "buffer",
      TypeTag::ANY      => "any",
      _ => return None
    };
    Some(name)
  }
}

impl From<u8> for TypeTag {
  fn from(tag: u8) -> TypeTag {
    TypeTag(tag as u16)
  }
}

/**
  Renders a type tag as a type name. The optional bit is masked off before the base type is
  identified; if `include_optional_suffix` is set and the bit is present, `?` is appended.

  Tags whose base is not one of the known types, including tagged userdata and `INVALID`,
  fail with `UnrepresentableType`.
*/
pub fn type_name(tag: u16, include_optional_suffix: bool) -> Result<String> {
  let tag = TypeTag(tag);

  let name = tag.base_name().ok_or(DecodeError::UnrepresentableType(tag.0))?;

  let mut result = String::from(name);
  if include_optional_suffix && tag.is_optional() {
    result.push('?');
  }
  Ok(result)
}

// endregion


#[cfg(test)]
mod tests {
  use super::*;
  use strum::IntoEnumIterator;

  #[test]
  fn type_names(){
    assert_eq!(type_name(2, false).unwrap(), "number");
    assert_eq!(type_name(2 | 128, true).unwrap(), "number?");
    assert_eq!(type_name(2 | 128, false).unwrap(), "number");
    assert_eq!(type_name(8, true).unwrap(), "vector");
    assert_eq!(type_name(15 | 128, true).unwrap(), "any?");
    assert_eq!(type_name(0, true).unwrap(), "nil");
  }

  #[test]
  fn unrepresentable_type_names(){
    assert_eq!(type_name(99, true), Err(DecodeError::UnrepresentableType(99)));
    assert_eq!(type_name(10, false), Err(DecodeError::UnrepresentableType(10)));
    assert_eq!(type_name(64, false), Err(DecodeError::UnrepresentableType(64)));
    assert_eq!(type_name(256, false), Err(DecodeError::UnrepresentableType(256)));
    assert_eq!(type_name(99 | 128, true), Err(DecodeError::UnrepresentableType(99 | 128)));
  }

  #[test]
  fn every_base_type_is_nameable(){
    let known = [0u16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 15];
    for tag in 0u16..=255 {
      let base = tag & !TypeTag::OPTIONAL_BIT;
      assert_eq!(type_name(tag, false).is_ok(), known.contains(&base), "tag {}", tag);
    }
  }

  #[test]
  fn tagged_userdata(){
    assert!(TypeTag(64).is_tagged_userdata());
    assert!(TypeTag(95 | 128).is_tagged_userdata());
    assert!(!TypeTag(96).is_tagged_userdata());
    assert_eq!(TypeTag(70 | 128).tagged_userdata_index(), Some(6));
    assert_eq!(TypeTag::USERDATA.tagged_userdata_index(), None);
  }

  #[test]
  fn optional_bit(){
    let tag = TypeTag::STRING.optional();
    assert_eq!(tag, TypeTag(3 | 128));
    assert!(tag.is_optional());
    assert_eq!(tag.base(), TypeTag::STRING);
    assert_eq!(TypeTag::from(0x89u8).base(), TypeTag::BUFFER);
  }

  #[test]
  fn wire_values(){
    assert_eq!(bytecode_versions(), 3..=6);
    assert_eq!(type_versions(), 1..=3);

    let tags: Vec<u8> = ConstantTag::iter().map(Into::<u8>::into).collect();
    assert_eq!(tags, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(ConstantTag::try_from(4u8).ok(), Some(ConstantTag::Import));
    assert!(ConstantTag::try_from(8u8).is_err());
    assert_eq!(ConstantTag::Closure.to_string(), "closure");

    assert_eq!(CaptureType::try_from(1u8).ok(), Some(CaptureType::Reference));
    assert_eq!(CaptureType::Upvalue.to_string(), "UPVAL");
    assert!(CaptureType::try_from(3u8).is_err());

    assert_eq!(ProtoFlags::NATIVE_MODULE.bits(), 1);
    assert_eq!(ProtoFlags::NATIVE_COLD.bits(), 2);
    assert_eq!(ProtoFlags::NATIVE_FUNCTION.bits(), 4);
    assert_eq!(ProtoFlags::from_bits(0b1000), None);
    assert_eq!(
      ProtoFlags::from_bits_truncate(0b111),
      ProtoFlags::NATIVE_MODULE | ProtoFlags::NATIVE_COLD | ProtoFlags::NATIVE_FUNCTION
    );
  }
}
