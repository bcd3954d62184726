//! The field value domain: every primitive a record field can hold, plus the
//! homogeneous vector and enum wrappers. `FieldValue` is the common currency
//! between providers, setters and `EqualityPredicate` bindings — it is what
//! lets a `Setter` be generic over "some field of some record" without a
//! separate trait per Rust primitive type.

use alloc::string::String;
use alloc::vec::Vec;

use crate::date::Date;
use crate::GenId;

/// An index into a named `EnumSet` domain. Carries no reference to the set
/// itself — resolving an `EnumValue` to its label requires the `EnumSet` the
/// field was declared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumValue(pub u32);

impl EnumValue {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A strong reference to a record of some other (fixed, field-declared) type.
/// Logically a typed pointer; here it is just the referenced `gen_id` plus a
/// record-type tag checked by the caller, since `sdg_core` has no knowledge
/// of concrete record types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordRef(pub GenId);

impl RecordRef {
    pub fn gen_id(self) -> GenId {
        self.0
    }
}

/// Every value a record field can hold.
///
/// `Vec` variants are homogeneous — a `List` field never mixes scalar kinds
/// within one instance — but that invariant is enforced by the generated
/// `RecordFieldTraits` glue in `sdg_engine`, not by this enum itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    U16(u16),
    U32(u32),
    U64(u64),
    Decimal(f64),
    Date(Date),
    Str(String),
    Enum(EnumValue),
    Reference(RecordRef),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I16(v) => Some(*v as i64),
            FieldValue::I32(v) => Some(*v as i64),
            FieldValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U16(v) => Some(*v as u64),
            FieldValue::U32(v) => Some(*v as u64),
            FieldValue::U64(v) => Some(*v),
            FieldValue::Enum(e) => Some(e.0 as u64),
            FieldValue::Reference(r) => Some(r.0),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            FieldValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            FieldValue::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<RecordRef> {
        match self {
            FieldValue::Reference(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_to_expected_variant() {
        assert_eq!(FieldValue::U32(7).as_u64(), Some(7));
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Decimal(1.5).as_decimal(), Some(1.5));
        assert!(FieldValue::Bool(true).as_u64().is_none());
    }

    #[test]
    fn enum_and_reference_round_trip_as_u64() {
        assert_eq!(FieldValue::Enum(EnumValue(3)).as_u64(), Some(3));
        assert_eq!(FieldValue::Reference(RecordRef(42)).as_u64(), Some(42));
    }
}
