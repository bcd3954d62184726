//! `FieldCodec`: the conversion between a record's native field type and
//! the common [`FieldValue`] currency that [`crate::predicate::EqualityPredicate`]
//! bindings and cross-field-type `Setter::filter_range` calls are expressed
//! in. Every concrete `ValueProvider::Value` used as a field setter's output
//! implements this so a predicate built from loosely-typed config/CLI input
//! can be compared against it without a separate trait per Rust primitive.

use sdg_core::{Date, EnumValue, FieldValue, RecordRef};

pub trait FieldCodec: Sized {
    fn to_field_value(&self) -> FieldValue;
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_field_codec_int {
    ($t:ty, $variant:ident) => {
        impl FieldCodec for $t {
            fn to_field_value(&self) -> FieldValue {
                FieldValue::$variant(*self)
            }
            fn from_field_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_field_codec_int!(bool, Bool);
impl_field_codec_int!(i16, I16);
impl_field_codec_int!(i32, I32);
impl_field_codec_int!(i64, I64);
impl_field_codec_int!(u16, U16);
impl_field_codec_int!(u32, U32);
impl_field_codec_int!(u64, U64);
impl_field_codec_int!(f64, Decimal);
impl_field_codec_int!(Date, Date);
impl_field_codec_int!(EnumValue, Enum);
impl_field_codec_int!(RecordRef, Reference);

impl FieldCodec for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Str(self.clone())
    }
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// `&'static str` field values appear throughout this crate's own tests and
/// fixtures (enum-like labels fixed at compile time); round-tripping through
/// `FieldValue::Str` requires leaking the reconstructed string, which is
/// acceptable for the small, bounded set of distinct labels any such field
/// actually takes — this is not exercised on a record's hot apply path, only
/// by `EqualityPredicate`/`filter_range` call sites.
impl FieldCodec for &'static str {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Str((*self).to_string())
    }
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(Box::leak(s.clone().into_boxed_str())),
            _ => None,
        }
    }
}

impl<T: FieldCodec> FieldCodec for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldCodec::to_field_value).collect())
    }
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::List(items) => items.iter().map(T::from_field_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trips_through_field_value() {
        let fv = 42u32.to_field_value();
        assert_eq!(u32::from_field_value(&fv), Some(42));
        assert_eq!(i64::from_field_value(&fv), None);
    }

    #[test]
    fn list_round_trips_element_wise() {
        let v = vec![1i32, 2, 3];
        let fv = v.to_field_value();
        assert_eq!(Vec::<i32>::from_field_value(&fv), Some(v));
    }
}
