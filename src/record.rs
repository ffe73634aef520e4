//! Record descriptors
//!
//! A record type exposes its fields (name, column tag, kind) in declaration
//! order and hands out native cell values for export. Types that can also be
//! built from a sheet row implement [`ImportRecord`].
//!
//! The [`sheet_record!`](crate::sheet_record) macro generates both impls:
//!
//! ```
//! sheetbind::sheet_record! {
//!     #[derive(Debug, Clone, PartialEq, Default)]
//!     pub struct Person {
//!         #[column = "Name"]
//!         pub name: String,
//!         #[column = "Age"]
//!         pub age: i64,
//!         pub note: String,
//!     }
//! }
//!
//! use sheetbind::Record;
//! let labels: Vec<&str> = Person::fields().iter().map(|f| f.label()).collect();
//! assert_eq!(labels, ["Name", "Age", ""]);
//! ```

use crate::types::{CellValue, Conversion, FieldDef};

/// A fixed-shape type whose fields map to sheet columns
pub trait Record {
    /// Field descriptors in declaration order
    fn fields() -> &'static [FieldDef];

    /// Native value of every field, in declaration order
    fn cells(&self) -> Vec<CellValue>;
}

/// A record that can be allocated zero-valued and populated from cell text
pub trait ImportRecord: Record + Default {
    /// Convert `text` into the field at `index` (declaration order).
    ///
    /// Out-of-range indices report `Unsupported` and change nothing.
    fn assign(&mut self, index: usize, text: &str) -> Conversion<()>;
}

impl<R: Record> Record for &R {
    fn fields() -> &'static [FieldDef] {
        R::fields()
    }

    fn cells(&self) -> Vec<CellValue> {
        (**self).cells()
    }
}

impl<R: Record> Record for Box<R> {
    fn fields() -> &'static [FieldDef] {
        R::fields()
    }

    fn cells(&self) -> Vec<CellValue> {
        (**self).cells()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column_tag {
    () => {
        ::core::option::Option::None
    };
    ($tag:literal) => {
        ::core::option::Option::Some($tag)
    };
}

/// Declare a struct together with its [`Record`] and [`ImportRecord`] impls.
///
/// Fields may carry a `#[column = "Label"]` attribute binding them to a
/// column; untagged fields export under an empty header and are never
/// populated on import. Every field type must implement
/// [`FieldType`](crate::types::FieldType), and the struct must be `Default`.
#[macro_export]
macro_rules! sheet_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[column = $tag:literal])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field : $ty ),*
        }

        impl $crate::record::Record for $name {
            fn fields() -> &'static [$crate::types::FieldDef] {
                const FIELDS: &[$crate::types::FieldDef] = &[
                    $(
                        $crate::types::FieldDef::new(
                            stringify!($field),
                            $crate::__column_tag!($($tag)?),
                            <$ty as $crate::types::FieldType>::KIND,
                        )
                    ),*
                ];
                FIELDS
            }

            fn cells(&self) -> ::std::vec::Vec<$crate::types::CellValue> {
                ::std::vec![
                    $( $crate::types::FieldType::to_cell(&self.$field) ),*
                ]
            }
        }

        impl $crate::record::ImportRecord for $name {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn assign(&mut self, index: usize, text: &str) -> $crate::types::Conversion<()> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return $crate::types::assign_field(&mut self.$field, text);
                    }
                    position += 1;
                )*
                $crate::types::Conversion::Unsupported
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;

    crate::sheet_record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Item {
            #[column = "SKU"]
            sku: String,
            #[column = "Qty"]
            qty: u32,
            #[column = "Price"]
            price: f64,
            internal: bool,
        }
    }

    #[test]
    fn test_fields_follow_declaration_order() {
        let fields = Item::fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["sku", "qty", "price", "internal"]);
        assert_eq!(fields[1].tag, Some("Qty"));
        assert_eq!(fields[3].tag, None);
    }

    #[test]
    fn test_field_kinds_come_from_types() {
        let kinds: Vec<FieldKind> = Item::fields().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [
                FieldKind::Text,
                FieldKind::Integer,
                FieldKind::Float,
                FieldKind::Unsupported
            ]
        );
    }

    #[test]
    fn test_cells_and_assign() {
        let item = Item {
            sku: "A-1".to_string(),
            qty: 3,
            price: 9.5,
            internal: true,
        };
        assert_eq!(
            item.cells(),
            vec![
                CellValue::Text("A-1".into()),
                CellValue::Int(3),
                CellValue::Float(9.5),
                CellValue::Bool(true),
            ]
        );

        let mut fresh = Item::default();
        assert!(fresh.assign(0, "A-1").is_parsed());
        assert!(fresh.assign(1, "3").is_parsed());
        assert!(matches!(fresh.assign(1, "three"), Conversion::Failed(_)));
        assert_eq!(fresh.assign(9, "x"), Conversion::Unsupported);
        assert_eq!(fresh.sku, "A-1");
        assert_eq!(fresh.qty, 3);
    }

    #[test]
    fn test_references_and_boxes_deref_one_level() {
        let item = Item::default();
        assert_eq!(<&Item as Record>::fields().len(), 4);
        assert_eq!(Box::new(item.clone()).cells(), item.cells());
        assert_eq!((&item).cells(), item.cells());
    }
}
