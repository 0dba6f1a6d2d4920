//! Static record descriptors and the macro that attaches them to record types.

// self
use crate::mapper::MapError;

/// Declared shape of a typed record.
#[derive(Debug)]
pub struct RecordSchema {
	/// Record name used in diagnostics.
	pub name: &'static str,
	/// Wire fields in declaration order.
	pub fields: &'static [FieldSpec],
}
impl RecordSchema {
	/// Looks up a declared field by its wire name.
	pub fn field(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|field| field.name == name)
	}

	/// Rejects empty or duplicated field names.
	pub fn validate(&self) -> Result<(), MapError> {
		for (i, field) in self.fields.iter().enumerate() {
			if field.name.trim().is_empty() {
				return Err(MapError::Schema {
					record: self.name,
					reason: format!("field #{i} has an empty name"),
				});
			}
			if self.fields[..i].iter().any(|prior| prior.name == field.name) {
				return Err(MapError::Schema {
					record: self.name,
					reason: format!("field `{}` is declared twice", field.name),
				});
			}
		}

		Ok(())
	}
}

/// One declared wire field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
	/// Wire name of the field.
	pub name: &'static str,
	/// How the field's value is projected.
	pub kind: FieldKind,
	/// Whether `null` is an acceptable value for nested records and lists.
	pub optional: bool,
}

/// Projection applied to a field's value.
#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
	/// Primitive or enumerated value, passed through.
	Scalar,
	/// Date-time string normalized to RFC 3339.
	Instant,
	/// Nested record.
	Record(fn() -> &'static RecordSchema),
	/// Ordered list of nested records.
	List(fn() -> &'static RecordSchema),
}

/// Implements [`Record`](crate::mapper::Record) for a struct by declaring its wire fields.
///
/// Each entry is `"wireName" => required|optional kind`, where `kind` is one of `scalar`,
/// `instant`, `record<Type>`, or `list<Type>`. Nested types must implement `Record` themselves.
///
/// ```
/// # use serde::Deserialize;
/// #[derive(Deserialize)]
/// struct Invoice {
/// 	number: Option<String>,
/// }
/// trade_master_api::impl_record!(Invoice { "number" => optional scalar });
/// ```
#[macro_export]
macro_rules! impl_record {
	(@kind scalar) => {
		$crate::mapper::FieldKind::Scalar
	};
	(@kind instant) => {
		$crate::mapper::FieldKind::Instant
	};
	(@kind record<$inner:ty>) => {
		$crate::mapper::FieldKind::Record(<$inner as $crate::mapper::Record>::describe)
	};
	(@kind list<$inner:ty>) => {
		$crate::mapper::FieldKind::List(<$inner as $crate::mapper::Record>::describe)
	};
	(@optional required) => {
		false
	};
	(@optional optional) => {
		true
	};
	($name:ident { $($wire:literal => $presence:ident $kind:ident $(<$inner:ty>)?),* $(,)? }) => {
		impl $crate::mapper::Record for $name {
			fn describe() -> &'static $crate::mapper::RecordSchema {
				static SCHEMA: $crate::mapper::RecordSchema = $crate::mapper::RecordSchema {
					name: stringify!($name),
					fields: &[$($crate::mapper::FieldSpec {
						name: $wire,
						kind: $crate::impl_record!(@kind $kind $(<$inner>)?),
						optional: $crate::impl_record!(@optional $presence),
					}),*],
				};

				&SCHEMA
			}
		}
	};
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn leaf() -> &'static RecordSchema {
		static LEAF: RecordSchema = RecordSchema { name: "Leaf", fields: &[] };

		&LEAF
	}

	#[test]
	fn validate_rejects_empty_names() {
		static BLANK: RecordSchema = RecordSchema {
			name: "Blank",
			fields: &[FieldSpec { name: " ", kind: FieldKind::Scalar, optional: true }],
		};

		assert!(matches!(BLANK.validate(), Err(MapError::Schema { record: "Blank", .. })));
	}

	#[test]
	fn field_lookup_finds_nested_kinds() {
		static PARENT: RecordSchema = RecordSchema {
			name: "Parent",
			fields: &[
				FieldSpec { name: "child", kind: FieldKind::Record(leaf), optional: false },
				FieldSpec { name: "children", kind: FieldKind::List(leaf), optional: true },
			],
		};

		assert!(PARENT.validate().is_ok());
		assert!(matches!(PARENT.field("child").map(|f| f.kind), Some(FieldKind::Record(_))));
		assert!(PARENT.field("children").is_some_and(|f| f.optional));
		assert!(PARENT.field("missing").is_none());
	}
}
