//! Schema-driven projection of untyped JSON into nested typed records.
//!
//! A [`Record`] pairs a serde-deserializable struct with a static [`RecordSchema`] describing
//! which wire fields it declares and how each one is shaped. [`map`] walks the raw payload
//! through that schema before handing it to serde:
//!
//! - undeclared fields are dropped;
//! - absent fields stay absent so serde applies the struct's defaults;
//! - nested records and lists of records are projected recursively;
//! - instant fields are normalized to RFC 3339 strings.
//!
//! Values of every other kind pass through untouched, so type mismatches surface from serde
//! with the failing path attached.

pub mod instant;

mod schema;

pub use schema::*;

// std
use std::ptr;
// crates.io
use serde::de::DeserializeOwned;
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Typed structure that can be built from a raw payload through its schema.
pub trait Record: DeserializeOwned {
	/// Returns the static schema describing the record's wire fields.
	fn describe() -> &'static RecordSchema;
}

/// Failures raised while projecting or constructing a typed record.
#[derive(Debug, ThisError)]
pub enum MapError {
	/// The schema itself is not a valid record declaration.
	#[error("Record `{record}` has an invalid schema: {reason}.")]
	Schema {
		/// Record whose schema is invalid.
		record: &'static str,
		/// Description of the defect.
		reason: String,
	},
	/// A mapping was expected where the payload holds something else.
	#[error("Expected an object for record `{record}` at `{path}`, found {found}.")]
	NotAnObject {
		/// Record that was being projected.
		record: &'static str,
		/// Location inside the payload.
		path: String,
		/// JSON kind found at that location.
		found: &'static str,
	},
	/// A list was expected where the payload holds something else.
	#[error("Expected a list at `{path}`, found {found}.")]
	NotAList {
		/// Location inside the payload.
		path: String,
		/// JSON kind found at that location.
		found: &'static str,
	},
	/// An instant string could not be parsed.
	#[error("Value `{value}` at `{path}` is not a recognized instant.")]
	Instant {
		/// Location inside the payload.
		path: String,
		/// Raw string that failed to parse.
		value: String,
		/// Last parser failure.
		#[source]
		source: time::error::Parse,
	},
	/// A parsed instant could not be rendered as RFC 3339.
	#[error("Instant at `{path}` cannot be rendered as RFC 3339.")]
	InstantFormat {
		/// Location inside the payload.
		path: String,
		/// Formatter failure.
		#[source]
		source: time::error::Format,
	},
	/// The projected payload did not satisfy the record's field types.
	#[error("Record `{record}` could not be constructed at `{}`.", source.path())]
	Construct {
		/// Record that failed to build.
		record: &'static str,
		/// Structured deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The response body is not valid JSON for the requested type.
	#[error("Response payload could not be decoded at `{}`.", source.path())]
	Payload {
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Projects `raw` through `schema`, returning the value serde will construct the record from.
///
/// The schema and every schema reachable from it are validated once, before the walk.
pub fn project(schema: &RecordSchema, raw: &Value) -> Result<Value, MapError> {
	validate_reachable(schema)?;

	project_record(schema, raw, ROOT_PATH)
}

/// Projects `raw` through `T`'s schema and constructs the record.
pub fn map<T>(raw: &Value) -> Result<T>
where
	T: Record,
{
	observe(T::describe(), |schema| construct(schema, raw, ROOT_PATH))
}

/// Maps every element of a JSON array into `T`, preserving order.
pub fn map_list<T>(raw: &Value) -> Result<Vec<T>>
where
	T: Record,
{
	let Value::Array(items) = raw else {
		return Err(MapError::NotAList { path: ROOT_PATH.into(), found: json_kind(raw) }.into());
	};

	observe(T::describe(), |schema| {
		items
			.iter()
			.enumerate()
			.map(|(i, item)| construct(schema, item, &format!("{ROOT_PATH}[{i}]")))
			.collect()
	})
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a list",
		Value::Object(_) => "an object",
	}
}

const ROOT_PATH: &str = "$";

fn observe<R>(
	schema: &'static RecordSchema,
	build: impl FnOnce(&RecordSchema) -> Result<R, MapError>,
) -> Result<R> {
	const KIND: CallKind = CallKind::Mapping;

	let _guard = CallSpan::new(KIND, schema.name).entered();

	obs::record_call_outcome(KIND, CallOutcome::Attempt);

	let result = validate_reachable(schema).and_then(|()| build(schema)).map_err(Error::from);

	obs::record_result(KIND, &result);

	result
}

fn construct<T>(schema: &RecordSchema, raw: &Value, path: &str) -> Result<T, MapError>
where
	T: DeserializeOwned,
{
	let projected = project_record(schema, raw, path)?;

	serde_path_to_error::deserialize(projected)
		.map_err(|source| MapError::Construct { record: schema.name, source })
}

/// Validates `schema` and each distinct schema nested under it; recursive schemas terminate.
fn validate_reachable(schema: &RecordSchema) -> Result<(), MapError> {
	fn visit<'a>(schema: &'a RecordSchema, seen: &mut Vec<&'a RecordSchema>) -> Result<(), MapError> {
		if seen.iter().any(|known| ptr::eq(*known, schema)) {
			return Ok(());
		}

		schema.validate()?;
		seen.push(schema);

		for field in schema.fields {
			if let FieldKind::Record(describe) | FieldKind::List(describe) = field.kind {
				visit(describe(), seen)?;
			}
		}

		Ok(())
	}

	visit(schema, &mut Vec::new())
}

/// Walks `raw` through an already validated `schema`.
fn project_record(schema: &RecordSchema, raw: &Value, path: &str) -> Result<Value, MapError> {
	let Value::Object(object) = raw else {
		return Err(MapError::NotAnObject {
			record: schema.name,
			path: path.into(),
			found: json_kind(raw),
		});
	};
	let mut projected = Map::with_capacity(schema.fields.len());

	for field in schema.fields {
		let Some(value) = object.get(field.name) else { continue };
		let field_path = format!("{path}.{}", field.name);
		let value = match (field.kind, value) {
			(FieldKind::Scalar, value) => value.clone(),
			(FieldKind::Instant, value) => instant::normalize(value, &field_path)?,
			(_, Value::Null) if field.optional => Value::Null,
			(FieldKind::Record(describe), value) => project_record(describe(), value, &field_path)?,
			(FieldKind::List(describe), Value::Array(items)) => {
				let schema = describe();

				items
					.iter()
					.enumerate()
					.map(|(i, item)| project_record(schema, item, &format!("{field_path}[{i}]")))
					.collect::<Result<Vec<_>, _>>()?
					.into()
			},
			(FieldKind::List(_), value) =>
				return Err(MapError::NotAList { path: field_path, found: json_kind(value) }),
		};

		projected.insert(field.name.to_owned(), value);
	}

	Ok(Value::Object(projected))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[derive(Debug, PartialEq, Deserialize, Serialize)]
	#[serde(rename_all = "camelCase")]
	struct Ticket {
		installment_number: Option<i64>,
		due_date: Option<String>,
	}
	crate::impl_record!(Ticket {
		"installmentNumber" => optional scalar,
		"dueDate" => optional instant,
	});

	#[derive(Debug, PartialEq, Deserialize, Serialize)]
	#[serde(rename_all = "camelCase")]
	struct Operation {
		operation_code: String,
		#[serde(default)]
		tickets: Option<Vec<Ticket>>,
		#[serde(default)]
		lead: Option<Ticket>,
	}
	crate::impl_record!(Operation {
		"operationCode" => required scalar,
		"tickets" => optional list<Ticket>,
		"lead" => optional record<Ticket>,
	});

	#[derive(Debug, Deserialize)]
	struct Broken {}
	crate::impl_record!(Broken {
		"dup" => optional scalar,
		"dup" => optional scalar,
	});

	#[test]
	fn absent_fields_default_and_undeclared_fields_drop() {
		let raw = json!({ "operationCode": "op-1", "unexpected": true });
		let projected = project(Operation::describe(), &raw).expect("Projection should succeed.");

		assert_eq!(projected, json!({ "operationCode": "op-1" }));

		let operation: Operation = map(&raw).expect("Mapping should succeed.");

		assert_eq!(operation, Operation { operation_code: "op-1".into(), tickets: None, lead: None });
	}

	#[test]
	fn nested_lists_and_records_are_projected_in_order() {
		let raw = json!({
			"operationCode": "op-2",
			"tickets": [
				{ "installmentNumber": 1, "dueDate": "2024-03-01", "noise": 1 },
				{ "installmentNumber": 2 },
			],
			"lead": { "dueDate": "2024-03-01T10:00:00.500Z" },
		});
		let operation: Operation = map(&raw).expect("Mapping should succeed.");
		let tickets = operation.tickets.expect("Tickets should be present.");

		assert_eq!(tickets.len(), 2);
		assert_eq!(tickets[0].installment_number, Some(1));
		assert_eq!(tickets[0].due_date.as_deref(), Some("2024-03-01T00:00:00Z"));
		assert_eq!(tickets[1], Ticket { installment_number: Some(2), due_date: None });
		assert_eq!(
			operation.lead.and_then(|lead| lead.due_date).as_deref(),
			Some("2024-03-01T10:00:00.5Z")
		);
	}

	#[test]
	fn empty_and_null_optional_lists_are_kept() {
		let empty: Operation =
			map(&json!({ "operationCode": "op", "tickets": [] })).expect("Empty list should map.");

		assert_eq!(empty.tickets, Some(Vec::new()));

		let null: Operation = map(&json!({ "operationCode": "op", "tickets": null, "lead": null }))
			.expect("Null optional fields should map.");

		assert_eq!(null.tickets, None);
		assert_eq!(null.lead, None);
	}

	#[test]
	fn mapping_is_idempotent_after_reserialization() {
		let raw = json!({
			"operationCode": "op-3",
			"tickets": [{ "installmentNumber": 7, "dueDate": "2024-05-06T07:08:09.123Z" }],
		});
		let first: Operation = map(&raw).expect("First mapping should succeed.");
		let again: Operation = map(&serde_json::to_value(&first).expect("Record should serialize."))
			.expect("Second mapping should succeed.");

		assert_eq!(first, again);
	}

	#[test]
	fn shape_errors_carry_paths() {
		let err = project(Operation::describe(), &json!({ "operationCode": "x", "tickets": {} }))
			.expect_err("An object where a list is declared must fail.");

		assert!(matches!(err, MapError::NotAList { ref path, found: "an object" } if path == "$.tickets"));

		let err = project(Operation::describe(), &json!({ "tickets": [1] }))
			.expect_err("A scalar where a record is declared must fail.");

		assert!(matches!(err, MapError::NotAnObject { record: "Ticket", ref path, .. } if path == "$.tickets[0]"));
	}

	#[test]
	fn type_mismatches_surface_from_construction() {
		let err = map::<Operation>(&json!({ "operationCode": 5 }))
			.expect_err("A numeric code must fail construction.");

		assert!(matches!(err, Error::Mapping(MapError::Construct { record: "Operation", .. })));

		let err = map::<Operation>(&json!({})).expect_err("A missing required field must fail.");

		assert!(matches!(err, Error::Mapping(MapError::Construct { .. })));
	}

	#[test]
	fn invalid_schema_is_rejected() {
		let err = project(Broken::describe(), &json!({})).expect_err("Duplicate fields must fail.");

		assert!(matches!(err, MapError::Schema { record: "Broken", .. }));
	}

	#[derive(Debug, Deserialize)]
	struct Holder {}
	crate::impl_record!(Holder {
		"items" => optional list<Broken>,
	});

	#[derive(Debug, Deserialize)]
	struct Node {}
	crate::impl_record!(Node {
		"next" => optional record<Node>,
		"children" => optional list<Node>,
	});

	#[test]
	fn nested_schemas_are_validated_before_the_walk() {
		for raw in [json!({}), json!({ "items": [] }), json!({ "items": [{}, {}, {}] })] {
			let err = map::<Holder>(&raw).expect_err("A broken nested schema must fail.");

			assert!(matches!(err, Error::Mapping(MapError::Schema { record: "Broken", .. })));
		}

		let err = map_list::<Holder>(&json!([{}, {}])).expect_err("Lists share the check.");

		assert!(matches!(err, Error::Mapping(MapError::Schema { record: "Broken", .. })));
	}

	#[test]
	fn self_referencing_schemas_validate_and_map() {
		let raw = json!({ "next": { "next": null }, "children": [{ "children": [] }] });

		assert!(validate_reachable(Node::describe()).is_ok());
		assert!(map::<Node>(&raw).is_ok());
	}

	#[test]
	fn map_list_reports_element_paths() {
		let err = map_list::<Operation>(&json!([{ "operationCode": "a" }, { "tickets": 1 }]))
			.expect_err("The second element must fail.");

		assert!(matches!(
			err,
			Error::Mapping(MapError::NotAList { ref path, .. }) if path == "$[1].tickets"
		));
	}

	#[test]
	fn map_list_preserves_order() {
		let tickets: Vec<Ticket> =
			map_list(&json!([{ "installmentNumber": 1 }, { "installmentNumber": 2 }]))
				.expect("List mapping should succeed.");

		assert_eq!(
			tickets.iter().map(|t| t.installment_number).collect::<Vec<_>>(),
			[Some(1), Some(2)]
		);
	}
}
