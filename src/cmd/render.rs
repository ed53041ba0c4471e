use std::collections::HashSet;
use std::fmt::Write;

use clonedoc::sclone::{Document, HeapObject, ObjId, Value};
use serde_json::{Map, Value as JsonValue, json};

use crate::cmd::util::number_label;

/// Nesting limits for document rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
	/// Deepest object nesting expanded before eliding.
	pub max_depth: usize,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self { max_depth: 64 }
	}
}

/// Render the document root as an indented text tree.
///
/// Each container is expanded once. An object already open on the current
/// path renders as `[Circular #id]`, a later visit to an expanded one as
/// `[Ref #id]`.
pub fn render_text(doc: &Document, options: RenderOptions) -> String {
	let mut text = TextRenderer {
		doc,
		options,
		path: Vec::new(),
		expanded: HashSet::new(),
		out: String::new(),
	};
	text.value(doc.root(), 0);
	text.out
}

/// Render the document root as a JSON tree.
pub fn render_json(doc: &Document, options: RenderOptions) -> JsonValue {
	let mut json = JsonRenderer {
		doc,
		options,
		path: Vec::new(),
		expanded: HashSet::new(),
	};
	json.value(doc.root())
}

/// One-line label for primitives and short object references.
pub fn inline_label(doc: &Document, value: &Value) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Undefined => "undefined".to_owned(),
		Value::Bool(value) => value.to_string(),
		Value::Int32(value) => value.to_string(),
		Value::Double(value) => number_label(*value),
		Value::String(value) => format!("{value:?}"),
		Value::Object(id) => match doc.get(*id) {
			Some(object) => format!("{} {id}", object.kind_label()),
			None => format!("<dangling {id}>"),
		},
	}
}

struct TextRenderer<'d> {
	doc: &'d Document,
	options: RenderOptions,
	path: Vec<ObjId>,
	expanded: HashSet<ObjId>,
	out: String,
}

impl TextRenderer<'_> {
	/// Writes the value from the current column and ends the line.
	fn value(&mut self, value: &Value, indent: usize) {
		let Value::Object(id) = value else {
			let label = inline_label(self.doc, value);
			self.line(&label);
			return;
		};
		let id = *id;
		let doc = self.doc;
		let Some(object) = doc.get(id) else {
			self.line(&format!("<dangling {id}>"));
			return;
		};
		if self.path.contains(&id) {
			self.line(&format!("[Circular {id}]"));
			return;
		}
		if self.expanded.contains(&id) {
			self.line(&format!("[Ref {id}]"));
			return;
		}

		let kind = object.kind_label();
		match object {
			HeapObject::Boolean(value) => self.line(&format!("{kind} {id} ({value})")),
			HeapObject::Number(value) => self.line(&format!("{kind} {id} ({})", number_label(*value))),
			HeapObject::String(value) => self.line(&format!("{kind} {id} ({value:?})")),
			HeapObject::Date(time) => self.line(&format!("{kind} {id} ({})", number_label(*time))),
			HeapObject::RegExp(re) => self.line(&format!("{kind} {id} /{}/{}", re.source, re.flags)),
			HeapObject::Unsupported(marker) => self.line(&format!("<unsupported {} (tag 0x{:08x})>", marker.kind, marker.tag)),
			HeapObject::Array(_) | HeapObject::Object(_) | HeapObject::Map(_) | HeapObject::Set(_) => {
				if self.path.len() >= self.options.max_depth {
					self.line(&format!("{kind} {id} {{ ... }}"));
					return;
				}
				self.line(&format!("{kind} {id} {{"));
				self.expanded.insert(id);
				self.path.push(id);
				self.children(object, indent + 2);
				self.path.pop();
				self.pad(indent);
				self.line("}");
			}
		}
	}

	fn children(&mut self, object: &HeapObject, indent: usize) {
		match object {
			HeapObject::Array(slots) => {
				for (index, slot) in slots.iter().enumerate() {
					self.pad(indent);
					let _ = write!(self.out, "[{index}] = ");
					match slot {
						Some(value) => self.value(value, indent),
						None => self.line("<unset>"),
					}
				}
			}
			HeapObject::Object(props) => {
				for (key, value) in props.iter() {
					self.pad(indent);
					let _ = write!(self.out, "{key} = ");
					self.value(value, indent);
				}
			}
			HeapObject::Map(entries) => {
				for (key, value) in entries {
					self.pad(indent);
					let _ = write!(self.out, "{} => ", inline_label(self.doc, &key.0));
					self.value(value, indent);
				}
			}
			HeapObject::Set(items) => {
				for item in items {
					self.pad(indent);
					self.value(&item.0, indent);
				}
			}
			_ => {}
		}
	}

	fn pad(&mut self, indent: usize) {
		self.out.extend(std::iter::repeat_n(' ', indent));
	}

	fn line(&mut self, text: &str) {
		self.out.push_str(text);
		self.out.push('\n');
	}
}

struct JsonRenderer<'d> {
	doc: &'d Document,
	options: RenderOptions,
	path: Vec<ObjId>,
	expanded: HashSet<ObjId>,
}

impl JsonRenderer<'_> {
	fn value(&mut self, value: &Value) -> JsonValue {
		match value {
			Value::Null => JsonValue::Null,
			Value::Undefined => json!({ "$undefined": true }),
			Value::Bool(value) => json!(value),
			Value::Int32(value) => json!(value),
			Value::Double(value) => number_json(*value),
			Value::String(value) => json!(value.as_ref()),
			Value::Object(id) => self.object(*id),
		}
	}

	fn object(&mut self, id: ObjId) -> JsonValue {
		let doc = self.doc;
		let Some(object) = doc.get(id) else {
			return json!({ "$dangling": id.index() });
		};
		if self.path.contains(&id) {
			return json!({ "$circular": id.index() });
		}
		if self.expanded.contains(&id) {
			return json!({ "$ref": id.index() });
		}

		match object {
			HeapObject::Boolean(value) => json!({ "$boolean": value }),
			HeapObject::Number(value) => json!({ "$number": number_json(*value) }),
			HeapObject::String(value) => json!({ "$string": value.as_ref() }),
			HeapObject::Date(time) => json!({ "$date": number_json(*time) }),
			HeapObject::RegExp(re) => json!({ "$regexp": re.source.as_ref(), "flags": re.flags.to_string() }),
			HeapObject::Unsupported(marker) => json!({ "$unsupported": marker.kind.to_string(), "tag": marker.tag }),
			HeapObject::Array(_) | HeapObject::Object(_) | HeapObject::Map(_) | HeapObject::Set(_) => {
				if self.path.len() >= self.options.max_depth {
					return json!({ "$truncated": id.index() });
				}
				self.expanded.insert(id);
				self.path.push(id);
				let out = self.container(object);
				self.path.pop();
				out
			}
		}
	}

	fn container(&mut self, object: &HeapObject) -> JsonValue {
		match object {
			HeapObject::Array(slots) => JsonValue::Array(
				slots
					.iter()
					.map(|slot| slot.as_ref().map_or(JsonValue::Null, |value| self.value(value)))
					.collect(),
			),
			HeapObject::Object(props) => {
				let mut out = Map::new();
				for (key, value) in props.iter() {
					let value = self.value(value);
					out.insert(key.to_string(), value);
				}
				JsonValue::Object(out)
			}
			HeapObject::Map(entries) => {
				let pairs: Vec<JsonValue> = entries
					.iter()
					.map(|(key, value)| JsonValue::Array(vec![self.value(&key.0), self.value(value)]))
					.collect();
				json!({ "$map": pairs })
			}
			HeapObject::Set(items) => {
				let items: Vec<JsonValue> = items.iter().map(|item| self.value(&item.0)).collect();
				json!({ "$set": items })
			}
			_ => JsonValue::Null,
		}
	}
}

// JSON has no spelling for NaN or the infinities.
fn number_json(value: f64) -> JsonValue {
	if value.is_finite() { json!(value) } else { json!(number_label(value)) }
}
