//! Canonical Extended-JSON-like textual rendering, used by tests and by
//! anything that wants a human-readable view of a decoded value.
//!
//! This is a write-only rendering path: nothing in this crate parses
//! Extended JSON back into BSON.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::binary::BinarySubtype;
use crate::document::array::ArrayReader;
use crate::document::reader::DocumentReader;
use crate::document::value::ValueReader;
use crate::error::Error;
use crate::types::BsonType;

/// The inclusive millisecond range rendered as an ISO-8601 string rather
/// than `{"$numberLong": ...}` -- years 1970 through 9999.
const MAX_ISO8601_MILLIS: i64 = 253_402_300_799_999;

pub fn render_document(doc: &DocumentReader) -> Result<String, Error> {
    let entries = doc.entries()?;
    let mut rendered = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        rendered.push(format!("{}: {}", escape_string(&name), render_value(&value)?));
    }
    Ok(format!("{{{}}}", rendered.join(", ")))
}

pub fn render_array(array: &ArrayReader) -> Result<String, Error> {
    let elements = array.elements()?;
    let mut rendered = Vec::with_capacity(elements.len());
    for value in elements {
        rendered.push(render_value(&value)?);
    }
    Ok(format!("[{}]", rendered.join(", ")))
}

/// Renders a single value per the rules in the design notes. Literal
/// strings are reproduced exactly as specified since the test suite
/// compares against them verbatim.
pub fn render_value(value: &ValueReader) -> Result<String, Error> {
    Ok(match value.bson_type() {
        BsonType::Boolean => value.read_boolean()?.to_string(),
        BsonType::Int32 => value.read_int32()?.to_string(),
        BsonType::Int64 => value.read_int64()?.to_string(),
        BsonType::Null => "null".to_string(),
        BsonType::Double => render_double(value.read_double()?),
        BsonType::String => escape_string(&value.read_string()?),
        BsonType::Datetime => render_datetime(value.read_datetime()?),
        BsonType::ObjectId => format!("{{\"$oid\": \"{}\"}}", value.read_object_id()?.to_hex()),
        BsonType::Timestamp => {
            let ts = value.read_timestamp()?;
            format!(
                "{{\"$timestamp\": {{\"t\": {}, \"i\": {}}}}}",
                ts.time(),
                ts.increment()
            )
        }
        BsonType::BinaryData => {
            let binary = value.read_binary_data()?;
            let subtype: u8 = binary.subtype.into();
            format!(
                "{{\"$binary\": {{\"base64\": \"{}\", \"subType\": \"{:02x}\"}}}}",
                BASE64.encode(&binary.bytes),
                subtype
            )
        }
        BsonType::RegExp => {
            let regex = value.read_regexp()?;
            format!(
                "{{\"$regularExpression\": {{\"pattern\": {}, \"options\": \"{}\"}}}}",
                escape_string(&regex.pattern),
                regex.options
            )
        }
        BsonType::Document => render_document(&value.read_document()?)?,
        BsonType::Array => render_array(&value.read_array()?)?,
        BsonType::MinKey => "{\"$minKey\": 1}".to_string(),
        BsonType::MaxKey => "{\"$maxKey\": 1}".to_string(),
        BsonType::JavaScript => format!("{{\"$code\": {}}}", escape_string(&value.read_javascript()?)),
        BsonType::Undefined => {
            value.read_undefined()?;
            "{\"$undefined\": true}".to_string()
        }
        // the remaining deprecated types have no rendering rule in the
        // design notes; fall back to their raw decoded form.
        BsonType::Symbol => escape_string(&value.read_symbol()?),
        BsonType::Decimal128 => {
            let d = value.read_decimal128()?;
            format!("{{\"$numberDecimalBits\": [{}, {}]}}", d.low(), d.high())
        }
        BsonType::DBPointer => {
            let (namespace, id) = value.read_db_pointer()?;
            format!(
                "{{\"$dbPointer\": {{\"$ref\": {}, \"$id\": \"{}\"}}}}",
                escape_string(&namespace),
                id.to_hex()
            )
        }
        BsonType::JavaScriptWithScope => {
            let (code, scope) = value.read_javascript_with_scope()?;
            format!(
                "{{\"$code\": {}, \"$scope\": {}}}",
                escape_string(&code),
                render_document(&scope)?
            )
        }
    })
}

fn render_double(d: f64) -> String {
    if d.is_nan() {
        return "{\"$numberDouble\": \"NaN\"}".to_string();
    }
    if d.is_infinite() {
        let sign = if d > 0.0 { "" } else { "-" };
        return format!("{{\"$numberDouble\": \"{sign}Infinity\"}}");
    }
    if d.abs() > 1e6 {
        format!("{:E}", d)
    } else {
        // `{:?}` on f64 always includes a fractional dot and preserves the
        // sign of negative zero, matching the rendering rule directly.
        format!("{d:?}")
    }
}

fn render_datetime(millis_since_epoch: i64) -> String {
    if (0..=MAX_ISO8601_MILLIS).contains(&millis_since_epoch) {
        format!("{{\"$date\": \"{}\"}}", format_iso8601(millis_since_epoch))
    } else {
        format!("{{\"$date\": {{\"$numberLong\": \"{millis_since_epoch}\"}}}}")
    }
}

fn format_iso8601(millis_since_epoch: i64) -> String {
    let secs = millis_since_epoch.div_euclid(1000);
    let ms = millis_since_epoch.rem_euclid(1000);
    let dt = time::OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(secs);
    let base = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year(),
        dt.month() as u8,
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );
    if ms == 0 {
        format!("{base}Z")
    } else {
        format!("{base}.{ms:03}Z")
    }
}

/// JSON-escapes and double-quotes a string.
fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
